//! Lorenz Chaotic State
//!
//! Three coupled scalars evolved by the classic Lorenz equations:
//!   dx = σ(y - x)
//!   dy = x(ρ - z) - y
//!   dz = xy - βz
//! with σ=10, ρ=28, β=8/3. After each step every component is wrapped
//! into [0, 180) so the state can never run off to infinity.

const SIGMA: f64 = 10.0;
const RHO: f64 = 28.0;
const BETA: f64 = 8.0 / 3.0;

/// Upper bound (exclusive) of every state component
pub const STATE_BOUND: f64 = 180.0;

/// Raw Lorenz derivative (dx, dy, dz), before any bounding
pub type Derivative = (f64, f64, f64);

/// Euclidean remainder that always lands in `[0, modulus)`.
///
/// `rem_euclid` can round up to exactly `modulus` for tiny negative inputs.
pub fn wrap(value: f64, modulus: f64) -> f64 {
    let r = value.rem_euclid(modulus);
    if r >= modulus {
        0.0
    } else {
        r
    }
}

/// The (x, y, z) triple driving angle distortion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaoticState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for ChaoticState {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl ChaoticState {
    /// State at the start of every repetition
    pub const INITIAL: ChaoticState = ChaoticState { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new() -> Self {
        Self::INITIAL
    }

    /// Back to (1, 1, 1)
    pub fn reset(&mut self) {
        *self = Self::INITIAL;
    }

    /// Lorenz derivative at the current state (no mutation)
    pub fn derivative(&self) -> Derivative {
        let dx = SIGMA * (self.y - self.x);
        let dy = self.x * (RHO - self.z) - self.y;
        let dz = self.x * self.y - BETA * self.z;
        (dx, dy, dz)
    }

    /// Step along a given derivative, scaled by `multiplier`, then wrap
    pub fn advance(&mut self, derivative: Derivative, multiplier: f64) {
        let (dx, dy, dz) = derivative;
        self.x = wrap(self.x + dx * multiplier, STATE_BOUND);
        self.y = wrap(self.y + dy * multiplier, STATE_BOUND);
        self.z = wrap(self.z + dz * multiplier, STATE_BOUND);
    }

    /// Compute the derivative at the current state, advance along it and
    /// return the raw derivative for use in the same step.
    pub fn update(&mut self, multiplier: f64) -> Derivative {
        let derivative = self.derivative();
        self.advance(derivative, multiplier);
        derivative
    }

    /// True when all three components lie in [0, 180)
    #[cfg(test)]
    pub fn is_bounded(&self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|v| (0.0..STATE_BOUND).contains(v))
    }
}

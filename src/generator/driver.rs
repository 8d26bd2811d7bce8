//! Fractal Driver
//!
//! Walks the three nested loops of a run as a lazy instruction stream:
//!
//! ```text
//! for each repetition:            reset chaos to (1, 1, 1)
//!     for each group pass:
//!         for sides in min..=max: Stroke, polygon, counter += increment, Left(angle1)
//!     PenUp, Forward(move), Left(angle2), PenDown
//! ```
//!
//! The angle increment counter is never reset between repetitions.

use std::iter::FusedIterator;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::chaos::ChaoticState;
use super::instruction::{DrawingInstruction, Rgb};
use super::polygon::PolygonEmitter;
use crate::config::FractalConfig;

/// Where the driver is inside the nested loops
#[derive(Debug, Clone)]
enum Phase {
    /// About to start (or finish) a repetition
    Repetition,
    /// About to pick a color and start a polygon
    Polygon { group: u32, sides: u32 },
    /// Emitting the sides of a polygon
    Drawing { group: u32, emitter: PolygonEmitter },
    /// Inter-group move, step 0..4
    Transit(u8),
    Done,
}

/// Lazy, finite, non-restartable producer of a run's instructions.
///
/// Owns the chaotic state, the angle increment counter and the color RNG
/// for the whole run.
#[derive(Debug)]
pub struct FractalDriver<R: Rng = StdRng> {
    config: FractalConfig,
    rng: R,
    state: ChaoticState,
    angle_increment: f64,
    repetition: u32,
    polygons_drawn: u64,
    emitted: u64,
    total: Option<u64>,
    phase: Phase,
}

impl FractalDriver<StdRng> {
    /// Driver with a seeded color RNG
    pub fn seeded(config: FractalConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FractalDriver<R> {
    pub fn new(config: FractalConfig, rng: R) -> Self {
        let total = Self::expected_len(&config);
        Self {
            config,
            rng,
            state: ChaoticState::new(),
            angle_increment: 0.0,
            repetition: 0,
            polygons_drawn: 0,
            emitted: 0,
            total,
            phase: Phase::Repetition,
        }
    }

    /// Exact number of instructions a full run emits, `None` past `u64::MAX`
    pub fn expected_len(config: &FractalConfig) -> Option<u64> {
        // Each pass draws sides_min..=sides_max: sum(2s + 2) = (min + max) * n + 2n
        let per_pass = if config.sides_min <= config.sides_max {
            let min = u128::from(config.sides_min);
            let max = u128::from(config.sides_max);
            let n = max - min + 1;
            (min + max) * n + 2 * n
        } else {
            0
        };
        let per_repetition = u128::from(config.grouping)
            .checked_mul(per_pass)?
            .checked_add(4)?;
        let total = u128::from(config.iterations).checked_mul(per_repetition)?;
        u64::try_from(total).ok()
    }

    /// Current chaotic state
    pub fn state(&self) -> &ChaoticState {
        &self.state
    }

    /// Current value of the run-wide angle increment counter
    pub fn angle_increment(&self) -> f64 {
        self.angle_increment
    }

    /// Repetitions started so far
    pub fn repetition(&self) -> u32 {
        self.repetition
    }

    pub fn polygons_drawn(&self) -> u64 {
        self.polygons_drawn
    }

    /// First polygon of a group pass, or the inter-group move if none
    fn group_start(&self, group: u32) -> Phase {
        if group < self.config.grouping && self.config.sides_min <= self.config.sides_max {
            Phase::Polygon { group, sides: self.config.sides_min }
        } else {
            Phase::Transit(0)
        }
    }

    fn after_polygon(&self, group: u32, sides: u32) -> Phase {
        if sides < self.config.sides_max {
            Phase::Polygon { group, sides: sides + 1 }
        } else {
            self.group_start(group + 1)
        }
    }

    fn step(&mut self) -> Option<DrawingInstruction> {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Done => return None,

                Phase::Repetition => {
                    if self.repetition >= self.config.iterations {
                        tracing::debug!(
                            polygons = self.polygons_drawn,
                            instructions = self.emitted,
                            "Run complete"
                        );
                        return None;
                    }
                    self.repetition += 1;
                    self.state.reset();
                    tracing::debug!(
                        repetition = self.repetition,
                        of = self.config.iterations,
                        angle_increment = self.angle_increment,
                        "Starting repetition"
                    );
                    self.phase = self.group_start(0);
                }

                Phase::Polygon { group, sides } => {
                    let color = Rgb::random(&mut self.rng);
                    let emitter = PolygonEmitter::new(
                        sides,
                        self.config.side_length,
                        self.angle_increment,
                        &self.config.distortion(),
                    );
                    self.phase = Phase::Drawing { group, emitter };
                    return Some(DrawingInstruction::Stroke { color });
                }

                Phase::Drawing { group, mut emitter } => {
                    if let Some(instruction) = emitter.next_instruction(&mut self.state) {
                        self.phase = Phase::Drawing { group, emitter };
                        return Some(instruction);
                    }
                    self.angle_increment += self.config.increment_amount;
                    self.polygons_drawn += 1;
                    self.phase = self.after_polygon(group, emitter.sides());
                    return Some(DrawingInstruction::left(self.config.angle1));
                }

                Phase::Transit(step) => {
                    let instruction = match step {
                        0 => DrawingInstruction::PenUp,
                        1 => DrawingInstruction::forward(self.config.move_length),
                        2 => DrawingInstruction::left(self.config.angle2),
                        _ => DrawingInstruction::PenDown,
                    };
                    self.phase = if step < 3 {
                        Phase::Transit(step + 1)
                    } else {
                        Phase::Repetition
                    };
                    return Some(instruction);
                }
            }
        }
    }
}

impl<R: Rng> Iterator for FractalDriver<R> {
    type Item = DrawingInstruction;

    fn next(&mut self) -> Option<Self::Item> {
        let instruction = self.step()?;
        self.emitted += 1;
        Some(instruction)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self
            .total
            .and_then(|total| usize::try_from(total.saturating_sub(self.emitted)).ok());
        match left {
            Some(left) => (left, Some(left)),
            None => (usize::MAX, None),
        }
    }
}

impl<R: Rng> FusedIterator for FractalDriver<R> {}

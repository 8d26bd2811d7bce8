//! Turn Angle Distortion
//!
//! The undistorted polygon turns by 360/sides. Two perturbations are added:
//! - the Lorenz dx, scaled by the golden ratio and damped by a divisor
//! - a sine of the run-wide angle increment, scaled by the modulation strength
//!
//! The sum is wrapped into [0, 180), which keeps every turn below a half
//! circle and pushes the drawing towards spirals.

use super::chaos::wrap;

/// Turns are always reported in [0, 180)
pub const TURN_BOUND: f64 = 180.0;

/// (1 + √5) / 2
pub fn golden_ratio() -> f64 {
    (1.0 + 5.0_f64.sqrt()) / 2.0
}

/// Computes per-side turn angles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDistorter {
    pub modulation_strength: f64,
    pub golden_ratio_divisor: f64,
}

impl AngleDistorter {
    pub fn new(modulation_strength: f64, golden_ratio_divisor: f64) -> Self {
        Self {
            modulation_strength,
            golden_ratio_divisor,
        }
    }

    /// Lorenz contribution to the angle
    pub fn distortion(&self, dx: f64) -> f64 {
        dx * golden_ratio() / self.golden_ratio_divisor
    }

    /// Periodic contribution; `step_index` is read as degrees
    pub fn periodic(&self, step_index: f64) -> f64 {
        self.modulation_strength * step_index.to_radians().sin()
    }

    /// Turn angle in degrees for one polygon side.
    ///
    /// # Arguments
    /// * `step_index` - run-wide angle increment counter for this polygon
    /// * `sides` - side count of the polygon being drawn
    /// * `dx` - Lorenz dx from the same step
    pub fn turn_angle(&self, step_index: f64, sides: u32, dx: f64) -> f64 {
        let base_angle = 360.0 / sides as f64;
        let distorted = base_angle + self.distortion(dx);
        wrap(distorted + self.periodic(step_index), TURN_BOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undistorted_triangle() {
        let d = AngleDistorter::new(1.0, 100.0);
        assert_eq!(d.turn_angle(0.0, 3, 0.0), 120.0);
    }

    #[test]
    fn test_square_wraps_to_half_turn_range() {
        // 90 + 100 = 190 -> 10
        let d = AngleDistorter::new(100.0, 100.0);
        let angle = d.turn_angle(90.0, 4, 0.0);
        assert!((angle - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_golden_ratio_scaling() {
        let d = AngleDistorter::new(0.0, 100.0);
        let angle = d.turn_angle(0.0, 6, 100.0);
        assert!((angle - (60.0 + golden_ratio())).abs() < 1e-12);
    }

    #[test]
    fn test_negative_sum_is_non_negative() {
        // 120 - 200 = -80 -> 100
        let d = AngleDistorter::new(0.0, golden_ratio());
        let angle = d.turn_angle(0.0, 3, -200.0);
        assert!((angle - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_reproducible() {
        let d = AngleDistorter::new(1.3, 77.0);
        let a = d.turn_angle(12.7, 5, 3.21);
        let b = d.turn_angle(12.7, 5, 3.21);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_always_in_range() {
        let d = AngleDistorter::new(50.0, 0.5);
        for i in 0..500 {
            let dx = (i as f64 - 250.0) * 13.7;
            let angle = d.turn_angle(i as f64 * 0.1, 3 + i % 7, dx);
            assert!((0.0..TURN_BOUND).contains(&angle));
        }
    }
}

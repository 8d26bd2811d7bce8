//! Chaotic Polygon Generator
//!
//! Produces the turtle instruction stream for a distorted polygon fractal:
//! - chaos: Lorenz state bounded to [0, 180)
//! - angle: per-side turn angle distortion
//! - polygon: one polygon as alternating forward/turn instructions
//! - driver: repetitions of group passes over a side-count range

pub mod angle;
pub mod chaos;
pub mod driver;
pub mod instruction;
pub mod polygon;

pub use angle::AngleDistorter;
pub use chaos::ChaoticState;
pub use driver::FractalDriver;
pub use instruction::{Direction, DrawingInstruction, Rgb};
pub use polygon::emit_polygon;

use serde::{Deserialize, Serialize};

/// When the Lorenz derivative feeding a side's turn angle is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaosSampling {
    /// Fresh derivative from the just-advanced state on every side
    #[default]
    PerSide,
    /// Derivative taken once at the polygon's first side and reused for
    /// every side (the state still advances along it each side)
    PolygonStart,
}

/// Distortion knobs shared by every polygon in a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    pub modulation_strength: f64,
    pub golden_ratio_divisor: f64,
    pub chaos_multiplier: f64,
    pub sampling: ChaosSampling,
}

impl Distortion {
    pub fn angle_distorter(&self) -> AngleDistorter {
        AngleDistorter::new(self.modulation_strength, self.golden_ratio_divisor)
    }
}

impl Default for Distortion {
    fn default() -> Self {
        Self {
            modulation_strength: 1.0,
            golden_ratio_divisor: 100.0,
            chaos_multiplier: 0.01,
            sampling: ChaosSampling::PerSide,
        }
    }
}

//! Configuration loader - YAML file + .env settings
//!
//! Every field has a default taken from the classic parameter set, so an
//! empty (or missing) file yields a drawable configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::generator::{ChaosSampling, Distortion};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Non-fatal oddities that still produce a drawing
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// `sides_min > sides_max`: no polygons are drawn
    EmptySideRange { min: u32, max: u32 },
    /// Fewer than three sides cannot close a polygon
    DegeneratePolygon { sides: u32 },
    /// Nothing but inter-group moves will be emitted
    NothingToDraw,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::EmptySideRange { min, max } => write!(
                f,
                "sides_min ({}) > sides_max ({}): groups will contain no polygons",
                min, max
            ),
            ConfigWarning::DegeneratePolygon { sides } => {
                write!(f, "{}-sided polygons are degenerate", sides)
            }
            ConfigWarning::NothingToDraw => write!(f, "grouping or iterations is 0: nothing will be drawn"),
        }
    }
}

/// Main configuration loaded from fractal.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fractal: FractalConfig,
    pub render: RenderConfig,
    /// Seed for polygon colors; random when absent
    pub seed: Option<u64>,
}

/// Generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    /// Length of each polygon side
    pub side_length: f64,
    /// Smallest polygon drawn in each group pass
    pub sides_min: u32,
    /// Largest polygon drawn in each group pass
    pub sides_max: u32,
    /// Passes over the side range per repetition
    pub grouping: u32,
    /// Left turn after each polygon
    pub angle1: f64,
    /// Left turn after each group
    pub angle2: f64,
    /// Pen-up distance between groups
    pub move_length: f64,
    /// Number of repetitions (groups)
    pub iterations: u32,
    /// Added to the angle increment counter after each polygon
    pub increment_amount: f64,
    /// Scales the sine term of the angle
    pub modulation_strength: f64,
    /// Damps the golden-ratio scaled Lorenz term
    pub golden_ratio_divisor: f64,
    /// Step size of the Lorenz update
    #[serde(alias = "lorenz_multiplier")]
    pub chaos_multiplier: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub chaos_sampling: ChaosSampling,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            side_length: 50.0,
            sides_min: 3,
            sides_max: 3,
            grouping: 3,
            angle1: 160.0,
            angle2: 150.0,
            move_length: 200.0,
            iterations: 43,
            increment_amount: 0.1,
            modulation_strength: 1.0,
            golden_ratio_divisor: 100.0,
            chaos_multiplier: 0.01,
            start_x: 0.0,
            start_y: 0.0,
            chaos_sampling: ChaosSampling::PerSide,
        }
    }
}

/// Output canvas settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Blank border kept around the fitted drawing, in pixels
    pub margin: f64,
    pub stroke_width: f64,
    pub background: [u8; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1000,
            margin: 20.0,
            stroke_width: 1.0,
            background: [0, 0, 0],
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document parses as unit, not as a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate both sections; returns non-fatal warnings
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.render.validate()?;
        self.fractal.validate()
    }
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} is not a finite number", value),
        })
    }
}

impl FractalConfig {
    /// Side counts drawn in each group pass (empty when min > max)
    pub fn side_range(&self) -> RangeInclusive<u32> {
        self.sides_min..=self.sides_max
    }

    pub fn distortion(&self) -> Distortion {
        Distortion {
            modulation_strength: self.modulation_strength,
            golden_ratio_divisor: self.golden_ratio_divisor,
            chaos_multiplier: self.chaos_multiplier,
            sampling: self.chaos_sampling,
        }
    }

    pub fn start(&self) -> (f64, f64) {
        (self.start_x, self.start_y)
    }

    /// Polygons in a full run, `None` past `u64::MAX`
    pub fn polygon_count(&self) -> Option<u64> {
        let sides = if self.sides_min <= self.sides_max {
            u64::from(self.sides_max - self.sides_min) + 1
        } else {
            0
        };
        u64::from(self.iterations)
            .checked_mul(u64::from(self.grouping))?
            .checked_mul(sides)
    }

    /// Reject parameters that would make angles non-finite
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        for (field, value) in [
            ("side_length", self.side_length),
            ("angle1", self.angle1),
            ("angle2", self.angle2),
            ("move_length", self.move_length),
            ("increment_amount", self.increment_amount),
            ("modulation_strength", self.modulation_strength),
            ("golden_ratio_divisor", self.golden_ratio_divisor),
            ("chaos_multiplier", self.chaos_multiplier),
            ("start_x", self.start_x),
            ("start_y", self.start_y),
        ] {
            ensure_finite(field, value)?;
        }

        if self.golden_ratio_divisor == 0.0 {
            return Err(ConfigError::Invalid {
                field: "golden_ratio_divisor",
                reason: "must not be zero".to_string(),
            });
        }
        if self.sides_min == 0 {
            return Err(ConfigError::Invalid {
                field: "sides_min",
                reason: "a polygon needs at least one side".to_string(),
            });
        }

        let mut warnings = Vec::new();
        if self.sides_min > self.sides_max {
            warnings.push(ConfigWarning::EmptySideRange {
                min: self.sides_min,
                max: self.sides_max,
            });
        } else if self.sides_min < 3 {
            warnings.push(ConfigWarning::DegeneratePolygon { sides: self.sides_min });
        }
        if self.grouping == 0 || self.iterations == 0 {
            warnings.push(ConfigWarning::NothingToDraw);
        }
        Ok(warnings)
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid {
                field: "render.width/height",
                reason: format!("canvas {}x{} is empty", self.width, self.height),
            });
        }
        ensure_finite("render.margin", self.margin)?;
        ensure_finite("render.stroke_width", self.stroke_width)?;
        if self.margin < 0.0 || 2.0 * self.margin >= f64::from(self.width.min(self.height)) {
            return Err(ConfigError::Invalid {
                field: "render.margin",
                reason: format!("{} leaves no room to draw", self.margin),
            });
        }
        let canvas = f64::from(self.width.min(self.height));
        if self.stroke_width <= 0.0 || self.stroke_width > canvas {
            return Err(ConfigError::Invalid {
                field: "render.stroke_width",
                reason: format!("{} is outside (0, {}]", self.stroke_width, canvas),
            });
        }
        Ok(())
    }
}

/// Settings loaded from .env / environment
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub log_dir: String,
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
}

impl Settings {
    /// Load settings from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Settings {
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            seed: std::env::var("FRACTAL_SEED")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

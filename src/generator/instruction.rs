//! Drawing instructions emitted by the generator
//!
//! A renderer consumes these in order. `Forward` draws only while the pen
//! is down; `Stroke` selects the color for the polygon that follows.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Turn direction, turtle convention (left = counter-clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// RGB color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const RED: Rgb = Rgb { r: 1.0, g: 0.0, b: 0.0 };

    /// Three independent uniform draws
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let r = rng.gen::<f64>();
        let g = rng.gen::<f64>();
        let b = rng.gen::<f64>();
        Self { r, g, b }
    }

    pub fn to_u8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0) as u8,
        ]
    }

    /// CSS form, e.g. `rgb(255,0,0)`
    pub fn css(self) -> String {
        let [r, g, b] = self.to_u8();
        format!("rgb({},{},{})", r, g, b)
    }
}

/// A single turtle command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawingInstruction {
    /// Move forward; draws a line if the pen is down
    Forward { distance: f64 },
    /// Rotate in place by `degrees`
    Turn { direction: Direction, degrees: f64 },
    PenUp,
    PenDown,
    /// Color for the next polygon
    Stroke { color: Rgb },
}

impl DrawingInstruction {
    pub fn forward(distance: f64) -> Self {
        DrawingInstruction::Forward { distance }
    }

    pub fn left(degrees: f64) -> Self {
        DrawingInstruction::Turn { direction: Direction::Left, degrees }
    }

    #[cfg(test)]
    pub fn right(degrees: f64) -> Self {
        DrawingInstruction::Turn { direction: Direction::Right, degrees }
    }

    pub fn is_turn(&self) -> bool {
        matches!(self, DrawingInstruction::Turn { .. })
    }

    #[cfg(test)]
    pub fn is_stroke(&self) -> bool {
        matches!(self, DrawingInstruction::Stroke { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_color_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let c = Rgb::random(&mut rng);
            for v in [c.r, c.g, c.b] {
                assert!((0.0..1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_css() {
        assert_eq!(Rgb::RED.css(), "rgb(255,0,0)");
    }

    #[test]
    fn test_json_tagging() {
        let json = serde_json::to_string(&DrawingInstruction::left(90.0)).unwrap();
        assert_eq!(json, r#"{"op":"turn","direction":"left","degrees":90.0}"#);
        let json = serde_json::to_string(&DrawingInstruction::PenUp).unwrap();
        assert_eq!(json, r#"{"op":"pen_up"}"#);
    }
}

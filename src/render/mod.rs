//! Renderers - turn an instruction stream into a picture
//!
//! The `Turtle` interprets instructions into line segments; the SVG and PNG
//! back ends fit those segments onto a canvas. Nothing here knows how the
//! instructions were generated.

pub mod raster;
pub mod svg;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::RenderConfig;
use crate::generator::{Direction, DrawingInstruction, Rgb};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A drawn line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: Rgb,
}

/// Turtle pose and pen
///
/// Heading is in degrees, 0 = east, counter-clockwise positive (y up).
#[derive(Debug, Clone)]
pub struct Turtle {
    pub position: (f64, f64),
    pub heading: f64,
    pub pen_down: bool,
    pub color: Rgb,
}

impl Turtle {
    /// Turtle at `start`, facing east, pen down, drawing red
    pub fn new(start: (f64, f64)) -> Self {
        Self {
            position: start,
            heading: 0.0,
            pen_down: true,
            color: Rgb::RED,
        }
    }

    /// Apply one instruction, returning the segment drawn (if any)
    pub fn apply(&mut self, instruction: &DrawingInstruction) -> Option<Segment> {
        match *instruction {
            DrawingInstruction::Forward { distance } => {
                let (sin, cos) = self.heading.to_radians().sin_cos();
                let from = self.position;
                let to = (from.0 + distance * cos, from.1 + distance * sin);
                self.position = to;
                self.pen_down.then_some(Segment {
                    from,
                    to,
                    color: self.color,
                })
            }
            DrawingInstruction::Turn { direction, degrees } => {
                let signed = match direction {
                    Direction::Left => degrees,
                    Direction::Right => -degrees,
                };
                self.heading = (self.heading + signed).rem_euclid(360.0);
                None
            }
            DrawingInstruction::PenUp => {
                self.pen_down = false;
                None
            }
            DrawingInstruction::PenDown => {
                self.pen_down = true;
                None
            }
            DrawingInstruction::Stroke { color } => {
                self.color = color;
                None
            }
        }
    }

    /// Run a whole stream and collect the drawn segments
    pub fn trace<I>(&mut self, instructions: I) -> Vec<Segment>
    where
        I: IntoIterator<Item = DrawingInstruction>,
    {
        instructions
            .into_iter()
            .filter_map(|instruction| self.apply(&instruction))
            .collect()
    }
}

/// Axis-aligned bounding box of a drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: (f64, f64),
    pub max: (f64, f64),
}

impl Bounds {
    /// Box around all segment endpoints; `None` for an empty drawing
    pub fn of(segments: &[Segment]) -> Option<Self> {
        let mut points = segments.iter().flat_map(|s| [s.from, s.to]);
        let first = points.next()?;
        let mut bounds = Bounds { min: first, max: first };
        for (x, y) in points {
            bounds.min = (bounds.min.0.min(x), bounds.min.1.min(y));
            bounds.max = (bounds.max.0.max(x), bounds.max.1.max(y));
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.0 - self.min.0
    }

    pub fn height(&self) -> f64 {
        self.max.1 - self.min.1
    }
}

/// Maps turtle coordinates to canvas pixels (y flipped, centered)
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    scale: f64,
    offset: (f64, f64),
    height: f64,
}

impl Viewport {
    /// Auto-fit the drawing into the canvas, keeping aspect ratio
    pub fn fit(bounds: Option<Bounds>, render: &RenderConfig) -> Self {
        let width = f64::from(render.width);
        let height = f64::from(render.height);
        let avail_w = width - 2.0 * render.margin;
        let avail_h = height - 2.0 * render.margin;

        let Some(b) = bounds else {
            return Self {
                scale: 1.0,
                offset: (width / 2.0, height / 2.0),
                height,
            };
        };

        let span_w = b.width().max(f64::EPSILON);
        let span_h = b.height().max(f64::EPSILON);
        let scale = (avail_w / span_w).min(avail_h / span_h);
        let center = ((b.min.0 + b.max.0) / 2.0, (b.min.1 + b.max.1) / 2.0);
        Self {
            scale,
            offset: (width / 2.0 - center.0 * scale, height / 2.0 - center.1 * scale),
            height,
        }
    }

    /// Canvas position, origin top-left
    pub fn map(&self, point: (f64, f64)) -> (f64, f64) {
        let x = point.0 * self.scale + self.offset.0;
        let y = point.1 * self.scale + self.offset.1;
        (x, self.height - y)
    }
}

/// Output file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    /// Guess from file extension
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Encode segments into file bytes
    pub fn encode(self, segments: &[Segment], render: &RenderConfig) -> Result<Vec<u8>, RenderError> {
        match self {
            OutputFormat::Svg => Ok(self::svg::render(segments, render).to_string().into_bytes()),
            OutputFormat::Png => raster::encode_png(&raster::render(segments, render)),
        }
    }
}

/// Write via a sibling temp file so an existing drawing is only replaced
/// by a complete one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".partial");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_square_closes() {
        let mut turtle = Turtle::new((10.0, -5.0));
        let mut instructions = Vec::new();
        for _ in 0..4 {
            instructions.push(DrawingInstruction::forward(3.0));
            instructions.push(DrawingInstruction::left(90.0));
        }
        let segments = turtle.trace(instructions);
        assert_eq!(segments.len(), 4);
        assert!(close(segments[0].to, (13.0, -5.0)));
        assert!(close(segments[1].to, (13.0, -2.0)));
        assert!(close(turtle.position, (10.0, -5.0)));
        assert!(turtle.heading.abs() < 1e-9 || (turtle.heading - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_pen_up_moves_without_drawing() {
        let mut turtle = Turtle::new((0.0, 0.0));
        let segments = turtle.trace([
            DrawingInstruction::PenUp,
            DrawingInstruction::forward(5.0),
            DrawingInstruction::PenDown,
            DrawingInstruction::right(90.0),
            DrawingInstruction::forward(1.0),
        ]);
        assert_eq!(segments.len(), 1);
        assert!(close(segments[0].from, (5.0, 0.0)));
        assert!(close(segments[0].to, (5.0, -1.0)));
    }

    #[test]
    fn test_stroke_sets_color() {
        let blue = Rgb { r: 0.0, g: 0.0, b: 0.5 };
        let mut turtle = Turtle::new((0.0, 0.0));
        let segments = turtle.trace([
            DrawingInstruction::forward(1.0),
            DrawingInstruction::Stroke { color: blue },
            DrawingInstruction::forward(1.0),
        ]);
        assert_eq!(segments[0].color, Rgb::RED);
        assert_eq!(segments[1].color, blue);
    }

    #[test]
    fn test_bounds_and_fit() {
        let segments = vec![Segment {
            from: (-10.0, 0.0),
            to: (10.0, 5.0),
            color: Rgb::RED,
        }];
        let bounds = Bounds::of(&segments).unwrap();
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 5.0);

        let render = RenderConfig {
            width: 120,
            height: 100,
            margin: 10.0,
            ..RenderConfig::default()
        };
        let view = Viewport::fit(Some(bounds), &render);
        // 100 px of usable width over 20 units
        assert!(close(view.map((-10.0, 0.0)), (10.0, 62.5)));
        assert!(close(view.map((10.0, 5.0)), (110.0, 37.5)));
    }

    #[test]
    fn test_empty_bounds() {
        assert_eq!(Bounds::of(&[]), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.SVG")).unwrap(), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path(Path::new("x.png")).unwrap(), OutputFormat::Png);
        assert!(OutputFormat::from_path(Path::new("x.bmp")).is_err());
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = std::env::temp_dir().join(format!("chaos_turtle_write_{}", std::process::id()));
        let path = dir.join("out.svg");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert!(!dir.join("out.svg.partial").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}

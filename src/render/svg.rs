//! SVG output
//!
//! Consecutive segments that share a color and join end-to-start are merged
//! into one `<path>`, so each polygon usually becomes a single element.

use svg::node::element::path::Data;
use svg::node::element::{Path, Rectangle};
use svg::Document;

use super::{Bounds, Segment, Viewport};
use crate::config::RenderConfig;
use crate::generator::Rgb;

/// A polyline in canvas coordinates
struct Run {
    color: Rgb,
    points: Vec<(f64, f64)>,
}

fn runs(segments: &[Segment], view: &Viewport) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut last_end: Option<(f64, f64)> = None;

    for segment in segments {
        let from = view.map(segment.from);
        let to = view.map(segment.to);
        let joins = last_end == Some(segment.from);
        match runs.last_mut() {
            Some(run) if joins && run.color == segment.color => run.points.push(to),
            _ => runs.push(Run {
                color: segment.color,
                points: vec![from, to],
            }),
        }
        last_end = Some(segment.to);
    }
    runs
}

fn path_data(points: &[(f64, f64)]) -> Data {
    let mut data = Data::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        let p = (x as f32, y as f32);
        data = if i == 0 { data.move_to(p) } else { data.line_to(p) };
    }
    data
}

/// Build the SVG document for a drawing
pub fn render(segments: &[Segment], render: &RenderConfig) -> Document {
    let view = Viewport::fit(Bounds::of(segments), render);
    let [r, g, b] = render.background;

    let background = Rectangle::new()
        .set("x", "0")
        .set("y", "0")
        .set("width", "100%")
        .set("height", "100%")
        .set("fill", format!("rgb({},{},{})", r, g, b));

    let mut document = Document::new()
        .set("width", render.width.to_string())
        .set("height", render.height.to_string())
        .set("viewBox", format!("0 0 {} {}", render.width, render.height))
        .add(background);

    for run in runs(segments, &view) {
        let path = Path::new()
            .set("fill", "none")
            .set("stroke", run.color.css())
            .set("stroke-width", render.stroke_width.to_string())
            .set("stroke-linejoin", "round")
            .set("stroke-linecap", "round")
            .set("d", path_data(&run.points));
        document = document.add(path);
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{DrawingInstruction, FractalDriver};
    use crate::render::Turtle;
    use crate::config::FractalConfig;

    fn seg(from: (f64, f64), to: (f64, f64), color: Rgb) -> Segment {
        Segment { from, to, color }
    }

    #[test]
    fn test_contiguous_same_color_merges() {
        let view = Viewport::fit(None, &RenderConfig::default());
        let green = Rgb { r: 0.0, g: 1.0, b: 0.0 };
        let segments = [
            seg((0.0, 0.0), (1.0, 0.0), Rgb::RED),
            seg((1.0, 0.0), (1.0, 1.0), Rgb::RED),
            seg((1.0, 1.0), (0.0, 1.0), green),
            seg((5.0, 5.0), (6.0, 5.0), green),
        ];
        let runs = runs(&segments, &view);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].points.len(), 3);
        assert_eq!(runs[1].points.len(), 2);
    }

    #[test]
    fn test_one_path_per_polygon() {
        let config = FractalConfig {
            grouping: 1,
            iterations: 2,
            ..FractalConfig::default()
        };
        let segments = Turtle::new(config.start()).trace(FractalDriver::seeded(config, 11));
        let text = render(&segments, &RenderConfig::default()).to_string();
        assert!(text.contains("<svg"));
        assert_eq!(text.matches("<path").count(), 2);
        assert!(text.contains("viewBox=\"0 0 1200 1000\""));
    }

    #[test]
    fn test_empty_drawing_is_background_only() {
        let segments = Turtle::new((0.0, 0.0)).trace([DrawingInstruction::PenUp]);
        let text = render(&segments, &RenderConfig::default()).to_string();
        assert!(text.contains("<rect"));
        assert!(!text.contains("<path"));
    }
}

//! PNG output
//!
//! Lines are rasterized with a simple DDA walk; stroke widths above one
//! pixel are approximated by stamping a square brush at each step.

use image::{ImageFormat, Rgb as Pixel, RgbImage};
use std::io::Cursor;

use super::{Bounds, RenderError, Segment, Viewport};
use crate::config::RenderConfig;

/// Rasterize a drawing onto a fresh canvas
pub fn render(segments: &[Segment], render: &RenderConfig) -> RgbImage {
    let view = Viewport::fit(Bounds::of(segments), render);
    let mut img = RgbImage::from_pixel(render.width, render.height, Pixel(render.background));
    let brush = (render.stroke_width.round() as i64).max(1);

    for segment in segments {
        let color = Pixel(segment.color.to_u8());
        draw_line(&mut img, view.map(segment.from), view.map(segment.to), brush, color);
    }
    img
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn stamp(img: &mut RgbImage, x: i64, y: i64, brush: i64, color: Pixel<u8>) {
    let half = brush / 2;
    for by in (y - half)..(y - half + brush) {
        for bx in (x - half)..(x - half + brush) {
            if bx >= 0 && by >= 0 && bx < i64::from(img.width()) && by < i64::from(img.height()) {
                img.put_pixel(bx as u32, by as u32, color);
            }
        }
    }
}

fn draw_line(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), brush: i64, color: Pixel<u8>) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
    // Lines far outside the canvas are not worth walking
    if !steps.is_finite() || steps > 1e6 {
        return;
    }
    let n = steps as i64;
    for i in 0..=n {
        let t = i as f64 / steps;
        let x = (from.0 + dx * t).round() as i64;
        let y = (from.1 + dy * t).round() as i64;
        stamp(img, x, y, brush, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Rgb;

    fn small() -> RenderConfig {
        RenderConfig {
            width: 40,
            height: 30,
            margin: 5.0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_background_fill() {
        let render_config = RenderConfig {
            background: [10, 20, 30],
            ..small()
        };
        let img = render(&[], &render_config);
        assert_eq!(img.dimensions(), (40, 30));
        assert!(img.pixels().all(|p| *p == Pixel([10, 20, 30])));
    }

    #[test]
    fn test_horizontal_line_spans_fit_width() {
        let segments = [Segment {
            from: (0.0, 0.0),
            to: (100.0, 0.0),
            color: Rgb::RED,
        }];
        let img = render(&segments, &small());
        let red = Pixel([255, 0, 0]);
        // fitted from x=5 to x=35 on the middle row (y flipped around 15)
        assert_eq!(*img.get_pixel(5, 15), red);
        assert_eq!(*img.get_pixel(35, 15), red);
        assert_eq!(*img.get_pixel(20, 15), red);
        assert_eq!(*img.get_pixel(2, 15), Pixel([0, 0, 0]));
        assert_eq!(*img.get_pixel(20, 5), Pixel([0, 0, 0]));
    }

    #[test]
    fn test_png_signature() {
        let img = render(&[], &small());
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}

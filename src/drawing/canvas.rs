use image::{ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::drawing::{DrawingAction, Page, Point, ShapeTool, StrokeTool};
use crate::error::WhiteboardError;

/// Raster target that reconstructs a page by replaying its action log.
pub struct Canvas {
    pixmap: Pixmap,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, WhiteboardError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            WhiteboardError::ParseError(format!("Invalid canvas size {}x{}", width, height))
        })?;

        // Fill with white background
        pixmap.fill(Color::WHITE);

        Ok(Self {
            pixmap,
            width,
            height,
        })
    }

    /// Render `page` at full size.
    pub fn replay(&mut self, page: &Page) {
        for action in page.actions() {
            self.draw(action);
        }
    }

    /// Render `page`, drawn on a `logical_width`x`logical_height` surface, scaled to fit this canvas.
    pub fn replay_scaled(&mut self, page: &Page, logical_width: u32, logical_height: u32) {
        let sx = self.width as f64 / logical_width.max(1) as f64;
        let sy = self.height as f64 / logical_height.max(1) as f64;

        for action in page.actions() {
            self.draw(&action.scaled(sx, sy));
        }
    }

    pub fn draw(&mut self, action: &DrawingAction) {
        let Ok((r, g, b, a)) = action.color().to_rgba() else {
            tracing::debug!("Skipping action with invalid color {:?}", action.color());
            return;
        };

        match action {
            DrawingAction::Fill { .. } => {
                self.pixmap.fill(Color::from_rgba8(r, g, b, a));
            }
            DrawingAction::Stroke {
                tool,
                points,
                width,
                ..
            } => {
                let paint = match tool {
                    StrokeTool::Pencil => paint(r, g, b, a),
                    StrokeTool::Eraser => paint(255, 255, 255, 255),
                };
                self.draw_polyline(points, &paint, &stroke(*width));
            }
            DrawingAction::Shape {
                tool: ShapeTool::Rectangle,
                origin,
                corner,
                width,
                ..
            } => {
                self.draw_rectangle(*origin, *corner, &paint(r, g, b, a), &stroke(*width));
            }
            DrawingAction::Shape {
                tool: ShapeTool::Ellipse,
                origin,
                corner,
                width,
                ..
            } => {
                self.draw_ellipse(*origin, *corner, &paint(r, g, b, a), &stroke(*width));
            }
        }
    }

    fn draw_polyline(&mut self, points: &[Point], paint: &Paint, stroke: &Stroke) {
        let mut pb = PathBuilder::new();

        match points {
            [] => return,
            [p] => {
                // Draw a point (small circle)
                pb.push_circle(p.x as f32, p.y as f32, 0.5);
            }
            [first, rest @ ..] => {
                pb.move_to(first.x as f32, first.y as f32);
                for p in rest {
                    pb.line_to(p.x as f32, p.y as f32);
                }
            }
        }

        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, paint, stroke, Transform::identity(), None);
        }
    }

    fn draw_rectangle(&mut self, origin: Point, corner: Point, paint: &Paint, stroke: &Stroke) {
        let x = origin.x.min(corner.x) as f32;
        let y = origin.y.min(corner.y) as f32;
        let width = (origin.x - corner.x).abs() as f32;
        let height = (origin.y - corner.y).abs() as f32;

        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut pb = PathBuilder::new();
        if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, width, height) {
            pb.push_rect(rect);
        }

        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, paint, stroke, Transform::identity(), None);
        }
    }

    /// Circle centered between the two points, with half the diagonal as radius.
    fn draw_ellipse(&mut self, origin: Point, corner: Point, paint: &Paint, stroke: &Stroke) {
        let cx = (origin.x + corner.x) / 2.0;
        let cy = (origin.y + corner.y) / 2.0;
        let radius = (corner.x - origin.x).hypot(corner.y - origin.y) / 2.0;

        if radius <= 0.0 {
            return;
        }

        let mut pb = PathBuilder::new();
        pb.push_circle(cx as f32, cy as f32, radius as f32);

        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, paint, stroke, Transform::identity(), None);
        }
    }

    /// Export canvas to PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>, WhiteboardError> {
        let data = self.pixmap.data();

        let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::new(self.width, self.height);

        for (i, pixel) in img.pixels_mut().enumerate() {
            let offset = i * 4;
            // tiny-skia uses RGBA premultiplied, need to unpremultiply
            let a = data[offset + 3] as f32 / 255.0;
            if a > 0.0 {
                *pixel = Rgba([
                    (data[offset] as f32 / a).min(255.0) as u8,
                    (data[offset + 1] as f32 / a).min(255.0) as u8,
                    (data[offset + 2] as f32 / a).min(255.0) as u8,
                    data[offset + 3],
                ]);
            } else {
                *pixel = Rgba([255, 255, 255, 255]);
            }
        }

        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// Unpremultiplied RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some((c.red(), c.green(), c.blue(), c.alpha()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn paint(r: u8, g: u8, b: u8, a: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(r, g, b, a));
    paint.anti_alias = true;
    paint
}

fn stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas() {
        let canvas = Canvas::new(900, 600).unwrap();
        assert_eq!(canvas.width(), 900);
        assert_eq!(canvas.height(), 600);
        assert_eq!(canvas.pixel(10, 10), Some((255, 255, 255, 255)));
    }

    #[test]
    fn test_zero_size_canvas_rejected() {
        assert!(Canvas::new(0, 100).is_err());
    }

    #[test]
    fn test_replay_fill_then_stroke() {
        let mut page = Page::new();
        page.apply(DrawingAction::stroke(
            StrokeTool::Pencil,
            vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            "#000000",
            4.0,
        ));
        page.apply(DrawingAction::fill("#ff0000"));

        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas.replay(&page);

        // The fill sits first in the log, so the stroke stays visible on top.
        assert_eq!(canvas.pixel(5, 5), Some((255, 0, 0, 255)));
        assert_eq!(canvas.pixel(50, 50), Some((0, 0, 0, 255)));
    }

    #[test]
    fn test_eraser_paints_white() {
        let mut page = Page::new();
        page.apply(DrawingAction::fill("#0000ff"));
        page.apply(DrawingAction::stroke(
            StrokeTool::Eraser,
            vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            "#0000ff",
            10.0,
        ));

        let mut canvas = Canvas::new(100, 100).unwrap();
        canvas.replay(&page);

        assert_eq!(canvas.pixel(50, 50), Some((255, 255, 255, 255)));
        assert_eq!(canvas.pixel(50, 10), Some((0, 0, 255, 255)));
    }

    #[test]
    fn test_replay_scaled_preview() {
        let mut page = Page::new();
        page.apply(DrawingAction::shape(
            ShapeTool::Rectangle,
            Point::new(100.0, 100.0),
            Point::new(900.0, 900.0),
            "#00ff00",
            50.0,
        ));

        let mut preview = Canvas::new(100, 100).unwrap();
        preview.replay_scaled(&page, 1000, 1000);

        // Left edge of the rectangle lands at x=10 in the thumbnail.
        let (r, g, b, _) = preview.pixel(10, 50).unwrap();
        assert!(g > 200 && r < 100 && b < 100);
        assert_eq!(preview.pixel(50, 50), Some((255, 255, 255, 255)));
    }

    #[test]
    fn test_export_png() {
        let canvas = Canvas::new(100, 100).unwrap();
        let png = canvas.to_png().unwrap();

        // PNG magic bytes
        assert_eq!(&png[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}

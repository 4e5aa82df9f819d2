use std::path::PathBuf;

use geo_types::{LineString, Polygon};
use tiny_skia::{FillRule, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::mesh::{centered_bounds, collection_bounds, ViewTransform};
use super::{RenderOptions, Renderer};
use crate::error::KerbsideError;

/// Renders polygons into a PNG file.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    path: PathBuf,
}

impl ImageRenderer {
    /// Creates a renderer writing to `path`. The file is overwritten on each render.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Renderer for ImageRenderer {
    fn render(
        &mut self,
        polygons: &[Polygon<f64>],
        options: &RenderOptions,
    ) -> Result<(), KerbsideError> {
        let pixmap = rasterize(polygons, options)?;
        pixmap
            .save_png(&self.path)
            .map_err(|err| KerbsideError::Render(err.to_string()))?;

        log::info!(
            "Saved {}x{} image to {}",
            pixmap.width(),
            pixmap.height(),
            self.path.display()
        );
        Ok(())
    }
}

/// Draws the polygons into an in-memory pixmap, fitting them into the view.
pub fn rasterize(
    polygons: &[Polygon<f64>],
    options: &RenderOptions,
) -> Result<Pixmap, KerbsideError> {
    let [width, height] = options.size;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| KerbsideError::Render(format!("cannot create {width}x{height} image")))?;
    pixmap.fill(options.background.to_skia());

    let Some(bounds) = collection_bounds(polygons) else {
        return Ok(pixmap);
    };
    let origin = bounds.center();
    let view = ViewTransform::fit(
        centered_bounds(bounds),
        [width as f32, height as f32],
        options.margin,
    );

    let mut fill = Paint::default();
    fill.set_color(options.fill.to_skia());
    fill.anti_alias = true;

    let mut outline = Paint::default();
    outline.set_color(options.outline.to_skia());
    outline.anti_alias = true;
    let stroke = Stroke {
        width: options.outline_width,
        line_join: LineJoin::MiterClip,
        ..Stroke::default()
    };

    for polygon in polygons {
        let mut builder = PathBuilder::new();
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            add_ring(&mut builder, ring, |x, y| {
                view.apply([(x - origin.x) as f32, (y - origin.y) as f32])
            });
        }

        let Some(path) = builder.finish() else {
            log::debug!("Skipping polygon without drawable rings");
            continue;
        };

        pixmap.fill_path(&path, &fill, FillRule::EvenOdd, Transform::identity(), None);
        if options.draws_outline() {
            pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
        }
    }

    Ok(pixmap)
}

fn add_ring(
    builder: &mut PathBuilder,
    ring: &LineString<f64>,
    project: impl Fn(f64, f64) -> [f32; 2],
) {
    let mut points = ring.coords().map(|c| project(c.x, c.y));
    let Some([x, y]) = points.next() else {
        return;
    };

    builder.move_to(x, y);
    for [x, y] in points {
        builder.line_to(x, y);
    }
    builder.close();
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geo_types::polygon;
    use tempfile::TempDir;
    use tiny_skia::ColorU8;

    use super::*;
    use crate::render::Color;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]
    }

    fn options() -> RenderOptions {
        RenderOptions {
            fill: Color::rgba(255, 0, 0, 255),
            outline: Color::BLACK,
            outline_width: 2.0,
            ..RenderOptions::default().with_size(100, 100)
        }
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let color = pixmap.pixel(x, y).unwrap().demultiply();
        [color.red(), color.green(), color.blue(), color.alpha()]
    }

    #[test]
    fn fills_polygon_interior() {
        let pixmap = rasterize(&[square(1000.0, 2000.0, 10.0)], &options()).unwrap();

        assert_eq!((pixmap.width(), pixmap.height()), (100, 100));
        assert_eq!(pixel(&pixmap, 50, 50), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixmap, 2, 2), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixmap, 97, 97), [255, 255, 255, 255]);
    }

    #[test]
    fn draws_outline_on_polygon_border() {
        let pixmap = rasterize(&[square(0.0, 0.0, 10.0)], &options()).unwrap();

        // Left border of the square is at x = 10.
        let [r, g, b, a] = pixel(&pixmap, 10, 50);
        assert!(r < 16 && g < 16 && b < 16, "got {r} {g} {b}");
        assert_eq!(a, 255);

        let no_outline = RenderOptions {
            outline_width: 0.0,
            ..options()
        };
        let pixmap = rasterize(&[square(0.0, 0.0, 10.0)], &no_outline).unwrap();
        let [r, g, b, _] = pixel(&pixmap, 10, 50);
        assert!(r > 240 && g < 16 && b < 16, "got {r} {g} {b}");
    }

    #[test]
    fn polygon_with_hole() {
        let polygon = Polygon::new(
            square(0.0, 0.0, 10.0).exterior().clone(),
            vec![square(3.0, 3.0, 4.0).exterior().clone()],
        );
        let options = RenderOptions {
            outline_width: 0.0,
            ..options()
        };
        let pixmap = rasterize(&[polygon], &options).unwrap();

        assert_eq!(pixel(&pixmap, 50, 50), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixmap, 15, 50), [255, 0, 0, 255]);
    }

    #[test]
    fn empty_collection_renders_background() {
        let options = RenderOptions {
            background: Color::GRAY,
            ..options()
        };
        let pixmap = rasterize(&[], &options).unwrap();

        let gray = ColorU8::from_rgba(170, 170, 170, 255);
        assert!(pixmap.pixels().iter().all(|p| p.demultiply() == gray));
    }

    #[test]
    fn zero_size_is_rejected() {
        let options = RenderOptions::default().with_size(0, 10);
        assert_matches!(rasterize(&[], &options), Err(KerbsideError::Render(_)));
    }

    #[test]
    fn writes_png_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let mut renderer = ImageRenderer::new(&path);

        renderer
            .render(
                &[square(0.0, 0.0, 1.0), square(2.0, 0.0, 1.0)],
                &RenderOptions::default().with_size(64, 32),
            )
            .unwrap();

        let pixmap = Pixmap::load_png(&path).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (64, 32));
        assert_eq!(pixel(&pixmap, 0, 0), Color::WHITE.to_u8_array());
    }

    #[test]
    fn unwritable_path_is_a_render_error() {
        let dir = TempDir::new().unwrap();
        let mut renderer = ImageRenderer::new(dir.path().join("missing").join("out.png"));

        let result = renderer.render(&[square(0.0, 0.0, 1.0)], &options());
        assert_matches!(result, Err(KerbsideError::Render(_)));
    }
}

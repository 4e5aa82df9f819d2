//! Drawing of reconstructed polygons.
//!
//! The crate only ships an [`ImageRenderer`] that writes PNG files. Interactive display lives in
//! the `kerbside-egui` crate, which implements the same [`Renderer`] trait.

use geo_types::Polygon;
use serde::{Deserialize, Serialize};

use crate::error::KerbsideError;

mod color;
mod mesh;
mod raster;

pub use color::Color;
pub use mesh::{MeshPoint, PolygonMesh, ViewTransform};
pub use raster::{rasterize, ImageRenderer};

/// Output surface for a collection of polygons.
pub trait Renderer {
    /// Draws all the `polygons` in one view.
    ///
    /// An empty collection is valid and produces an empty view.
    fn render(
        &mut self,
        polygons: &[Polygon<f64>],
        options: &RenderOptions,
    ) -> Result<(), KerbsideError>;
}

/// Style and size of the rendered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Width and height of the view in pixels.
    pub size: [u32; 2],
    /// Window title for interactive renderers.
    pub title: String,
    /// Background color.
    pub background: Color,
    /// Fill color of the polygons.
    pub fill: Color,
    /// Color of the polygon outlines.
    pub outline: Color,
    /// Width of the outlines in pixels. Zero disables outlines.
    pub outline_width: f32,
    /// Free space left around the polygons, in pixels.
    pub margin: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: [600, 600],
            title: "Kerbside".to_string(),
            background: Color::WHITE,
            fill: Color::STEEL_BLUE,
            outline: Color::BLACK,
            outline_width: 1.0,
            margin: 10.0,
        }
    }
}

impl RenderOptions {
    /// Sets the size of the view.
    pub fn with_size(self, width: u32, height: u32) -> Self {
        Self {
            size: [width, height],
            ..self
        }
    }

    /// Returns true if outlines should be drawn.
    pub fn draws_outline(&self) -> bool {
        self.outline_width > 0.0 && !self.outline.is_transparent()
    }
}

//! Egui integration of Kerbside.
//!
//! [`EguiPolygons`] is a widget that can be embedded into any egui application. With the `init`
//! feature enabled (default) the crate also provides [`EguiRenderer`], which opens a native window
//! showing the polygons and blocks until it is closed.

mod egui_polygons;
pub use egui_polygons::{to_color32, EguiPolygons};

#[cfg(feature = "init")]
mod init;
#[cfg(feature = "init")]
pub use init::EguiRenderer;

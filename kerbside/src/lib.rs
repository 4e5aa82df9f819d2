//! Kerbside loads road and traffic sign geometries of a city model and shows them on a plane.
//!
//! The source data is a set of CityGML files, one directory per feature category. Each city object
//! carries a number of surfaces stored as rings of 3D coordinates. Kerbside reads the objects that
//! intersect a region of interest, turns every exterior ring into a planar [`Polygon`] and groups
//! the polygons into [`FeatureEntity`] values tagged with their [`FeatureCategory`].
//!
//! # Quick start
//!
//! ```no_run
//! use kerbside::{ImageRenderer, RegionEnvironment, RenderOptions, SourceDirectories};
//!
//! let env = RegionEnvironment::from_geojson_file(
//!     "area.geojson",
//!     SourceDirectories::in_dir("/data/city"),
//! )?
//! .with_road_filter(Some(1));
//!
//! let roads = env.generate_roads()?;
//! println!("{} roads in the area", roads.len());
//!
//! env.visualize(None, &mut ImageRenderer::new("area.png"), &RenderOptions::default())?;
//! # Ok::<(), kerbside::error::KerbsideError>(())
//! ```
//!
//! # Main components
//!
//! * [`FeatureFactory`] scans the source directory of one category and builds entities from the
//!   rows of every `.gml` file in it, optionally keeping only rows with a given `function` code.
//! * [`RegionEnvironment`] holds a factory per category and the [`RegionFilter`] the objects are
//!   clipped to.
//! * [`ring::reconstruct`] converts a flat ring coordinate buffer into a polygon.
//! * [`render`] draws polygon collections. [`ImageRenderer`] writes PNG files; an interactive
//!   window is provided by the `kerbside-egui` crate.
//!
//! Reading of the files is abstracted by the [`FeatureReader`] trait, implemented for the CityGML
//! reader of the `kerbside-gml` crate.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod category;
mod config;
mod entity;
mod environment;
pub mod error;
mod factory;
pub mod reader;
pub mod region;
pub mod render;
pub mod ring;

#[cfg(test)]
mod test_utils;

pub use category::FeatureCategory;
pub use config::EnvironmentConfig;
pub use entity::FeatureEntity;
pub use environment::RegionEnvironment;
pub use factory::{FeatureFactory, Resolved, SourceDirectories, GML_EXTENSION, IGNORED_FIELDS};
pub use reader::FeatureReader;
pub use region::RegionFilter;
pub use render::{Color, ImageRenderer, RenderOptions, Renderer};

// Reexport geometry types and the CityGML reader
pub use geo_types::{self, Polygon};
pub use kerbside_gml;

//! Reader of CityGML city models.
//!
//! The reader does not try to understand the whole CityGML schema. It extracts what is needed to
//! draw the objects on a plane: the object's name, its `function` code, other simple properties and
//! the exterior rings of all its surfaces as flat `x, y, z` coordinate buffers.

pub mod error;
mod reader;
mod table;

pub use error::GmlError;
pub use reader::GmlReader;
pub use table::{FeatureRow, FeatureTable, RingBuffer};

use std::path::Path;

use geo_types::Rect;
use kerbside_gml::{FeatureTable, GmlError, GmlReader};

/// Source of feature tables.
///
/// Reader turns one geometry file into a [`FeatureTable`]. Implementations must release all the
/// resources associated with the file before returning.
pub trait FeatureReader {
    /// Error returned when a file cannot be read.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the file at `path`.
    ///
    /// If `bbox` is given, rows that do not intersect it must be excluded. `ignore_fields` lists
    /// attributes the caller is not interested in; the reader may skip them.
    fn read(
        &self,
        path: &Path,
        bbox: Option<Rect<f64>>,
        ignore_fields: &[&str],
    ) -> Result<FeatureTable, Self::Error>;
}

impl FeatureReader for GmlReader {
    type Error = GmlError;

    fn read(
        &self,
        path: &Path,
        bbox: Option<Rect<f64>>,
        ignore_fields: &[&str],
    ) -> Result<FeatureTable, Self::Error> {
        GmlReader::read(self, path, bbox, ignore_fields)
    }
}

//! Error types used by the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Kerbside error type.
#[derive(Debug, Error)]
pub enum KerbsideError {
    /// Category tag is not one of the known feature categories.
    #[error("unknown feature category: {0:?}")]
    UnknownCategory(String),

    /// Source directory of a category does not exist.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A geometry file could not be read or parsed.
    #[error("failed to read features from {}: {source}", path.display())]
    FeatureFileRead {
        /// File that failed.
        path: PathBuf,
        /// Error returned by the feature reader.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Row index is outside of the feature table.
    #[error("row index {index} is out of range for a table of {len} rows")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of rows in the table.
        len: usize,
    },

    /// Ring coordinate buffer cannot be converted into a polygon.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Attribute value cannot be interpreted as required.
    #[error("invalid value {value:?} of attribute '{field}'")]
    InvalidAttribute {
        /// Attribute name.
        field: String,
        /// Value found in the row, if any.
        value: Option<String>,
    },

    /// Region of interest cannot be loaded.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Renderer failed to display or save the geometries.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration file is not a valid environment configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Error reading/writing data to the FS.
    #[error("failed to read file")]
    Io(#[from] std::io::Error),
}

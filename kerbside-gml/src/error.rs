//! Error type used by the crate.

use thiserror::Error;

/// Error reading a CityGML document.
#[derive(Debug, Error)]
pub enum GmlError {
    /// The file could not be opened or read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed XML.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document ended before all the elements were closed.
    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// A coordinate value is not a number.
    #[error("invalid coordinate value: {0:?}")]
    Coordinate(String),

    /// Coordinate list does not match the declared dimension.
    #[error("{count} coordinate values cannot be split into points of dimension {dimension}")]
    Dimension {
        /// Number of values found in the list.
        count: usize,
        /// Declared or inferred dimension of the points.
        dimension: usize,
    },
}

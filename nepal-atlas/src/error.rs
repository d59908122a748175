//! Error types used by the crate.

use thiserror::Error;

/// Error of loading, decoding or configuring the atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Network request failed before a response was received.
    #[error("failed to load data: {0}")]
    IO(String),
    /// Server responded with a non-success status.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        /// Requested url.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Error decoding data.
    #[error("failed to decode data: {0}")]
    Decoding(String),
    /// Image decoding error.
    #[error("image decode error: {0:?}")]
    ImageDecode(#[from] image::ImageError),
    /// Error reading/writing data to the FS.
    #[error("file system error: {0}")]
    FsIo(#[from] std::io::Error),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Background task was dropped before it produced a result.
    #[error("background task was cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for AtlasError {
    fn from(value: reqwest::Error) -> Self {
        Self::IO(value.to_string())
    }
}

impl From<geojson::Error> for AtlasError {
    fn from(value: geojson::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}

/// Rejection of a user action.
///
/// The `Display` text is what the user sees in the alert dialog.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// Buffer was requested with an empty drawn collection.
    #[error("Draw a feature first.")]
    NothingToBuffer,
    /// Centroid was requested with an empty drawn collection.
    #[error("Draw a polygon first.")]
    NothingForCentroid,
    /// Union needs at least two drawn shapes.
    #[error("Draw at least two polygons to union.")]
    NotEnoughShapes {
        /// Number of shapes currently drawn.
        drawn: usize,
    },
    /// One of the first two drawn shapes is not a polygon.
    #[error("Union requires two polygons.")]
    NotPolygonal,
    /// Buffer distance is negative or not a number.
    #[error("Buffer distance must be a non-negative number of kilometres, got {0}.")]
    InvalidDistance(f64),
    /// The drawing tool has too few vertices to finish the shape.
    #[error("A {shape} needs at least {required} points.")]
    TooFewVertices {
        /// Name of the shape being drawn.
        shape: &'static str,
        /// Minimum number of vertices.
        required: usize,
    },
}

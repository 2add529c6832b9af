//! Error types used by the crate.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TowerMapError>;

/// Towermap error type.
#[derive(Debug, Error)]
pub enum TowerMapError {
    /// Error reading a file from the FS.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    /// JSON syntax or shape error.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is valid JSON but not valid GeoJSON.
    #[error("invalid geojson: {0}")]
    GeoJson(#[from] geojson::Error),
    /// A polygon ring has no points, so no bounding box can be built from it.
    #[error("ring of feature {feature} is empty")]
    EmptyRing {
        /// Index of the feature in its collection.
        feature: usize,
    },
    /// A GeoJSON position has less than two coordinates.
    #[error("position with {0} coordinates, at least 2 expected")]
    InvalidPosition(usize),
    /// Only points and polygons can be displayed.
    #[error("feature {feature}: unsupported geometry {geometry}")]
    UnsupportedGeometry {
        /// Index of the feature in its collection.
        feature: usize,
        /// GeoJSON geometry type name.
        geometry: String,
    },
    /// A property value is not a string, a number or a bounding box.
    #[error("property '{key}': {reason}")]
    InvalidProperty {
        /// Property key.
        key: String,
        /// What is wrong with the value.
        reason: String,
    },
    /// Theme is inconsistent.
    #[error("theme error: {0}")]
    Theme(String),
    /// Map engine refused a data source.
    #[error("data source '{name}' was rejected: {reason}")]
    DataSource {
        /// Name of the data source.
        name: String,
        /// Reason reported by the engine.
        reason: String,
    },
}

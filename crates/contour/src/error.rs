use thiserror::Error;

use crate::types::RingId;

#[derive(Error, Debug)]
pub enum ContourError {
    #[error("Topology violation: {0}")]
    Topology(#[from] TopologyError),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    #[error("Raster data has {actual} cells, expected {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Malformed contour GeoJSON: {0}")]
    MalformedGeoJson(String),
}

/// Broken ring-building invariants. These only arise from a class map that
/// is not planar-consistent and are never recovered from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("segment at ({x}, {y}) belongs to ring {found:?} while walking ring {expected}")]
    RingMismatch {
        x: i32,
        y: i32,
        expected: RingId,
        found: Option<RingId>,
    },

    #[error("closing segment is no longer in the graph")]
    MissingHead,

    #[error("closing segment at ({x}, {y}) is not linked into any ring")]
    UnlinkedHead { x: i32, y: i32 },

    #[error("lone segment ending at ({x}, {y}) was never linked")]
    DanglingSegment { x: i32, y: i32 },

    #[error("ring {ring} is open: segment ending at ({x}, {y}) has no successor")]
    OpenRing { ring: RingId, x: i32, y: i32 },
}

pub type Result<T> = std::result::Result<T, ContourError>;

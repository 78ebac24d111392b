//! Error types for brickmap-core

use thiserror::Error;

use crate::query::QueryBounds;

/// Error returned by a [`FeatureQuery`](crate::query::FeatureQuery) implementation.
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for brickmap-core operations
pub type BrickResult<T> = Result<T, BrickError>;

/// Errors that can occur while reducing tiles or aggregating features
#[derive(Debug, Error)]
pub enum BrickError {
    /// Sampling region yields no samples (smaller than the stride, or zero area)
    #[error("Degenerate region {width}x{height} for sample stride {stride}")]
    DegenerateRegion { width: u32, height: u32, stride: u32 },

    /// Tile dimensions are not evenly divisible by the block size
    #[error("Block size {block_size} does not evenly divide tile {width}x{height}")]
    InvalidBlockSize { block_size: u32, width: u32, height: u32 },

    /// The adaptive query hit its depth or area floor while still truncated
    #[error("Query still truncated at depth {depth} in {} quadrant(s)", capped.len())]
    QueryDepthExceeded { depth: u32, capped: Vec<QueryBounds> },

    /// The external feature query failed; propagated unchanged
    #[error("Feature query failed for {bounds}")]
    QueryPrimitiveFailure {
        bounds: QueryBounds,
        #[source]
        source: FetchError,
    },

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSizeMismatch { width: u32, height: u32, expected: usize, actual: usize },

    #[error("Region ({x}, {y}) {width}x{height} lies outside the {buffer_width}x{buffer_height} buffer")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        buffer_width: u32,
        buffer_height: u32,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Aggregation cancelled")]
    Cancelled,
}

impl BrickError {
    pub fn query_failure(bounds: QueryBounds, source: impl Into<FetchError>) -> Self {
        Self::QueryPrimitiveFailure {
            bounds,
            source: source.into(),
        }
    }
}

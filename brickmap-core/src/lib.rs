//! Brickmap Core Library
//!
//! Block colour reduction, palette snapping and adaptive density aggregation
//! for stylized map tiles.

pub mod color;
pub mod density;
pub mod error;
pub mod query;
pub mod reduce;
pub mod sampler;

// Re-export commonly used types and functions
pub use color::{rgb_to_hsl, DistanceMetric, Hsl, Palette, Rgb, ToneFilter};
pub use density::{aggregate_density, DensityGrid};
pub use error::{BrickError, BrickResult, FetchError};
pub use query::{
    AggregateOutcome, CancelFlag, Feature, FeatureQuery, PointLayer, QuadrantQuery, QueryBounds,
    QueryLimits, QueryResponse, Quantization,
};
pub use reduce::{BlockColor, BlockReducer, ReducedTile};
pub use sampler::{AverageSampler, PixelBuffer, Region};

/// Version information for the brickmap core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

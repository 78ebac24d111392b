//! Adaptive feature queries
//!
//! Point features are fetched from an external service that caps how many
//! results it returns per request. When a response comes back truncated the
//! request area is split into quadrants and queried again, see
//! [`QuadrantQuery`].

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::FetchError;

pub mod dedup;
pub mod layer;
pub mod quadrant;

pub use dedup::DedupSet;
pub use layer::{Point, PointLayer, Quantization};
pub use quadrant::{AggregateOutcome, QuadrantQuery, QueryLimits};

/// Unique feature identifier within one source dataset
pub type ObjectId = u64;

/// Axis-aligned rectangle in the source's planar coordinate system.
///
/// `y` grows upwards, so the "top" quadrants are the ones with larger `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryBounds {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl QueryBounds {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Closed-interval containment; points on an edge belong to both neighbours.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Split into top-left, top-right, bottom-left, bottom-right.
    ///
    /// Siblings share the exact same midpoint coordinates so the four children
    /// tile the parent with no gap or overlap.
    pub fn quadrants(&self) -> [QueryBounds; 4] {
        let mx = self.xmin + self.width() * 0.5;
        let my = self.ymin + self.height() * 0.5;
        [
            QueryBounds::new(self.xmin, my, mx, self.ymax),
            QueryBounds::new(mx, my, self.xmax, self.ymax),
            QueryBounds::new(self.xmin, self.ymin, mx, my),
            QueryBounds::new(mx, self.ymin, self.xmax, my),
        ]
    }
}

impl fmt::Display for QueryBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}

/// A point feature already quantized to a block column/row of the tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub object_id: ObjectId,
    pub col: i64,
    pub row: i64,
}

impl Feature {
    pub fn new(object_id: ObjectId, col: i64, row: i64) -> Self {
        Self { object_id, col, row }
    }
}

/// One response from the feature service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub features: Vec<Feature>,
    /// The service hit its transfer limit and omitted some features
    pub truncated: bool,
}

/// The external feature query primitive.
///
/// Each call is treated as atomic. Timeouts, retries and paging are the
/// implementation's business; any error it returns aborts the aggregation.
pub trait FeatureQuery: Send + Sync {
    fn fetch(&self, bounds: QueryBounds) -> BoxFuture<'_, Result<QueryResponse, FetchError>>;
}

/// Shared cancellation flag checked before every fetch
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

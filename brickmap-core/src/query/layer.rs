//! In-memory point layer with a transfer limit
//!
//! Behaves like a remote feature service: positions come back snapped to
//! block coordinates of the requesting tile, and a request touching more
//! points than the transfer limit is answered with the first `transfer_limit`
//! matches and `truncated = true`.

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use super::{Feature, FeatureQuery, ObjectId, QueryBounds, QueryResponse};
use crate::error::{BrickError, BrickResult, FetchError};
use crate::reduce::block_grid;

/// Raw point with an id in planar coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
}

/// Snaps planar coordinates to block columns/rows of a tile.
///
/// Origin is the upper-left corner of the tile extent; one block spans
/// `tolerance` map units. Points on the right or bottom edge of the extent
/// belong to the last column or row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantization {
    pub origin_x: f64,
    pub origin_y: f64,
    pub tolerance: f64,
    /// Blocks per axis
    pub blocks: u32,
}

impl Quantization {
    /// Quantization for a `tile_size` pixel tile split into `block_size` blocks.
    pub fn for_tile(extent: QueryBounds, tile_size: u32, block_size: u32) -> BrickResult<Self> {
        let (blocks, _) = block_grid(tile_size, tile_size, block_size)?;
        if extent.width().is_nan() || extent.width() <= 0.0 {
            return Err(BrickError::InvalidParams(format!("tile extent {} has no width", extent)));
        }
        Ok(Self {
            origin_x: extent.xmin,
            origin_y: extent.ymax,
            tolerance: extent.width() / blocks as f64,
            blocks,
        })
    }

    pub fn quantize(&self, x: f64, y: f64) -> (i64, i64) {
        let edge = self.blocks as i64;
        let fold = |i: i64| if i == edge { edge - 1 } else { i };
        let col = ((x - self.origin_x) / self.tolerance).floor() as i64;
        let row = ((self.origin_y - y) / self.tolerance).floor() as i64;
        (fold(col), fold(row))
    }
}

/// Point collection that answers bounded queries with a result cap
#[derive(Debug, Clone)]
pub struct PointLayer {
    points: Vec<Point>,
    transfer_limit: usize,
}

impl PointLayer {
    pub fn new(points: Vec<Point>, transfer_limit: usize) -> BrickResult<Self> {
        if transfer_limit == 0 {
            return Err(BrickError::InvalidParams("transfer limit must be at least 1".to_string()));
        }
        Ok(Self { points, transfer_limit })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn transfer_limit(&self) -> usize {
        self.transfer_limit
    }

    /// Answer one query, quantizing positions with `quantization`.
    pub fn respond(&self, bounds: &QueryBounds, quantization: &Quantization) -> QueryResponse {
        let mut features = Vec::new();
        let mut truncated = false;

        for point in self.points.iter().filter(|p| bounds.contains(p.x, p.y)) {
            if features.len() == self.transfer_limit {
                truncated = true;
                break;
            }
            let (col, row) = quantization.quantize(point.x, point.y);
            features.push(Feature::new(point.id, col, row));
        }

        QueryResponse { features, truncated }
    }

    /// A [`FeatureQuery`] view of this layer for one tile.
    pub fn view(&self, quantization: Quantization) -> LayerView<'_> {
        LayerView { layer: self, quantization }
    }
}

/// [`PointLayer`] bound to one tile's quantization
#[derive(Debug, Clone, Copy)]
pub struct LayerView<'a> {
    layer: &'a PointLayer,
    quantization: Quantization,
}

impl FeatureQuery for LayerView<'_> {
    fn fetch(&self, bounds: QueryBounds) -> BoxFuture<'_, Result<QueryResponse, FetchError>> {
        future::ready(Ok(self.layer.respond(&bounds, &self.quantization))).boxed()
    }
}

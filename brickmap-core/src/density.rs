//! Per-block feature counts for density tiles

use crate::error::{BrickError, BrickResult};
use crate::query::{AggregateOutcome, Feature, QuadrantQuery, QueryBounds};

/// Flat `row * blocks_per_axis + col` grid of feature counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    blocks_per_axis: u32,
    counts: Vec<u32>,
    /// Features whose block lies outside the grid
    dropped: usize,
}

impl DensityGrid {
    pub fn new(blocks_per_axis: u32) -> Self {
        let n = blocks_per_axis as usize;
        Self {
            blocks_per_axis,
            counts: vec![0; n * n],
            dropped: 0,
        }
    }

    /// Count each feature once in its block.
    ///
    /// Services may return features slightly outside the requested extent;
    /// those are skipped and tallied in [`dropped`](Self::dropped).
    pub fn build(features: &[Feature], blocks_per_axis: u32) -> Self {
        let mut grid = Self::new(blocks_per_axis);
        for feature in features {
            if !grid.increment(feature.col, feature.row) {
                grid.dropped += 1;
            }
        }
        if grid.dropped > 0 {
            log::debug!("Dropped {} features outside the {}x{} grid", grid.dropped, blocks_per_axis, blocks_per_axis);
        }
        grid
    }

    fn index(&self, col: i64, row: i64) -> Option<usize> {
        let n = self.blocks_per_axis as i64;
        if col < 0 || row < 0 || col >= n || row >= n {
            return None;
        }
        Some((row * n + col) as usize)
    }

    /// Add one to block `(col, row)`; false if it lies outside the grid.
    pub fn increment(&mut self, col: i64, row: i64) -> bool {
        match self.index(col, row) {
            Some(idx) => {
                self.counts[idx] = self.counts[idx].saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, col: u32, row: u32) -> u32 {
        self.index(col as i64, row as i64)
            .map(|idx| self.counts[idx])
            .unwrap_or(0)
    }

    pub fn blocks_per_axis(&self) -> u32 {
        self.blocks_per_axis
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Non-empty blocks as `(col, row, count)` in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let n = self.blocks_per_axis.max(1);
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(move |(idx, &c)| (idx as u32 % n, idx as u32 / n, c))
    }
}

/// Aggregate features for one tile and bin them.
///
/// All-or-nothing: a fetch failure aborts the tile, and a depth-capped
/// (partial) result is an error unless `allow_partial` is set.
pub async fn aggregate_density(
    query: &QuadrantQuery<'_>,
    bounds: QueryBounds,
    blocks_per_axis: u32,
    allow_partial: bool,
) -> BrickResult<(DensityGrid, AggregateOutcome)> {
    let outcome = query.run(bounds).await?;

    if outcome.truncated && !allow_partial {
        return Err(BrickError::QueryDepthExceeded {
            depth: outcome.deepest,
            capped: outcome.capped,
        });
    }

    let grid = DensityGrid::build(&outcome.features, blocks_per_axis);
    Ok((grid, outcome))
}

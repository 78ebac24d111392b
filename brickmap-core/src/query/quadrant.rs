//! Recursive quadrant subdivision over a capped feature service

use futures::future::{try_join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use super::{CancelFlag, DedupSet, Feature, FeatureQuery, QueryBounds};
use crate::error::{BrickError, BrickResult};

/// Default maximum subdivision depth (root is depth 0)
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Bounds on how far a truncated query may be subdivided
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryLimits {
    pub max_depth: u32,
    /// Do not split when a child's width or height would fall below this
    pub min_extent: Option<f64>,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_extent: None,
        }
    }
}

impl QueryLimits {
    fn can_split(&self, bounds: &QueryBounds, depth: u32) -> bool {
        if depth >= self.max_depth {
            return false;
        }
        let half_w = bounds.width() * 0.5;
        let half_h = bounds.height() * 0.5;
        if half_w.is_nan() || half_h.is_nan() || half_w <= 0.0 || half_h <= 0.0 {
            return false;
        }
        match self.min_extent {
            Some(min) => half_w >= min && half_h >= min,
            None => true,
        }
    }
}

/// Result of one adaptive aggregation
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    /// Unique features, each object id at most once
    pub features: Vec<Feature>,
    /// Some leaf was still truncated when the depth or area floor stopped it
    pub truncated: bool,
    /// Leaf bounds that hit the floor while truncated
    pub capped: Vec<QueryBounds>,
    pub calls: usize,
    pub duplicates: usize,
    pub deepest: u32,
}

impl AggregateOutcome {
    /// The features, or `QueryDepthExceeded` when the result is partial.
    pub fn into_complete(self) -> BrickResult<Vec<Feature>> {
        if self.truncated {
            return Err(BrickError::QueryDepthExceeded {
                depth: self.deepest,
                capped: self.capped,
            });
        }
        Ok(self.features)
    }
}

/// Shared accumulators for one aggregation
#[derive(Default)]
struct Session {
    seen: DedupSet,
    collected: Mutex<Vec<Feature>>,
    capped: Mutex<Vec<QueryBounds>>,
    calls: AtomicUsize,
    duplicates: AtomicUsize,
    deepest: AtomicU32,
}

/// Fetches every feature in a region from a service with a result cap.
///
/// A truncated response splits the request into four quadrants which are
/// fetched concurrently against the same dedup set. Features lying on a
/// quadrant edge can come back from several siblings; only the first copy
/// is kept.
pub struct QuadrantQuery<'q> {
    source: &'q dyn FeatureQuery,
    limits: QueryLimits,
    cancel: Option<CancelFlag>,
}

impl<'q> QuadrantQuery<'q> {
    pub fn new(source: &'q dyn FeatureQuery) -> Self {
        Self {
            source,
            limits: QueryLimits::default(),
            cancel: None,
        }
    }

    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Aggregate all features within `bounds`.
    ///
    /// Any fetch failure or cancellation aborts the whole aggregation. Hitting
    /// the depth/area floor does not: the outcome comes back flagged
    /// `truncated` so the caller can decide.
    pub async fn run(&self, bounds: QueryBounds) -> BrickResult<AggregateOutcome> {
        let session = Session::default();
        self.visit(&session, bounds, 0).await?;

        let capped = session.capped.into_inner();
        let outcome = AggregateOutcome {
            features: session.collected.into_inner(),
            truncated: !capped.is_empty(),
            capped,
            calls: session.calls.into_inner(),
            duplicates: session.duplicates.into_inner(),
            deepest: session.deepest.into_inner(),
        };

        log::debug!(
            "Aggregated {} unique features in {} calls ({} duplicates, depth {})",
            outcome.features.len(),
            outcome.calls,
            outcome.duplicates,
            outcome.deepest
        );
        Ok(outcome)
    }

    fn visit<'s>(
        &'s self,
        session: &'s Session,
        bounds: QueryBounds,
        depth: u32,
    ) -> BoxFuture<'s, BrickResult<()>> {
        async move {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                return Err(BrickError::Cancelled);
            }

            session.calls.fetch_add(1, Ordering::Relaxed);
            session.deepest.fetch_max(depth, Ordering::Relaxed);

            let response = self
                .source
                .fetch(bounds)
                .await
                .map_err(|e| BrickError::query_failure(bounds, e))?;

            let mut fresh = Vec::with_capacity(response.features.len());
            for feature in response.features {
                if session.seen.insert(feature.object_id) {
                    fresh.push(feature);
                } else {
                    session.duplicates.fetch_add(1, Ordering::Relaxed);
                }
            }
            session.collected.lock().extend(fresh);

            if !response.truncated {
                return Ok(());
            }

            if !self.limits.can_split(&bounds, depth) {
                log::warn!("Query {} still truncated at depth {}; result will be partial", bounds, depth);
                session.capped.lock().push(bounds);
                return Ok(());
            }

            log::debug!("Query {} truncated at depth {}, splitting", bounds, depth);
            try_join_all(
                bounds
                    .quadrants()
                    .into_iter()
                    .map(|child| self.visit(session, child, depth + 1)),
            )
            .await?;
            Ok(())
        }
        .boxed()
    }
}

use dashmap::DashSet;

use super::ObjectId;

/// Concurrent set of object ids already seen in one aggregation session.
///
/// `insert` is a single atomic insert-if-absent, so two branches racing on
/// the same id cannot both observe it as new.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: DashSet<ObjectId>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` was not present before this call.
    pub fn insert(&self, id: ObjectId) -> bool {
        self.seen.insert(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

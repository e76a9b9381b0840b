use crate::core::types::{MatchSet, SharedMatchSet};

/// Run-wide accumulator of matches.
///
/// Merging is a set union, so the order in which sources report and how
/// often the same match is reported make no difference to the result.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    matches: SharedMatchSet,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, matches: MatchSet) {
        self.matches.merge(matches);
    }

    /// Handle for concurrent writers such as traffic interceptors.
    pub fn shared(&self) -> &SharedMatchSet {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn finish(self) -> MatchSet {
        self.matches.take()
    }
}

//! In-memory reference index
//!
//! A [`ReferenceSearch`] backed by a local list of candidates, for hosts that
//! already hold events/activities/documents and for tests. Mirrors the search
//! service's ranking: case-insensitive substring over title and description,
//! up to 5 hits per type, 10 overall, types in `MentionType::ALL` order.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::mention::search::{ReferenceSearch, SearchQuery};
use crate::mention::types::{MentionCandidate, MentionType};

const PER_TYPE_LIMIT: usize = 5;
const TOTAL_LIMIT: usize = 10;

/// Local, synchronous reference index
#[derive(Debug, Default, Clone)]
pub struct ReferenceIndex {
    entries: Vec<MentionCandidate>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, candidate: MentionCandidate) {
        self.entries.push(candidate);
    }

    pub fn extend(&mut self, candidates: impl IntoIterator<Item = MentionCandidate>) {
        self.entries.extend(candidates);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked lookup without going through the async contract
    pub fn lookup(&self, query: &SearchQuery) -> Vec<MentionCandidate> {
        let needle = query.query.to_lowercase();
        let kinds: Vec<MentionType> = match query.kind {
            Some(kind) => vec![kind],
            None => MentionType::ALL.to_vec(),
        };

        let mut results = Vec::new();
        for kind in kinds {
            results.extend(
                self.entries
                    .iter()
                    .filter(|c| c.kind() == kind && matches(c, &needle))
                    .take(PER_TYPE_LIMIT)
                    .cloned(),
            );
        }
        results.truncate(TOTAL_LIMIT);
        results
    }
}

fn matches(candidate: &MentionCandidate, needle: &str) -> bool {
    let base = candidate.base();
    base.title.to_lowercase().contains(needle)
        || base
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

#[async_trait(?Send)]
impl ReferenceSearch for ReferenceIndex {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<MentionCandidate>, SearchError> {
        Ok(self.lookup(query))
    }
}

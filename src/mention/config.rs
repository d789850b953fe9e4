//! Configuration types and defaults for the mention engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Debounce ceiling; anything slower reads as a broken widget
const MAX_DEBOUNCE_MS: u64 = 2000;

/// Mention engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MentionConfig {
    /// Queries shorter than this (in chars) never reach the collaborator. Default: 2
    pub min_query_len: usize,
    /// Quiet period after the last keystroke before a search is issued. Default: 200
    pub debounce_ms: u64,
    /// Result lists are truncated to this length. Default: 10
    pub max_candidates: usize,
    /// Search as soon as the prefix is typed, before any query text. Default: false
    pub search_empty_query: bool,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            debounce_ms: 200,
            max_candidates: 10,
            search_empty_query: false,
        }
    }
}

impl MentionConfig {
    /// Production defaults
    pub fn standard() -> Self {
        Self::default()
    }

    /// No debounce window; searches are due as soon as they are scheduled
    pub fn immediate() -> Self {
        Self {
            debounce_ms: 0,
            ..Self::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_candidates == 0 {
            return Err(ConfigError::ZeroCandidates);
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::DebounceTooLong(self.debounce_ms));
        }
        Ok(())
    }

    /// Whether a query is long enough to be sent to the collaborator
    pub fn is_searchable(&self, query: &str) -> bool {
        if query.is_empty() {
            return self.search_empty_query;
        }
        query.chars().count() >= self.min_query_len
    }
}

//! Reference search sequencing
//!
//! The collaborator is reached through [`ReferenceSearch`]; [`SearchClient`]
//! decides *when* it is called and *which* answer is kept:
//! 1. Queries below the minimum length resolve locally to an empty list.
//! 2. A scheduled search only becomes due after the debounce window; a newer
//!    schedule replaces it, so superseded queries never leave the engine.
//! 3. Every schedule takes a fresh ticket. Responses carrying any ticket other
//!    than the latest are discarded, so a slow answer can never overwrite a
//!    newer one.
//!
//! Cancellation is logical only: in-flight requests are not aborted, their
//! answers are simply ignored when they land.

use async_trait::async_trait;
use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::error::{CandidateError, SearchError};
use crate::mention::config::MentionConfig;
use crate::mention::types::{MentionCandidate, MentionType};

// =============================================================================
// Collaborator contract
// =============================================================================

/// Request sent to the reference search collaborator
///
/// `kind == None` searches across all types.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MentionType>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, kind: Option<MentionType>) -> Self {
        Self {
            query: query.into(),
            kind,
        }
    }
}

/// External reference search service
///
/// Futures are `?Send`: the engine runs on a single-threaded UI event loop.
#[async_trait(?Send)]
pub trait ReferenceSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<MentionCandidate>, SearchError>;
}

// =============================================================================
// Types
// =============================================================================

/// Identity of one scheduled search; strictly increasing per client
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(pub u64);

/// A search that is due to be sent to the collaborator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub ticket: SearchTicket,
    pub query: SearchQuery,
}

/// Collaborator answer tagged with the ticket it was issued for
#[derive(Clone, Debug)]
pub struct SearchResponse {
    pub ticket: SearchTicket,
    pub result: Result<Vec<MentionCandidate>, SearchError>,
}

/// Where the current search stands
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Nothing requested
    Idle,
    /// Waiting out the debounce window
    Pending,
    /// Sent to the collaborator, no answer yet
    InFlight,
    /// Candidates are current (possibly empty)
    Ready,
    /// Last search failed; candidates are empty
    Failed,
}

/// Outcome of [`SearchClient::schedule`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Query too short; resolved locally to an empty list
    Local,
    /// Search will be due at the given instant
    Debounced { ticket: SearchTicket, due: Instant },
}

/// Outcome of [`SearchClient::resolve`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Candidates replaced; number kept
    Applied(usize),
    /// Failure recorded for the current search
    Failed,
    /// Superseded ticket; ignored
    Stale,
}

/// Counters for debugging
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub issued: u64,
    pub stale: u64,
    pub failed: u64,
    pub local: u64,
}

#[derive(Clone, Debug)]
struct PendingSearch {
    request: SearchRequest,
    due: Instant,
}

// =============================================================================
// SearchClient
// =============================================================================

/// Debounced, order-safe search sequencer for one input field
#[derive(Debug)]
pub struct SearchClient {
    config: MentionConfig,
    latest: SearchTicket,
    kind: Option<MentionType>,
    pending: Option<PendingSearch>,
    candidates: Vec<MentionCandidate>,
    status: SearchStatus,
    failure: Option<SearchError>,
    stats: SearchStats,
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new(MentionConfig::default())
    }
}

impl SearchClient {
    pub fn new(config: MentionConfig) -> Self {
        Self {
            config,
            latest: SearchTicket(0),
            kind: None,
            pending: None,
            candidates: Vec::new(),
            status: SearchStatus::Idle,
            failure: None,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &MentionConfig {
        &self.config
    }

    /// Schedule a search for `query`, superseding anything earlier
    ///
    /// The previous candidate list is discarded in full either way.
    pub fn schedule(&mut self, kind: MentionType, query: &str, now: Instant) -> Schedule {
        self.latest = SearchTicket(self.latest.0 + 1);
        self.kind = Some(kind);
        self.candidates.clear();
        self.failure = None;

        if !self.config.is_searchable(query) {
            self.pending = None;
            self.status = SearchStatus::Ready;
            self.stats.local += 1;
            tracing::debug!(ticket = self.latest.0, query, "query below minimum, empty local result");
            return Schedule::Local;
        }

        let due = now + self.config.debounce();
        self.pending = Some(PendingSearch {
            request: SearchRequest {
                ticket: self.latest,
                query: SearchQuery::new(query, Some(kind)),
            },
            due,
        });
        self.status = SearchStatus::Pending;
        tracing::debug!(ticket = self.latest.0, %kind, query, "search scheduled");

        Schedule::Debounced {
            ticket: self.latest,
            due,
        }
    }

    /// When the pending search becomes due, if any
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Hand out the pending search once its debounce window has elapsed
    pub fn take_due(&mut self, now: Instant) -> Option<SearchRequest> {
        match &self.pending {
            Some(pending) if pending.due <= now => {}
            _ => return None,
        }
        let pending = self.pending.take()?;
        self.status = SearchStatus::InFlight;
        self.stats.issued += 1;
        tracing::debug!(ticket = pending.request.ticket.0, "search issued");
        Some(pending.request)
    }

    /// Apply a collaborator answer if it belongs to the latest search
    pub fn resolve(&mut self, response: SearchResponse) -> Resolution {
        let SearchResponse { ticket, result } = response;

        if ticket != self.latest {
            self.stats.stale += 1;
            tracing::debug!(ticket = ticket.0, latest = self.latest.0, "stale search response discarded");
            return Resolution::Stale;
        }
        if self.pending.as_ref().is_some_and(|p| p.request.ticket == ticket) {
            self.pending = None;
        }

        match result {
            Ok(found) => {
                let kind = self.kind;
                let mut kept: Vec<MentionCandidate> = found
                    .into_iter()
                    .filter(|c| match kind {
                        Some(expected) if c.kind() != expected => {
                            let err = CandidateError::TypeMismatch {
                                expected,
                                got: c.kind(),
                            };
                            tracing::warn!(id = c.id(), error = %err, "dropping search result");
                            false
                        }
                        _ => true,
                    })
                    .collect();
                kept.truncate(self.config.max_candidates);

                let count = kept.len();
                self.candidates = kept;
                self.failure = None;
                self.status = SearchStatus::Ready;
                Resolution::Applied(count)
            }
            Err(err) => {
                tracing::warn!(ticket = ticket.0, error = %err, "reference search failed");
                self.candidates.clear();
                self.failure = Some(err);
                self.status = SearchStatus::Failed;
                self.stats.failed += 1;
                Resolution::Failed
            }
        }
    }

    /// Drop the current search; any answer still in flight becomes stale
    pub fn cancel(&mut self) {
        self.latest = SearchTicket(self.latest.0 + 1);
        self.kind = None;
        self.pending = None;
        self.candidates.clear();
        self.failure = None;
        self.status = SearchStatus::Idle;
    }

    pub fn candidates(&self) -> &[MentionCandidate] {
        &self.candidates
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Error of the last search, when it failed
    pub fn failure(&self) -> Option<&SearchError> {
        self.failure.as_ref()
    }

    pub fn latest_ticket(&self) -> SearchTicket {
        self.latest
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }
}

/// Run one request against the collaborator, keeping its ticket attached
pub async fn fetch<S>(source: &S, request: SearchRequest) -> SearchResponse
where
    S: ReferenceSearch + ?Sized,
{
    let result = source.search(&request.query).await;
    SearchResponse {
        ticket: request.ticket,
        result,
    }
}

// =============================================================================
// Tests
// =============================================================================

//! ComposeSession: per-field mention composition state machine
//!
//! # States
//! 1. Idle: no trigger left of the caret
//! 2. Searching: trigger active, waiting on debounce or the collaborator
//! 3. Choosing: trigger active, candidate list current (possibly empty or failed)
//!
//! Selecting a candidate splices the token and returns to Idle. Typing a
//! space, breaking the prefix, or moving the caret out of the span abandons
//! composition without touching the text. Every input field owns its own
//! session; sessions never share state.
//!
//! # Usage
//! ```rust,ignore
//! let mut session = ComposeSession::new(MentionConfig::default());
//! session.edit("veja @evento:Sess", 17, Instant::now());
//! // ...after the debounce window...
//! session.search_due(&index, Instant::now()).await;
//! let splice = session.select(0)?;
//! let draft = session.submit(); // { content, mentions }
//! ```

use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::comments::CommentDraft;
use crate::error::ComposeError;
use crate::mention::composer::{apply_selection, Splice};
use crate::mention::config::MentionConfig;
use crate::mention::search::{
    fetch, ReferenceSearch, Resolution, SearchClient, SearchRequest, SearchResponse, SearchStats,
    SearchStatus,
};
use crate::mention::trigger::detect_trigger;
use crate::mention::types::{CompositionState, MentionCandidate};

// =============================================================================
// Phase
// =============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Searching,
    Choosing,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Searching => "searching",
            Phase::Choosing => "choosing",
        }
    }
}

// =============================================================================
// ComposeSession
// =============================================================================

/// Composition state for one input field
#[derive(Debug)]
pub struct ComposeSession {
    text: String,
    caret: usize,
    composition: Option<CompositionState>,
    search: SearchClient,
    highlighted: usize,
}

impl Default for ComposeSession {
    fn default() -> Self {
        Self::new(MentionConfig::default())
    }
}

impl ComposeSession {
    pub fn new(config: MentionConfig) -> Self {
        Self {
            text: String::new(),
            caret: 0,
            composition: None,
            search: SearchClient::new(config),
            highlighted: 0,
        }
    }

    /// Start from existing content (edit box), caret at the end
    pub fn with_text(config: MentionConfig, text: impl Into<String>) -> Self {
        let text = text.into();
        let caret = text.len();
        Self {
            text,
            caret,
            ..Self::new(config)
        }
    }

    // -------------------------------------------------------------------------
    // Input events
    // -------------------------------------------------------------------------

    /// Text changed; `caret` is the new caret offset (UTF-8 bytes)
    pub fn edit(&mut self, text: impl Into<String>, caret: usize, now: Instant) -> Phase {
        self.text = text.into();
        self.caret = caret.min(self.text.len());
        self.rederive(now)
    }

    /// Caret moved without a text change (arrows, click)
    pub fn move_caret(&mut self, caret: usize, now: Instant) -> Phase {
        self.caret = caret.min(self.text.len());
        self.rederive(now)
    }

    /// Explicit dismissal (Escape)
    pub fn cancel(&mut self) {
        if self.composition.take().is_some() {
            tracing::debug!("composition cancelled");
        }
        self.search.cancel();
        self.highlighted = 0;
    }

    fn rederive(&mut self, now: Instant) -> Phase {
        match detect_trigger(&self.text, self.caret) {
            None => {
                if self.composition.take().is_some() {
                    tracing::debug!(caret = self.caret, "composition abandoned");
                    self.search.cancel();
                    self.highlighted = 0;
                }
            }
            Some(trigger) => {
                let next = trigger.composition();
                let same_search = self
                    .composition
                    .as_ref()
                    .is_some_and(|c| c.start == next.start && c.kind == next.kind && c.query == next.query);
                if !same_search {
                    self.search.schedule(next.kind, &next.query, now);
                    self.highlighted = 0;
                }
                self.composition = Some(next);
            }
        }
        self.phase()
    }

    // -------------------------------------------------------------------------
    // Search plumbing
    // -------------------------------------------------------------------------

    /// When the host should call [`take_due_search`](Self::take_due_search)
    pub fn next_due(&self) -> Option<Instant> {
        self.search.next_due()
    }

    pub fn take_due_search(&mut self, now: Instant) -> Option<SearchRequest> {
        self.search.take_due(now)
    }

    /// Deliver a collaborator answer; stale answers are ignored
    pub fn deliver(&mut self, response: SearchResponse) -> Resolution {
        let resolution = self.search.resolve(response);
        if matches!(resolution, Resolution::Applied(_) | Resolution::Failed) {
            self.highlighted = 0;
        }
        resolution
    }

    /// Issue the due search (if any) and apply its answer
    ///
    /// Holds `&mut self` across the await; hosts that need overlapping
    /// searches use `take_due_search` + [`fetch`] + `deliver` instead.
    pub async fn search_due<S>(&mut self, source: &S, now: Instant) -> Option<Resolution>
    where
        S: ReferenceSearch + ?Sized,
    {
        let request = self.take_due_search(now)?;
        let response = fetch(source, request).await;
        Some(self.deliver(response))
    }

    // -------------------------------------------------------------------------
    // Choosing
    // -------------------------------------------------------------------------

    pub fn candidates(&self) -> &[MentionCandidate] {
        if self.composition.is_none() {
            return &[];
        }
        self.search.candidates()
    }

    /// Whether the last search failed (UI may show "no results")
    pub fn search_failed(&self) -> bool {
        self.composition.is_some() && self.search.status() == SearchStatus::Failed
    }

    pub fn highlighted(&self) -> Option<usize> {
        (!self.candidates().is_empty()).then_some(self.highlighted)
    }

    pub fn select_next(&mut self) -> Option<usize> {
        let len = self.candidates().len();
        if len == 0 {
            return None;
        }
        self.highlighted = (self.highlighted + 1) % len;
        Some(self.highlighted)
    }

    pub fn select_previous(&mut self) -> Option<usize> {
        let len = self.candidates().len();
        if len == 0 {
            return None;
        }
        self.highlighted = (self.highlighted + len - 1) % len;
        Some(self.highlighted)
    }

    /// Select the keyboard-highlighted candidate (Enter)
    pub fn commit_highlighted(&mut self) -> Result<Splice, ComposeError> {
        self.select(self.highlighted)
    }

    /// Select a candidate from the current list by index
    pub fn select(&mut self, index: usize) -> Result<Splice, ComposeError> {
        let candidate = self
            .candidates()
            .get(index)
            .cloned()
            .ok_or(ComposeError::NoCandidate(index))?;
        self.select_candidate(&candidate)
    }

    /// Splice `candidate` over the active trigger
    pub fn select_candidate(&mut self, candidate: &MentionCandidate) -> Result<Splice, ComposeError> {
        let state = self.composition.as_ref().ok_or(ComposeError::NoActiveTrigger)?;
        let splice = apply_selection(&self.text, state, candidate)?;

        self.text = splice.text.clone();
        self.caret = splice.caret;
        self.composition = None;
        self.search.cancel();
        self.highlighted = 0;
        tracing::debug!(id = candidate.id(), kind = %candidate.kind(), "mention inserted");

        Ok(splice)
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Content plus freshly extracted mentions, ready for persistence
    pub fn submit(&self) -> CommentDraft {
        CommentDraft::from_text(self.text.clone())
    }

    /// Reset after a successful save
    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
        self.cancel();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        if self.composition.is_none() {
            return Phase::Idle;
        }
        match self.search.status() {
            SearchStatus::Ready | SearchStatus::Failed => Phase::Choosing,
            SearchStatus::Idle | SearchStatus::Pending | SearchStatus::InFlight => Phase::Searching,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn composition(&self) -> Option<&CompositionState> {
        self.composition.as_ref()
    }

    pub fn config(&self) -> &MentionConfig {
        self.search.config()
    }

    pub fn stats(&self) -> SearchStats {
        self.search.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::types::MentionType;
    use std::time::Duration;

    #[test]
    fn test_plain_text_stays_idle() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        assert_eq!(session.edit("olá mundo", 10, now), Phase::Idle);
        assert_eq!(session.edit("mail@x", 6, now), Phase::Idle);
        assert!(session.composition().is_none());
    }

    #[test]
    fn test_short_query_goes_straight_to_choosing() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        // Empty query: nothing sent, empty list is current
        assert_eq!(session.edit("@evento:", 8, now), Phase::Choosing);
        assert!(session.candidates().is_empty());
        assert!(session.take_due_search(now + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_long_enough_query_is_searching() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        assert_eq!(session.edit("@evento:Se", 10, now), Phase::Searching);
        let state = session.composition().unwrap();
        assert_eq!(state.kind, MentionType::Event);
        assert_eq!(state.query, "Se");
        assert_eq!(session.next_due(), Some(now + Duration::from_millis(200)));
    }

    #[test]
    fn test_space_abandons_without_changing_text() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        session.edit("@evento:Se", 10, now);
        assert_eq!(session.edit("@evento:Se ", 11, now), Phase::Idle);
        assert_eq!(session.text(), "@evento:Se ");
        assert!(session.next_due().is_none());
    }

    #[test]
    fn test_caret_leaving_span_abandons() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        session.edit("oi @evento:Sess", 15, now);
        assert_eq!(session.move_caret(2, now), Phase::Idle);
        // Coming back re-derives from scratch
        assert_eq!(session.move_caret(15, now), Phase::Searching);
    }

    #[test]
    fn test_caret_inside_span_rederives_query() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        session.edit("@evento:Sessão", "@evento:Sessão".len(), now);

        assert_eq!(session.move_caret("@evento:Se".len(), now), Phase::Searching);
        let state = session.composition().unwrap();
        assert_eq!(state.query, "Se");
        assert_eq!(state.end, "@evento:Se".len());
        // Right after the '@' the type token is empty, so nothing is composed
        assert_eq!(session.move_caret(1, now), Phase::Idle);
    }

    #[test]
    fn test_select_without_trigger_fails() {
        let mut session = ComposeSession::default();
        assert_eq!(session.select(0), Err(ComposeError::NoCandidate(0)));
        assert_eq!(session.commit_highlighted(), Err(ComposeError::NoCandidate(0)));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut session = ComposeSession::default();
        let now = Instant::now();
        session.edit("@documento:Ata", 14, now);
        session.cancel();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.text(), "@documento:Ata");
    }

    #[test]
    fn test_with_text_places_caret_at_end() {
        let session = ComposeSession::with_text(MentionConfig::default(), "já @evento:A");
        assert_eq!(session.caret(), "já @evento:A".len());
        assert_eq!(session.submit().mentions.len(), 1);
    }
}

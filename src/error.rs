//! Error types for MentionCore
//!
//! One enum per concern. Everything is recoverable: callers decide how to
//! surface it, the engine never shows UI for an error.

use crate::mention::MentionType;

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_candidates must be at least 1")]
    ZeroCandidates,

    #[error("debounce of {0} ms exceeds the 2000 ms ceiling")]
    DebounceTooLong(u64),
}

/// A search result rejected at the collaborator boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("candidate has no id")]
    MissingId,

    #[error("candidate {id} has an empty title")]
    EmptyTitle { id: String },

    #[error("unknown mention type: {0}")]
    UnknownType(String),

    #[error("expected a {expected} candidate, got {got}")]
    TypeMismatch { expected: MentionType, got: MentionType },
}

/// Reference search failure (never fatal to composition)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("reference search failed: {0}")]
    Collaborator(String),

    #[error("reference search returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Splice could not be applied to the current text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("trigger span {start}..{end} is outside text of length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),

    #[error("no mention is being composed")]
    NoActiveTrigger,

    #[error("no candidate at index {0}")]
    NoCandidate(usize),
}

/// Comment persistence failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentError {
    #[error("comment content is empty")]
    EmptyContent,

    #[error("comment {0} not found")]
    NotFound(i64),

    #[error("user {user_id} may not modify comment {comment_id}")]
    Forbidden { comment_id: i64, user_id: String },

    #[error("comment store error: {0}")]
    Store(String),
}

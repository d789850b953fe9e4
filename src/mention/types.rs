//! Core mention types
//!
//! The mention vocabulary is closed: three entity types, each introduced in
//! text by a fixed, case-sensitive prefix word. Adding a type means adding a
//! variant here and teaching the search collaborator about it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CandidateError;

// =============================================================================
// MentionType
// =============================================================================

/// Kind of entity a mention refers to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    Event,
    Activity,
    Document,
}

impl MentionType {
    /// All types, in the order the reference index searches them
    pub const ALL: [MentionType; 3] = [
        MentionType::Event,
        MentionType::Activity,
        MentionType::Document,
    ];

    /// Internal tag used on the wire (`event`, `activity`, `document`)
    pub fn as_str(&self) -> &'static str {
        match self {
            MentionType::Event => "event",
            MentionType::Activity => "activity",
            MentionType::Document => "document",
        }
    }

    /// User-facing prefix word written after `@` in text
    pub fn prefix(&self) -> &'static str {
        match self {
            MentionType::Event => "evento",
            MentionType::Activity => "atividade",
            MentionType::Document => "documento",
        }
    }

    /// Map a prefix word back to its type. Case-sensitive.
    pub fn from_prefix(word: &str) -> Option<Self> {
        match word {
            "evento" => Some(MentionType::Event),
            "atividade" => Some(MentionType::Activity),
            "documento" => Some(MentionType::Document),
            _ => None,
        }
    }

    /// Map a wire tag back to its type
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "event" => Some(MentionType::Event),
            "activity" => Some(MentionType::Activity),
            "document" => Some(MentionType::Document),
            _ => None,
        }
    }

    /// UI route of a referenced entity
    pub fn route(&self, id: &str) -> String {
        match self {
            MentionType::Event => format!("/events/{}", id),
            MentionType::Activity => format!("/activities/{}", id),
            MentionType::Document => format!("/documents/{}", id),
        }
    }

    /// Canonical in-text token for a title: `@<prefix>:<title>`
    pub fn token(&self, title: &str) -> String {
        format!("@{}:{}", self.prefix(), title)
    }
}

impl fmt::Display for MentionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Mention
// =============================================================================

/// Persisted structured reference, derived from text
///
/// Identity is the `(type, title)` pair; repeats are kept as repeats.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mention {
    #[serde(rename = "type")]
    pub kind: MentionType,
    pub title: String,
}

impl Mention {
    pub fn new(kind: MentionType, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
        }
    }

    /// Canonical token this mention is written as
    pub fn token(&self) -> String {
        self.kind.token(&self.title)
    }
}

// =============================================================================
// MentionCandidate
// =============================================================================

/// Fields shared by every candidate type
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateBase {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    pub url: String,
}

/// A validated search result, tagged by the entity type it refers to
///
/// Ephemeral: lives only as long as the search that produced it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MentionCandidate {
    Event(CandidateBase),
    Activity(CandidateBase),
    Document(CandidateBase),
}

impl MentionCandidate {
    pub fn new(kind: MentionType, base: CandidateBase) -> Self {
        match kind {
            MentionType::Event => MentionCandidate::Event(base),
            MentionType::Activity => MentionCandidate::Activity(base),
            MentionType::Document => MentionCandidate::Document(base),
        }
    }

    pub fn kind(&self) -> MentionType {
        match self {
            MentionCandidate::Event(_) => MentionType::Event,
            MentionCandidate::Activity(_) => MentionType::Activity,
            MentionCandidate::Document(_) => MentionType::Document,
        }
    }

    pub fn base(&self) -> &CandidateBase {
        match self {
            MentionCandidate::Event(b)
            | MentionCandidate::Activity(b)
            | MentionCandidate::Document(b) => b,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn title(&self) -> &str {
        &self.base().title
    }

    pub fn url(&self) -> &str {
        &self.base().url
    }
}

/// Search result as the collaborator sends it: loosely typed JSON
///
/// `id` may be a number or a string, `url` may be missing.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct RawCandidate {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl TryFrom<RawCandidate> for MentionCandidate {
    type Error = CandidateError;

    fn try_from(raw: RawCandidate) -> Result<Self, Self::Error> {
        let id = match raw.id {
            serde_json::Value::String(s) if !s.is_empty() => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => return Err(CandidateError::MissingId),
        };

        let tag = raw.kind.unwrap_or_default();
        let kind = MentionType::from_tag(&tag).ok_or(CandidateError::UnknownType(tag))?;

        let title = raw.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(CandidateError::EmptyTitle { id });
        }

        let url = raw
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| kind.route(&id));

        Ok(MentionCandidate::new(
            kind,
            CandidateBase {
                id,
                title,
                description: raw.description,
                date: raw.date,
                status: raw.status,
                category: raw.category,
                highlight: raw.highlight,
                url,
            },
        ))
    }
}

// =============================================================================
// CompositionState
// =============================================================================

/// Transient per-field state while a mention is being typed
///
/// `[start, end)` is the trigger span in UTF-8 byte offsets; the caret sits
/// at `end`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CompositionState {
    pub start: usize,
    pub end: usize,
    pub kind: MentionType,
    pub query: String,
}

impl CompositionState {
    pub fn caret(&self) -> usize {
        self.end
    }
}

//! Trigger detection
//!
//! Decides, from the text and caret alone, whether a mention is being typed:
//! - `@evento:Sess|`  → active, type Event, query "Sess"
//! - `@evento|`       → active, type Event, empty query
//! - `@evento:Sess |` → inactive (whitespace aborts)
//! - `@random:x|`     → inactive (`@` is literal text)
//!
//! Detection is re-run from scratch on every edit and caret move; there is no
//! "inside a trigger" flag that outlives the text it was derived from.

use serde::{Deserialize, Serialize};

use crate::mention::types::{CompositionState, MentionType};

/// An active trigger left of the caret
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    /// Byte offset of the `@`
    pub start: usize,
    /// Byte offset of the caret (exclusive end of the span)
    pub end: usize,
    pub kind: MentionType,
    /// Text between `@` and the first `:` (or the caret)
    pub raw_type_token: String,
    /// Text after the first `:`; empty when no `:` was typed yet
    pub query: String,
}

impl Trigger {
    /// Prefix word the trigger was typed with
    pub fn prefix(&self) -> &'static str {
        self.kind.prefix()
    }

    pub fn composition(&self) -> CompositionState {
        CompositionState {
            start: self.start,
            end: self.end,
            kind: self.kind,
            query: self.query.clone(),
        }
    }
}

/// Detect an active trigger ending at `caret` (UTF-8 byte offset)
///
/// A caret past the end of `text` is clamped to the end. A caret that splits
/// a character never produces a trigger.
pub fn detect_trigger(text: &str, caret: usize) -> Option<Trigger> {
    let caret = caret.min(text.len());
    if !text.is_char_boundary(caret) {
        tracing::debug!(caret, "caret not on a char boundary, no trigger");
        return None;
    }

    let before = &text[..caret];
    let at = before.rfind('@')?;
    let tail = &before[at + 1..];

    if tail.chars().any(char::is_whitespace) {
        return None;
    }

    let (raw_type_token, query) = match tail.split_once(':') {
        Some((token, query)) => (token, query),
        None => (tail, ""),
    };

    let kind = MentionType::from_prefix(raw_type_token)?;

    Some(Trigger {
        start: at,
        end: caret,
        kind,
        raw_type_token: raw_type_token.to_string(),
        query: query.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at_end(text: &str) -> Option<Trigger> {
        detect_trigger(text, text.len())
    }

    #[test]
    fn test_event_trigger_with_query() {
        let t = at_end("Olá @evento:Sessão").unwrap();
        assert_eq!(t.kind, MentionType::Event);
        assert_eq!(t.query, "Sessão");
        assert_eq!(t.raw_type_token, "evento");
        // "Olá " is 5 bytes
        assert_eq!(t.start, 5);
        assert_eq!(t.end, "Olá @evento:Sessão".len());
    }

    #[test]
    fn test_space_aborts_trigger() {
        assert!(at_end("Olá @evento:Sessão ").is_none());
    }

    #[test]
    fn test_newline_aborts_trigger() {
        assert!(at_end("@evento:Sess\n").is_none());
    }

    #[test]
    fn test_prefix_without_colon_is_active_with_empty_query() {
        let t = at_end("veja @documento").unwrap();
        assert_eq!(t.kind, MentionType::Document);
        assert_eq!(t.query, "");
    }

    #[test]
    fn test_colon_with_empty_query() {
        let t = at_end("veja @evento:").unwrap();
        assert_eq!((t.start, t.end), (5, 13));
        assert_eq!(t.query, "");
    }

    #[test]
    fn test_unrecognized_prefix_is_literal() {
        assert!(at_end("@random:text").is_none());
        assert!(at_end("mail me @ home").is_none());
        assert!(at_end("user@example").is_none());
    }

    #[test]
    fn test_partial_prefix_is_not_a_trigger() {
        assert!(at_end("@even").is_none());
        assert!(at_end("@Evento:x").is_none());
    }

    #[test]
    fn test_query_keeps_later_colons() {
        let t = at_end("@atividade:PL:2024").unwrap();
        assert_eq!(t.kind, MentionType::Activity);
        assert_eq!(t.query, "PL:2024");
    }

    #[test]
    fn test_only_last_at_counts() {
        // Earlier completed mention, new literal `@` after it
        assert!(at_end("@evento:A @x").is_none());
        let t = at_end("@x @evento:B").unwrap();
        assert_eq!(t.start, 3);
        assert_eq!(t.query, "B");
    }

    #[test]
    fn test_caret_in_middle_rederives() {
        let text = "@evento:Sessão e mais";
        // Caret right after "Ses"
        let t = detect_trigger(text, "@evento:Ses".len()).unwrap();
        assert_eq!(t.query, "Ses");
        // Caret after the space: no trigger
        assert!(detect_trigger(text, "@evento:Sessão ".len()).is_none());
        // Caret before the `@`
        assert!(detect_trigger(text, 0).is_none());
    }

    #[test]
    fn test_caret_past_end_is_clamped() {
        let t = detect_trigger("@evento:x", 999).unwrap();
        assert_eq!(t.end, 9);
    }

    #[test]
    fn test_caret_inside_multibyte_char() {
        // 'ã' is two bytes; offset 1 into it is not a boundary
        let text = "@evento:ã";
        assert!(detect_trigger(text, text.len() - 1).is_none());
    }

    #[test]
    fn test_composition_from_trigger() {
        let t = at_end("x @atividade:Req").unwrap();
        let c = t.composition();
        assert_eq!(c.start, 2);
        assert_eq!(c.caret(), t.end);
        assert_eq!(c.kind, MentionType::Activity);
        assert_eq!(c.query, "Req");
    }
}

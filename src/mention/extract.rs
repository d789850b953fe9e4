//! Mention extraction
//!
//! Scans final text for canonical tokens:
//! `@(evento|atividade|documento):<run without '@' or whitespace>`
//!
//! Output is in left-to-right order with repeats preserved. Always computed
//! from the full current text, never patched from an earlier list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mention::types::{Mention, MentionType};

// Group 1: prefix word, Group 2: title
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(evento|atividade|documento):([^@\s]+)").expect("token pattern is valid")
});

/// A token located in text (UTF-8 byte offsets)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenMatch {
    pub start: usize,
    pub end: usize,
    pub mention: Mention,
}

/// Locate every canonical token in `text`
pub fn find_tokens(text: &str) -> Vec<TokenMatch> {
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let full = cap.get(0)?;
            let kind = MentionType::from_prefix(cap.get(1)?.as_str())?;
            let title = cap.get(2)?.as_str();
            Some(TokenMatch {
                start: full.start(),
                end: full.end(),
                mention: Mention::new(kind, title),
            })
        })
        .collect()
}

/// Structured mentions of `text`, no deduplication
pub fn extract_mentions(text: &str) -> Vec<Mention> {
    find_tokens(text).into_iter().map(|m| m.mention).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_all_types_in_order() {
        let mentions = extract_mentions(
            "ver @documento:Ata-3, @evento:Sessão e @atividade:PL-12",
        );
        assert_eq!(
            mentions,
            vec![
                Mention::new(MentionType::Document, "Ata-3,"),
                Mention::new(MentionType::Event, "Sessão"),
                Mention::new(MentionType::Activity, "PL-12"),
            ]
        );
    }

    #[test]
    fn test_repeats_are_not_deduplicated() {
        let mentions = extract_mentions("@evento:A e também @evento:A");
        assert_eq!(
            mentions,
            vec![
                Mention::new(MentionType::Event, "A"),
                Mention::new(MentionType::Event, "A"),
            ]
        );
    }

    #[test]
    fn test_unrecognized_prefix_yields_nothing() {
        assert!(extract_mentions("@random:text").is_empty());
        assert!(extract_mentions("@Evento:x @eventos:y").is_empty());
    }

    #[test]
    fn test_title_stops_at_whitespace_and_at() {
        let tokens = find_tokens("@evento:Sessão #12 e @evento:A@evento:B");
        let titles: Vec<&str> = tokens.iter().map(|t| t.mention.title.as_str()).collect();
        assert_eq!(titles, vec!["Sessão", "A", "B"]);
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[0].end, "@evento:Sessão".len());
    }

    #[test]
    fn test_prefix_without_title_is_not_a_mention() {
        assert!(extract_mentions("@evento: e @documento").is_empty());
    }

    #[test]
    fn test_hand_typed_tokens_count() {
        // Never checked against search results
        let mentions = extract_mentions("@documento:NaoExiste");
        assert_eq!(mentions, vec![Mention::new(MentionType::Document, "NaoExiste")]);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let text = "@evento:X @atividade:Y @evento:X";
        assert_eq!(extract_mentions(text), extract_mentions(text));
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_mentions("").is_empty());
    }
}

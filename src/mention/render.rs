//! Mention rendering
//!
//! Turns stored `{content, mentions}` into a flat list of segments that a UI
//! maps to plain text runs and badges. No markup is produced, so nothing in
//! user text can be interpreted as HTML.
//!
//! Matching is by exact literal token text. Every occurrence is highlighted;
//! a mention whose token no longer appears in the text is silently skipped.
//! When tokens overlap (`@evento:A` inside `@evento:AB`), the leftmost-longest
//! occurrence wins.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::{Deserialize, Serialize};

use crate::mention::types::{Mention, MentionType};

/// One display unit of rendered text
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Text {
        value: String,
    },
    Mention {
        /// Token text exactly as it appears in the content
        value: String,
        #[serde(rename = "type")]
        mention_type: MentionType,
        title: String,
    },
}

impl Segment {
    pub fn value(&self) -> &str {
        match self {
            Segment::Text { value } | Segment::Mention { value, .. } => value,
        }
    }

    pub fn is_mention(&self) -> bool {
        matches!(self, Segment::Mention { .. })
    }
}

/// Split `text` into text and mention segments
///
/// Concatenating the segment values always reproduces `text` exactly.
pub fn render_segments(text: &str, mentions: &[Mention]) -> Vec<Segment> {
    let mut unique: Vec<&Mention> = Vec::new();
    for mention in mentions.iter().filter(|m| !m.title.is_empty()) {
        if !unique.contains(&mention) {
            unique.push(mention);
        }
    }

    if unique.is_empty() {
        return plain(text);
    }

    let patterns: Vec<String> = unique.iter().map(|m| m.token()).collect();
    let matcher = match AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&patterns)
    {
        Ok(matcher) => matcher,
        Err(err) => {
            tracing::warn!(error = %err, "mention matcher build failed, rendering plain text");
            return plain(text);
        }
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in matcher.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment::Text {
                value: text[cursor..found.start()].to_string(),
            });
        }
        let mention = unique[found.pattern().as_usize()];
        segments.push(Segment::Mention {
            value: text[found.start()..found.end()].to_string(),
            mention_type: mention.kind,
            title: mention.title.clone(),
        });
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(Segment::Text {
            value: text[cursor..].to_string(),
        });
    }

    segments
}

fn plain(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![Segment::Text {
        value: text.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::extract::extract_mentions;

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(Segment::value).collect()
    }

    fn highlighted(segments: &[Segment]) -> Vec<&str> {
        segments
            .iter()
            .filter(|s| s.is_mention())
            .map(Segment::value)
            .collect()
    }

    #[test]
    fn test_wraps_mention_between_text() {
        let text = "veja @evento:Sessão hoje";
        let segments = render_segments(text, &extract_mentions(text));
        assert_eq!(
            segments,
            vec![
                Segment::Text { value: "veja ".to_string() },
                Segment::Mention {
                    value: "@evento:Sessão".to_string(),
                    mention_type: MentionType::Event,
                    title: "Sessão".to_string(),
                },
                Segment::Text { value: " hoje".to_string() },
            ]
        );
    }

    #[test]
    fn test_every_occurrence_is_highlighted() {
        let text = "@evento:A e também @evento:A";
        // A single entry still highlights both occurrences
        let segments = render_segments(text, &[Mention::new(MentionType::Event, "A")]);
        assert_eq!(highlighted(&segments), vec!["@evento:A", "@evento:A"]);
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_missing_token_is_skipped() {
        let text = "@evento:Novo titulo";
        let segments = render_segments(text, &[Mention::new(MentionType::Event, "Antigo")]);
        assert_eq!(segments, vec![Segment::Text { value: text.to_string() }]);
    }

    #[test]
    fn test_unrecognized_prefix_passes_through() {
        let text = "@random:text";
        let segments = render_segments(text, &extract_mentions(text));
        assert_eq!(segments, vec![Segment::Text { value: text.to_string() }]);
    }

    #[test]
    fn test_longest_overlapping_token_wins() {
        let text = "@evento:A @evento:AB";
        let segments = render_segments(text, &extract_mentions(text));
        assert_eq!(highlighted(&segments), vec!["@evento:A", "@evento:AB"]);
        assert_eq!(joined(&segments), text);
    }

    #[test]
    fn test_markup_is_not_interpreted() {
        let text = "<b>x</b> @documento:<script>";
        let segments = render_segments(text, &extract_mentions(text));
        assert_eq!(segments[0], Segment::Text { value: "<b>x</b> ".to_string() });
        assert_eq!(segments[1].value(), "@documento:<script>");
    }

    #[test]
    fn test_title_with_space_matches_literally() {
        let text = "ver @evento:Sessão #12";
        let segments = render_segments(text, &[Mention::new(MentionType::Event, "Sessão #12")]);
        assert_eq!(highlighted(&segments), vec!["@evento:Sessão #12"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(render_segments("", &[]).is_empty());
        assert_eq!(render_segments("oi", &[]).len(), 1);
    }

    #[test]
    fn test_segment_json_shape() {
        let segments = render_segments("@atividade:PL", &extract_mentions("@atividade:PL"));
        let v = serde_json::to_value(&segments).unwrap();
        assert_eq!(v[0]["kind"], "mention");
        assert_eq!(v[0]["value"], "@atividade:PL");
        assert_eq!(v[0]["type"], "activity");
        assert_eq!(v[0]["title"], "PL");
    }
}

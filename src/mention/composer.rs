//! Mention composition: splice a selected candidate into the text
//!
//! The in-progress trigger span is replaced by the canonical token
//! `@<prefix>:<title>` and the caret lands right after it. Pure substring
//! replacement: same inputs, same output.

use serde::{Deserialize, Serialize};

use crate::error::ComposeError;
use crate::mention::types::{CompositionState, MentionCandidate, MentionType};

/// Text and caret after a splice (UTF-8 byte offsets)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub caret: usize,
}

/// Replace the trigger span with the candidate's canonical token
pub fn apply_selection(
    text: &str,
    state: &CompositionState,
    candidate: &MentionCandidate,
) -> Result<Splice, ComposeError> {
    splice_token(text, state.start, state.end, state.kind, candidate.title())
}

/// Replace `text[start..end]` with `@<prefix>:<title>`
pub fn splice_token(
    text: &str,
    start: usize,
    end: usize,
    kind: MentionType,
    title: &str,
) -> Result<Splice, ComposeError> {
    if start > end || end > text.len() {
        return Err(ComposeError::SpanOutOfBounds {
            start,
            end,
            len: text.len(),
        });
    }
    for offset in [start, end] {
        if !text.is_char_boundary(offset) {
            return Err(ComposeError::NotCharBoundary(offset));
        }
    }

    let token = kind.token(title);
    let mut spliced = String::with_capacity(text.len() - (end - start) + token.len());
    spliced.push_str(&text[..start]);
    spliced.push_str(&token);
    spliced.push_str(&text[end..]);

    Ok(Splice {
        text: spliced,
        caret: start + token.len(),
    })
}

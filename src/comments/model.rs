//! Comment data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mention::extract::extract_mentions;
use crate::mention::types::Mention;

/// Content plus the mentions extracted from exactly that content
///
/// Built with [`CommentDraft::from_text`]; `CommentService` rebuilds it from
/// the content right before every store call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommentDraft {
    pub content: String,
    pub mentions: Vec<Mention>,
}

impl CommentDraft {
    pub fn from_text(content: impl Into<String>) -> Self {
        let content = content.into();
        let mentions = extract_mentions(&content);
        Self { content, mentions }
    }

    /// Whitespace-only content is not a comment
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Author display fields returned with comments
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// A stored event comment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub event_id: i64,
    pub author_id: String,
    pub content: String,
    pub mentions: Vec<Mention>,
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorProfile>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// The user performing a comment operation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn member(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Member,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
        }
    }

    /// Authors may change their own comments; admins may change any
    pub fn may_modify(&self, comment: &Comment) -> bool {
        self.role == Role::Admin || self.id == comment.author_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::types::MentionType;

    fn comment(author: &str) -> Comment {
        let now = Utc::now();
        Comment {
            id: 1,
            event_id: 9,
            author_id: author.to_string(),
            content: String::new(),
            mentions: Vec::new(),
            is_edited: false,
            created_at: now,
            updated_at: now,
            author: None,
        }
    }

    #[test]
    fn test_draft_extracts_from_its_own_content() {
        let draft = CommentDraft::from_text("ver @evento:A e @atividade:B");
        assert_eq!(
            draft.mentions,
            vec![
                Mention::new(MentionType::Event, "A"),
                Mention::new(MentionType::Activity, "B"),
            ]
        );
    }

    #[test]
    fn test_blank_draft() {
        assert!(CommentDraft::from_text("  \n\t").is_blank());
        assert!(!CommentDraft::from_text(" x ").is_blank());
    }

    #[test]
    fn test_modify_permission() {
        let c = comment("u1");
        assert!(Actor::member("u1").may_modify(&c));
        assert!(!Actor::member("u2").may_modify(&c));
        assert!(Actor::admin("u2").may_modify(&c));
    }

    #[test]
    fn test_comment_wire_shape() {
        let mut c = comment("u1");
        c.mentions.push(Mention::new(MentionType::Document, "Ata"));
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["authorId"], "u1");
        assert_eq!(v["isEdited"], false);
        assert_eq!(v["mentions"][0]["type"], "document");
        assert!(v.get("author").is_none());
    }
}

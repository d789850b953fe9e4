//! Comment persistence contract and service
//!
//! `CommentService` is the only path from a compose box to a store. It
//! re-runs mention extraction on the exact content being saved, so stored
//! `content` and `mentions` are never out of sync.

use async_trait::async_trait;

use crate::comments::model::{Actor, Comment, CommentDraft};
use crate::error::CommentError;

/// External comment persistence service
#[async_trait(?Send)]
pub trait CommentStore {
    /// Comments of an event, in service order
    async fn list(&self, event_id: i64) -> Result<Vec<Comment>, CommentError>;

    async fn get(&self, comment_id: i64) -> Result<Option<Comment>, CommentError>;

    async fn create(
        &self,
        event_id: i64,
        author_id: &str,
        draft: CommentDraft,
    ) -> Result<Comment, CommentError>;

    /// Replace content and mentions; the store marks the comment edited
    async fn update(&self, comment_id: i64, draft: CommentDraft) -> Result<Comment, CommentError>;

    async fn delete(&self, comment_id: i64) -> Result<(), CommentError>;
}

/// Validates, extracts and forwards comment operations
pub struct CommentService<S> {
    store: S,
}

impl<S: CommentStore> CommentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list(&self, event_id: i64) -> Result<Vec<Comment>, CommentError> {
        self.store.list(event_id).await
    }

    pub async fn create(
        &self,
        event_id: i64,
        actor: &Actor,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let draft = prepare(content)?;
        tracing::debug!(event_id, mentions = draft.mentions.len(), "creating comment");
        self.store.create(event_id, &actor.id, draft).await
    }

    pub async fn update(
        &self,
        comment_id: i64,
        actor: &Actor,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let draft = prepare(content)?;
        self.authorize(comment_id, actor).await?;
        tracing::debug!(comment_id, mentions = draft.mentions.len(), "updating comment");
        self.store.update(comment_id, draft).await
    }

    pub async fn delete(&self, comment_id: i64, actor: &Actor) -> Result<(), CommentError> {
        self.authorize(comment_id, actor).await?;
        tracing::debug!(comment_id, "deleting comment");
        self.store.delete(comment_id).await
    }

    async fn authorize(&self, comment_id: i64, actor: &Actor) -> Result<Comment, CommentError> {
        let comment = self
            .store
            .get(comment_id)
            .await?
            .ok_or(CommentError::NotFound(comment_id))?;
        if !actor.may_modify(&comment) {
            tracing::warn!(comment_id, user = %actor.id, "comment modification refused");
            return Err(CommentError::Forbidden {
                comment_id,
                user_id: actor.id.clone(),
            });
        }
        Ok(comment)
    }
}

fn prepare(content: &str) -> Result<CommentDraft, CommentError> {
    let draft = CommentDraft::from_text(content);
    if draft.is_blank() {
        return Err(CommentError::EmptyContent);
    }
    Ok(draft)
}

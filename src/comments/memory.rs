//! In-memory CommentStore
//!
//! Backs tests and offline demos. Keeps creation order and joins author
//! profiles on read like the hosted service does.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

use crate::comments::model::{AuthorProfile, Comment, CommentDraft};
use crate::comments::store::CommentStore;
use crate::error::CommentError;

#[derive(Default)]
struct State {
    next_id: i64,
    comments: Vec<Comment>,
    authors: HashMap<String, AuthorProfile>,
}

#[derive(Default)]
pub struct InMemoryCommentStore {
    state: RefCell<State>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile to attach to that author's comments
    pub fn add_author(&self, profile: AuthorProfile) {
        self.state
            .borrow_mut()
            .authors
            .insert(profile.id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.state.borrow().comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl State {
    fn joined(&self, comment: &Comment) -> Comment {
        let mut out = comment.clone();
        out.author = self.authors.get(&comment.author_id).cloned();
        out
    }

    fn position(&self, comment_id: i64) -> Result<usize, CommentError> {
        self.comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(CommentError::NotFound(comment_id))
    }
}

#[async_trait(?Send)]
impl CommentStore for InMemoryCommentStore {
    async fn list(&self, event_id: i64) -> Result<Vec<Comment>, CommentError> {
        let state = self.state.borrow();
        Ok(state
            .comments
            .iter()
            .filter(|c| c.event_id == event_id)
            .map(|c| state.joined(c))
            .collect())
    }

    async fn get(&self, comment_id: i64) -> Result<Option<Comment>, CommentError> {
        let state = self.state.borrow();
        Ok(state
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| state.joined(c)))
    }

    async fn create(
        &self,
        event_id: i64,
        author_id: &str,
        draft: CommentDraft,
    ) -> Result<Comment, CommentError> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: state.next_id,
            event_id,
            author_id: author_id.to_string(),
            content: draft.content,
            mentions: draft.mentions,
            is_edited: false,
            created_at: now,
            updated_at: now,
            author: None,
        };
        let out = state.joined(&comment);
        state.comments.push(comment);
        Ok(out)
    }

    async fn update(&self, comment_id: i64, draft: CommentDraft) -> Result<Comment, CommentError> {
        let mut state = self.state.borrow_mut();
        let at = state.position(comment_id)?;
        let comment = &mut state.comments[at];
        comment.content = draft.content;
        comment.mentions = draft.mentions;
        comment.is_edited = true;
        comment.updated_at = Utc::now();
        let updated = comment.clone();
        Ok(state.joined(&updated))
    }

    async fn delete(&self, comment_id: i64) -> Result<(), CommentError> {
        let mut state = self.state.borrow_mut();
        let at = state.position(comment_id)?;
        state.comments.remove(at);
        Ok(())
    }
}

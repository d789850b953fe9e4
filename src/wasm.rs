//! WASM bindings
//!
//! JS sees UTF-16 caret offsets and plain objects; everything below this
//! file works in UTF-8 byte offsets and typed values.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use instant::Instant;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::comments::{Actor, CommentService, InMemoryCommentStore};
use crate::error::{CommentError, SearchError};
use crate::mention::composer::Splice;
use crate::mention::config::MentionConfig;
use crate::mention::extract::extract_mentions;
use crate::mention::render::render_segments;
use crate::mention::search::{fetch, ReferenceSearch, SearchQuery};
use crate::mention::session::ComposeSession;
use crate::mention::trigger::{detect_trigger, Trigger};
use crate::mention::types::{Mention, MentionCandidate, MentionType, RawCandidate};
use crate::text::{byte_to_utf16, utf16_to_byte};

/// Plain JS objects for maps, `null` for unit
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(|e| {
        web_sys::console::error_1(&format!("[mentioncore] Serialization failed: {:?}", e).into());
        JsValue::from_str(&e.to_string())
    })
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

// ============================================================================
// JS views (UTF-16 offsets)
// ============================================================================

/// Active trigger as JS sees it
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerView {
    pub start: usize,
    pub end: usize,
    pub kind: MentionType,
    /// Prefix word of the resolved type (`evento`, `atividade`, `documento`)
    pub type_prefix: &'static str,
    pub raw_type_token: String,
    pub query: String,
}

impl TriggerView {
    pub fn new(text: &str, trigger: &Trigger) -> Self {
        Self {
            start: byte_to_utf16(text, trigger.start),
            end: byte_to_utf16(text, trigger.end),
            kind: trigger.kind,
            type_prefix: trigger.prefix(),
            raw_type_token: trigger.raw_type_token.clone(),
            query: trigger.query.clone(),
        }
    }
}

/// Spliced text with the caret in UTF-16 units
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SpliceView {
    pub text: String,
    pub caret: usize,
}

impl From<Splice> for SpliceView {
    fn from(splice: Splice) -> Self {
        let caret = byte_to_utf16(&splice.text, splice.caret);
        Self {
            text: splice.text,
            caret,
        }
    }
}

// ============================================================================
// MentionEngine (stateless helpers)
// ============================================================================

#[wasm_bindgen]
#[derive(Default)]
pub struct MentionEngine;

#[wasm_bindgen]
impl MentionEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self
    }

    /// Active trigger at `caret` (UTF-16) or null
    /// Returns { start, end, kind, typePrefix, rawTypeToken, query } with UTF-16 offsets
    #[wasm_bindgen(js_name = detectTrigger)]
    pub fn detect_trigger(&self, text: &str, caret: usize) -> Result<JsValue, JsValue> {
        match detect_trigger(text, utf16_to_byte(text, caret)) {
            Some(trigger) => to_js(&TriggerView::new(text, &trigger)),
            None => Ok(JsValue::NULL),
        }
    }

    /// Mentions in `text`, in order of appearance
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&extract_mentions(text))
    }

    /// Text/mention segments for display
    #[wasm_bindgen]
    pub fn render(&self, text: &str, mentions: JsValue) -> Result<JsValue, JsValue> {
        let mentions: Vec<Mention> = if mentions.is_undefined() || mentions.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(mentions).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        to_js(&render_segments(text, &mentions))
    }
}

// ============================================================================
// JsReferenceSearch
// ============================================================================

/// Reference search backed by a JS callback `(query, type) => Promise<candidate[]>`
pub struct JsReferenceSearch {
    callback: js_sys::Function,
}

impl JsReferenceSearch {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

#[async_trait(?Send)]
impl ReferenceSearch for JsReferenceSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<MentionCandidate>, SearchError> {
        let kind = query.kind.map(|k| JsValue::from_str(k.as_str())).unwrap_or(JsValue::UNDEFINED);
        let returned = self
            .callback
            .call2(&JsValue::NULL, &JsValue::from_str(&query.query), &kind)
            .map_err(|e| SearchError::Collaborator(js_message(&e)))?;
        let value = JsFuture::from(js_sys::Promise::resolve(&returned))
            .await
            .map_err(|e| SearchError::Collaborator(js_message(&e)))?;

        let raw: Vec<RawCandidate> = serde_wasm_bindgen::from_value(value)
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let mut candidates = Vec::with_capacity(raw.len());
        for item in raw {
            match MentionCandidate::try_from(item) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => tracing::warn!(error = %e, "dropping search result"),
            }
        }
        Ok(candidates)
    }
}

// ============================================================================
// ComposeBox
// ============================================================================

/// One compose/edit field: trigger tracking, search sequencing, splicing
#[wasm_bindgen]
pub struct ComposeBox {
    session: Rc<RefCell<ComposeSession>>,
    source: Rc<JsReferenceSearch>,
}

#[wasm_bindgen]
impl ComposeBox {
    /// `config` is a partial MentionConfig ({ debounceMs, minQueryLen, ... }) or undefined
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, search: js_sys::Function) -> Result<ComposeBox, JsValue> {
        let config: MentionConfig = if config.is_undefined() || config.is_null() {
            MentionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(ComposeBox {
            session: Rc::new(RefCell::new(ComposeSession::new(config))),
            source: Rc::new(JsReferenceSearch::new(search)),
        })
    }

    /// Text or caret changed; returns the phase ("idle" | "searching" | "choosing")
    #[wasm_bindgen]
    pub fn edit(&self, text: String, caret: usize) -> String {
        let caret = utf16_to_byte(&text, caret);
        let phase = self.session.borrow_mut().edit(text, caret, Instant::now());
        phase.as_str().to_string()
    }

    #[wasm_bindgen(js_name = moveCaret)]
    pub fn move_caret(&self, caret: usize) -> String {
        let mut session = self.session.borrow_mut();
        let caret = utf16_to_byte(session.text(), caret);
        session.move_caret(caret, Instant::now()).as_str().to_string()
    }

    #[wasm_bindgen]
    pub fn cancel(&self) {
        self.session.borrow_mut().cancel();
    }

    /// Run the search whose debounce window has elapsed, if any
    /// Resolves to the phase after the answer is applied
    #[wasm_bindgen]
    pub fn flush(&self) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        let source = Rc::clone(&self.source);

        future_to_promise(async move {
            let request = session.borrow_mut().take_due_search(Instant::now());
            if let Some(request) = request {
                let response = fetch(source.as_ref(), request).await;
                session.borrow_mut().deliver(response);
            }
            let phase = session.borrow().phase();
            Ok(JsValue::from_str(phase.as_str()))
        })
    }

    #[wasm_bindgen]
    pub fn candidates(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().candidates())
    }

    #[wasm_bindgen]
    pub fn phase(&self) -> String {
        self.session.borrow().phase().as_str().to_string()
    }

    #[wasm_bindgen(js_name = searchFailed)]
    pub fn search_failed(&self) -> bool {
        self.session.borrow().search_failed()
    }

    /// Highlighted candidate index or undefined
    #[wasm_bindgen]
    pub fn highlighted(&self) -> Option<usize> {
        self.session.borrow().highlighted()
    }

    #[wasm_bindgen(js_name = selectNext)]
    pub fn select_next(&self) -> Option<usize> {
        self.session.borrow_mut().select_next()
    }

    #[wasm_bindgen(js_name = selectPrevious)]
    pub fn select_previous(&self) -> Option<usize> {
        self.session.borrow_mut().select_previous()
    }

    /// Insert candidate `index`; returns { text, caret } with a UTF-16 caret
    #[wasm_bindgen]
    pub fn select(&self, index: usize) -> Result<JsValue, JsValue> {
        let splice = self
            .session
            .borrow_mut()
            .select(index)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&SpliceView::from(splice))
    }

    #[wasm_bindgen(js_name = commitHighlighted)]
    pub fn commit_highlighted(&self) -> Result<JsValue, JsValue> {
        let splice = self
            .session
            .borrow_mut()
            .commit_highlighted()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&SpliceView::from(splice))
    }

    /// { content, mentions } for persistence
    #[wasm_bindgen]
    pub fn submit(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().submit())
    }

    #[wasm_bindgen]
    pub fn clear(&self) {
        self.session.borrow_mut().clear();
    }

    #[wasm_bindgen(js_name = debounceMs)]
    pub fn debounce_ms(&self) -> u32 {
        self.session.borrow().config().debounce_ms as u32
    }

    /// { issued, stale, failed, local }
    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().stats())
    }
}

// ============================================================================
// CommentBoard (offline comment persistence)
// ============================================================================

/// `{ ok: true, value }` or `{ ok: false, error }`
#[derive(Serialize)]
#[serde(untagged)]
pub enum PersistOutcome<T: Serialize> {
    Saved { ok: bool, value: T },
    Rejected { ok: bool, error: String },
}

impl<T: Serialize> From<Result<T, CommentError>> for PersistOutcome<T> {
    fn from(result: Result<T, CommentError>) -> Self {
        match result {
            Ok(value) => PersistOutcome::Saved { ok: true, value },
            Err(e) => PersistOutcome::Rejected {
                ok: false,
                error: e.to_string(),
            },
        }
    }
}

/// Event comments kept in memory, for demos and offline hosts
#[wasm_bindgen]
pub struct CommentBoard {
    service: Rc<CommentService<InMemoryCommentStore>>,
}

impl Default for CommentBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl CommentBoard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            service: Rc::new(CommentService::new(InMemoryCommentStore::new())),
        }
    }

    /// Resolves to the event's comments in creation order
    #[wasm_bindgen]
    pub fn list(&self, event_id: i32) -> js_sys::Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            let outcome: PersistOutcome<_> = service.list(event_id as i64).await.into();
            to_js(&outcome)
        })
    }

    /// `actor` is { id, role: "admin" | "member" }
    #[wasm_bindgen]
    pub fn create(&self, event_id: i32, actor: JsValue, content: String) -> js_sys::Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            let actor: Actor = serde_wasm_bindgen::from_value(actor)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let outcome: PersistOutcome<_> =
                service.create(event_id as i64, &actor, &content).await.into();
            to_js(&outcome)
        })
    }

    #[wasm_bindgen]
    pub fn update(&self, comment_id: i32, actor: JsValue, content: String) -> js_sys::Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            let actor: Actor = serde_wasm_bindgen::from_value(actor)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let outcome: PersistOutcome<_> =
                service.update(comment_id as i64, &actor, &content).await.into();
            to_js(&outcome)
        })
    }

    #[wasm_bindgen]
    pub fn delete(&self, comment_id: i32, actor: JsValue) -> js_sys::Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            let actor: Actor = serde_wasm_bindgen::from_value(actor)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            let outcome: PersistOutcome<_> = service.delete(comment_id as i64, &actor).await.into();
            to_js(&outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::Comment;

    #[test]
    fn test_persist_outcome_shape() {
        let ok: PersistOutcome<u32> = Ok(7).into();
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v, serde_json::json!({ "ok": true, "value": 7 }));

        let err: PersistOutcome<Comment> = Err(CommentError::EmptyContent).into();
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["ok"], false);
        assert!(!v["error"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_trigger_view_fields_and_utf16_offsets() {
        let text = "Olá @atividade:Re";
        let trigger = detect_trigger(text, text.len()).unwrap();
        let view = TriggerView::new(text, &trigger);

        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "start": 4,
                "end": 17,
                "kind": "activity",
                "typePrefix": "atividade",
                "rawTypeToken": "atividade",
                "query": "Re",
            })
        );
    }

    #[test]
    fn test_splice_view_caret_in_utf16() {
        let view = SpliceView::from(Splice {
            text: "veja @evento:Sessão #12".to_string(),
            caret: 24,
        });
        assert_eq!(view.caret, 23);
        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(v["text"], "veja @evento:Sessão #12");
        assert_eq!(v["caret"], 23);
    }

    #[test]
    fn test_unit_outcome_has_null_value() {
        let ok: PersistOutcome<()> = Ok(()).into();
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["ok"], true);
        assert!(v["value"].is_null());
    }
}

//! MentionCore: Comment Mention Engine
//!
//! A Rust/WASM implementation of the event-comment mention pipeline.
//!
//! # Architecture
//!
//! ## Mention Components
//! - `trigger.rs` - Trigger detection left of the caret (`@evento:quer|`)
//! - `search.rs` - Reference search sequencing: debounce + stale-response rejection
//! - `index.rs` - In-memory reference index (offline hosts, tests)
//! - `composer.rs` - Splices the canonical token into the text
//! - `extract.rs` - Re-derives `{type, title}` mentions from final text
//! - `render.rs` - Structured text/mention segments for display
//! - `session.rs` - Per-field compose state machine (Idle → Searching → Choosing)
//!
//! ## Comment Components
//! - `comments` - Persistence contract and `CommentService` (extract-before-persist)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { ComposeBox, MentionEngine } from 'mentioncore';
//!
//! await init();
//!
//! const box = new ComposeBox({ debounceMs: 200 }, (query, type) =>
//!   fetch(`/api/search/mentions?query=${query}&type=${type}`).then(r => r.json()));
//!
//! box.edit("veja @evento:Sess", 17);   // -> "searching"
//! setTimeout(() => box.flush().then(() => console.log(box.candidates())), box.debounceMs());
//! const { text, caret } = box.select(0);
//! const draft = box.submit();          // { content, mentions }
//!
//! const segments = new MentionEngine().render(draft.content, draft.mentions);
//! ```

pub mod comments;
pub mod error;
pub mod mention;
pub mod text;
pub mod wasm;

// Public exports - Mention engine
pub use mention::*;

// Public exports - Comments
pub use comments::*;

pub use error::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("mentioncore v{}", env!("CARGO_PKG_VERSION"))
}

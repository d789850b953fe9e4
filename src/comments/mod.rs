//! Comment persistence collaborator contracts
//!
//! - `model`: draft, stored comment, actor permissions
//! - `store`: the `CommentStore` trait and the validating `CommentService`
//! - `memory`: in-process store for tests and demos

pub mod memory;
pub mod model;
pub mod store;

pub use memory::InMemoryCommentStore;
pub use model::*;
pub use store::*;

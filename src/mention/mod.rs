pub mod types;
pub mod config;
pub mod trigger;
pub mod search;
pub mod index;
pub mod composer;
pub mod extract;
pub mod render;
pub mod session;

pub use types::*;
pub use config::*;
pub use trigger::*;
pub use search::*;
pub use index::*;
pub use composer::*;
pub use extract::*;
pub use render::*;
pub use session::*;

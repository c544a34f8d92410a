//! Shared mutable state owned by the orchestrator: the status store and the
//! result cache. Both are constructed at startup and injected, never reached
//! through globals.

pub mod cache;
pub mod status;

pub use cache::{CachedSite, ResultCache};
pub use status::StatusStore;

//! Context-aware caching of assistant answers.

pub mod context;
pub mod key;
pub mod response_cache;

pub use context::{ContextSnapshot, ScreenPayload, NO_CONTEXT_FINGERPRINT};
pub use key::derive_key;
pub use response_cache::{ContextAwareResponseCache, DEFAULT_CAPACITY};

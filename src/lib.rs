//! DealPilot assistant layer.
//!
//! The embedded assistant answers natural-language questions about whatever
//! screen or entity the user currently has in front of them. Model calls are
//! slow and billed per token, so answers are cached per user and per screen
//! context (see [`cache::ContextAwareResponseCache`]). The persistent medium
//! behind the cache is an injected [`storage::KeyValueStore`], so the host
//! application decides where cached answers actually live.

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;

pub use cache::{ContextAwareResponseCache, ContextSnapshot, ScreenPayload};
pub use error::{PilotError, Result};
pub use storage::KeyValueStore;

//! Cache key derivation.
//!
//! A key is the SHA-256 digest of `(fingerprint, trimmed question)` with
//! length-prefixed encoding, so no combination of fingerprint and question
//! text can collide with another by sliding bytes across the boundary.
//! The digest is stable across processes, which lets persisted entries be
//! rehydrated after a restart.

use sha2::{Digest, Sha256};

use super::context::{ContextSnapshot, NO_CONTEXT_FINGERPRINT};

/// Derive the cache key for a question asked under an optional context.
///
/// The question is trimmed; matching is otherwise exact-case and
/// exact-whitespace. Pure and infallible.
pub fn derive_key(question: &str, context: Option<&ContextSnapshot>) -> String {
    let fingerprint = match context {
        Some(ctx) => ctx.fingerprint(),
        None => NO_CONTEXT_FINGERPRINT.to_string(),
    };
    let question = question.trim();

    let mut hasher = Sha256::new();
    hasher.update((fingerprint.len() as u64).to_le_bytes());
    hasher.update(fingerprint.as_bytes());
    hasher.update((question.len() as u64).to_le_bytes());
    hasher.update(question.as_bytes());
    format!("{:x}", hasher.finalize())
}

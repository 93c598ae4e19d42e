//! Assistant configuration.

use serde::{Deserialize, Serialize};

/// Response cache settings.
///
/// Lives under the `[assistant.cache]` table of the host application's
/// config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether cached answers are served at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Maximum number of cached answers before LRU eviction kicks in.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_capacity() -> usize {
    50
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capacity: default_capacity(),
        }
    }
}

//! Screen-context snapshots and their cache fingerprints.
//!
//! A [`ContextSnapshot`] describes who is asking, from which screen, and
//! about which entities. Only part of it decides whether a cached answer is
//! still valid: the user, the screen, the selected entity ids, the payload
//! kind, and the payload's status field. Volatile descriptive fields (a
//! summary string, a last-updated timestamp) change constantly without
//! changing what the right answer is, so they stay out of the fingerprint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fingerprint used when a question arrives with no context snapshot at all.
/// All such questions share one cache bucket.
pub const NO_CONTEXT_FINGERPRINT: &str = "no-context";

/// Snapshot of the application state surrounding a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnapshot {
    /// Asking user; empty string means anonymous/unauthenticated.
    #[serde(default)]
    pub user_id: String,
    /// Screen the question was asked from (e.g. `"deal_cockpit"`).
    pub screen_name: String,
    /// Router path of that screen. Informational only; two routes rendering
    /// the same screen over the same entities share cached answers.
    #[serde(default)]
    pub route: String,
    /// Entity kind -> entity id currently in focus. BTreeMap so fingerprint
    /// iteration order is deterministic.
    #[serde(default)]
    pub selection: BTreeMap<String, String>,
    /// Screen-specific payload.
    pub payload: ScreenPayload,
}

/// Screen-specific context payload.
///
/// Each variant declares exactly one (or zero) mutable status field that
/// participates in the cache fingerprint; everything else in the variant is
/// descriptive and ignored for caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenPayload {
    /// Deal cockpit screen. `stage` is the status field: a cached answer
    /// about a deal in "due_diligence" is wrong once the deal moves to
    /// "closing".
    DealCockpit {
        stage: String,
        #[serde(default)]
        summary: Option<String>,
        #[serde(default)]
        updated_at: Option<String>,
    },
    /// Property detail screen. `listing_status` is the status field.
    PropertyDetail {
        listing_status: String,
        #[serde(default)]
        address: Option<String>,
        #[serde(default)]
        headline: Option<String>,
    },
    /// Screens with no entity-specific state worth tracking.
    Generic {
        #[serde(default)]
        description: Option<String>,
    },
}

impl ScreenPayload {
    /// Stable tag identifying the payload kind, matching the serde tag.
    pub fn type_tag(&self) -> &'static str {
        match self {
            ScreenPayload::DealCockpit { .. } => "deal_cockpit",
            ScreenPayload::PropertyDetail { .. } => "property_detail",
            ScreenPayload::Generic { .. } => "generic",
        }
    }

    /// The variant's mutable status field, if it defines one.
    pub fn status_field(&self) -> Option<&str> {
        match self {
            ScreenPayload::DealCockpit { stage, .. } => Some(stage),
            ScreenPayload::PropertyDetail { listing_status, .. } => Some(listing_status),
            ScreenPayload::Generic { .. } => None,
        }
    }
}

impl ContextSnapshot {
    /// Deterministic fingerprint of the answer-relevant parts of this
    /// snapshot. Two snapshots with equal fingerprints are interchangeable
    /// for caching purposes.
    pub fn fingerprint(&self) -> String {
        let mut parts = vec![
            format!("user={}", self.user_id),
            format!("screen={}", self.screen_name),
        ];
        for (kind, id) in &self.selection {
            parts.push(format!("sel.{}={}", kind, id));
        }
        parts.push(format!("payload={}", self.payload.type_tag()));
        if let Some(status) = self.payload.status_field() {
            parts.push(format!("status={}", status));
        }
        parts.join("\n")
    }
}

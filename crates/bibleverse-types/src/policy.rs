//! What a verse request does when the model cannot produce a verse

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavior on upstream or extraction failure
///
/// Applied uniformly to every provider. A missing API key and invalid input
/// are never covered by the policy; they always surface as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Answer 200 with the situation's fallback verse
    #[default]
    Fallback,
    /// Surface the failure as an HTTP error
    Error,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Some(Self::Fallback),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

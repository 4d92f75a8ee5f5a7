//! Request and response bodies

use bibleverse_types::Situation;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ApiError, ApiResult};

/// Longest situation text accepted, in characters
pub const MAX_SITUATION_CHARS: u64 = 500;

/// Verse request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct GetVerseRequest {
    /// Preset label, preset id, or free text describing the situation
    #[serde(default)]
    #[validate(length(max = MAX_SITUATION_CHARS, message = "Situation must be at most 500 characters"))]
    #[schema(example = "감사할 때")]
    pub situation: Option<String>,
}

impl GetVerseRequest {
    /// The trimmed situation, rejecting missing or blank input
    pub fn situation(&self) -> ApiResult<&str> {
        match self.situation.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ApiError::SituationRequired),
        }
    }
}

/// Preset situations response
#[derive(Debug, Serialize, ToSchema)]
pub struct SituationsResponse {
    pub situations: Vec<Situation>,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Configured provider
    pub provider: String,
    /// Whether the provider's API key is present
    pub provider_configured: bool,
    /// Timestamp (RFC 3339)
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_situation_trimmed() {
        let req = GetVerseRequest { situation: Some("  감사할 때 \n".to_string()) };
        assert_eq!(req.situation().unwrap(), "감사할 때");
    }

    #[test]
    fn test_situation_required() {
        for situation in [None, Some(String::new()), Some("   ".to_string())] {
            let req = GetVerseRequest { situation };
            assert!(matches!(req.situation(), Err(ApiError::SituationRequired)));
        }
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let req = GetVerseRequest { situation: Some("가".repeat(MAX_SITUATION_CHARS as usize)) };
        assert!(req.validate().is_ok());

        let req = GetVerseRequest { situation: Some("가".repeat(MAX_SITUATION_CHARS as usize + 1)) };
        assert!(req.validate().is_err());
    }
}

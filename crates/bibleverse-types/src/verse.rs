//! Verse recommendation returned to the UI

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A scripture recommendation with commentary and a prayer
///
/// `reference` and `text` are always present and non-empty once a value has
/// passed [`VerseResult::missing_field`]. The commentary fields are optional
/// and omitted from the JSON body when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerseResult {
    /// Book, chapter and verse (e.g. "시편 23:1")
    pub reference: String,
    /// Verse text
    pub text: String,
    /// Surrounding biblical context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// How the verse applies to the situation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    /// A prayer based on the verse
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prayer: Option<String>,
}

impl VerseResult {
    pub fn new(reference: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            text: text.into(),
            context: None,
            meaning: None,
            prayer: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    pub fn with_prayer(mut self, prayer: impl Into<String>) -> Self {
        self.prayer = Some(prayer.into());
        self
    }

    /// Name of the first required field that is blank, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.reference.trim().is_empty() {
            Some("reference")
        } else if self.text.trim().is_empty() {
            Some("text")
        } else {
            None
        }
    }
}

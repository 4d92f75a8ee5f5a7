//! Preset situations shown as buttons in the UI

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Stable identifier for a preset situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SituationId {
    Comfort,
    Anxiety,
    Gratitude,
    Decision,
    Strength,
    Forgiveness,
    Hope,
    Love,
}

impl SituationId {
    /// All preset ids in display order
    pub const ALL: [SituationId; 8] = [
        Self::Comfort,
        Self::Anxiety,
        Self::Gratitude,
        Self::Decision,
        Self::Strength,
        Self::Forgiveness,
        Self::Hope,
        Self::Love,
    ];

    /// Situation used when nothing else matches
    pub const DEFAULT: SituationId = Self::Comfort;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comfort => "comfort",
            Self::Anxiety => "anxiety",
            Self::Gratitude => "gratitude",
            Self::Decision => "decision",
            Self::Strength => "strength",
            Self::Forgiveness => "forgiveness",
            Self::Hope => "hope",
            Self::Love => "love",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

impl fmt::Display for SituationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A preset situation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Situation {
    pub id: SituationId,
    /// Localized label, also sent as the `situation` text
    pub label: String,
    pub icon: String,
    /// Tailwind gradient classes for the card
    pub gradient: String,
}

impl Situation {
    fn preset(id: SituationId, label: &str, icon: &str, gradient: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            icon: icon.to_string(),
            gradient: gradient.to_string(),
        }
    }
}

/// The ordered list of preset situations
#[derive(Debug, Clone)]
pub struct SituationCatalog {
    situations: Vec<Situation>,
}

impl SituationCatalog {
    pub fn builtin() -> Self {
        use SituationId::*;

        Self {
            situations: vec![
                Situation::preset(Comfort, "위로가 필요할 때", "💙", "from-blue-50 to-indigo-50"),
                Situation::preset(Anxiety, "불안하고 두려울 때", "🕊️", "from-purple-50 to-pink-50"),
                Situation::preset(Gratitude, "감사할 때", "🙏", "from-amber-50 to-orange-50"),
                Situation::preset(Decision, "결정이 필요할 때", "🛤️", "from-teal-50 to-cyan-50"),
                Situation::preset(Strength, "힘이 필요할 때", "💪", "from-green-50 to-emerald-50"),
                Situation::preset(Forgiveness, "용서하고 싶을 때", "🤍", "from-slate-50 to-gray-50"),
                Situation::preset(Hope, "희망이 필요할 때", "🌟", "from-yellow-50 to-amber-50"),
                Situation::preset(Love, "사랑에 대해 알고 싶을 때", "❤️", "from-rose-50 to-red-50"),
            ],
        }
    }

    pub fn all(&self) -> &[Situation] {
        &self.situations
    }

    pub fn get(&self, id: SituationId) -> Option<&Situation> {
        self.situations.iter().find(|s| s.id == id)
    }

    /// Resolve free text to a preset by exact id or exact label
    ///
    /// Surrounding whitespace is ignored. Anything else, including partial
    /// matches, is a custom situation and resolves to `None`.
    pub fn resolve(&self, text: &str) -> Option<SituationId> {
        let text = text.trim();
        if let Some(id) = SituationId::from_str(text) {
            return Some(id);
        }
        self.situations
            .iter()
            .find(|s| s.label == text)
            .map(|s| s.id)
    }
}

impl Default for SituationCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

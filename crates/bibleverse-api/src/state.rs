//! Application state shared across handlers
//!
//! Everything here is immutable after startup; handlers only read it.

use std::sync::Arc;

use bibleverse_llm::LLMRouter;
use bibleverse_types::{FailurePolicy, FallbackTable, SituationCatalog};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configured verse provider
    pub llm: LLMRouter,
    /// Preset situations
    pub catalog: Arc<SituationCatalog>,
    /// Verses served when generation fails under [`FailurePolicy::Fallback`]
    pub fallback: Arc<FallbackTable>,
    /// What to do when generation fails
    pub policy: FailurePolicy,
}

impl AppState {
    /// Create a new application state
    pub fn new(llm: LLMRouter, fallback: FallbackTable, policy: FailurePolicy) -> Self {
        Self {
            llm,
            catalog: Arc::new(SituationCatalog::builtin()),
            fallback: Arc::new(fallback),
            policy,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("llm", &self.llm)
            .field("situations", &self.catalog.all().len())
            .field("fallback_entries", &self.fallback.len())
            .field("policy", &self.policy)
            .finish()
    }
}

//! Bible Verse LLM - provider abstraction for verse generation
//!
//! Exactly one provider is active per deployment; they are alternates, not
//! a pipeline:
//!
//! - Hugging Face Inference API (default)
//! - Google Gemini `generateContent`
//! - Anthropic `messages`
//!
//! Every provider follows the same three steps: build a prompt for the
//! situation, make one HTTP call, and pull the generated text out of the
//! provider-specific response. The text is then handed to [`extract_verse`],
//! which turns free-form model output into a [`VerseResult`].
//!
//! There are no retries. A failed call is reported once to the caller.
//!
//! [`VerseResult`]: bibleverse_types::VerseResult

pub mod extract;
pub mod prompt;
pub mod providers;
pub mod router;
pub mod types;

pub use extract::*;
pub use prompt::*;
pub use providers::*;
pub use router::*;
pub use types::*;

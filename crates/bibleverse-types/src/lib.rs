//! Bible Verse Types - domain types shared by the provider and API layers
//!
//! This crate has no dependencies on other bibleverse crates. It defines:
//!
//! - [`VerseResult`], the structured recommendation returned to the UI
//! - [`SituationId`] and the preset [`SituationCatalog`]
//! - [`FallbackTable`], the immutable situation → verse resource used when
//!   the upstream model cannot produce a verse
//! - [`FailurePolicy`], which decides between that fallback and an error
//!
//! Situations are keyed by a stable [`SituationId`], never by their
//! localized label. Labels are only an input alias resolved through the
//! catalog.

pub mod error;
pub mod fallback;
pub mod policy;
pub mod situation;
pub mod verse;

pub use error::*;
pub use fallback::*;
pub use policy::*;
pub use situation::*;
pub use verse::*;

//! Health summary maintenance.
//!
//! Keeps one natural-language summary per profile and merges new
//! evidence (documents, chat sessions, transcriptions) into it through
//! a `TextGenerator`. Every failure is logged and absorbed: callers get
//! a `SummaryOutcome`, never an error.

pub mod prompt;
pub mod reconciler;
pub mod similarity;
pub mod store;
pub mod types;

pub use prompt::*;
pub use reconciler::*;
pub use similarity::*;
pub use store::*;
pub use types::*;

//! API endpoint handlers.
//!
//! Reconciler and speech calls block on HTTP, so handlers run them on
//! `spawn_blocking`.

pub mod health;
pub mod summaries;
pub mod transcribe;

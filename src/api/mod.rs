//! HTTP surface for summary maintenance and voice-note transcription.
//!
//! `api_router()` returns a composable `Router`. Everything except
//! `/health` sits behind the `X-API-Key` check.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::ApiServer;
pub use types::ApiContext;

//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Access logger — method, path, status, latency (all routes)
//! 2. Auth validator — `X-API-Key` check (all routes except `/health`)

pub mod access_log;
pub mod auth;

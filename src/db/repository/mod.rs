//! Repository layer — entity-scoped database operations.

mod health_summary;

pub use health_summary::*;

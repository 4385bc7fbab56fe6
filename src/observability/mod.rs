//! Observability subsystem.
//!
//! Structured logging through `tracing`; HTTP access spans come from
//! `tower_http::trace::TraceLayer` in the server.

pub mod logging;

pub use logging::init_logging;

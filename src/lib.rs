//! Shared JSON request/response helpers for HTTP services.
//!
//! Handlers read bodies through one strict decoder (size ceiling, unknown
//! key policy, single value) and answer with one envelope shape.

pub mod broker;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::{JsonConfig, ServiceConfig};
pub use http::{DecodeError, EncodeError, HttpServer, JsonResponse, JsonTools, StrictJson};
pub use lifecycle::Shutdown;

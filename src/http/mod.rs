//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → request.rs (content type check, bounded read, decode, classify)
//!     → handler (broker or any caller-defined route)
//!     → response.rs (serialize, copy headers, set status)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;
pub mod tools;

pub use error::{DecodeError, EncodeError};
pub use request::{decode_json, StrictJson, APPLICATION_JSON};
pub use response::{error_response, json_response, JsonResponse};
pub use server::{AppState, HttpServer};
pub use tools::JsonTools;

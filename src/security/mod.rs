//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming body:
//!     → limits.rs (cap the number of bytes read)
//!     → Pass to the JSON decoder
//! ```
//!
//! # Design Decisions
//! - Fail closed: a body past its ceiling is rejected, never truncated
//! - No trust in client input

pub mod limits;

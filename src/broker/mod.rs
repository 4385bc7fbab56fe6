//! Broker endpoint: the reference consumer of the JSON helpers.
//!
//! Clients post a `BrokerRequestPayload` naming an action; the handler
//! decodes it through `StrictJson` and answers with a `JsonResponse`.

pub mod handlers;
pub mod types;

pub use types::{AuthPayload, BrokerError, BrokerRequestPayload};

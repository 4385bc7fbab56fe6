//! Broker payloads and errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A request submitted to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerRequestPayload {
    pub action: String,
    #[serde(default)]
    pub auth: AuthPayload,
}

/// Credentials carried by an `auth` action.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPayload")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Data returned for an accepted action. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accepted {
    pub action: String,
    pub email: String,
}

/// Why the broker refused a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("unknown action \"{0}\"")]
    UnknownAction(String),

    #[error("auth action requires an email")]
    MissingEmail,
}

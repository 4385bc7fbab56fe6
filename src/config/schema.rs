//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the JSON service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::security::limits::DEFAULT_MAX_JSON_SIZE;

/// Root configuration for the service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request body limits and strictness shared by every handler.
    pub json: JsonConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Limits applied when reading request bodies.
///
/// Created once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct JsonConfig {
    /// Maximum JSON body size in bytes (0 = 1 MiB).
    pub max_json_size: usize,

    /// Maximum XML body size in bytes.
    pub max_xml_size: usize,

    /// Maximum size of uploaded files in bytes.
    pub max_file_size: usize,

    /// Allowed upload media types (e.g. "image/jpeg").
    pub allowed_file_types: Vec<String>,

    /// Accept keys the destination type does not declare.
    pub allow_unknown_fields: bool,
}

impl JsonConfig {
    /// Effective JSON ceiling in bytes.
    pub fn json_limit(&self) -> usize {
        if self.max_json_size == 0 {
            DEFAULT_MAX_JSON_SIZE
        } else {
            self.max_json_size
        }
    }
}

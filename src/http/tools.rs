//! The handle request handlers share for JSON in and JSON out.

use std::sync::Arc;

use crate::config::JsonConfig;

/// Shared, read-only JSON settings.
///
/// Cloning is cheap; every clone points at the same [`JsonConfig`]. Reading
/// lives in [`request`](super::request), writing in [`response`](super::response).
#[derive(Debug, Clone, Default)]
pub struct JsonTools {
    config: Arc<JsonConfig>,
}

impl JsonTools {
    pub fn new(config: JsonConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &JsonConfig {
        &self.config
    }
}

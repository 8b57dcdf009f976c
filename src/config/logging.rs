use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// LoggingConfig controls how we initialize tracing/logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct LoggingConfig {
    pub level: String,  // e.g. "info", "debug", "warn"
    pub format: String, // e.g. "json", "console"
    pub service_name: Option<String>,
    pub service_version: Option<String>,
}

impl LoggingConfig {
    pub fn service_name(&self) -> String {
        self.service_name
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
    }

    pub fn service_version(&self) -> String {
        self.service_version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: "console".to_string(),
            service_name: None,
            service_version: None,
        }
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the session key-value pairs live. Differentiated by a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// Process-local; the session ends with the process.
    #[serde(rename = "memory")]
    #[default]
    Memory,
    /// A JSON document on disk, surviving restarts.
    #[serde(rename = "file")]
    File { path: PathBuf },
}

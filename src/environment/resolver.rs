//! Maps the host the client runs under to a deployment environment and the
//! API base address that goes with it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const LOCAL_API_BASE_URL: &str = "http://localhost:5000/api";
pub const PROD_API_BASE_URL: &str =
    "https://student-analytics-backend-470050740360.asia-east1.run.app/api";

/// Host names that select the development environment. Nothing else does.
const DEVELOPMENT_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of resolution. Computed once at startup and handed to the
/// HTTP client; never changes afterwards.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub environment: Environment,
    pub api_base_url: String,
}

impl EnvironmentConfig {
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Optional overrides for the two fixed base addresses.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Default)]
pub struct EnvironmentSettings {
    /// Host name the client is served from. Absent means no host context.
    pub hostname: Option<String>,
    pub development_base_url: Option<String>,
    pub production_base_url: Option<String>,
}

/// Resolve with the built-in base addresses.
pub fn resolve(hostname: Option<&str>) -> EnvironmentConfig {
    resolve_with(hostname, &EnvironmentSettings::default())
}

/// Resolve `hostname` against `settings`. Pure: no I/O, no lookups.
pub fn resolve_with(hostname: Option<&str>, settings: &EnvironmentSettings) -> EnvironmentConfig {
    let environment = match hostname {
        Some(host) if DEVELOPMENT_HOSTS.contains(&host) => Environment::Development,
        _ => Environment::Production,
    };

    let api_base_url = match environment {
        Environment::Development => settings
            .development_base_url
            .as_deref()
            .unwrap_or(LOCAL_API_BASE_URL),
        Environment::Production => settings
            .production_base_url
            .as_deref()
            .unwrap_or(PROD_API_BASE_URL),
    };

    EnvironmentConfig {
        environment,
        api_base_url: api_base_url.trim_end_matches('/').to_string(),
    }
}

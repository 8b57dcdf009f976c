use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::logging::LoggingConfig;
use super::store::StoreConfig;
use crate::client::HttpSettings;
use crate::environment::EnvironmentSettings;
use crate::error::{Error, Result};
use crate::navigation::RouteSettings;
use crate::session::SessionBackendConfig;

/// Prefix for environment overrides, e.g. `ANALYTICS_ENVIRONMENT__HOSTNAME`.
pub const ENV_PREFIX: &str = "ANALYTICS_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub environment: EnvironmentSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionBackendConfig,
    #[serde(default)]
    pub routes: RouteSettings,
}

fn extract(figment: Figment) -> Result<ConfigV1> {
    let config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract::<Config>()
        .map_err(|e| Error::Config(e.to_string()))?;
    // handle configuration migration between versions here when necessary
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from a YAML file, with `ANALYTICS_*` environment overrides.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConfigV1> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Config(format!(
            "configuration file '{}' not found",
            path.display()
        )));
    }
    extract(Figment::new().merge(Yaml::file(path)))
}

/// Load config from an in-memory YAML document.
pub fn load_config_from_str(yaml: &str) -> Result<ConfigV1> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

/// The JSON schema for the configuration, pretty printed.
pub fn config_schema() -> Result<String> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).map_err(|e| Error::Config(e.to_string()))
}

pub fn print_schema() -> Result<()> {
    println!("{}", config_schema()?);
    Ok(())
}

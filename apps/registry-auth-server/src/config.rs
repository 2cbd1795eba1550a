//! Server configuration: YAML file overlaid with `REGISTRY_AUTH__` environment variables.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use registry_auth::RegistryAuthConfig;
use serde::{Deserialize, Serialize};
use static_users_plugin::StaticUsersPluginConfig;

/// Prefix of environment overrides. Nested keys are separated by `__`,
/// eg. `REGISTRY_AUTH__AUTH__ISSUER`.
pub const ENV_PREFIX: &str = "REGISTRY_AUTH__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: RegistryAuthConfig,
    pub users: StaticUsersPluginConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Default `tracing` filter, used when `RUST_LOG` is not set.
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".to_owned(),
            log_level: "info".to_owned(),
            log_format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl AppConfig {
    /// Load defaults, then the YAML file at `path` (if any), then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value does not fit the schema.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            anyhow::ensure!(
                path.is_file(),
                "config file {} does not exist",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }
}

//! Configuration for the static users plugin.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticUsersPluginConfig {
    pub users: Vec<UserConfig>,
}

/// A single user entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Login name, also used as the subject id.
    pub username: String,

    /// bcrypt hash of the password (`$2a$`, `$2b$` or `$2y$`).
    pub password_hash: String,

    /// Disabled users can neither log in nor redeem refresh tokens.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Free-form subject attributes, eg. `name`.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

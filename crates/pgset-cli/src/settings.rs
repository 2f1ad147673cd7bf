//! Layered settings: defaults, then TOML file, then flags and environment

use anyhow::Context;
use pgset_core::{Mode, ReconcileConfig};
use pgset_sqlx::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables consulted for the connection URL, in order
pub const URL_ENV_VARS: [&str; 2] = ["PGSET_DATABASE_URL", "DATABASE_URL"];

/// Settings file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `[connection]` table
    pub connection: ConnectionConfig,
    /// `[reconcile]` table
    pub reconcile: ReconcileConfig,
}

/// Values given on the command line, each overriding the file when set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Connection URL
    pub url: Option<String>,
    /// Database name
    pub database: Option<String>,
    /// Role to switch to after connecting
    pub session_role: Option<String>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
    /// Predict without applying
    pub preview: bool,
}

impl AppConfig {
    /// Load from `path`, or defaults when no path is given
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not valid TOML for this shape
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Layer command line values on top
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(url) = &overrides.url {
            self.connection.url.clone_from(url);
        }
        if let Some(database) = &overrides.database {
            self.connection.database = Some(database.clone());
        }
        if let Some(role) = &overrides.session_role {
            self.connection.session_role = Some(role.clone());
        }
        if let Some(secs) = overrides.connect_timeout_secs {
            self.connection.connect_timeout_secs = secs;
        }
        if overrides.preview {
            self.reconcile.mode = Mode::Preview;
        }
        self
    }
}

/// First connection URL found in the environment
#[must_use]
pub fn url_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    URL_ENV_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|url| !url.is_empty()))
}

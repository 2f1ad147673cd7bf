//! Connection configuration

use serde::{Deserialize, Serialize};

/// Default connection URL
pub const DEFAULT_URL: &str = "postgres://postgres@localhost:5432/postgres";

/// How to reach the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Connection URL
    pub url: String,
    /// Database to connect to, overriding the URL path
    pub database: Option<String>,
    /// Role to `SET ROLE` to after connecting
    pub session_role: Option<String>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl ConnectionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With connection URL
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// With database override
    #[inline]
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// With session role
    #[inline]
    #[must_use]
    pub fn with_session_role(mut self, role: impl Into<String>) -> Self {
        self.session_role = Some(role.into());
        self
    }

    /// With connect timeout
    #[inline]
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: None,
            session_role: None,
            connect_timeout_secs: 10,
        }
    }
}

//! Reconciliation configuration

use serde::{Deserialize, Serialize};

/// Oldest server version (`server_version_num`) supporting `ALTER SYSTEM`
pub const MIN_SERVER_VERSION: u32 = 90_400;

/// Run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Predict the outcome without mutating the server
    Preview,
    /// Apply and verify
    #[default]
    Execute,
}

impl Mode {
    /// Check if this is a dry run
    #[inline]
    #[must_use]
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview)
    }
}

/// Reconciliation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Preview or execute
    pub mode: Mode,
    /// Servers below this version get a degraded no-op result
    pub min_server_version: u32,
    /// Warn when a change is pending a restart
    pub warn_on_restart: bool,
}

impl ReconcileConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With run mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// With minimum supported server version
    #[inline]
    #[must_use]
    pub fn with_min_server_version(mut self, version: u32) -> Self {
        self.min_server_version = version;
        self
    }

    /// With restart warning toggle
    #[inline]
    #[must_use]
    pub fn with_warn_on_restart(mut self, warn: bool) -> Self {
        self.warn_on_restart = warn;
        self
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Execute,
            min_server_version: MIN_SERVER_VERSION,
            warn_on_restart: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReconcileConfig::new();
        assert_eq!(config.mode, Mode::Execute);
        assert_eq!(config.min_server_version, 90_400);
        assert!(config.warn_on_restart);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ReconcileConfig = serde_json::from_str(r#"{"mode":"preview"}"#).unwrap();
        assert!(config.mode.is_preview());
        assert_eq!(config.min_server_version, MIN_SERVER_VERSION);
    }
}

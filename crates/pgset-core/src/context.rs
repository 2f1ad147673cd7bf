//! Context Classifier
//!
//! Maps a parameter's `pg_settings.context` to the strategy used to apply
//! and verify a change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mutability class of a server parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextClass {
    /// Fixed at build or initdb time
    Internal,
    /// Read at server start only
    Postmaster,
    /// Reloadable via SIGHUP
    Sighup,
    /// Fixed per backend at connection start
    Backend,
    /// Like `Backend`, superuser only
    SuperuserBackend,
    /// Session-settable by superusers
    Superuser,
    /// Session-settable by any user
    User,
}

impl ContextClass {
    /// Every context class, in catalog order
    pub const ALL: [ContextClass; 7] = [
        Self::Internal,
        Self::Postmaster,
        Self::Sighup,
        Self::Backend,
        Self::SuperuserBackend,
        Self::Superuser,
        Self::User,
    ];

    /// Name as reported by `pg_settings.context`
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Postmaster => "postmaster",
            Self::Sighup => "sighup",
            Self::Backend => "backend",
            Self::SuperuserBackend => "superuser-backend",
            Self::Superuser => "superuser",
            Self::User => "user",
        }
    }

    /// Strategy for this class
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> ApplyStrategy {
        classify(*self)
    }
}

impl fmt::Display for ContextClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized `pg_settings.context` value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized parameter context: '{0}'")]
pub struct UnknownContext(pub String);

impl FromStr for ContextClass {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| UnknownContext(s.to_string()))
    }
}

/// How a change to a parameter takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyStrategy {
    /// Any change request is fatal
    Immutable,
    /// Override is written but only a restart activates it; live values
    /// cannot be verified
    Restart,
    /// Override is written and a reload activates it; live values are
    /// re-read to verify
    Reload,
}

impl ApplyStrategy {
    /// Whether the parameter may be changed at all
    #[inline]
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        !matches!(self, Self::Immutable)
    }

    /// Whether a change needs a full server restart
    #[inline]
    #[must_use]
    pub fn requires_restart(&self) -> bool {
        matches!(self, Self::Restart)
    }

    /// Whether the apply step should also reload the configuration
    #[inline]
    #[must_use]
    pub fn issues_reload(&self) -> bool {
        matches!(self, Self::Reload)
    }

    /// Whether post-apply verification against the live server is meaningful
    #[inline]
    #[must_use]
    pub fn verifies(&self) -> bool {
        matches!(self, Self::Reload)
    }
}

/// Map a context class to its apply/verify strategy
#[must_use]
pub fn classify(context: ContextClass) -> ApplyStrategy {
    match context {
        ContextClass::Internal => ApplyStrategy::Immutable,
        ContextClass::Postmaster => ApplyStrategy::Restart,
        ContextClass::Sighup
        | ContextClass::Backend
        | ContextClass::SuperuserBackend
        | ContextClass::Superuser
        | ContextClass::User => ApplyStrategy::Reload,
    }
}

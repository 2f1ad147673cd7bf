//! Core types for pgset
//!
//! Defines the data flowing through one reconciliation run:
//! - Catalog rows as returned by the engine
//! - Normalized parameter state
//! - The requested change
//! - The result record handed back to the caller

use crate::context::ContextClass;
use crate::error::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword that removes an override instead of setting one
pub const DEFAULT_KEYWORD: &str = "default";

/// One row of `pg_settings`, as returned by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    /// Parameter name
    pub name: String,
    /// `setting` column, in the parameter's native unit
    pub setting: String,
    /// `unit` column
    pub unit: Option<String>,
    /// `context` column
    pub context: ContextClass,
    /// `boot_val` column, in the parameter's native unit
    pub boot_val: String,
}

/// Unit of a normalized raw value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// Dimensionless
    #[default]
    None,
    /// Kilobytes (catalog only, never leaves the normalizer)
    Kilobyte,
    /// Megabytes (catalog only, never leaves the normalizer)
    Megabyte,
    /// Bytes
    Bytes,
    /// Any other catalog unit (`8kB`, `ms`, `s`, ...), passed through
    Other(String),
}

impl Unit {
    /// Parse the `pg_settings.unit` column
    #[must_use]
    pub fn from_catalog(unit: Option<&str>) -> Self {
        match unit {
            None | Some("") => Self::None,
            Some("kB") => Self::Kilobyte,
            Some("MB") => Self::Megabyte,
            Some("B") => Self::Bytes,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Label used in result records
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::None => "",
            Self::Kilobyte => "kB",
            Self::Megabyte => "MB",
            Self::Bytes => "b",
            Self::Other(unit) => unit,
        }
    }

    /// Multiplier to bytes for scalable units
    #[inline]
    #[must_use]
    pub fn byte_factor(&self) -> Option<i64> {
        match self {
            Self::Kilobyte => Some(1024),
            Self::Megabyte => Some(1024 * 1024),
            _ => None,
        }
    }
}

/// A raw setting after unit normalization
///
/// Positive integral kB/MB settings become `Bytes`; everything else keeps
/// the catalog text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Size in bytes
    Bytes(i64),
    /// Catalog text, unmodified
    Raw(String),
}

impl SettingValue {
    /// Empty raw value
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::Raw(String::new())
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "{bytes}"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Normalized state of one parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Case-sensitive parameter name
    pub name: String,
    /// Display token from `SHOW`, boolean-normalized
    pub current_value: String,
    /// `setting`, scaled to bytes where applicable
    pub raw_value: SettingValue,
    /// Unit of `raw_value`
    pub unit: Unit,
    /// Mutability class
    pub context: ContextClass,
    /// `boot_val`, scaled like `raw_value`
    pub boot_value: SettingValue,
    /// `boot_val` as the catalog reported it, in the native unit
    pub boot_literal: String,
}

/// Value submitted with an override command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideValue {
    /// A literal value
    Literal(String),
    /// Remove the override and fall back to the configuration file
    Default,
}

impl OverrideValue {
    /// Build from a desired literal; `default` in any case maps to [`OverrideValue::Default`]
    #[must_use]
    pub fn from_literal(literal: &str) -> Self {
        if literal.eq_ignore_ascii_case(DEFAULT_KEYWORD) {
            Self::Default
        } else {
            Self::Literal(literal.to_string())
        }
    }
}

impl fmt::Display for OverrideValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.write_str(value),
            Self::Default => f.write_str("DEFAULT"),
        }
    }
}

/// The requested change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredChange {
    /// Set to a value (possibly `default`)
    Value(String),
    /// Restore the boot value
    Reset,
}

impl DesiredChange {
    /// Validate a value/reset pair
    ///
    /// # Errors
    /// - `MutuallyExclusiveInput` if both are present
    /// - `MissingInput` if neither is
    pub fn from_parts(
        name: &str,
        value: Option<String>,
        reset: bool,
    ) -> Result<Self, ReconcileError> {
        match (value, reset) {
            (Some(_), true) => Err(ReconcileError::MutuallyExclusiveInput {
                name: name.to_string(),
            }),
            (None, false) => Err(ReconcileError::MissingInput {
                name: name.to_string(),
            }),
            (Some(value), false) => Ok(Self::Value(value)),
            (None, true) => Ok(Self::Reset),
        }
    }

    /// Check if this is a reset request
    #[inline]
    #[must_use]
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

/// Unvalidated request as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Parameter name
    pub name: String,
    /// Desired value
    #[serde(default)]
    pub value: Option<String>,
    /// Restore boot value
    #[serde(default)]
    pub reset: bool,
}

impl ChangeRequest {
    /// Request to set `name` to `value`
    #[inline]
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            reset: false,
        }
    }

    /// Request to reset `name` to its boot value
    #[inline]
    pub fn reset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            reset: true,
        }
    }

    /// Validate into a [`DesiredChange`]
    ///
    /// # Errors
    /// See [`DesiredChange::from_parts`]
    pub fn desired(&self) -> Result<DesiredChange, ReconcileError> {
        DesiredChange::from_parts(&self.name, self.value.clone(), self.reset)
    }
}

/// Canonical value reported in a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedValue {
    /// Raw value, bytes where scaled
    pub value: SettingValue,
    /// Unit label
    pub unit: String,
}

impl ReportedValue {
    /// Report a raw value with its unit
    #[must_use]
    pub fn new(value: &SettingValue, unit: &Unit) -> Self {
        Self {
            value: value.clone(),
            unit: unit.label().to_string(),
        }
    }

    /// Empty value, used when no state could be observed
    #[must_use]
    pub fn empty() -> Self {
        Self {
            value: SettingValue::empty(),
            unit: String::new(),
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Parameter name
    pub name: String,
    /// Whether the setting changed
    pub changed: bool,
    /// Whether a server restart is still required
    pub restart_required: bool,
    /// Display value before the run
    #[serde(rename = "prev_val_pretty")]
    pub prev_value_pretty: String,
    /// Display value after the run (predicted in preview mode)
    pub value_pretty: String,
    /// Last successfully observed raw value
    pub value: ReportedValue,
    /// Mutability class, absent when the server was never inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextClass>,
    /// Non-fatal warnings raised during the run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ResultRecord {
    /// Degraded record for servers older than the supported minimum
    #[must_use]
    pub fn unsupported_version(name: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            changed: false,
            restart_required: false,
            prev_value_pretty: String::new(),
            value_pretty: String::new(),
            value: ReportedValue::empty(),
            context: None,
            warnings: vec![warning.into()],
        }
    }

    /// Append a warning
    #[inline]
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

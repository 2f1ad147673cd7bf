//! Testing utilities for pgset workspace
//!
//! An in-memory stand-in for a PostgreSQL server implementing the engine
//! traits. It keeps a live setting and a pending override per parameter,
//! applies pending overrides on reload (or restart, for `postmaster`
//! parameters), formats display values the way `SHOW` does and records
//! every command and connection.

#![allow(missing_docs)]

use parking_lot::Mutex;
use pgset_core::normalize::{to_canonical_bytes, CanonicalValue, Number};
use pgset_core::{CatalogRow, ContextClass, Engine, EngineError, OverrideValue, Session};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const MEMORY_UNITS: [&str; 4] = ["kB", "MB", "GB", "TB"];

/// Server version reported by default (16.2)
pub const DEFAULT_VERSION: u32 = 160_002;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Set(String),
    Remove,
}

/// One simulated `pg_settings` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeSetting {
    pub setting: String,
    pub unit: Option<String>,
    pub context: ContextClass,
    pub boot_val: String,
    display: Option<String>,
    pending: Option<Pending>,
}

impl FakeSetting {
    pub fn new(setting: &str, unit: Option<&str>, context: ContextClass) -> Self {
        Self {
            setting: setting.to_string(),
            unit: unit.map(str::to_string),
            context,
            boot_val: setting.to_string(),
            display: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn with_boot(mut self, boot_val: &str) -> Self {
        self.boot_val = boot_val.to_string();
        self
    }

    /// Force the `SHOW` output until the setting next changes
    #[must_use]
    pub fn displayed_as(mut self, display: &str) -> Self {
        self.display = Some(display.to_string());
        self
    }

    fn display_value(&self) -> String {
        self.display
            .clone()
            .unwrap_or_else(|| pretty(&self.setting, self.unit.as_deref()))
    }

    fn activate(&mut self) {
        match self.pending.take() {
            Some(Pending::Set(value)) => self.setting = value,
            Some(Pending::Remove) => self.setting = self.boot_val.clone(),
            None => return,
        }
        self.display = None;
    }
}

/// Mutating command received by the fake server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCommand {
    Override { name: String, value: OverrideValue },
    Reload,
}

/// Engine call that can be made to fail once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Connect,
    ServerVersion,
    Catalog,
    Display,
    Override,
    Reload,
}

#[derive(Debug, Default)]
struct State {
    version: u32,
    settings: BTreeMap<String, FakeSetting>,
    commands: Vec<FakeCommand>,
    failures: HashMap<FailPoint, String>,
    opened: usize,
    closed: usize,
}

impl State {
    fn trip(&mut self, point: FailPoint) -> Result<(), EngineError> {
        match self.failures.remove(&point) {
            Some(message) => Err(EngineError::new(message)),
            None => Ok(()),
        }
    }

    fn setting_mut(&mut self, name: &str) -> Result<&mut FakeSetting, EngineError> {
        self.settings.get_mut(name).ok_or_else(|| {
            EngineError::new(format!("unrecognized configuration parameter \"{name}\""))
        })
    }
}

/// Shared in-memory server; clones observe the same state
#[derive(Debug, Clone)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    /// Empty server at [`DEFAULT_VERSION`]
    #[must_use]
    pub fn new() -> Self {
        let state = State {
            version: DEFAULT_VERSION,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Server preloaded with a representative set of parameters
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_setting("work_mem", FakeSetting::new("4096", Some("kB"), ContextClass::User))
            .with_setting(
                "maintenance_work_mem",
                FakeSetting::new("65536", Some("kB"), ContextClass::User),
            )
            .with_setting(
                "temp_file_limit",
                FakeSetting::new("-1", Some("kB"), ContextClass::Superuser),
            )
            .with_setting(
                "max_wal_size",
                FakeSetting::new("1024", Some("MB"), ContextClass::Sighup),
            )
            .with_setting(
                "log_min_duration_statement",
                FakeSetting::new("-1", Some("ms"), ContextClass::Superuser),
            )
            .with_setting(
                "max_connections",
                FakeSetting::new("100", None, ContextClass::Postmaster),
            )
            .with_setting(
                "wal_log_hints",
                FakeSetting::new("off", None, ContextClass::Postmaster),
            )
            .with_setting(
                "TimeZone",
                FakeSetting::new("UTC", None, ContextClass::User).with_boot("GMT"),
            )
            .with_setting(
                "block_size",
                FakeSetting::new("8192", None, ContextClass::Internal),
            )
    }

    #[must_use]
    pub fn with_version(self, version: u32) -> Self {
        self.state.lock().version = version;
        self
    }

    #[must_use]
    pub fn with_setting(self, name: &str, setting: FakeSetting) -> Self {
        self.state.lock().settings.insert(name.to_string(), setting);
        self
    }

    /// Make the next call at `point` fail with `message`
    pub fn fail_on(&self, point: FailPoint, message: &str) {
        self.state.lock().failures.insert(point, message.to_string());
    }

    /// Change the live setting directly, as another client would
    pub fn set_live(&self, name: &str, setting: &str) {
        if let Some(entry) = self.state.lock().settings.get_mut(name) {
            entry.setting = setting.to_string();
            entry.display = None;
        }
    }

    /// Activate every pending override, including `postmaster` ones
    pub fn restart(&self) {
        for setting in self.state.lock().settings.values_mut() {
            setting.activate();
        }
    }

    #[must_use]
    pub fn commands(&self) -> Vec<FakeCommand> {
        self.state.lock().commands.clone()
    }

    #[must_use]
    pub fn overrides_issued(&self) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| matches!(c, FakeCommand::Override { .. }))
            .count()
    }

    #[must_use]
    pub fn reloads_issued(&self) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| matches!(c, FakeCommand::Reload))
            .count()
    }

    /// Live `setting` column for `name`
    #[must_use]
    pub fn live_setting(&self, name: &str) -> Option<String> {
        self.state.lock().settings.get(name).map(|s| s.setting.clone())
    }

    /// Whether `name` has an override waiting for reload or restart
    #[must_use]
    pub fn has_pending(&self, name: &str) -> bool {
        self.state
            .lock()
            .settings
            .get(name)
            .is_some_and(|s| s.pending.is_some())
    }

    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.state.lock().opened
    }

    #[must_use]
    pub fn connections_closed(&self) -> usize {
        self.state.lock().closed
    }
}

impl Engine for FakeServer {
    fn open(&self) -> Result<Box<dyn Session>, EngineError> {
        let mut state = self.state.lock();
        state.trip(FailPoint::Connect)?;
        state.opened += 1;
        Ok(Box::new(FakeSession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeSession {
    state: Arc<Mutex<State>>,
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.state.lock().closed += 1;
    }
}

impl Session for FakeSession {
    fn server_version(&mut self) -> Result<u32, EngineError> {
        let mut state = self.state.lock();
        state.trip(FailPoint::ServerVersion)?;
        Ok(state.version)
    }

    fn fetch_catalog_row(&mut self, name: &str) -> Result<Option<CatalogRow>, EngineError> {
        let mut state = self.state.lock();
        state.trip(FailPoint::Catalog)?;
        Ok(state.settings.get(name).map(|s| CatalogRow {
            name: name.to_string(),
            setting: s.setting.clone(),
            unit: s.unit.clone(),
            context: s.context,
            boot_val: s.boot_val.clone(),
        }))
    }

    fn fetch_display_value(&mut self, name: &str) -> Result<String, EngineError> {
        let mut state = self.state.lock();
        state.trip(FailPoint::Display)?;
        state.setting_mut(name).map(|s| s.display_value())
    }

    fn execute_override(&mut self, name: &str, value: &OverrideValue) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.trip(FailPoint::Override)?;
        state.commands.push(FakeCommand::Override {
            name: name.to_string(),
            value: value.clone(),
        });

        let setting = state.setting_mut(name)?;
        if setting.context == ContextClass::Internal {
            return Err(EngineError::new(format!(
                "parameter \"{name}\" cannot be changed"
            )));
        }
        setting.pending = Some(match value {
            OverrideValue::Default => Pending::Remove,
            OverrideValue::Literal(literal) => {
                Pending::Set(to_native(name, literal, setting.unit.as_deref())?)
            }
        });
        Ok(())
    }

    fn execute_reload(&mut self) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.trip(FailPoint::Reload)?;
        state.commands.push(FakeCommand::Reload);
        for setting in state.settings.values_mut() {
            if setting.context != ContextClass::Postmaster {
                setting.activate();
            }
        }
        Ok(())
    }
}

/// Convert a submitted literal to the parameter's native unit
fn to_native(name: &str, literal: &str, unit: Option<&str>) -> Result<String, EngineError> {
    let factor: i64 = match unit {
        Some("kB") => 1024,
        Some("MB") => 1024 * 1024,
        _ => return Ok(literal.to_string()),
    };
    match to_canonical_bytes(literal) {
        CanonicalValue::Bytes(bytes) => Ok((bytes / factor).to_string()),
        CanonicalValue::Number(Number::Int(amount)) => Ok(amount.to_string()),
        _ => Err(EngineError::new(format!(
            "invalid value for parameter \"{name}\": \"{literal}\""
        ))),
    }
}

/// Format a native setting the way `SHOW` does
#[must_use]
pub fn pretty(setting: &str, unit: Option<&str>) -> String {
    let base = match unit {
        Some("kB") => 0,
        Some("MB") => 1,
        Some(other) if !setting.starts_with('-') => return format!("{setting}{other}"),
        _ => return setting.to_string(),
    };
    let Ok(mut amount) = setting.parse::<i64>() else {
        return setting.to_string();
    };
    if amount <= 0 {
        return amount.to_string();
    }
    let mut exponent = base;
    while exponent + 1 < MEMORY_UNITS.len() && amount % 1024 == 0 {
        amount /= 1024;
        exponent += 1;
    }
    format!("{amount}{}", MEMORY_UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_matches_show_output() {
        assert_eq!(pretty("4096", Some("kB")), "4MB");
        assert_eq!(pretty("1536", Some("kB")), "1536kB");
        assert_eq!(pretty("1024", Some("MB")), "1GB");
        assert_eq!(pretty("-1", Some("kB")), "-1");
        assert_eq!(pretty("-1", Some("ms")), "-1");
        assert_eq!(pretty("200", Some("ms")), "200ms");
        assert_eq!(pretty("UTC", None), "UTC");
    }

    #[test]
    fn reload_activates_reloadable_overrides_only() {
        let server = FakeServer::with_defaults();
        let mut session = server.open().unwrap();
        session
            .execute_override("work_mem", &OverrideValue::Literal("32MB".into()))
            .unwrap();
        session
            .execute_override("max_connections", &OverrideValue::Literal("200".into()))
            .unwrap();
        session.execute_reload().unwrap();
        drop(session);

        assert_eq!(server.live_setting("work_mem").as_deref(), Some("32768"));
        assert_eq!(server.live_setting("max_connections").as_deref(), Some("100"));
        assert!(server.has_pending("max_connections"));

        server.restart();
        assert_eq!(server.live_setting("max_connections").as_deref(), Some("200"));
        assert_eq!(server.connections_opened(), server.connections_closed());
    }

    #[test]
    fn failures_trigger_once() {
        let server = FakeServer::with_defaults();
        server.fail_on(FailPoint::Connect, "connection refused");
        assert!(server.open().is_err());
        assert!(server.open().is_ok());
    }
}

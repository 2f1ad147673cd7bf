//! Engine collaborator contract
//!
//! The reconciler never talks to a server directly. It asks an [`Engine`]
//! for a scoped [`Session`] around each phase of a run and drops the
//! session when the phase ends, on success and on error alike. Closing the
//! underlying connection is the session's `Drop` responsibility.

use crate::error::EngineError;
use crate::types::{CatalogRow, OverrideValue};

/// A single server connection, released on drop
#[cfg_attr(test, mockall::automock)]
pub trait Session {
    /// Numeric server version (`server_version_num`, e.g. `160002`)
    ///
    /// # Errors
    /// Engine failure
    fn server_version(&mut self) -> Result<u32, EngineError>;

    /// Look up the `pg_settings` row for `name`
    ///
    /// # Errors
    /// Engine failure; a missing row is `Ok(None)`
    fn fetch_catalog_row(&mut self, name: &str) -> Result<Option<CatalogRow>, EngineError>;

    /// Display value as `SHOW name` reports it
    ///
    /// # Errors
    /// Engine failure
    fn fetch_display_value(&mut self, name: &str) -> Result<String, EngineError>;

    /// Write a system-wide override (`ALTER SYSTEM SET`)
    ///
    /// # Errors
    /// Engine failure
    fn execute_override(&mut self, name: &str, value: &OverrideValue) -> Result<(), EngineError>;

    /// Apply pending reloadable settings (`pg_reload_conf()`)
    ///
    /// # Errors
    /// Engine failure
    fn execute_reload(&mut self) -> Result<(), EngineError>;
}

/// Source of scoped sessions
pub trait Engine {
    /// Acquire a fresh session
    ///
    /// # Errors
    /// Connection failure
    fn open(&self) -> Result<Box<dyn Session>, EngineError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn open(&self) -> Result<Box<dyn Session>, EngineError> {
        (**self).open()
    }
}

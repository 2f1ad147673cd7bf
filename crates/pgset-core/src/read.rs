//! Parameter state reads

use crate::engine::{Engine, Session};
use crate::error::ReconcileError;
use crate::normalize;
use crate::types::ParameterInfo;

/// Open a session, mapping connection failures to `QueryExecution`
///
/// # Errors
/// `QueryExecution` if the engine cannot connect
pub fn open_session<E: Engine + ?Sized>(engine: &E) -> Result<Box<dyn Session>, ReconcileError> {
    engine
        .open()
        .map_err(|e| ReconcileError::query("unable to connect to database", e))
}

/// Fetch and normalize the current state of `name`
///
/// # Errors
/// - `UnknownParameter` if the catalog has no row
/// - `QueryExecution` if either query fails
pub fn fetch_parameter(
    session: &mut dyn Session,
    name: &str,
) -> Result<ParameterInfo, ReconcileError> {
    let operation = || format!("unable to get {name} value");

    let row = session
        .fetch_catalog_row(name)
        .map_err(|e| ReconcileError::query(operation(), e))?
        .ok_or_else(|| ReconcileError::UnknownParameter {
            name: name.to_string(),
        })?;
    let display = session
        .fetch_display_value(name)
        .map_err(|e| ReconcileError::query(operation(), e))?;

    let info = normalize::parameter_info(row, &display);
    tracing::debug!(
        parameter = %info.name,
        current = %info.current_value,
        raw = %info.raw_value,
        boot = %info.boot_value,
        context = %info.context,
        "fetched parameter state"
    );
    Ok(info)
}

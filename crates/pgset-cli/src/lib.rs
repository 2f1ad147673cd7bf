//! pgset command line
//!
//! Parses a change request, layers settings from a TOML file, flags and
//! environment, runs one reconciliation and renders the result.
//!
//! Exit codes: `0` on success, `2` for invalid input, `1` for anything else.

#![warn(unreachable_pub)]

pub mod cli;
pub mod output;
pub mod settings;

use pgset_core::{ChangeRequest, Engine, ReconcileError, Reconciler, ResultRecord};
use settings::AppConfig;

/// Exit code for caller mistakes
pub const EXIT_INPUT: u8 = 2;

/// Exit code for every other failure
pub const EXIT_FAILURE: u8 = 1;

/// Run one request against `engine` with the given settings
///
/// # Errors
/// Any [`ReconcileError`] from the run
pub fn reconcile_with<E: Engine>(
    engine: E,
    config: &AppConfig,
    request: &ChangeRequest,
) -> anyhow::Result<ResultRecord> {
    tracing::debug!(
        mode = ?config.reconcile.mode,
        session_role = ?config.connection.session_role,
        "settings resolved"
    );
    Ok(Reconciler::new(engine, config.reconcile.clone()).reconcile(request)?)
}

/// Map a failure to the process exit code
#[must_use]
pub fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ReconcileError>() {
        Some(e) if e.is_input_error() => EXIT_INPUT,
        _ => EXIT_FAILURE,
    }
}

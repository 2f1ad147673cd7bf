//! Verification Step
//!
//! Re-reads a reloadable parameter through a fresh session after apply and
//! computes the authoritative changed flag from canonical raw values.

use crate::engine::Engine;
use crate::error::ReconcileError;
use crate::read::{fetch_parameter, open_session};
use crate::types::ParameterInfo;

/// Post-apply observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Whether the raw value differs from the pre-apply one
    pub changed: bool,
    /// State observed after apply
    pub after: ParameterInfo,
}

/// Re-fetch `before.name` and compare raw values
///
/// # Errors
/// Any read failure, see [`fetch_parameter`]
pub fn verify<E: Engine + ?Sized>(
    engine: &E,
    before: &ParameterInfo,
) -> Result<Verification, ReconcileError> {
    let after = {
        let mut session = open_session(engine)?;
        fetch_parameter(session.as_mut(), &before.name)?
    };

    let changed = before.raw_value != after.raw_value;
    tracing::debug!(
        parameter = %before.name,
        before = %before.raw_value,
        after = %after.raw_value,
        changed,
        "verified parameter state"
    );
    Ok(Verification { changed, after })
}

//! Reconciliation Decision
//!
//! Decides whether an apply step is needed and what the expected outcome is.
//!
//! Preview and execute mode compare differently on purpose. Preview compares
//! canonical bytes, so `1GB` against a current `1024MB` predicts no change.
//! Execute compares the literal text, so the same request issues an override
//! and reports `changed` until verification (where available) corrects it.

use crate::config::ReconcileConfig;
use crate::context::{classify, ApplyStrategy};
use crate::error::ReconcileError;
use crate::normalize::to_canonical_bytes;
use crate::types::{DesiredChange, OverrideValue, ParameterInfo};

/// What the apply step must do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to submit
    NoOp,
    /// Submit an override
    Apply(OverrideValue),
}

impl Decision {
    /// Override to submit, if any
    #[inline]
    #[must_use]
    pub fn override_value(&self) -> Option<&OverrideValue> {
        match self {
            Self::NoOp => None,
            Self::Apply(value) => Some(value),
        }
    }
}

/// Decision plus the outcome expected before verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Apply or not
    pub decision: Decision,
    /// Strategy from the context class
    pub strategy: ApplyStrategy,
    /// Predicted (preview) or optimistic (execute) changed flag
    pub changed: bool,
    /// Expected display value
    pub value_pretty: String,
}

impl Plan {
    fn no_op(strategy: ApplyStrategy, current: &str) -> Self {
        Self {
            decision: Decision::NoOp,
            strategy,
            changed: false,
            value_pretty: current.to_string(),
        }
    }

    /// Whether a restart is needed for this parameter
    #[inline]
    #[must_use]
    pub fn restart_required(&self) -> bool {
        self.strategy.requires_restart()
    }
}

/// Decide what to do for `desired` given the observed state `info`
///
/// `desired` values are expected to be normalized already
/// (see [`crate::normalize::normalize_desired`]).
///
/// # Errors
/// `ImmutableParameter` for `internal` parameters, in any mode
pub fn decide(
    info: &ParameterInfo,
    desired: &DesiredChange,
    config: &ReconcileConfig,
) -> Result<Plan, ReconcileError> {
    let strategy = classify(info.context);
    if !strategy.is_mutable() {
        return Err(ReconcileError::ImmutableParameter {
            name: info.name.clone(),
        });
    }

    let current = info.current_value.as_str();
    let preview = config.mode.is_preview();

    let plan = match desired {
        DesiredChange::Reset if info.raw_value == info.boot_value => {
            Plan::no_op(strategy, current)
        }
        DesiredChange::Reset => Plan {
            decision: if preview {
                Decision::NoOp
            } else {
                Decision::Apply(OverrideValue::Literal(info.boot_literal.clone()))
            },
            strategy,
            changed: true,
            value_pretty: current.to_string(),
        },
        DesiredChange::Value(value) if preview => {
            if to_canonical_bytes(value) == to_canonical_bytes(current) {
                Plan::no_op(strategy, current)
            } else {
                Plan {
                    decision: Decision::NoOp,
                    strategy,
                    changed: true,
                    value_pretty: value.clone(),
                }
            }
        }
        DesiredChange::Value(value) if value != current => Plan {
            decision: Decision::Apply(OverrideValue::from_literal(value)),
            strategy,
            changed: true,
            value_pretty: value.clone(),
        },
        DesiredChange::Value(_) => Plan::no_op(strategy, current),
    };

    tracing::debug!(
        parameter = %info.name,
        mode = ?config.mode,
        decision = ?plan.decision,
        changed = plan.changed,
        "reconciliation decision"
    );
    Ok(plan)
}

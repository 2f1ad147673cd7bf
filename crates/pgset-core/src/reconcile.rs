//! Reconciler
//!
//! Runs one reconciliation:
//! 1. Read: open a session, gate on server version, fetch state, release
//! 2. Decide
//! 3. Apply (execute mode only), in its own session
//! 4. Verify (reloadable parameters only), in its own session
//!
//! There is no retry and no state carried between runs.

use crate::apply::apply;
use crate::config::ReconcileConfig;
use crate::decision::{decide, Decision};
use crate::engine::Engine;
use crate::error::ReconcileError;
use crate::normalize::normalize_desired;
use crate::read::{fetch_parameter, open_session};
use crate::types::{ChangeRequest, DesiredChange, ParameterInfo, ReportedValue, ResultRecord};
use crate::verify::verify;

/// Drives the read/decide/apply/verify sequence against an engine
#[derive(Debug, Clone)]
pub struct Reconciler<E> {
    engine: E,
    config: ReconcileConfig,
}

enum ReadOutcome {
    Unsupported { version: u32 },
    State(ParameterInfo),
}

impl<E: Engine> Reconciler<E> {
    /// Create reconciler
    #[inline]
    #[must_use]
    pub fn new(engine: E, config: ReconcileConfig) -> Self {
        Self { engine, config }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Engine in use
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate a caller request and reconcile it
    ///
    /// Input validation happens before any session is opened.
    ///
    /// # Errors
    /// See [`Reconciler::run`]; additionally `MutuallyExclusiveInput` and
    /// `MissingInput`
    pub fn reconcile(&self, request: &ChangeRequest) -> Result<ResultRecord, ReconcileError> {
        let desired = request.desired()?;
        self.run(&request.name, &desired)
    }

    /// Reconcile `name` towards `desired`
    ///
    /// # Errors
    /// - `UnknownParameter`, `ImmutableParameter`
    /// - `QueryExecution` on any engine failure
    pub fn run(
        &self,
        name: &str,
        desired: &DesiredChange,
    ) -> Result<ResultRecord, ReconcileError> {
        let desired = match desired {
            DesiredChange::Value(value) => DesiredChange::Value(normalize_desired(value)),
            DesiredChange::Reset => DesiredChange::Reset,
        };
        tracing::info!(parameter = %name, mode = ?self.config.mode, "reconciling parameter");

        let before = match self.read(name)? {
            ReadOutcome::State(info) => info,
            ReadOutcome::Unsupported { version } => {
                let warning = format!(
                    "PostgreSQL is {version} version but {} or later is required",
                    self.config.min_server_version
                );
                tracing::warn!(parameter = %name, version, "{warning}");
                return Ok(ResultRecord::unsupported_version(name, warning));
            }
        };

        let plan = decide(&before, &desired, &self.config)?;
        let mut record = ResultRecord {
            name: name.to_string(),
            changed: plan.changed,
            restart_required: plan.restart_required(),
            prev_value_pretty: before.current_value.clone(),
            value_pretty: plan.value_pretty.clone(),
            value: ReportedValue::new(&before.raw_value, &before.unit),
            context: Some(before.context),
            warnings: Vec::new(),
        };

        if let Decision::Apply(value) = &plan.decision {
            {
                let mut session = open_session(&self.engine)?;
                apply(session.as_mut(), name, value, before.context)?;
            }

            if plan.strategy.verifies() {
                let verification = verify(&self.engine, &before)?;
                record.changed = verification.changed;
                record.value_pretty = verification.after.current_value;
                record.value = ReportedValue::new(&verification.after.raw_value, &before.unit);
            }
        }

        if record.restart_required && record.changed && self.config.warn_on_restart {
            let warning = format!("Restart of PostgreSQL is required for setting {name}");
            tracing::warn!(parameter = %name, "{warning}");
            record.warn(warning);
        }

        tracing::info!(
            parameter = %name,
            changed = record.changed,
            restart_required = record.restart_required,
            "reconciliation finished"
        );
        Ok(record)
    }

    fn read(&self, name: &str) -> Result<ReadOutcome, ReconcileError> {
        let mut session = open_session(&self.engine)?;
        let version = session
            .server_version()
            .map_err(|e| ReconcileError::query("unable to read server version", e))?;
        if version < self.config.min_server_version {
            return Ok(ReadOutcome::Unsupported { version });
        }
        fetch_parameter(session.as_mut(), name).map(ReadOutcome::State)
    }
}

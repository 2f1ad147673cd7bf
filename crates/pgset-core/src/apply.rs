//! Apply Step
//!
//! Writes the override and, for reloadable parameters, reloads the server
//! configuration in the same session. Commands are auto-committed; nothing
//! is rolled back if the reload fails after the override succeeded.

use crate::context::{classify, ContextClass};
use crate::engine::Session;
use crate::error::ReconcileError;
use crate::types::OverrideValue;

/// Submit `value` for `name`, reloading unless the parameter needs a restart
///
/// # Errors
/// `QueryExecution` if the override or the reload fails
pub fn apply(
    session: &mut dyn Session,
    name: &str,
    value: &OverrideValue,
    context: ContextClass,
) -> Result<(), ReconcileError> {
    tracing::info!(parameter = %name, value = %value, %context, "applying override");

    session
        .execute_override(name, value)
        .map_err(|e| ReconcileError::query(format!("unable to set {name}"), e))?;

    if classify(context).issues_reload() {
        session
            .execute_reload()
            .map_err(|e| ReconcileError::query("unable to reload configuration", e))?;
    } else {
        tracing::debug!(parameter = %name, "reload skipped until restart");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockSession;
    use crate::error::EngineError;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn override_then_reload() {
        let mut session = MockSession::new();
        let mut seq = Sequence::new();
        session
            .expect_execute_override()
            .with(eq("work_mem"), eq(OverrideValue::Literal("32MB".into())))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        session
            .expect_execute_reload()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        apply(
            &mut session,
            "work_mem",
            &OverrideValue::Literal("32MB".into()),
            ContextClass::User,
        )
        .unwrap();
    }

    #[test]
    fn postmaster_skips_reload() {
        let mut session = MockSession::new();
        session
            .expect_execute_override()
            .with(eq("shared_buffers"), eq(OverrideValue::Default))
            .times(1)
            .returning(|_, _| Ok(()));
        session.expect_execute_reload().never();

        apply(
            &mut session,
            "shared_buffers",
            &OverrideValue::Default,
            ContextClass::Postmaster,
        )
        .unwrap();
    }

    #[test]
    fn override_failure_stops_before_reload() {
        let mut session = MockSession::new();
        session
            .expect_execute_override()
            .times(1)
            .returning(|_, _| Err(EngineError::new("permission denied to set parameter")));
        session.expect_execute_reload().never();

        let err = apply(
            &mut session,
            "work_mem",
            &OverrideValue::Literal("32MB".into()),
            ContextClass::Sighup,
        )
        .unwrap_err();
        assert_eq!(
            err.engine_message(),
            Some("permission denied to set parameter")
        );
    }

    #[test]
    fn reload_failure_is_reported() {
        let mut session = MockSession::new();
        session.expect_execute_override().returning(|_, _| Ok(()));
        session
            .expect_execute_reload()
            .returning(|| Err(EngineError::new("server closed the connection")));

        let err = apply(
            &mut session,
            "work_mem",
            &OverrideValue::Literal("32MB".into()),
            ContextClass::User,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("unable to reload configuration"));
    }
}

//! Settings loading and end-to-end runs against the fake server

use pgset_cli::cli::{command, Invocation};
use pgset_cli::output::{render, Format};
use pgset_cli::settings::{AppConfig, Overrides};
use pgset_cli::{exit_code, reconcile_with, EXIT_FAILURE, EXIT_INPUT};
use pgset_core::{ChangeRequest, Mode, OverrideValue};
use pgset_test_utils::{FakeCommand, FakeServer};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_without_path_gives_defaults() {
    assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
}

#[test]
fn load_reads_both_tables() {
    let file = config_file(
        r#"
[connection]
url = "postgres://admin@db.internal/app"
session_role = "dba"

[reconcile]
mode = "preview"
warn_on_restart = false
"#,
    );

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.connection.url, "postgres://admin@db.internal/app");
    assert_eq!(config.connection.session_role.as_deref(), Some("dba"));
    assert_eq!(config.connection.connect_timeout_secs, 10);
    assert_eq!(config.reconcile.mode, Mode::Preview);
    assert!(!config.reconcile.warn_on_restart);
    assert_eq!(config.reconcile.min_server_version, 90_400);
}

#[test]
fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn load_rejects_unknown_tables() {
    let file = config_file("[server]\nport = 5432\n");
    let err = AppConfig::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));
    assert_eq!(exit_code(&err), EXIT_FAILURE);
}

#[test]
fn flags_override_file() {
    let file = config_file("[connection]\nurl = \"postgres://file@db/app\"\n");
    let matches = command()
        .try_get_matches_from([
            "pgset",
            "--name",
            "work_mem",
            "--value",
            "32MB",
            "--check",
            "--url",
            "postgres://flag@db/app",
        ])
        .unwrap();
    let invocation = Invocation::from_matches_with_env(&matches, |_| None);

    let config = AppConfig::load(Some(file.path()))
        .unwrap()
        .with_overrides(&invocation.overrides);
    assert_eq!(config.connection.url, "postgres://flag@db/app");
    assert_eq!(config.reconcile.mode, Mode::Preview);
}

#[test]
fn run_applies_change() {
    let server = FakeServer::with_defaults();
    let record = reconcile_with(
        &server,
        &AppConfig::default(),
        &ChangeRequest::set("work_mem", "32mb"),
    )
    .unwrap();

    assert!(record.changed);
    assert_eq!(record.value_pretty, "32MB");
    assert_eq!(
        server.commands(),
        vec![
            FakeCommand::Override {
                name: "work_mem".into(),
                value: OverrideValue::Literal("32MB".into()),
            },
            FakeCommand::Reload,
        ]
    );
    assert_eq!(
        render(&record, Format::Text).unwrap(),
        "work_mem: 4MB >> 32MB (changed)"
    );
}

#[test]
fn preview_overrides_leave_server_untouched() {
    let server = FakeServer::with_defaults();
    let config = AppConfig::default().with_overrides(&Overrides {
        preview: true,
        ..Overrides::default()
    });

    let record =
        reconcile_with(&server, &config, &ChangeRequest::set("work_mem", "32MB")).unwrap();

    assert!(record.changed);
    assert!(server.commands().is_empty());
}

#[test]
fn input_errors_exit_with_two() {
    let server = FakeServer::with_defaults();
    let request = ChangeRequest {
        name: "work_mem".into(),
        value: Some("1MB".into()),
        reset: true,
    };

    let err = reconcile_with(&server, &AppConfig::default(), &request).unwrap_err();
    assert_eq!(exit_code(&err), EXIT_INPUT);
    assert_eq!(server.connections_opened(), 0);
}

#[test]
fn server_errors_exit_with_one() {
    let server = FakeServer::with_defaults();
    let err = reconcile_with(
        &server,
        &AppConfig::default(),
        &ChangeRequest::set("no_such_setting", "1"),
    )
    .unwrap_err();
    assert_eq!(exit_code(&err), EXIT_FAILURE);
}

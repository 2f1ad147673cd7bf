//! Argument parsing

use crate::output::Format;
use crate::settings::{url_from_env, Overrides};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pgset_core::ChangeRequest;
use std::path::PathBuf;

/// Build the `pgset` command
#[must_use]
pub fn command() -> Command {
    Command::new("pgset")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Change a PostgreSQL server parameter via ALTER SYSTEM")
        .arg(
            Arg::new("name")
                .long("name")
                .required(true)
                .help("Parameter name"),
        )
        .arg(
            Arg::new("value")
                .long("value")
                .allow_hyphen_values(true)
                .help("Desired value (use 'default' to remove the override)"),
        )
        .arg(
            Arg::new("reset")
                .long("reset")
                .action(ArgAction::SetTrue)
                .help("Restore the parameter's boot value"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .action(ArgAction::SetTrue)
                .help("Report the predicted outcome without changing anything"),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .help("Connection URL [env: PGSET_DATABASE_URL, DATABASE_URL]"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .help("Database to connect to"),
        )
        .arg(
            Arg::new("session-role")
                .long("session-role")
                .help("Role to switch to after connecting"),
        )
        .arg(
            Arg::new("connect-timeout")
                .long("connect-timeout")
                .value_parser(value_parser!(u64))
                .help("Connect timeout in seconds"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML settings file with [connection] and [reconcile] tables"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .default_value("json")
                .value_parser(value_parser!(Format))
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

/// Everything one run needs from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Unvalidated change request
    pub request: ChangeRequest,
    /// Settings file
    pub config_path: Option<PathBuf>,
    /// Flag and environment overrides
    pub overrides: Overrides,
    /// Output format
    pub format: Format,
    /// Debug logging
    pub verbose: bool,
}

impl Invocation {
    /// Extract from parsed arguments, reading the process environment
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self::from_matches_with_env(matches, |var| std::env::var(var).ok())
    }

    /// Extract from parsed arguments with a custom environment lookup
    #[must_use]
    pub fn from_matches_with_env(
        matches: &ArgMatches,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let string = |id: &str| matches.get_one::<String>(id).cloned();

        Self {
            request: ChangeRequest {
                name: string("name").unwrap_or_default(),
                value: string("value"),
                reset: matches.get_flag("reset"),
            },
            config_path: matches.get_one::<PathBuf>("config").cloned(),
            overrides: Overrides {
                url: string("url").or_else(|| url_from_env(lookup)),
                database: string("db"),
                session_role: string("session-role"),
                connect_timeout_secs: matches.get_one::<u64>("connect-timeout").copied(),
                preview: matches.get_flag("check"),
            },
            format: matches.get_one::<Format>("format").copied().unwrap_or_default(),
            verbose: matches.get_flag("verbose"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Invocation {
        let matches = command().try_get_matches_from(args).unwrap();
        Invocation::from_matches_with_env(&matches, |_| None)
    }

    #[test]
    fn value_request() {
        let inv = parse(&["pgset", "--name", "work_mem", "--value", "32mb"]);
        assert_eq!(inv.request, ChangeRequest::set("work_mem", "32mb"));
        assert_eq!(inv.format, Format::Json);
        assert!(!inv.overrides.preview);
    }

    #[test]
    fn negative_value_is_accepted() {
        let inv = parse(&["pgset", "--name", "temp_file_limit", "--value", "-1"]);
        assert_eq!(inv.request.value.as_deref(), Some("-1"));
    }

    #[test]
    fn reset_with_check_and_text() {
        let inv = parse(&["pgset", "--name", "work_mem", "--reset", "--check", "--format", "text"]);
        assert_eq!(inv.request, ChangeRequest::reset("work_mem"));
        assert!(inv.overrides.preview);
        assert_eq!(inv.format, Format::Text);
    }

    #[test]
    fn value_and_reset_are_left_for_validation() {
        let inv = parse(&["pgset", "--name", "work_mem", "--value", "1MB", "--reset"]);
        assert!(inv.request.desired().is_err());
    }

    #[test]
    fn connection_flags() {
        let inv = parse(&[
            "pgset",
            "--name",
            "work_mem",
            "--value",
            "1MB",
            "--url",
            "postgres://admin@db/app",
            "--db",
            "postgres",
            "--session-role",
            "dba",
            "--connect-timeout",
            "3",
        ]);
        assert_eq!(
            inv.overrides,
            Overrides {
                url: Some("postgres://admin@db/app".into()),
                database: Some("postgres".into()),
                session_role: Some("dba".into()),
                connect_timeout_secs: Some(3),
                preview: false,
            }
        );
    }

    #[test]
    fn url_falls_back_to_environment() {
        let matches = command()
            .try_get_matches_from(["pgset", "--name", "work_mem", "--reset"])
            .unwrap();
        let inv = Invocation::from_matches_with_env(&matches, |var| {
            (var == "DATABASE_URL").then(|| "postgres://env@db/app".to_string())
        });
        assert_eq!(inv.overrides.url.as_deref(), Some("postgres://env@db/app"));
    }

    #[test]
    fn name_is_required() {
        assert!(command().try_get_matches_from(["pgset", "--reset"]).is_err());
    }
}

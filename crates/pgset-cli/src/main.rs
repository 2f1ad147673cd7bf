use anyhow::Context;
use pgset_cli::cli::{self, Invocation};
use pgset_cli::settings::AppConfig;
use pgset_cli::{exit_code, output, reconcile_with};
use pgset_sqlx::PgEngine;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    let invocation = Invocation::from_matches(&matches);

    // Logs go to stderr; stdout carries only the result
    let filter = if invocation.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&invocation) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(invocation: &Invocation) -> anyhow::Result<String> {
    let config = AppConfig::load(invocation.config_path.as_deref())?
        .with_overrides(&invocation.overrides);
    let engine = PgEngine::new(&config.connection).context("invalid connection settings")?;
    let record = reconcile_with(engine, &config, &invocation.request)?;
    output::render(&record, invocation.format)
}

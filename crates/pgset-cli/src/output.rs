//! Result rendering

use clap::ValueEnum;
use pgset_core::ResultRecord;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON record
    #[default]
    Json,
    /// One-line summary
    Text,
}

/// Render a record
///
/// # Errors
/// Fails only if JSON serialization fails
pub fn render(record: &ResultRecord, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(record)?),
        Format::Text => Ok(summary(record)),
    }
}

fn summary(record: &ResultRecord) -> String {
    let mut line = format!(
        "{}: {} >> {} ({})",
        record.name,
        record.prev_value_pretty,
        record.value_pretty,
        if record.changed { "changed" } else { "unchanged" }
    );
    if record.restart_required {
        line.push_str(", restart required");
    }
    line
}

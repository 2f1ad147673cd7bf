//! SQL text issued by the engine

use pgset_core::OverrideValue;

/// Catalog row lookup, bound by name
pub const CATALOG_QUERY: &str =
    "SELECT name, setting, unit, context, boot_val FROM pg_settings WHERE name = $1";

/// Numeric server version
pub const SERVER_VERSION_QUERY: &str = "SHOW server_version_num";

/// Configuration reload
pub const RELOAD_QUERY: &str = "SELECT pg_reload_conf()";

/// Quote a string literal, doubling embedded single quotes
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote an identifier, doubling embedded double quotes
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `SHOW` for a parameter
#[must_use]
pub fn show(name: &str) -> String {
    format!("SHOW {name}")
}

/// `ALTER SYSTEM SET` for a parameter
#[must_use]
pub fn alter_system(name: &str, value: &OverrideValue) -> String {
    match value {
        OverrideValue::Default => format!("ALTER SYSTEM SET {name} = DEFAULT"),
        OverrideValue::Literal(literal) => {
            format!("ALTER SYSTEM SET {name} = {}", quote_literal(literal))
        }
    }
}

/// `SET ROLE` for a session role
#[must_use]
pub fn set_role(role: &str) -> String {
    format!("SET ROLE {}", quote_ident(role))
}

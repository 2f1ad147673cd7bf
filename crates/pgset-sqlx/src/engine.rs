//! sqlx-backed engine
//!
//! Every [`Engine::open`] call makes a new connection and every session
//! closes it on drop. Async driver calls are driven to completion on a
//! private current-thread runtime, so these types must not be used from
//! inside another async runtime.

use crate::config::ConnectionConfig;
use crate::error::{engine_error, ConnectError};
use crate::statements::{self, CATALOG_QUERY, RELOAD_QUERY, SERVER_VERSION_QUERY};
use pgset_core::{CatalogRow, ContextClass, Engine, EngineError, OverrideValue, Session};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Connection, Row};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Engine that opens a fresh PostgreSQL connection per session
#[derive(Debug, Clone)]
pub struct PgEngine {
    options: PgConnectOptions,
    session_role: Option<String>,
    connect_timeout: Duration,
    runtime: Arc<Runtime>,
}

impl PgEngine {
    /// Build an engine from configuration; no connection is made yet
    ///
    /// # Errors
    /// - `ConnectError::InvalidUrl` if the URL does not parse
    /// - `ConnectError::Runtime` if the runtime cannot start
    pub fn new(config: &ConnectionConfig) -> Result<Self, ConnectError> {
        let mut options: PgConnectOptions = config.url.parse().map_err(ConnectError::InvalidUrl)?;
        if let Some(database) = &config.database {
            options = options.database(database);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ConnectError::Runtime)?;

        Ok(Self {
            options,
            session_role: config.session_role.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            runtime: Arc::new(runtime),
        })
    }

    async fn connect(&self) -> Result<PgConnection, EngineError> {
        let mut conn = tokio::time::timeout(
            self.connect_timeout,
            PgConnection::connect_with(&self.options),
        )
        .await
        .map_err(|_| {
            EngineError::new(format!(
                "timed out after {}s connecting to server",
                self.connect_timeout.as_secs()
            ))
        })?
        .map_err(engine_error)?;

        if let Some(role) = &self.session_role {
            sqlx::raw_sql(&statements::set_role(role))
                .execute(&mut conn)
                .await
                .map_err(engine_error)?;
            tracing::debug!(role = %role, "switched session role");
        }
        Ok(conn)
    }
}

impl Engine for PgEngine {
    fn open(&self) -> Result<Box<dyn Session>, EngineError> {
        let conn = self.runtime.block_on(self.connect())?;
        tracing::debug!("opened database session");
        Ok(Box::new(PgSession {
            runtime: Arc::clone(&self.runtime),
            conn: Some(conn),
        }))
    }
}

struct PgSession {
    runtime: Arc<Runtime>,
    conn: Option<PgConnection>,
}

impl PgSession {
    fn parts(&mut self) -> Result<(&Runtime, &mut PgConnection), EngineError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| EngineError::new("connection already closed"))?;
        Ok((&self.runtime, conn))
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = self.runtime.block_on(conn.close()) {
                tracing::debug!(error = %e, "error closing database session");
            }
        }
    }
}

impl Session for PgSession {
    fn server_version(&mut self) -> Result<u32, EngineError> {
        let (runtime, conn) = self.parts()?;
        let row = runtime
            .block_on(sqlx::raw_sql(SERVER_VERSION_QUERY).fetch_one(conn))
            .map_err(engine_error)?;
        let text: String = row.try_get(0).map_err(engine_error)?;
        text.trim()
            .parse()
            .map_err(|_| EngineError::new(format!("unexpected server_version_num: '{text}'")))
    }

    fn fetch_catalog_row(&mut self, name: &str) -> Result<Option<CatalogRow>, EngineError> {
        let (runtime, conn) = self.parts()?;
        let row = runtime
            .block_on(sqlx::query(CATALOG_QUERY).bind(name).fetch_optional(conn))
            .map_err(engine_error)?;
        row.as_ref().map(catalog_row).transpose()
    }

    fn fetch_display_value(&mut self, name: &str) -> Result<String, EngineError> {
        let (runtime, conn) = self.parts()?;
        let sql = statements::show(name);
        let row = runtime
            .block_on(sqlx::raw_sql(&sql).fetch_one(conn))
            .map_err(engine_error)?;
        row.try_get(0).map_err(engine_error)
    }

    fn execute_override(&mut self, name: &str, value: &OverrideValue) -> Result<(), EngineError> {
        let (runtime, conn) = self.parts()?;
        let sql = statements::alter_system(name, value);
        tracing::debug!(statement = %sql, "executing override");
        runtime
            .block_on(sqlx::raw_sql(&sql).execute(conn))
            .map_err(engine_error)?;
        Ok(())
    }

    fn execute_reload(&mut self) -> Result<(), EngineError> {
        let (runtime, conn) = self.parts()?;
        runtime
            .block_on(sqlx::raw_sql(RELOAD_QUERY).execute(conn))
            .map_err(engine_error)?;
        Ok(())
    }
}

fn catalog_row(row: &PgRow) -> Result<CatalogRow, EngineError> {
    let context: String = row.try_get("context").map_err(engine_error)?;
    Ok(CatalogRow {
        name: row.try_get("name").map_err(engine_error)?,
        setting: row
            .try_get::<Option<String>, _>("setting")
            .map_err(engine_error)?
            .unwrap_or_default(),
        unit: row.try_get("unit").map_err(engine_error)?,
        context: context
            .parse::<ContextClass>()
            .map_err(|e| EngineError::new(e.to_string()))?,
        boot_val: row
            .try_get::<Option<String>, _>("boot_val")
            .map_err(engine_error)?
            .unwrap_or_default(),
    })
}

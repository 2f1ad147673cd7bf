//! pgset sqlx engine
//!
//! Implements the pgset engine contract against a live PostgreSQL server:
//! - `pg_settings` lookups and `SHOW` for reads
//! - `ALTER SYSTEM SET` for overrides
//! - `pg_reload_conf()` for reloads
//!
//! # Example
//!
//! ```rust,ignore
//! use pgset_core::prelude::*;
//! use pgset_sqlx::{ConnectionConfig, PgEngine};
//!
//! let engine = PgEngine::new(&ConnectionConfig::new().with_session_role("dba"))?;
//! let record = Reconciler::new(engine, ReconcileConfig::new())
//!     .reconcile(&ChangeRequest::set("work_mem", "64MB"))?;
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod engine;
pub mod error;
pub mod statements;

pub use config::{ConnectionConfig, DEFAULT_URL};
pub use engine::PgEngine;
pub use error::ConnectError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

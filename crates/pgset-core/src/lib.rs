//! pgset Core - parameter state reconciliation
//!
//! Changes one PostgreSQL server parameter and reports precisely:
//! - Whether the change took effect
//! - Whether a full server restart is still required
//!
//! Connections are supplied by an [`Engine`]; this crate never opens a
//! socket itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use pgset_core::prelude::*;
//!
//! let reconciler = Reconciler::new(engine, ReconcileConfig::new());
//! let record = reconciler.reconcile(&ChangeRequest::set("work_mem", "32mb"))?;
//!
//! println!("{} {} >> {}", record.name, record.prev_value_pretty, record.value_pretty);
//! ```

#![warn(unreachable_pub)]

pub mod apply;
pub mod config;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod read;
pub mod reconcile;
pub mod types;
pub mod verify;

// Re-exports for convenience
pub use config::{Mode, ReconcileConfig, MIN_SERVER_VERSION};
pub use context::{classify, ApplyStrategy, ContextClass, UnknownContext};
pub use decision::{decide, Decision, Plan};
pub use engine::{Engine, Session};
pub use error::{EngineError, ReconcileError};
pub use normalize::{
    canonicalize_user_shorthand, normalize_boolean, to_canonical_bytes, CanonicalValue, Number,
};
pub use reconcile::Reconciler;
pub use types::{
    CatalogRow, ChangeRequest, DesiredChange, OverrideValue, ParameterInfo, ReportedValue,
    ResultRecord, SettingValue, Unit,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a reconciliation
    pub use crate::{
        ChangeRequest, DesiredChange, Engine, EngineError, Mode, ReconcileConfig, ReconcileError,
        Reconciler, ResultRecord, Session,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests;

pub mod predicate;

pub use predicate::{ColDef, CompOp, Condition, Rhs, SetClause, TabCol};

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Identifier for a column within a table schema.
pub type ColumnId = u16;

/// Canonical error type shared across database subsystems.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("parse: {0}")]
    Parser(String),
    #[error("plan: {0}")]
    Planner(String),
    #[error("catalog: {0}")]
    Catalog(String),
    #[error("no join executor selected")]
    NoJoinExecutorSelected,
    #[error("unexpected AST root")]
    UnexpectedAstRoot,
    #[error("unexpected field type")]
    UnexpectedFieldType,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a `DbError`.
pub type DbResult<T> = Result<T, DbError>;

/// Per-statement execution context. The planner treats it as an opaque
/// pass-through: the executor consumes the transaction id and lock handles.
#[derive(Clone, Copy, Debug, Default)]
pub struct Context {
    pub txn_id: u64,
}

impl Context {
    pub fn new(txn_id: u64) -> Self {
        Self { txn_id }
    }
}

/// Session-settable planner knobs, adjusted with
/// `SET enable_nestloop = ...` / `SET enable_sortmerge = ...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Knob {
    NestLoop,
    SortMerge,
}

/// Join-algorithm configuration, snapshotted per planner instance.
///
/// # Example
/// ```
/// use common::PlannerConfig;
///
/// let config = PlannerConfig::builder()
///     .enable_nestedloop_join(true)
///     .enable_sortmerge_join(false)
///     .build();
/// assert!(config.enable_nestedloop_join);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize, bon::Builder)]
pub struct PlannerConfig {
    /// Permits nested-loop joins. Must stay on while sort-merge is off.
    #[builder(default = true)]
    pub enable_nestedloop_join: bool,
    /// Permits sort-merge joins.
    #[builder(default = true)]
    pub enable_sortmerge_join: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            enable_nestedloop_join: true,
            enable_sortmerge_join: true,
        }
    }
}

impl PlannerConfig {
    /// Apply a `SET` knob to this configuration.
    pub fn set_knob(&mut self, knob: Knob, value: bool) {
        match knob {
            Knob::NestLoop => self.enable_nestedloop_join = value,
            Knob::SortMerge => self.enable_sortmerge_join = value,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::{
        ColDef, CompOp, Condition, Context, DbError, DbResult, PlannerConfig, Rhs, SetClause,
        TabCol,
    };
    pub use types::{ColType, Value};
}

//! Query planner: converts analyzed SQL statements into executable plan
//! trees.
//!
//! The planner sits between the semantic analyzer and the executor. For a
//! SELECT it performs three tasks:
//!
//! 1. **Logical rewrites** - greedy cardinality-driven join ordering and
//!    needed-column analysis on the `Query` envelope
//! 2. **Physical construction** - per-table access-path selection
//!    (sequential vs. index scan) and left-deep join assembly from the
//!    residual predicate list
//! 3. **Refinement** - explicit filter insertion above scans, projection
//!    narrowing, and sort generation
//!
//! DDL and the remaining DML kinds map directly onto their plan shapes.
//!
//! # Architecture
//!
//! ```text
//! Query (annotated AST)
//!     ↓
//! Logical rewrites (join ordering, needed columns)
//!     ↓
//! make_one_rel (access paths + left-deep joins)
//!     ↓
//! Refinement (filters, projections, sort)
//!     ↓
//! Plan tree
//!     ↓
//! Executor
//! ```
//!
//! # Example
//!
//! ```no_run
//! use catalog::Catalog;
//! use common::Context;
//! use parser::{SelectItem, SelectStmt, Statement};
//! use planner::{Planner, Query};
//!
//! let catalog = Catalog::new();
//! let planner = Planner::new(&catalog);
//! let ast = Statement::Select(SelectStmt {
//!     items: vec![SelectItem::Wildcard],
//!     tables: vec![],
//!     order_by: None,
//! });
//! let query = Query::builder()
//!     .ast(ast)
//!     .tables(vec!["users".into()])
//!     .is_select_star(true)
//!     .build();
//! let plan = planner.plan(query, &Context::default()).unwrap();
//! ```

mod optimizer;
mod physical;
mod plan;
mod query;
mod refine;


pub use physical::{Attach, drain_table_conds};
pub use plan::{
    DdlOp, DdlPlan, DmlOp, DmlPlan, FilterPlan, JoinAlgo, JoinPlan, OtherPlan, Plan,
    ProjectionPlan, ScanKind, ScanPlan, SortPlan, explain,
};
pub use query::Query;

use catalog::Catalog;
use common::{ColDef, Context, DbError, DbResult, PlannerConfig};
use parser::{Field, Statement};
use std::collections::HashMap;

/// Main planner entry point. Borrows the catalog for the duration of a
/// call and snapshots the join knobs at construction; the emitted plan
/// tree is self-contained.
pub struct Planner<'a> {
    catalog: &'a Catalog,
    config: PlannerConfig,
}

impl<'a> Planner<'a> {
    /// Create a planner with the default join configuration.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            config: PlannerConfig::default(),
        }
    }

    /// Create a planner with an explicit join configuration snapshot.
    pub fn with_config(catalog: &'a Catalog, config: PlannerConfig) -> Self {
        Self { catalog, config }
    }

    /// Convert an analyzed statement into an executable plan.
    ///
    /// The context is an opaque pass-through for the executor; planning
    /// itself only reads the catalog.
    ///
    /// # Errors
    ///
    /// Returns `DbError::UnexpectedAstRoot` for statement kinds handled
    /// upstream (transaction control), `DbError::UnexpectedFieldType` for
    /// CREATE TABLE fields that are not plain columns,
    /// `DbError::NoJoinExecutorSelected` when a join is required with both
    /// join knobs off, and catalog errors for unknown tables or columns.
    pub fn plan(&self, query: Query, _ctx: &Context) -> DbResult<Plan> {
        match query.ast.clone() {
            Statement::CreateTable { table, fields } => {
                let mut cols = Vec::with_capacity(fields.len());
                for field in fields {
                    match field {
                        Field::Col(def) => cols.push(ColDef::new(def.name, def.ty)),
                        Field::PrimaryKey(_) => return Err(DbError::UnexpectedFieldType),
                    }
                }
                Ok(Plan::Ddl(DdlPlan {
                    op: DdlOp::CreateTable,
                    table,
                    cols,
                    index_cols: Vec::new(),
                }))
            }
            Statement::DropTable { table } => Ok(Plan::Ddl(DdlPlan {
                op: DdlOp::DropTable,
                table,
                cols: Vec::new(),
                index_cols: Vec::new(),
            })),
            Statement::CreateIndex { table, columns } => Ok(Plan::Ddl(DdlPlan {
                op: DdlOp::CreateIndex,
                table,
                cols: Vec::new(),
                index_cols: columns,
            })),
            Statement::DropIndex { table, columns } => Ok(Plan::Ddl(DdlPlan {
                op: DdlOp::DropIndex,
                table,
                cols: Vec::new(),
                index_cols: columns,
            })),
            Statement::ShowIndex { table } => Ok(Plan::Other(OtherPlan::ShowIndex { table })),
            Statement::Set { knob, value } => Ok(Plan::Other(OtherPlan::SetKnob { knob, value })),
            Statement::Insert { table, .. } => Ok(Plan::Dml(DmlPlan {
                op: DmlOp::Insert,
                child: None,
                table,
                values: query.values,
                conds: Vec::new(),
                set_clauses: Vec::new(),
                aliases: HashMap::new(),
                is_select_star: false,
            })),
            Statement::Delete { table } => {
                let scan = self.scan_plan_for(&table, query.conds.clone())?;
                Ok(Plan::Dml(DmlPlan {
                    op: DmlOp::Delete,
                    child: Some(Box::new(scan)),
                    table,
                    values: Vec::new(),
                    conds: query.conds,
                    set_clauses: Vec::new(),
                    aliases: HashMap::new(),
                    is_select_star: false,
                }))
            }
            Statement::Update { table } => {
                let scan = self.scan_plan_for(&table, query.conds.clone())?;
                Ok(Plan::Dml(DmlPlan {
                    op: DmlOp::Update,
                    child: Some(Box::new(scan)),
                    table,
                    values: Vec::new(),
                    conds: query.conds,
                    set_clauses: query.set_clauses,
                    aliases: HashMap::new(),
                    is_select_star: false,
                }))
            }
            Statement::Select(_) => {
                let subplan = self.select_plan(query)?;
                Ok(Plan::Dml(DmlPlan {
                    op: DmlOp::Select,
                    child: Some(Box::new(subplan)),
                    table: String::new(),
                    values: Vec::new(),
                    conds: Vec::new(),
                    set_clauses: Vec::new(),
                    aliases: HashMap::new(),
                    is_select_star: false,
                }))
            }
            Statement::Explain(inner) => {
                let aliases = query.aliases.clone();
                let is_select_star = query.is_select_star;
                let mut query = query;
                query.ast = *inner;
                let subplan = self.select_plan(query)?;
                Ok(Plan::Dml(DmlPlan {
                    op: DmlOp::Explain,
                    child: Some(Box::new(subplan)),
                    table: String::new(),
                    values: Vec::new(),
                    conds: Vec::new(),
                    set_clauses: Vec::new(),
                    aliases,
                    is_select_star,
                }))
            }
            Statement::Txn(_) => Err(DbError::UnexpectedAstRoot),
        }
    }

    /// Full SELECT pipeline: logical rewrites, physical construction, then
    /// the refinement passes.
    fn select_plan(&self, mut query: Query) -> DbResult<Plan> {
        self.optimize_logical(&mut query)?;
        let plan = self.make_one_rel(&query)?;
        let plan = refine::push_filters_down(plan);
        let plan = self.push_projections_down(plan, &query);
        self.apply_sort(plan, &query)
    }
}

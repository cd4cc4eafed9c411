//! The executable plan tree.
//!
//! Plans are owned tagged trees: every walker consumes or borrows a node
//! and matches exhaustively, so adding a plan kind is a compile-time
//! checkpoint for every rewrite pass.

use common::{ColDef, Condition, Knob, Rhs, SetClause, TabCol};
use std::collections::{BTreeSet, HashMap};
use types::Value;

/// How a base table is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanKind {
    SeqScan,
    IndexScan,
}

/// Join algorithm executed by the join operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinAlgo {
    NestLoop,
    SortMerge,
}

/// DML statement kinds carried by the plan root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmlOp {
    Insert,
    Delete,
    Update,
    Select,
    Explain,
}

/// DDL statement kinds carried by the plan root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DdlOp {
    CreateTable,
    DropTable,
    CreateIndex,
    DropIndex,
}

/// Reads one table. `fed_conds` names the subset of `conds` the executor
/// applies at record time; the refinement pass empties both when it hoists
/// the predicates into an explicit filter. `index_cols` is empty for a
/// sequential scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanPlan {
    pub kind: ScanKind,
    pub table: String,
    pub conds: Vec<Condition>,
    pub fed_conds: Vec<Condition>,
    pub index_cols: Vec<String>,
}

/// Joins two subtrees. `make_one_rel` grows the tree left-deep: the
/// accumulated tree stays on the left and each newly joined scan lands on
/// the right, with join conditions oriented so their left side names the
/// left subtree.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinPlan {
    pub algo: JoinAlgo,
    pub left: Box<Plan>,
    pub right: Box<Plan>,
    pub conds: Vec<Condition>,
}

/// Applies predicates to the rows of its child.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterPlan {
    pub child: Box<Plan>,
    pub conds: Vec<Condition>,
}

/// Narrows the child's output to the named columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionPlan {
    pub child: Box<Plan>,
    pub cols: Vec<TabCol>,
}

/// Orders the child's output by a single key column.
#[derive(Clone, Debug, PartialEq)]
pub struct SortPlan {
    pub child: Box<Plan>,
    pub key: TabCol,
    pub descending: bool,
}

/// Root node for DML statements. SELECT and EXPLAIN carry the finished
/// query subtree; DELETE and UPDATE carry the scan feeding the mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct DmlPlan {
    pub op: DmlOp,
    pub child: Option<Box<Plan>>,
    pub table: String,
    pub values: Vec<Value>,
    pub conds: Vec<Condition>,
    pub set_clauses: Vec<SetClause>,
    pub aliases: HashMap<String, String>,
    pub is_select_star: bool,
}

/// Root node for DDL statements.
#[derive(Clone, Debug, PartialEq)]
pub struct DdlPlan {
    pub op: DdlOp,
    pub table: String,
    pub cols: Vec<ColDef>,
    pub index_cols: Vec<String>,
}

/// Utility statements outside the DML/DDL split.
#[derive(Clone, Debug, PartialEq)]
pub enum OtherPlan {
    ShowIndex { table: String },
    SetKnob { knob: Knob, value: bool },
}

/// A node of the executable plan tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Plan {
    Scan(ScanPlan),
    Join(JoinPlan),
    Filter(FilterPlan),
    Projection(ProjectionPlan),
    Sort(SortPlan),
    Dml(DmlPlan),
    Ddl(DdlPlan),
    Other(OtherPlan),
}

impl Plan {
    pub(crate) fn join(algo: JoinAlgo, left: Plan, right: Plan, conds: Vec<Condition>) -> Plan {
        Plan::Join(JoinPlan {
            algo,
            left: Box::new(left),
            right: Box::new(right),
            conds,
        })
    }

    /// Collect the names of every base table scanned beneath this node.
    pub fn collect_table_names(&self, out: &mut BTreeSet<String>) {
        match self {
            Plan::Scan(scan) => {
                out.insert(scan.table.clone());
            }
            Plan::Join(join) => {
                join.left.collect_table_names(out);
                join.right.collect_table_names(out);
            }
            Plan::Filter(filter) => filter.child.collect_table_names(out),
            Plan::Projection(projection) => projection.child.collect_table_names(out),
            Plan::Sort(sort) => sort.child.collect_table_names(out),
            Plan::Dml(dml) => {
                if let Some(child) = &dml.child {
                    child.collect_table_names(out);
                }
            }
            Plan::Ddl(_) | Plan::Other(_) => {}
        }
    }

    /// Collect every column referenced by a join condition in this subtree.
    pub(crate) fn collect_join_columns(&self, out: &mut BTreeSet<TabCol>) {
        match self {
            Plan::Join(join) => {
                for cond in &join.conds {
                    out.insert(cond.lhs.clone());
                    if let Rhs::Col(rhs) = &cond.rhs {
                        out.insert(rhs.clone());
                    }
                }
                join.left.collect_join_columns(out);
                join.right.collect_join_columns(out);
            }
            Plan::Filter(filter) => filter.child.collect_join_columns(out),
            Plan::Projection(projection) => projection.child.collect_join_columns(out),
            Plan::Sort(sort) => sort.child.collect_join_columns(out),
            Plan::Scan(_) | Plan::Dml(_) | Plan::Ddl(_) | Plan::Other(_) => {}
        }
    }

}

/// Pretty-print a plan tree for EXPLAIN output and debugging.
pub fn explain(plan: &Plan) -> String {
    match plan {
        Plan::Scan(scan) => {
            let kind = match scan.kind {
                ScanKind::SeqScan => "SeqScan",
                ScanKind::IndexScan => "IndexScan",
            };
            let mut line = format!("{kind} table={}", scan.table);
            if !scan.conds.is_empty() {
                line.push_str(&format!(" conds=[{}]", render_conds(&scan.conds)));
            }
            if !scan.index_cols.is_empty() {
                line.push_str(&format!(" index=[{}]", scan.index_cols.join(", ")));
            }
            line
        }
        Plan::Join(join) => {
            let algo = match join.algo {
                JoinAlgo::NestLoop => "NestLoopJoin",
                JoinAlgo::SortMerge => "SortMergeJoin",
            };
            format!(
                "{algo} [{}]\n  {}\n  {}",
                render_conds(&join.conds),
                indent(&explain(&join.left)),
                indent(&explain(&join.right))
            )
        }
        Plan::Filter(filter) => format!(
            "Filter [{}]\n  {}",
            render_conds(&filter.conds),
            indent(&explain(&filter.child))
        ),
        Plan::Projection(projection) => {
            let cols: Vec<String> = projection.cols.iter().map(ToString::to_string).collect();
            format!(
                "Project [{}]\n  {}",
                cols.join(", "),
                indent(&explain(&projection.child))
            )
        }
        Plan::Sort(sort) => format!(
            "Sort key={} dir={}\n  {}",
            sort.key,
            if sort.descending { "desc" } else { "asc" },
            indent(&explain(&sort.child))
        ),
        Plan::Dml(dml) => {
            let op = match dml.op {
                DmlOp::Insert => "Insert",
                DmlOp::Delete => "Delete",
                DmlOp::Update => "Update",
                DmlOp::Select => "Select",
                DmlOp::Explain => "Explain",
            };
            let mut line = op.to_string();
            if !dml.table.is_empty() {
                line.push_str(&format!(" table={}", dml.table));
            }
            if !dml.conds.is_empty() {
                line.push_str(&format!(" conds=[{}]", render_conds(&dml.conds)));
            }
            if let Some(child) = &dml.child {
                line.push_str(&format!("\n  {}", indent(&explain(child))));
            }
            line
        }
        Plan::Ddl(ddl) => {
            let op = match ddl.op {
                DdlOp::CreateTable => "CreateTable",
                DdlOp::DropTable => "DropTable",
                DdlOp::CreateIndex => "CreateIndex",
                DdlOp::DropIndex => "DropIndex",
            };
            let mut line = format!("{op} table={}", ddl.table);
            if !ddl.cols.is_empty() {
                let cols: Vec<String> = ddl
                    .cols
                    .iter()
                    .map(|c| format!("{} {}", c.name, c.ty))
                    .collect();
                line.push_str(&format!(" cols=[{}]", cols.join(", ")));
            }
            if !ddl.index_cols.is_empty() {
                line.push_str(&format!(" index=[{}]", ddl.index_cols.join(", ")));
            }
            line
        }
        Plan::Other(OtherPlan::ShowIndex { table }) => format!("ShowIndex table={table}"),
        Plan::Other(OtherPlan::SetKnob { knob, value }) => format!("SetKnob {knob:?}={value}"),
    }
}

fn render_conds(conds: &[Condition]) -> String {
    conds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn indent(s: &str) -> String {
    s.lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

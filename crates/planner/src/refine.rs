//! Post-construction refinement: hoist scan predicates into explicit
//! filter nodes, narrow wide scans with projections, and generate the
//! sort node for ORDER BY.

use crate::plan::{FilterPlan, JoinPlan, Plan, ProjectionPlan, ScanPlan, SortPlan};
use crate::{Planner, Query};
use common::{DbError, DbResult, Rhs, TabCol};
use parser::{SortDirection, Statement};
use std::collections::BTreeSet;

/// Rewrite the tree so predicates live in explicit `Filter` nodes at the
/// lowest point that still sees the tables they mention. Scans come out
/// bare: their stored conditions (and the executor's `fed_conds` copy)
/// move into a filter directly above them.
pub(crate) fn push_filters_down(plan: Plan) -> Plan {
    match plan {
        Plan::Join(join) => {
            let JoinPlan {
                algo,
                left,
                right,
                conds,
            } = join;
            // Every predicate parked on a scan is single-table by
            // construction, so hoisting at the scan arm covers the whole
            // subtree; the join node only recurses.
            let left = push_filters_down(*left);
            let right = push_filters_down(*right);
            Plan::Join(JoinPlan {
                algo,
                left: Box::new(left),
                right: Box::new(right),
                conds,
            })
        }
        Plan::Scan(mut scan) => {
            if scan.conds.is_empty() {
                return Plan::Scan(scan);
            }
            let conds = std::mem::take(&mut scan.conds);
            scan.fed_conds.clear();
            Plan::Filter(FilterPlan {
                child: Box::new(Plan::Scan(scan)),
                conds,
            })
        }
        plan @ (Plan::Filter(_)
        | Plan::Projection(_)
        | Plan::Sort(_)
        | Plan::Dml(_)
        | Plan::Ddl(_)
        | Plan::Other(_)) => plan,
    }
}

impl Planner<'_> {
    /// Narrow multi-table plans with per-scan projections, then wrap the
    /// root in the projection that produces the user's select list.
    pub(crate) fn push_projections_down(&self, plan: Plan, query: &Query) -> Plan {
        let mut needed: BTreeSet<TabCol> = query.cols.iter().cloned().collect();
        for cond in &query.conds {
            needed.insert(cond.lhs.clone());
            if let Rhs::Col(rhs) = &cond.rhs {
                needed.insert(rhs.clone());
            }
        }
        plan.collect_join_columns(&mut needed);

        let plan = if query.tables.len() > 1 && !query.is_select_star && !query.cols.is_empty() {
            self.insert_scan_projections(plan, &needed)
        } else {
            plan
        };

        Plan::Projection(ProjectionPlan {
            child: Box::new(plan),
            cols: query.cols.clone(),
        })
    }

    fn insert_scan_projections(&self, plan: Plan, needed: &BTreeSet<TabCol>) -> Plan {
        match plan {
            Plan::Join(join) => {
                let JoinPlan {
                    algo,
                    left,
                    right,
                    conds,
                } = join;
                let left = self.insert_scan_projections(*left, needed);
                let right = self.insert_scan_projections(*right, needed);
                Plan::Join(JoinPlan {
                    algo,
                    left: Box::new(left),
                    right: Box::new(right),
                    conds,
                })
            }
            Plan::Filter(filter) => {
                let FilterPlan { child, conds } = filter;
                let child = self.insert_scan_projections(*child, needed);
                Plan::Filter(FilterPlan {
                    child: Box::new(child),
                    conds,
                })
            }
            Plan::Scan(scan) => self.project_scan(scan, needed),
            plan @ (Plan::Projection(_)
            | Plan::Sort(_)
            | Plan::Dml(_)
            | Plan::Ddl(_)
            | Plan::Other(_)) => plan,
        }
    }

    /// Wrap a scan in a projection of the columns the query needs from its
    /// table. A projection that would keep every column is skipped.
    fn project_scan(&self, scan: ScanPlan, needed: &BTreeSet<TabCol>) -> Plan {
        let table_cols: Vec<TabCol> = needed
            .iter()
            .filter(|col| col.table == scan.table)
            .cloned()
            .collect();
        if table_cols.is_empty() {
            return Plan::Scan(scan);
        }
        if let Ok(meta) = self.catalog.table(&scan.table)
            && table_cols.len() == meta.schema.columns.len()
        {
            return Plan::Scan(scan);
        }
        Plan::Projection(ProjectionPlan {
            child: Box::new(Plan::Scan(scan)),
            cols: table_cols,
        })
    }

    /// Generate the sort for ORDER BY. The key column is resolved against
    /// the scanned tables' schemas, first name match winning. The root
    /// projection stays on top; the sort slots in beneath it.
    pub(crate) fn apply_sort(&self, plan: Plan, query: &Query) -> DbResult<Plan> {
        let Statement::Select(select) = &query.ast else {
            return Ok(plan);
        };
        let Some(order) = &select.order_by else {
            return Ok(plan);
        };

        let mut key = None;
        for table in &query.tables {
            let meta = self.catalog.table(table)?;
            if meta.schema.column_index(&order.column).is_some() {
                key = Some(TabCol::new(table.clone(), order.column.clone()));
                break;
            }
        }
        let key = key.ok_or_else(|| {
            DbError::Planner(format!("unknown column '{}' in ORDER BY", order.column))
        })?;
        let descending = order.direction == SortDirection::Desc;

        Ok(match plan {
            Plan::Projection(projection) => {
                let ProjectionPlan { child, cols } = projection;
                let sorted = Plan::Sort(SortPlan {
                    child,
                    key,
                    descending,
                });
                Plan::Projection(ProjectionPlan {
                    child: Box::new(sorted),
                    cols,
                })
            }
            other => Plan::Sort(SortPlan {
                child: Box::new(other),
                key,
                descending,
            }),
        })
    }
}

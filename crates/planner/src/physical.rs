//! Physical plan construction: per-table access-path selection and
//! left-deep join assembly driven by the residual join predicates.

use crate::plan::{JoinAlgo, Plan, ScanKind, ScanPlan};
use crate::{Planner, Query};
use common::{Condition, DbError, DbResult};
use std::collections::BTreeSet;

/// Outcome of walking a subtree while placing a cross-tree condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attach {
    /// Neither side of the condition is produced by this subtree.
    NotFound,
    /// The subtree produces the condition's left-hand table.
    Lhs,
    /// The subtree produces the condition's right-hand table.
    Rhs,
    /// The condition has been attached to a join node.
    Attached,
}

/// Remove and return every predicate attributable to `table`: single-sided
/// predicates on one of its columns, and self-referential column
/// comparisons whose two sides both name it. What remains is the residual
/// join predicate list.
pub fn drain_table_conds(conds: &mut Vec<Condition>, table: &str) -> Vec<Condition> {
    let mut taken = Vec::new();
    let mut i = 0;
    while i < conds.len() {
        let cond = &conds[i];
        let single_sided = cond.is_rhs_val() && cond.lhs.table == table;
        let self_referential = cond.lhs.table == table && cond.rhs_table() == Some(table);
        if single_sided || self_referential {
            taken.push(conds.remove(i));
        } else {
            i += 1;
        }
    }
    taken
}

/// One-shot transfer of a table's scan out of its slot, recording the
/// table as joined. Returns `None` if the table is unknown or its scan was
/// already consumed.
fn take_scan(
    scans: &mut [Option<Plan>],
    tables: &[String],
    table: &str,
    joined: &mut Vec<String>,
) -> Option<Plan> {
    let idx = tables.iter().position(|t| t == table)?;
    let plan = scans[idx].take()?;
    joined.push(table.to_string());
    Some(plan)
}

/// Place a condition whose tables are both already joined. Recurses
/// left-first; when one child produces the left-hand table and the other
/// the right-hand table, the condition lands on that join node, flipped if
/// needed so its left side keeps naming the left subtree.
pub(crate) fn attach_cond(cond: &mut Option<Condition>, plan: &mut Plan) -> Attach {
    match plan {
        Plan::Scan(scan) => match cond.as_ref() {
            Some(c) if scan.table == c.lhs.table => Attach::Lhs,
            Some(c) if c.rhs_table() == Some(scan.table.as_str()) => Attach::Rhs,
            _ => Attach::NotFound,
        },
        Plan::Join(join) => {
            let left = attach_cond(cond, &mut join.left);
            if left == Attach::Attached {
                return Attach::Attached;
            }
            let right = attach_cond(cond, &mut join.right);
            if right == Attach::Attached {
                return Attach::Attached;
            }
            if left == Attach::NotFound || right == Attach::NotFound {
                // Report whichever side was seen, if any.
                return if left == Attach::NotFound { right } else { left };
            }
            if let Some(mut owned) = cond.take() {
                if left == Attach::Rhs {
                    owned.swap_sides();
                }
                join.conds.push(owned);
            }
            Attach::Attached
        }
        Plan::Filter(_)
        | Plan::Projection(_)
        | Plan::Sort(_)
        | Plan::Dml(_)
        | Plan::Ddl(_)
        | Plan::Other(_) => Attach::NotFound,
    }
}

impl Planner<'_> {
    /// Decide whether the given predicates can drive an index scan on
    /// `table`. Every single-sided predicate column is a candidate;
    /// single-column indexes are preferred (candidates are checked in
    /// lexicographic order, so ties resolve identically on every run), and
    /// a composite index matching the whole candidate set is the fallback.
    pub(crate) fn matching_index_cols(
        &self,
        table: &str,
        conds: &[Condition],
    ) -> DbResult<Option<Vec<String>>> {
        let mut candidates: BTreeSet<&str> = BTreeSet::new();
        for cond in conds {
            if cond.is_rhs_val() && cond.lhs.table == table {
                candidates.insert(cond.lhs.column.as_str());
            }
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        let meta = self.catalog.table(table)?;
        for col in &candidates {
            let single = vec![col.to_string()];
            if meta.is_indexed(&single) {
                return Ok(Some(single));
            }
        }
        let all: Vec<String> = candidates.into_iter().map(str::to_string).collect();
        if meta.is_indexed(&all) {
            return Ok(Some(all));
        }
        Ok(None)
    }

    /// Choose the access path for one table and build its scan node. The
    /// scan stores the predicates twice: `conds` for the planner's later
    /// refinement and `fed_conds` for the executor's record-time filter.
    pub(crate) fn scan_plan_for(&self, table: &str, conds: Vec<Condition>) -> DbResult<Plan> {
        let (kind, index_cols) = match self.matching_index_cols(table, &conds)? {
            Some(cols) => (ScanKind::IndexScan, cols),
            None => (ScanKind::SeqScan, Vec::new()),
        };
        Ok(Plan::Scan(ScanPlan {
            kind,
            table: table.to_string(),
            fed_conds: conds.clone(),
            conds,
            index_cols,
        }))
    }

    /// Fold every scanned table into a single relation: pick access paths,
    /// seed a join from the first residual predicate, extend the tree
    /// left-deep one predicate at a time, and sweep up unconnected tables
    /// as Cartesian products.
    pub(crate) fn make_one_rel(&self, query: &Query) -> DbResult<Plan> {
        let tables = &query.tables;
        if tables.is_empty() {
            return Err(DbError::Planner("query references no tables".into()));
        }

        // The envelope keeps its predicate list for the refinement passes;
        // construction consumes a working copy.
        let mut conds = query.conds.clone();

        let mut scans: Vec<Option<Plan>> = Vec::with_capacity(tables.len());
        for table in tables {
            let table_conds = drain_table_conds(&mut conds, table);
            scans.push(Some(self.scan_plan_for(table, table_conds)?));
        }

        if tables.len() == 1 {
            return scans[0]
                .take()
                .ok_or_else(|| DbError::Planner("scan slot already consumed".into()));
        }

        // Join predicates are processed in table order so the tree grows
        // off the pair the join-order pass ranked cheapest.
        let position = |t: &str| tables.iter().position(|x| x == t).unwrap_or(usize::MAX);
        conds.sort_by_key(|c| {
            let l = position(&c.lhs.table);
            let r = c.rhs_table().map(&position).unwrap_or(usize::MAX);
            (l.max(r), l.min(r))
        });

        let mut joined: Vec<String> = Vec::new();
        let mut root = if conds.is_empty() {
            scans[0]
                .take()
                .ok_or_else(|| DbError::Planner("scan slot already consumed".into()))?
        } else {
            let first = conds.remove(0);
            let rhs_table = first.rhs_table().map(str::to_string).ok_or_else(|| {
                DbError::Planner(format!("stray predicate '{first}' has no join target"))
            })?;
            let left = take_scan(&mut scans, tables, &first.lhs.table, &mut joined)
                .ok_or_else(|| {
                    DbError::Planner(format!("no scan available for '{}'", first.lhs.table))
                })?;
            let right =
                take_scan(&mut scans, tables, &rhs_table, &mut joined).ok_or_else(|| {
                    DbError::Planner(format!("no scan available for '{rhs_table}'"))
                })?;
            let algo = self.seed_join_algo()?;
            let mut root = Plan::join(algo, left, right, vec![first]);

            while !conds.is_empty() {
                let mut cond = conds.remove(0);
                let rhs_table = cond.rhs_table().map(str::to_string).ok_or_else(|| {
                    DbError::Planner(format!("stray predicate '{cond}' has no join target"))
                })?;
                let lhs_table = cond.lhs.table.clone();
                let left_new = if joined.contains(&lhs_table) {
                    None
                } else {
                    take_scan(&mut scans, tables, &lhs_table, &mut joined)
                };
                let right_new = if joined.contains(&rhs_table) {
                    None
                } else {
                    take_scan(&mut scans, tables, &rhs_table, &mut joined)
                };

                match (left_new, right_new) {
                    (Some(left), Some(right)) => {
                        // Two fresh tables join each other first; the pair
                        // attaches to the existing tree as a cross product.
                        let inner = Plan::join(JoinAlgo::NestLoop, left, right, vec![cond]);
                        root = Plan::join(JoinAlgo::NestLoop, inner, root, Vec::new());
                    }
                    (Some(new_side), None) => {
                        // The new table entered on the condition's left;
                        // flip the condition so its left side keeps naming
                        // the existing tree.
                        cond.swap_sides();
                        root = Plan::join(JoinAlgo::NestLoop, root, new_side, vec![cond]);
                    }
                    (None, Some(new_side)) => {
                        root = Plan::join(JoinAlgo::NestLoop, root, new_side, vec![cond]);
                    }
                    (None, None) => {
                        let mut slot = Some(cond);
                        attach_cond(&mut slot, &mut root);
                    }
                }
            }
            root
        };

        // Cartesian fallback: tables no predicate reached join in as plain
        // cross products.
        for slot in scans.iter_mut() {
            if let Some(scan) = slot.take() {
                root = Plan::join(JoinAlgo::NestLoop, scan, root, Vec::new());
            }
        }

        Ok(root)
    }

    /// Pick the join algorithm for the seed join from the session knobs.
    fn seed_join_algo(&self) -> DbResult<JoinAlgo> {
        match (
            self.config.enable_nestedloop_join,
            self.config.enable_sortmerge_join,
        ) {
            (true, _) => Ok(JoinAlgo::NestLoop),
            (false, true) => Ok(JoinAlgo::SortMerge),
            (false, false) => Err(DbError::NoJoinExecutorSelected),
        }
    }
}

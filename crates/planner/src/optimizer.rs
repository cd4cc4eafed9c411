//! Logical rewrites applied to the query envelope before physical
//! construction: predicate pushdown, needed-column analysis for projection
//! pushdown, and greedy cardinality-driven join ordering.

use crate::{Planner, Query};
use common::{Condition, DbResult, Rhs, TabCol};
use parser::Statement;
use std::collections::{BTreeSet, HashMap};

/// Assumed heap-page utilization when estimating row counts from page
/// statistics.
const PAGE_FILL_FACTOR: f64 = 0.7;

/// Row-count estimate used when a table has no readable statistics.
const DEFAULT_TABLE_CARDINALITY: usize = 1000;

/// Join ordering only pays off once at least this many tables are joined.
const MIN_TABLES_FOR_JOIN_ORDERING: usize = 3;

impl Planner<'_> {
    /// Apply the logical rewrite pipeline. Only SELECT bodies are
    /// rewritten; every other statement kind passes through untouched.
    pub(crate) fn optimize_logical(&self, query: &mut Query) -> DbResult<()> {
        if !matches!(query.ast, Statement::Select(_)) {
            return Ok(());
        }
        self.predicate_pushdown(query);
        self.projection_pushdown(query);
        self.optimize_join_order(query);
        Ok(())
    }

    /// Logical predicate pushdown. Single-table predicates migrate into
    /// scans during physical construction and the refinement pass places
    /// explicit filters, so there is nothing to rewrite here yet; the hook
    /// stays in the pipeline and is idempotent.
    fn predicate_pushdown(&self, _query: &mut Query) {}

    /// Record the set of columns the query actually needs: the select
    /// list, both sides of every predicate, and the ORDER BY key.
    fn projection_pushdown(&self, query: &mut Query) {
        let mut needed: BTreeSet<TabCol> = query.cols.iter().cloned().collect();
        for cond in &query.conds {
            needed.insert(cond.lhs.clone());
            if let Rhs::Col(rhs) = &cond.rhs {
                needed.insert(rhs.clone());
            }
        }
        if let Statement::Select(select) = &query.ast
            && let Some(order) = &select.order_by
        {
            for table in &query.tables {
                if let Ok(meta) = self.catalog.table(table)
                    && meta.schema.column_index(&order.column).is_some()
                {
                    needed.insert(TabCol::new(table.clone(), order.column.clone()));
                    break;
                }
            }
        }
        query.needed_cols = needed;
    }

    /// Greedy join ordering: start from the two smallest tables and keep
    /// appending the cheapest table connected to the chosen set.
    fn optimize_join_order(&self, query: &mut Query) {
        if query.tables.len() < MIN_TABLES_FOR_JOIN_ORDERING {
            return;
        }
        let stats: Vec<(String, usize)> = query
            .tables
            .iter()
            .map(|t| (t.clone(), self.estimate_cardinality(t)))
            .collect();
        query.tables = greedy_join_order(&stats, &query.conds);
    }

    /// Estimate a table's row count from its heap-file page statistics.
    /// The first page is the file header; the rest are assumed
    /// `PAGE_FILL_FACTOR` full. Missing statistics fall back to a fixed
    /// default rather than failing the query.
    pub(crate) fn estimate_cardinality(&self, table: &str) -> usize {
        match self.catalog.file_handle(table) {
            Ok(handle) => {
                let hdr = handle.header();
                let pages = hdr.num_pages.saturating_sub(1) as usize;
                let records = pages * hdr.num_records_per_page as usize;
                ((records as f64 * PAGE_FILL_FACTOR) as usize).max(1)
            }
            Err(_) => DEFAULT_TABLE_CARDINALITY,
        }
    }
}

/// Order tables for a left-deep join: ascending by estimated cardinality,
/// preferring tables that share a join edge with the already-chosen set. A
/// table with no edge into the chosen set is deferred while connected
/// candidates remain, then admitted cheapest-first.
fn greedy_join_order(stats: &[(String, usize)], conds: &[Condition]) -> Vec<String> {
    let mut edges: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for cond in conds {
        if let Rhs::Col(rhs) = &cond.rhs {
            edges
                .entry(cond.lhs.table.as_str())
                .or_default()
                .insert(rhs.table.as_str());
            edges
                .entry(rhs.table.as_str())
                .or_default()
                .insert(cond.lhs.table.as_str());
        }
    }

    // Stable sort: equal cardinalities keep their query order, so the
    // result is deterministic for a given input.
    let mut sorted: Vec<&(String, usize)> = stats.iter().collect();
    sorted.sort_by_key(|(_, card)| *card);

    let mut order: Vec<String> = Vec::with_capacity(stats.len());
    let mut used: BTreeSet<&str> = BTreeSet::new();
    for (table, _) in sorted.iter().take(2) {
        order.push(table.clone());
        used.insert(table.as_str());
    }

    while used.len() < sorted.len() {
        let next = sorted
            .iter()
            .find(|(table, _)| {
                !used.contains(table.as_str())
                    && edges
                        .get(table.as_str())
                        .is_some_and(|peers| peers.iter().any(|p| used.contains(p)))
            })
            .or_else(|| sorted.iter().find(|(table, _)| !used.contains(table.as_str())));
        match next {
            Some((table, _)) => {
                order.push(table.clone());
                used.insert(table.as_str());
            }
            None => break,
        }
    }

    order
}

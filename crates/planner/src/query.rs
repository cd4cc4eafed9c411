use common::{Condition, SetClause, TabCol};
use parser::Statement;
use std::collections::{BTreeSet, HashMap};
use types::Value;

/// The planner's input envelope: a parsed statement annotated by the
/// semantic analyzer with resolved tables, select columns, predicates,
/// assignments, and insert values.
///
/// `tables` is ordered; the join-order pass may rewrite it. `aliases`
/// maps an alias to the underlying table name, and downstream resolution
/// treats the alias as the effective table name. `needed_cols` is filled
/// in by the logical projection-pushdown pass.
#[derive(Clone, Debug, bon::Builder)]
pub struct Query {
    pub ast: Statement,
    #[builder(default)]
    pub tables: Vec<String>,
    #[builder(default)]
    pub cols: Vec<TabCol>,
    #[builder(default)]
    pub conds: Vec<Condition>,
    #[builder(default)]
    pub set_clauses: Vec<SetClause>,
    #[builder(default)]
    pub values: Vec<Value>,
    #[builder(default)]
    pub aliases: HashMap<String, String>,
    #[builder(default)]
    pub is_select_star: bool,
    #[builder(default)]
    pub needed_cols: BTreeSet<TabCol>,
}

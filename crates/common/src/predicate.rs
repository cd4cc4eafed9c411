//! Predicate vocabulary shared by the planner and the executor: qualified
//! column references, comparison operators, and flat `column op value` /
//! `column op column` conditions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use types::{ColType, Value};

/// A qualified column reference. The optional alias is display-only:
/// equality, ordering, and hashing consider `(table, column)` alone.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TabCol {
    pub table: String,
    pub column: String,
    pub alias: Option<String>,
}

impl TabCol {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl PartialEq for TabCol {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.column == other.column
    }
}

impl Eq for TabCol {}

impl Hash for TabCol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.table.hash(state);
        self.column.hash(state);
    }
}

impl Ord for TabCol {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.table, &self.column).cmp(&(&other.table, &other.column))
    }
}

impl PartialOrd for TabCol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TabCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.table.is_empty() {
            write!(f, "{}", self.column)
        } else {
            write!(f, "{}.{}", self.table, self.column)
        }
    }
}

/// Binary comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompOp {
    /// The operator that preserves meaning when the two sides of a
    /// comparison trade places: `a op b` is equivalent to
    /// `b op.swapped() a`. This map is an involution.
    pub fn swapped(self) -> CompOp {
        match self {
            CompOp::Eq => CompOp::Eq,
            CompOp::Ne => CompOp::Ne,
            CompOp::Lt => CompOp::Gt,
            CompOp::Gt => CompOp::Lt,
            CompOp::Le => CompOp::Ge,
            CompOp::Ge => CompOp::Le,
        }
    }

    /// Evaluate the operator against an ordering between two operands.
    pub fn matches(self, ord: Ordering) -> bool {
        match self {
            CompOp::Eq => ord == Ordering::Equal,
            CompOp::Ne => ord != Ordering::Equal,
            CompOp::Lt => ord == Ordering::Less,
            CompOp::Le => ord != Ordering::Greater,
            CompOp::Gt => ord == Ordering::Greater,
            CompOp::Ge => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompOp::Eq => "=",
            CompOp::Ne => "<>",
            CompOp::Lt => "<",
            CompOp::Le => "<=",
            CompOp::Gt => ">",
            CompOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

/// Right-hand side of a condition: a literal or another column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Rhs {
    Val(Value),
    Col(TabCol),
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Val(v) => write!(f, "{v}"),
            Rhs::Col(c) => write!(f, "{c}"),
        }
    }
}

/// A flat comparison predicate. A literal right-hand side makes the
/// condition single-sided (testable inside one table's scan); a column
/// right-hand side makes it join-shaped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub lhs: TabCol,
    pub op: CompOp,
    pub rhs: Rhs,
}

impl Condition {
    pub fn with_val(lhs: TabCol, op: CompOp, value: Value) -> Self {
        Self {
            lhs,
            op,
            rhs: Rhs::Val(value),
        }
    }

    pub fn with_col(lhs: TabCol, op: CompOp, rhs: TabCol) -> Self {
        Self {
            lhs,
            op,
            rhs: Rhs::Col(rhs),
        }
    }

    pub fn is_rhs_val(&self) -> bool {
        matches!(self.rhs, Rhs::Val(_))
    }

    /// The table referenced by the right-hand side, if it is a column.
    pub fn rhs_table(&self) -> Option<&str> {
        match &self.rhs {
            Rhs::Col(c) => Some(&c.table),
            Rhs::Val(_) => None,
        }
    }

    /// Swap the two sides of a join-shaped condition, applying the
    /// operator involution so the predicate keeps its meaning. A
    /// single-sided condition is left untouched.
    pub fn swap_sides(&mut self) {
        if let Rhs::Col(rhs) = &mut self.rhs {
            std::mem::swap(&mut self.lhs, rhs);
            self.op = self.op.swapped();
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

/// `SET column = value` assignment in an UPDATE statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    pub column: String,
    pub value: Value,
}

impl SetClause {
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// Column definition carried by CREATE TABLE plans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColDef {
    pub name: String,
    pub ty: ColType,
}

impl ColDef {
    pub fn new(name: impl Into<String>, ty: ColType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

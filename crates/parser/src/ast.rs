use common::Knob;
use serde::{Deserialize, Serialize};
use types::{ColType, Value};

/// Sort direction for ORDER BY clauses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// ORDER BY clause: a single column and a direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// A table in a FROM list, possibly aliased.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }
}

/// An entry in a SELECT list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    Wildcard,
    Column {
        table: Option<String>,
        column: String,
    },
}

/// SELECT statement body. Predicates are resolved by the semantic analyzer
/// and travel in the `Query` envelope, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub items: Vec<SelectItem>,
    pub tables: Vec<TableRef>,
    pub order_by: Option<OrderBy>,
}

impl SelectStmt {
    pub fn has_sort(&self) -> bool {
        self.order_by.is_some()
    }
}

/// Column definition in a CREATE TABLE field list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A single element of a CREATE TABLE field list. The planner only accepts
/// plain column definitions; table-level constraints are rejected there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Col(ColumnDef),
    PrimaryKey(Vec<String>),
}

/// Transaction control verbs, intercepted by the session layer before
/// planning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnOp {
    Begin,
    Commit,
    Abort,
    Rollback,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    CreateTable {
        table: String,
        fields: Vec<Field>,
    },
    DropTable {
        table: String,
    },
    CreateIndex {
        table: String,
        columns: Vec<String>,
    },
    DropIndex {
        table: String,
        columns: Vec<String>,
    },
    ShowIndex {
        table: String,
    },
    Insert {
        table: String,
        values: Vec<Value>,
    },
    Delete {
        table: String,
    },
    Update {
        table: String,
    },
    Select(SelectStmt),
    Explain(Box<Statement>),
    Set {
        knob: Knob,
        value: bool,
    },
    Txn(TxnOp),
}

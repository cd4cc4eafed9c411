//! Abstract syntax tree for the SQL dialect.
//!
//! The grammar itself (lexer + LALR parser) lives outside this workspace;
//! these types are the contract between the parse phase and the planner.
//! The semantic analyzer wraps a `Statement` together with resolved tables,
//! columns, and predicates into the planner's `Query` envelope.

mod ast;

pub use ast::{
    ColumnDef, Field, OrderBy, SelectItem, SelectStmt, SortDirection, Statement, TableRef, TxnOp,
};

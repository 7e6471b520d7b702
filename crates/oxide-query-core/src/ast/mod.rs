//! Abstract Syntax Tree (AST) types for query expressions and statements.

mod function;
mod node;
mod statement;

pub use function::{AggregateCall, ArgSlot, FunctionCall, Params, Returns, Signature};
pub use node::{BinaryOp, Case, ColumnRef, InSet, Node, TableId, TableRef, UnaryOp};
pub use statement::{
    CompoundOp, ConflictResolution, Cte, Delete, Insert, InsertSource, Join, JoinConstraint,
    JoinKind, Limit, NullOrdering, OrderDirection, OrderKey, Select, Update, Upsert, UpsertAction,
    With,
};

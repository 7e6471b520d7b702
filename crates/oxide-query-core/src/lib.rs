//! # oxide-query-core
//!
//! A typed query-expression compiler for SQLite.
//!
//! Queries are built as immutable trees of [`ast::Node`] values through the
//! functions in [`builder`]. Columns are referenced through marker types
//! generated by `#[derive(Table)]`, so a misspelled column does not compile.
//! Before a tree reaches the database it goes through three passes:
//!
//! - [`infer_type`] computes the row type and rejects ill-typed trees
//! - [`serialize`] renders SQLite SQL, with `?` placeholders or inline values
//! - [`bind`] walks the tree and writes every parameter into a [`BindSink`]
//!
//! Placeholders are emitted in exactly the order the walker binds them.
//!
//! ```rust
//! use oxide_query_core::ast::Node;
//! use oxide_query_core::builder::{cte_column, gt, lit, select, with};
//! use oxide_query_core::{bind, compile, RecordingSink, Scalar, SchemaRegistry, TypeTag};
//!
//! let schema = SchemaRegistry::builder().build().unwrap();
//! let numbers = select(lit(1).alias("n")).as_cte("numbers");
//! let query: Node = with(
//!     vec![numbers],
//!     select(cte_column("numbers", "n")).filter(gt(cte_column("numbers", "n"), 0)),
//! )
//! .into();
//!
//! let compiled = compile(&query, &schema).unwrap();
//! assert_eq!(
//!     compiled.sql,
//!     r#"WITH "numbers" AS (SELECT 1 AS "n") SELECT "n" FROM "numbers" WHERE "n" > ?"#
//! );
//! assert_eq!(compiled.result_type, TypeTag::Int);
//!
//! let mut sink = RecordingSink::new();
//! assert_eq!(bind(&query, &mut sink).unwrap(), 1);
//! assert_eq!(sink.values(), vec![Scalar::Int(0)]);
//! ```

pub mod ast;
pub mod builder;
mod compile;
pub mod error;
mod infer;
pub mod schema;
pub mod serializer;
pub mod types;
pub mod value;
pub mod walker;

#[cfg(test)]
mod fixtures;

pub use compile::{compile, dump, CompiledQuery};
pub use error::{BindError, Error, Result, SchemaError, TypeError};
pub use infer::infer_type;
pub use schema::{Column, ColumnDescriptor, Mapped, Record, SchemaRegistry, TableDescriptor};
pub use serializer::{serialize, Context};
pub use types::{common_type, TypeTag};
pub use value::{Bindable, PointerValue, Scalar, ToScalar};
pub use walker::{bind, bind_values, walk, BindSink, RecordingSink, Visitor};

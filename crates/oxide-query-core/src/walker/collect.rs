//! Visitors that gather tables and parameters.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use super::Visitor;
use crate::ast::{ColumnRef, TableId, TableRef};
use crate::error::SchemaError;
use crate::schema::SchemaRegistry;
use crate::value::Bindable;

/// Collects the distinct `(table name, alias)` pairs referenced by columns,
/// asterisks and rowids, without looking inside subqueries.
///
/// Common table expressions are collected by their moniker. The first
/// unmapped table stops the walk and is reported by [`TableCollector::finish`].
#[derive(Debug)]
pub struct TableCollector<'s> {
    schema: &'s SchemaRegistry,
    tables: BTreeSet<(String, Option<String>)>,
    error: Option<SchemaError>,
}

impl<'s> TableCollector<'s> {
    /// Creates an empty collector resolving names through `schema`.
    #[must_use]
    pub const fn new(schema: &'s SchemaRegistry) -> Self {
        Self {
            schema,
            tables: BTreeSet::new(),
            error: None,
        }
    }

    /// Returns the collected tables ordered by name then alias.
    ///
    /// # Errors
    ///
    /// Returns the schema error that stopped the walk, if any.
    pub fn finish(self) -> Result<BTreeSet<(String, Option<String>)>, SchemaError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.tables),
        }
    }

    fn record(&mut self, table: &TableId, alias: Option<&String>) -> ControlFlow<()> {
        let name = match table {
            TableId::Mapped(key) => match self.schema.table_name(*key) {
                Ok(name) => name.to_owned(),
                Err(err) => {
                    self.error = Some(err);
                    return ControlFlow::Break(());
                }
            },
            TableId::Moniker(moniker) => moniker.clone(),
        };
        self.tables.insert((name, alias.cloned()));
        ControlFlow::Continue(())
    }
}

impl Visitor for TableCollector<'_> {
    fn visit_column(&mut self, column: &ColumnRef) -> ControlFlow<()> {
        self.record(&column.table, column.alias.as_ref())
    }

    fn visit_table(&mut self, table: &TableRef) -> ControlFlow<()> {
        self.record(&table.table, table.alias.as_ref())
    }

    fn descend_into_subqueries(&self) -> bool {
        false
    }
}

/// Collects every bound parameter in serialization order.
#[derive(Debug, Default)]
pub struct ParameterCollector {
    /// Parameters seen so far.
    pub parameters: Vec<Bindable>,
}

impl ParameterCollector {
    /// Creates an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self { parameters: vec![] }
    }
}

impl Visitor for ParameterCollector {
    fn visit_parameter(&mut self, value: &Bindable) -> ControlFlow<()> {
        self.parameters.push(value.clone());
        ControlFlow::Continue(())
    }
}

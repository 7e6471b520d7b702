//! Statements built from record values and primary keys.
//!
//! These builders need the registered table metadata to know which columns
//! are written and which form the key, so they take the registry.

use super::{and, asterisk, eq, insert_into};
use crate::ast::{
    ColumnRef, ConflictResolution, Delete, Insert, InsertSource, Node, Select, TableId, Update,
};
use crate::error::SchemaError;
use crate::schema::{
    ColumnDescriptor, ColumnId, Mapped, Record, SchemaRegistry, TableDescriptor, TypeKey,
};
use crate::value::{Bindable, Scalar};

fn row_of<'a, R: Record>(
    record: &R,
    columns: impl Iterator<Item = &'a ColumnDescriptor>,
) -> Vec<Node> {
    let mut values = record.values();
    columns
        .map(|column| {
            let value = values
                .iter()
                .position(|(member, _)| *member == column.member)
                .map_or_else(|| Bindable::from_scalar(Scalar::Null), |i| values.swap_remove(i).1);
            Node::Parameter(value)
        })
        .collect()
}

fn members<'a>(columns: impl Iterator<Item = &'a ColumnDescriptor>) -> Vec<ColumnId> {
    columns.map(|c| c.member).collect()
}

/// `INSERT INTO t (..) VALUES (..)` for one record, skipping generated
/// columns and an auto-assigned integer primary key.
///
/// # Errors
///
/// Returns `UnmappedType` when `R` is not registered.
pub fn insert_record<R: Record>(
    schema: &SchemaRegistry,
    record: &R,
) -> Result<Insert, SchemaError> {
    let table = schema.resolve_type::<R>()?;
    Ok(insert_into::<R>()
        .columns(&members(table.insertable_columns()))
        .values_row(row_of(record, table.insertable_columns())))
}

/// A multi-row INSERT for `records`, or `None` when there are none.
///
/// # Errors
///
/// Returns `UnmappedType` when `R` is not registered.
pub fn insert_records<R: Record>(
    schema: &SchemaRegistry,
    records: &[R],
) -> Result<Option<Insert>, SchemaError> {
    let table = schema.resolve_type::<R>()?;
    if records.is_empty() {
        return Ok(None);
    }
    let rows = records
        .iter()
        .map(|record| row_of(record, table.insertable_columns()))
        .collect();
    let mut insert = insert_into::<R>().columns(&members(table.insertable_columns()));
    insert.source = InsertSource::Values(rows);
    Ok(Some(insert))
}

/// `REPLACE INTO t (..) VALUES (..)`, writing the primary key as well.
///
/// # Errors
///
/// Returns `UnmappedType` when `R` is not registered.
pub fn replace_record<R: Record>(
    schema: &SchemaRegistry,
    record: &R,
) -> Result<Insert, SchemaError> {
    let table = schema.resolve_type::<R>()?;
    Ok(insert_into::<R>()
        .or(ConflictResolution::Replace)
        .columns(&members(table.replaceable_columns()))
        .values_row(row_of(record, table.replaceable_columns())))
}

/// `UPDATE t SET .. WHERE <pk> = ..` writing every non-key, non-generated
/// column of `record`.
///
/// # Errors
///
/// Returns `UnmappedType`, `MissingPrimaryKey`, or `NoUpdatableColumns`
/// when every column is part of the key or generated.
pub fn update_record<R: Record>(
    schema: &SchemaRegistry,
    record: &R,
) -> Result<Update, SchemaError> {
    let table = schema.resolve_type::<R>()?;
    require_key(table)?;
    let mut values = record.values();
    let mut take = |member: ColumnId| {
        values
            .iter()
            .position(|(m, _)| *m == member)
            .map_or_else(|| Bindable::from_scalar(Scalar::Null), |i| values.swap_remove(i).1)
    };

    let assignments: Vec<(ColumnId, Node)> = table
        .columns
        .iter()
        .filter(|c| !c.is_generated && !table.is_primary_key(c.member))
        .map(|c| (c.member, Node::Parameter(take(c.member))))
        .collect();
    if assignments.is_empty() {
        return Err(SchemaError::NoUpdatableColumns(table.name.clone()));
    }
    let keys: Vec<Bindable> = table.primary_key_columns.iter().map(|pk| take(*pk)).collect();

    Ok(Update {
        table: TypeKey::of::<R>(),
        conflict: None,
        assignments,
        where_: Some(key_condition::<R>(table, keys)),
    })
}

/// `SELECT t.* FROM t WHERE <pk> = ..`
///
/// # Errors
///
/// Returns `UnmappedType`, `MissingPrimaryKey` or `PrimaryKeyArity`.
pub fn get_by_id<T: Mapped>(
    schema: &SchemaRegistry,
    keys: &[Scalar],
) -> Result<Select, SchemaError> {
    let table = schema.resolve_type::<T>()?;
    let condition = keyed(table, keys).map(|keys| key_condition::<T>(table, keys))?;
    Ok(super::select(asterisk::<T>()).from::<T>().filter(condition))
}

/// `DELETE FROM t WHERE <pk> = ..`
///
/// # Errors
///
/// Returns `UnmappedType`, `MissingPrimaryKey` or `PrimaryKeyArity`.
pub fn remove_by_id<T: Mapped>(
    schema: &SchemaRegistry,
    keys: &[Scalar],
) -> Result<Delete, SchemaError> {
    let table = schema.resolve_type::<T>()?;
    let condition = keyed(table, keys).map(|keys| key_condition::<T>(table, keys))?;
    Ok(super::delete_from::<T>().filter(condition))
}

fn require_key(table: &TableDescriptor) -> Result<(), SchemaError> {
    if table.primary_key_columns.is_empty() {
        return Err(SchemaError::MissingPrimaryKey(table.name.clone()));
    }
    Ok(())
}

fn keyed(table: &TableDescriptor, keys: &[Scalar]) -> Result<Vec<Bindable>, SchemaError> {
    require_key(table)?;
    if keys.len() != table.primary_key_columns.len() {
        return Err(SchemaError::PrimaryKeyArity {
            table: table.name.clone(),
            expected: table.primary_key_columns.len(),
            found: keys.len(),
        });
    }
    Ok(keys.iter().cloned().map(Bindable::from_scalar).collect())
}

fn key_condition<T: Mapped>(table: &TableDescriptor, keys: Vec<Bindable>) -> Node {
    table
        .primary_key_columns
        .iter()
        .zip(keys)
        .map(|(member, key)| {
            let column = ColumnRef {
                table: TableId::Mapped(TypeKey::of::<T>()),
                member: String::from(*member),
                alias: None,
            };
            eq(column, Node::Parameter(key))
        })
        .reduce(|acc, next| and(acc, next))
        .unwrap_or_else(|| Node::Literal(Bindable::new(false)))
}

impl Insert {
    fn values_row(mut self, row: Vec<Node>) -> Self {
        self.source = InsertSource::Values(vec![row]);
        self
    }
}

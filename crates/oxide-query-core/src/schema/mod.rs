//! Schema metadata for mapped records.
//!
//! A mapped record is a Rust type bound to one table. Its metadata lives in a
//! [`TableDescriptor`], normally produced by `#[derive(Table)]`, and all
//! descriptors are collected once into a read-only [`SchemaRegistry`].

mod registry;

use std::any::{type_name, TypeId};

pub use registry::{RegistryBuilder, SchemaRegistry};

use crate::types::TypeTag;
use crate::value::{Bindable, ToScalar};

/// Identity of a column inside its record: the Rust field name.
pub type ColumnId = &'static str;

/// Identity of a mapped record type.
///
/// Equality and hashing use the `TypeId` only; the name is kept for error
/// messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the `TypeId`.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the Rust type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Trait for table metadata.
///
/// Implemented by `#[derive(Table)]` for the record struct itself.
pub trait Mapped: 'static {
    /// Returns the table descriptor.
    fn descriptor() -> TableDescriptor;
}

/// Trait for records whose field values can be extracted for INSERT, REPLACE
/// and UPDATE statements.
pub trait Record: Mapped {
    /// Returns every field value in declaration order.
    fn values(&self) -> Vec<(ColumnId, Bindable)>;
}

/// Trait for typed column markers.
///
/// Implemented by the column types generated by `#[derive(Table)]`, so that
/// `col::<UserColumns::Id>()` can only name a real member of `User`.
pub trait Column {
    /// The record this column belongs to.
    type Table: Mapped;

    /// The Rust type of this column.
    type Type: ToScalar;

    /// The member identity.
    const MEMBER: ColumnId;
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Member identity (Rust field name).
    pub member: ColumnId,
    /// SQL column name.
    pub name: String,
    /// Declared type, never `Optional`.
    pub declared_type: TypeTag,
    /// Whether the column admits NULL.
    pub nullable: bool,
    /// Whether the column is generated (`GENERATED ALWAYS AS`).
    pub is_generated: bool,
}

impl ColumnDescriptor {
    /// Creates a NOT NULL column.
    #[must_use]
    pub fn new(member: ColumnId, name: impl Into<String>, declared_type: TypeTag) -> Self {
        let nullable = declared_type.is_nullable();
        Self {
            member,
            name: name.into(),
            declared_type: declared_type.non_null().clone(),
            nullable,
            is_generated: false,
        }
    }

    /// Creates a column whose type and nullability follow the Rust type `T`.
    #[must_use]
    pub fn of<T: ToScalar>(member: ColumnId, name: impl Into<String>) -> Self {
        Self::new(member, name, T::type_tag())
    }

    /// Marks the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as generated.
    #[must_use]
    pub const fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    /// Returns the inferred type of a reference to this column.
    #[must_use]
    pub fn value_type(&self) -> TypeTag {
        if self.nullable {
            TypeTag::optional(self.declared_type.clone())
        } else {
            self.declared_type.clone()
        }
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// SQL table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDescriptor>,
    /// Primary key members, in key order.
    pub primary_key_columns: Vec<ColumnId>,
}

impl TableDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            primary_key_columns: vec![],
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a column and adds it to the primary key.
    #[must_use]
    pub fn key_column(mut self, column: ColumnDescriptor) -> Self {
        self.primary_key_columns.push(column.member);
        self.columns.push(column);
        self
    }

    /// Looks up a column by member identity.
    #[must_use]
    pub fn find(&self, member: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.member == member)
    }

    /// Looks up a column by SQL name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns whether `member` is part of the primary key.
    #[must_use]
    pub fn is_primary_key(&self, member: &str) -> bool {
        self.primary_key_columns.iter().any(|pk| *pk == member)
    }

    /// Returns the full row type.
    #[must_use]
    pub fn row_type(&self) -> TypeTag {
        TypeTag::Tuple(self.columns.iter().map(ColumnDescriptor::value_type).collect())
    }

    /// Returns whether SQLite assigns this column on INSERT: the sole
    /// INTEGER primary key aliases the rowid.
    #[must_use]
    pub fn is_auto_key(&self, column: &ColumnDescriptor) -> bool {
        self.primary_key_columns.len() == 1
            && self.primary_key_columns[0] == column.member
            && column.declared_type == TypeTag::Int
    }

    /// Returns the columns a record INSERT writes.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| !c.is_generated && !self.is_auto_key(c))
    }

    /// Returns the columns a record REPLACE writes.
    pub fn replaceable_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.is_generated)
    }
}

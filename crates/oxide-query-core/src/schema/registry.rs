//! The read-only schema registry.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{ColumnDescriptor, Mapped, TableDescriptor, TypeKey};
use crate::error::SchemaError;
use crate::types::TypeTag;

#[derive(Debug)]
struct Entry {
    keyed: bool,
    descriptor: TableDescriptor,
}

/// Collects table registrations; [`build`](Self::build) validates them all at
/// once and produces the immutable [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<(TypeId, Entry)>,
}

impl RegistryBuilder {
    /// Registers the table of a mapped record.
    #[must_use]
    pub fn register<T: Mapped>(self) -> Self {
        self.push::<T>(T::descriptor(), false)
    }

    /// Registers the table of a mapped record on which primary-key statements
    /// (`get_by_id`, `remove_by_id`, `update_record`) will be built.
    #[must_use]
    pub fn register_keyed<T: Mapped>(self) -> Self {
        self.push::<T>(T::descriptor(), true)
    }

    /// Registers an explicit descriptor under the identity of `T`.
    #[must_use]
    pub fn table<T: 'static>(self, descriptor: TableDescriptor) -> Self {
        self.push::<T>(descriptor, false)
    }

    fn push<T: 'static>(mut self, descriptor: TableDescriptor, keyed: bool) -> Self {
        self.entries.push((
            TypeId::of::<T>(),
            Entry {
                keyed,
                descriptor,
            },
        ));
        self
    }

    /// Validates every registration and freezes the registry.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a table name or type registered twice,
    /// a member or column name declared twice, a primary key naming an
    /// unknown member, or a keyed table without primary key.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut tables = HashMap::with_capacity(self.entries.len());
        let mut names = HashSet::new();

        for (id, entry) in self.entries {
            let table = &entry.descriptor;
            if !names.insert(table.name.clone()) || tables.contains_key(&id) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }
            validate_columns(table)?;
            if entry.keyed && table.primary_key_columns.is_empty() {
                return Err(SchemaError::MissingPrimaryKey(table.name.clone()));
            }
            tables.insert(id, entry);
        }

        debug!(tables = tables.len(), "schema registry built");
        Ok(SchemaRegistry { tables })
    }
}

fn validate_columns(table: &TableDescriptor) -> Result<(), SchemaError> {
    let mut members = HashSet::new();
    let mut names = HashSet::new();
    for column in &table.columns {
        if !members.insert(column.member) {
            return Err(SchemaError::DuplicateColumn {
                table: table.name.clone(),
                column: column.member.to_string(),
            });
        }
        if !names.insert(column.name.as_str()) {
            return Err(SchemaError::DuplicateColumn {
                table: table.name.clone(),
                column: column.name.clone(),
            });
        }
    }
    for pk in &table.primary_key_columns {
        if !members.contains(pk) {
            return Err(SchemaError::ColumnNotFound {
                table: table.name.clone(),
                member: (*pk).to_string(),
            });
        }
    }
    Ok(())
}

/// Immutable mapping from mapped-record identity to table metadata.
///
/// Built once before any query is compiled and shared by reference
/// afterwards; there is no mutation API.
#[derive(Debug)]
pub struct SchemaRegistry {
    tables: HashMap<TypeId, Entry>,
}

impl SchemaRegistry {
    /// Starts a new registration.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolves a mapped identity to its table.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when the identity was never registered.
    pub fn resolve(&self, key: TypeKey) -> Result<&TableDescriptor, SchemaError> {
        self.tables
            .get(&key.id())
            .map(|entry| &entry.descriptor)
            .ok_or_else(|| SchemaError::UnmappedType {
                type_name: key.name().to_string(),
            })
    }

    /// Resolves the table of `T`.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when `T` was never registered.
    pub fn resolve_type<T: 'static>(&self) -> Result<&TableDescriptor, SchemaError> {
        self.resolve(TypeKey::of::<T>())
    }

    /// Returns the SQL table name of a mapped identity.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when the identity was never registered.
    pub fn table_name(&self, key: TypeKey) -> Result<&str, SchemaError> {
        self.resolve(key).map(|table| table.name.as_str())
    }

    /// Returns the column metadata of `member`.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` or `ColumnNotFound`.
    pub fn column(&self, key: TypeKey, member: &str) -> Result<&ColumnDescriptor, SchemaError> {
        let table = self.resolve(key)?;
        table.find(member).ok_or_else(|| SchemaError::ColumnNotFound {
            table: table.name.clone(),
            member: member.to_string(),
        })
    }

    /// Returns the SQL column name of `member`.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` or `ColumnNotFound`.
    pub fn column_name(&self, key: TypeKey, member: &str) -> Result<&str, SchemaError> {
        self.column(key, member).map(|c| c.name.as_str())
    }

    /// Returns the full row type of a mapped identity.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when the identity was never registered.
    pub fn row_type(&self, key: TypeKey) -> Result<TypeTag, SchemaError> {
        self.resolve(key).map(TableDescriptor::row_type)
    }

    /// Returns whether `key` is registered.
    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.tables.contains_key(&key.id())
    }

    /// Iterates over all registered tables, in no particular order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values().map(|entry| &entry.descriptor)
    }

    /// Returns the number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true when no table is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;
    struct Post;
    struct Log;

    impl Mapped for User {
        fn descriptor() -> TableDescriptor {
            TableDescriptor::new("users")
                .key_column(ColumnDescriptor::of::<i64>("id", "id"))
                .column(ColumnDescriptor::of::<String>("name", "user_name"))
        }
    }

    impl Mapped for Log {
        fn descriptor() -> TableDescriptor {
            TableDescriptor::new("log").column(ColumnDescriptor::of::<String>("line", "line"))
        }
    }

    #[test]
    fn test_resolve_and_column_name() {
        let schema = SchemaRegistry::builder().register::<User>().build().unwrap();
        let key = TypeKey::of::<User>();
        assert_eq!(schema.table_name(key).unwrap(), "users");
        assert_eq!(schema.column_name(key, "name").unwrap(), "user_name");
        assert_eq!(schema.len(), 1);
        assert!(schema.contains(key));
        assert!(!schema.contains(TypeKey::of::<Post>()));
    }

    #[test]
    fn test_unmapped_type() {
        let schema = SchemaRegistry::builder().register::<User>().build().unwrap();
        let err = schema.resolve_type::<Post>().unwrap_err();
        assert!(matches!(err, SchemaError::UnmappedType { type_name } if type_name.ends_with("Post")));
    }

    #[test]
    fn test_column_not_found() {
        let schema = SchemaRegistry::builder().register::<User>().build().unwrap();
        let err = schema.column_name(TypeKey::of::<User>(), "age").unwrap_err();
        assert_eq!(
            err,
            SchemaError::ColumnNotFound {
                table: String::from("users"),
                member: String::from("age"),
            }
        );
    }

    #[test]
    fn test_duplicate_table_name_is_reported_at_build() {
        let err = SchemaRegistry::builder()
            .register::<User>()
            .table::<Post>(TableDescriptor::new("users"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateTable(String::from("users")));
    }

    #[test]
    fn test_same_type_twice_is_reported_at_build() {
        let err = SchemaRegistry::builder()
            .register::<User>()
            .table::<User>(TableDescriptor::new("people"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateTable(String::from("people")));
    }

    #[test]
    fn test_keyed_table_without_primary_key() {
        let err = SchemaRegistry::builder()
            .register_keyed::<Log>()
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingPrimaryKey(String::from("log")));

        // Without keyed statements the same table is fine.
        assert!(SchemaRegistry::builder().register::<Log>().build().is_ok());
    }

    #[test]
    fn test_duplicate_column_and_unknown_key() {
        let err = SchemaRegistry::builder()
            .table::<Post>(
                TableDescriptor::new("posts")
                    .column(ColumnDescriptor::of::<i64>("id", "id"))
                    .column(ColumnDescriptor::of::<i64>("other", "id")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { column, .. } if column == "id"));

        let mut posts = TableDescriptor::new("posts");
        posts.primary_key_columns.push("missing");
        let err = SchemaRegistry::builder()
            .table::<Post>(posts)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ColumnNotFound { member, .. } if member == "missing"));
    }
}

//! INSERT builder.

use super::{functions::spread, IntoNode};
use crate::ast::{ConflictResolution, Insert, InsertSource, Node, Select, Upsert, UpsertAction};
use crate::schema::{Column, ColumnId, Mapped, TypeKey};

/// Starts an `INSERT INTO` the table of `T`; without values it inserts
/// `DEFAULT VALUES`.
#[must_use]
pub fn insert_into<T: Mapped>() -> Insert {
    Insert {
        table: TypeKey::of::<T>(),
        conflict: None,
        columns: vec![],
        source: InsertSource::DefaultValues,
        upsert: None,
    }
}

/// `DO NOTHING`
#[must_use]
pub const fn do_nothing() -> UpsertAction {
    UpsertAction::Nothing
}

/// `DO UPDATE SET assignments [WHERE condition]`
#[must_use]
pub fn do_update(assignments: Vec<(ColumnId, Node)>, condition: Option<Node>) -> UpsertAction {
    UpsertAction::Update {
        assignments,
        where_: condition,
    }
}

impl Insert {
    /// Adds an `OR <resolution>` clause.
    #[must_use]
    pub const fn or(mut self, resolution: ConflictResolution) -> Self {
        self.conflict = Some(resolution);
        self
    }

    /// Appends the typed column `C` to the column list.
    #[must_use]
    pub fn column<C: Column>(mut self) -> Self {
        self.columns.push(C::MEMBER);
        self
    }

    /// Appends members to the column list.
    #[must_use]
    pub fn columns(mut self, members: &[ColumnId]) -> Self {
        self.columns.extend_from_slice(members);
        self
    }

    /// Appends one row of values; a tuple supplies one value per column.
    #[must_use]
    pub fn values(mut self, row: impl IntoNode) -> Self {
        let row = spread(row);
        match &mut self.source {
            InsertSource::Values(rows) => rows.push(row),
            source => *source = InsertSource::Values(vec![row]),
        }
        self
    }

    /// Inserts the rows of a query.
    #[must_use]
    pub fn select(mut self, query: Select) -> Self {
        self.source = InsertSource::Select(Box::new(query));
        self
    }

    /// Adds `ON CONFLICT (target) DO ...`.
    #[must_use]
    pub fn on_conflict(mut self, target: &[ColumnId], action: UpsertAction) -> Self {
        self.upsert = Some(Upsert {
            target: target.to_vec(),
            action,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{excluded, set};
    use crate::fixtures::{User, UserColumns};

    #[test]
    fn test_values_rows_accumulate() {
        let insert = insert_into::<User>()
            .column::<UserColumns::Name>()
            .column::<UserColumns::Grade>()
            .values(("a", 1))
            .values(("b", 2));
        assert_eq!(insert.columns, vec!["name", "grade"]);
        let InsertSource::Values(rows) = insert.source else {
            panic!("expected VALUES");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_default_values_and_upsert() {
        let insert = insert_into::<User>();
        assert_eq!(insert.source, InsertSource::DefaultValues);

        let insert = insert_into::<User>()
            .columns(&["id", "name"])
            .values((1, "a"))
            .on_conflict(
                &["id"],
                do_update(vec![set::<UserColumns::Name>(excluded::<UserColumns::Name>())], None),
            );
        let upsert = insert.upsert.unwrap();
        assert_eq!(upsert.target, vec!["id"]);
        assert!(matches!(upsert.action, UpsertAction::Update { .. }));
    }
}

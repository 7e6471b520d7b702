//! UPDATE builder.

use super::IntoNode;
use crate::ast::{ConflictResolution, Node, Update};
use crate::schema::{Column, ColumnId, Mapped, TypeKey};

/// Starts an `UPDATE` of the table of `T`.
#[must_use]
pub fn update<T: Mapped>() -> Update {
    Update {
        table: TypeKey::of::<T>(),
        conflict: None,
        assignments: vec![],
        where_: None,
    }
}

/// One `"column" = value` assignment for UPDATE or an upsert.
#[must_use]
pub fn set<C: Column>(value: impl IntoNode) -> (ColumnId, Node) {
    (C::MEMBER, value.into_node())
}

impl Update {
    /// Adds an `OR <resolution>` clause.
    #[must_use]
    pub const fn or(mut self, resolution: ConflictResolution) -> Self {
        self.conflict = Some(resolution);
        self
    }

    /// Appends `"C" = value` to the SET list.
    #[must_use]
    pub fn set<C: Column>(mut self, value: impl IntoNode) -> Self {
        self.assignments.push(set::<C>(value));
        self
    }

    /// Sets the WHERE clause; a second call combines both with AND.
    #[must_use]
    pub fn filter(mut self, condition: impl IntoNode) -> Self {
        let condition = condition.into_node();
        self.where_ = Some(match self.where_.take() {
            Some(existing) => super::and(existing, condition),
            None => condition,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{add_as, col, eq};
    use crate::fixtures::{User, UserColumns};

    #[test]
    fn test_update_assignments() {
        let stmt = update::<User>()
            .set::<UserColumns::Name>("bob")
            .set::<UserColumns::Grade>(add_as::<i64>(col::<UserColumns::Grade>(), 1))
            .filter(eq(col::<UserColumns::Id>(), 7));
        assert_eq!(stmt.assignments.len(), 2);
        assert_eq!(stmt.assignments[0].0, "name");
        assert!(stmt.where_.is_some());
        assert!(stmt.conflict.is_none());
    }
}

//! DELETE builder.

use super::IntoNode;
use crate::ast::Delete;
use crate::schema::{Mapped, TypeKey};

/// Starts a `DELETE FROM` the table of `T`.
#[must_use]
pub fn delete_from<T: Mapped>() -> Delete {
    Delete {
        table: TypeKey::of::<T>(),
        where_: None,
    }
}

impl Delete {
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
    use crate::builder::{col, lt};
    use crate::fixtures::{User, UserColumns};

    #[test]
    fn test_delete_filter() {
        let stmt = delete_from::<User>();
        assert!(stmt.where_.is_none());

        let stmt = stmt.filter(lt(col::<UserColumns::Grade>(), 3));
        assert!(stmt.where_.is_some());
        assert_eq!(stmt.table, TypeKey::of::<User>());
    }
}

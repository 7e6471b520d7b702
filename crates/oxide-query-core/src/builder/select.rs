//! SELECT and WITH builders.

use super::{functions::spread, IntoNode};
use crate::ast::{
    CompoundOp, Cte, Join, JoinConstraint, JoinKind, Limit, Node, OrderKey, Select, TableRef,
    With,
};
use crate::schema::Mapped;
use crate::value::Bindable;

/// Starts a SELECT projecting `items`; a tuple projects each element.
///
/// Tables referenced by the projection, the WHERE clause and join
/// constraints are added to FROM automatically when rendered.
#[must_use]
pub fn select(items: impl IntoNode) -> Select {
    Select {
        columns: spread(items),
        ..Select::default()
    }
}

/// `WITH ctes statement`
#[must_use]
pub fn with(ctes: Vec<Cte>, statement: impl Into<Node>) -> With {
    With {
        recursive: false,
        ctes,
        statement: statement.into(),
    }
}

/// `WITH RECURSIVE ctes statement`
#[must_use]
pub fn with_recursive(ctes: Vec<Cte>, statement: impl Into<Node>) -> With {
    With {
        recursive: true,
        ctes,
        statement: statement.into(),
    }
}

impl Select {
    /// Names this query as a common table expression.
    #[must_use]
    pub fn as_cte(self, moniker: &str) -> Cte {
        Cte {
            moniker: String::from(moniker),
            columns: vec![],
            select: self,
        }
    }

    /// Names this query as a common table expression with explicit columns.
    #[must_use]
    pub fn as_cte_with(self, moniker: &str, columns: &[&str]) -> Cte {
        Cte {
            moniker: String::from(moniker),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            select: self,
        }
    }

    /// Adds SELECT DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds the table of `T` to FROM.
    #[must_use]
    pub fn from<T: Mapped>(self) -> Self {
        self.from_table(TableRef::mapped::<T>())
    }

    /// Adds the table of `T` to FROM under `alias`.
    #[must_use]
    pub fn from_as<T: Mapped>(self, alias: &str) -> Self {
        self.from_table(TableRef::mapped::<T>().alias(alias))
    }

    /// Adds an arbitrary table reference (e.g. a CTE) to FROM.
    #[must_use]
    pub fn from_table(mut self, table: TableRef) -> Self {
        self.from.push(table);
        self
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: TableRef,
        constraint: Option<JoinConstraint>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table,
            constraint,
        });
        self
    }

    /// `INNER JOIN table ON on`
    #[must_use]
    pub fn join(self, table: TableRef, on: impl IntoNode) -> Self {
        self.push_join(JoinKind::Inner, table, Some(JoinConstraint::On(on.into_node())))
    }

    /// `LEFT JOIN table ON on`
    #[must_use]
    pub fn left_join(self, table: TableRef, on: impl IntoNode) -> Self {
        self.push_join(JoinKind::Left, table, Some(JoinConstraint::On(on.into_node())))
    }

    /// `LEFT OUTER JOIN table ON on`
    #[must_use]
    pub fn left_outer_join(self, table: TableRef, on: impl IntoNode) -> Self {
        self.push_join(
            JoinKind::LeftOuter,
            table,
            Some(JoinConstraint::On(on.into_node())),
        )
    }

    /// `INNER JOIN table USING (members)`
    #[must_use]
    pub fn join_using(self, table: TableRef, members: &[&str]) -> Self {
        let members = members.iter().map(|m| String::from(*m)).collect();
        self.push_join(JoinKind::Inner, table, Some(JoinConstraint::Using(members)))
    }

    /// `CROSS JOIN table`
    #[must_use]
    pub fn cross_join(self, table: TableRef) -> Self {
        self.push_join(JoinKind::Cross, table, None)
    }

    /// `NATURAL JOIN table`
    #[must_use]
    pub fn natural_join(self, table: TableRef) -> Self {
        self.push_join(JoinKind::Natural, table, None)
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

    /// Appends GROUP BY expressions; a tuple appends each element.
    #[must_use]
    pub fn group_by(mut self, exprs: impl IntoNode) -> Self {
        self.group_by.extend(spread(exprs));
        self
    }

    /// Sets the HAVING clause.
    #[must_use]
    pub fn having(mut self, condition: impl IntoNode) -> Self {
        self.having = Some(condition.into_node());
        self
    }

    /// Appends an ORDER BY key.
    #[must_use]
    pub fn order_by(mut self, key: impl Into<OrderKey>) -> Self {
        self.order_by.push(key.into());
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub fn limit(mut self, count: impl IntoNode) -> Self {
        let offset = self.limit.take().and_then(|l| l.offset);
        self.limit = Some(Limit {
            count: count.into_node(),
            offset,
        });
        self
    }

    /// Sets OFFSET; without a LIMIT the count is unbounded (`LIMIT -1`).
    #[must_use]
    pub fn offset(mut self, offset: impl IntoNode) -> Self {
        let count = self
            .limit
            .take()
            .map_or_else(|| Node::Literal(Bindable::new(-1)), |l| l.count);
        self.limit = Some(Limit {
            count,
            offset: Some(offset.into_node()),
        });
        self
    }

    fn push_compound(&mut self, op: CompoundOp, other: Self) {
        if let Some((_, next)) = &mut self.compound {
            next.push_compound(op, other);
        } else {
            self.compound = Some((op, Box::new(other)));
        }
    }

    fn compound(mut self, op: CompoundOp, other: Self) -> Self {
        self.push_compound(op, other);
        self
    }

    /// `self UNION other`
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        self.compound(CompoundOp::Union, other)
    }

    /// `self UNION ALL other`
    #[must_use]
    pub fn union_all(self, other: Self) -> Self {
        self.compound(CompoundOp::UnionAll, other)
    }

    /// `self INTERSECT other`
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        self.compound(CompoundOp::Intersect, other)
    }

    /// `self EXCEPT other`
    #[must_use]
    pub fn except(self, other: Self) -> Self {
        self.compound(CompoundOp::Except, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{col, eq, lit};
    use crate::fixtures::{Post, PostColumns, User, UserColumns};

    #[test]
    fn test_tuple_projection_is_spread() {
        let query = select((col::<UserColumns::Id>(), col::<UserColumns::Name>()));
        assert_eq!(query.columns.len(), 2);

        let query = select(col::<UserColumns::Id>());
        assert_eq!(query.columns.len(), 1);
    }

    #[test]
    fn test_filter_twice_combines_with_and() {
        let query = select(col::<UserColumns::Id>())
            .filter(eq(col::<UserColumns::Grade>(), 2))
            .filter(eq(col::<UserColumns::Name>(), "a"));
        assert!(matches!(
            query.where_,
            Some(Node::Binary {
                op: crate::ast::BinaryOp::And,
                ..
            })
        ));
    }

    #[test]
    fn test_offset_without_limit() {
        let query = select(col::<UserColumns::Id>()).offset(5);
        let limit = query.limit.unwrap();
        assert_eq!(limit.count, lit(-1));
        assert!(limit.offset.is_some());

        let query = select(col::<UserColumns::Id>()).offset(5).limit(10);
        let limit = query.limit.unwrap();
        assert_eq!(limit.count, crate::builder::param(10));
        assert!(limit.offset.is_some());
    }

    #[test]
    fn test_compounds_chain_to_the_tail() {
        let query = select(lit(1))
            .union(select(lit(2)))
            .union_all(select(lit(3)));
        let (op, second) = query.compound.unwrap();
        assert_eq!(op, CompoundOp::Union);
        let (op, third) = second.compound.unwrap();
        assert_eq!(op, CompoundOp::UnionAll);
        assert!(third.compound.is_none());
    }

    #[test]
    fn test_joins() {
        let query = select(col::<PostColumns::Title>())
            .from::<User>()
            .join(
                TableRef::mapped::<Post>(),
                eq(col::<PostColumns::UserId>(), col::<UserColumns::Id>()),
            )
            .cross_join(TableRef::moniker("tags"));
        assert_eq!(query.joins.len(), 2);
        assert_eq!(query.joins[0].kind, JoinKind::Inner);
        assert!(query.joins[1].constraint.is_none());
    }
}

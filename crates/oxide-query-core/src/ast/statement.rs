//! SQL statement AST types.

use super::node::{Node, TableRef};
use crate::schema::{ColumnId, TypeKey};

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

impl NullOrdering {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    /// The expression to order by.
    pub expr: Node,
    /// The direction; `None` leaves it to SQLite.
    pub direction: Option<OrderDirection>,
    /// Collation name.
    pub collation: Option<String>,
    /// Null ordering.
    pub nulls: Option<NullOrdering>,
}

impl OrderKey {
    /// Orders by `expr` without an explicit direction.
    #[must_use]
    pub const fn new(expr: Node) -> Self {
        Self {
            expr,
            direction: None,
            collation: None,
            nulls: None,
        }
    }

    /// Ascending.
    #[must_use]
    pub const fn asc(mut self) -> Self {
        self.direction = Some(OrderDirection::Asc);
        self
    }

    /// Descending.
    #[must_use]
    pub const fn desc(mut self) -> Self {
        self.direction = Some(OrderDirection::Desc);
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the null ordering.
    #[must_use]
    pub const fn nulls(mut self, nulls: NullOrdering) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

impl From<Node> for OrderKey {
    fn from(expr: Node) -> Self {
        Self::new(expr)
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT JOIN.
    Left,
    /// LEFT OUTER JOIN.
    LeftOuter,
    /// CROSS JOIN.
    Cross,
    /// NATURAL JOIN.
    Natural,
}

impl JoinKind {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
        }
    }
}

/// Join condition.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    /// `ON expr`
    On(Node),
    /// `USING ("a", "b")`, by member identity of the joined table.
    Using(Vec<String>),
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The type of join.
    pub kind: JoinKind,
    /// The joined table.
    pub table: TableRef,
    /// The join condition (none for CROSS and NATURAL joins).
    pub constraint: Option<JoinConstraint>,
}

/// LIMIT and OFFSET.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    /// Row count.
    pub count: Node,
    /// Rows to skip.
    pub offset: Option<Node>,
}

/// Compound select operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    /// UNION
    Union,
    /// UNION ALL
    UnionAll,
    /// INTERSECT
    Intersect,
    /// EXCEPT
    Except,
}

impl CompoundOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// The projected items.
    pub columns: Vec<Node>,
    /// Explicit FROM tables; referenced tables are appended when rendering.
    pub from: Vec<TableRef>,
    /// JOIN clauses.
    pub joins: Vec<Join>,
    /// The WHERE clause.
    pub where_: Option<Node>,
    /// GROUP BY expressions.
    pub group_by: Vec<Node>,
    /// HAVING clause.
    pub having: Option<Node>,
    /// ORDER BY entries.
    pub order_by: Vec<OrderKey>,
    /// LIMIT and OFFSET.
    pub limit: Option<Limit>,
    /// Right arm of a compound select.
    pub compound: Option<(CompoundOp, Box<Select>)>,
}

/// One common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// The name the statement refers to.
    pub moniker: String,
    /// Explicit column names; empty to take them from the select.
    pub columns: Vec<String>,
    /// The defining query.
    pub select: Select,
}

/// `WITH [RECURSIVE] ctes statement`
#[derive(Debug, Clone, PartialEq)]
pub struct With {
    /// WITH RECURSIVE.
    pub recursive: bool,
    /// The common table expressions, in declaration order.
    pub ctes: Vec<Cte>,
    /// The statement the expressions are visible in.
    pub statement: Node,
}

/// Conflict resolution for INSERT and UPDATE (`OR ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// OR ABORT
    Abort,
    /// OR FAIL
    Fail,
    /// OR IGNORE
    Ignore,
    /// OR REPLACE
    Replace,
    /// OR ROLLBACK
    Rollback,
}

impl ConflictResolution {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
            Self::Rollback => "ROLLBACK",
        }
    }
}

/// Source of values for an INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES rows.
    Values(Vec<Vec<Node>>),
    /// A SELECT query.
    Select(Box<Select>),
    /// DEFAULT VALUES.
    DefaultValues,
}

/// The action of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertAction {
    /// DO NOTHING
    Nothing,
    /// DO UPDATE SET .. [WHERE ..]
    Update {
        /// Assignments by member identity.
        assignments: Vec<(ColumnId, Node)>,
        /// Condition.
        where_: Option<Node>,
    },
}

/// `ON CONFLICT (target) DO ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    /// Conflict target members.
    pub target: Vec<ColumnId>,
    /// The action.
    pub action: UpsertAction,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// The target table.
    pub table: TypeKey,
    /// `OR ...` clause.
    pub conflict: Option<ConflictResolution>,
    /// Target members.
    pub columns: Vec<ColumnId>,
    /// The values.
    pub source: InsertSource,
    /// Upsert clause.
    pub upsert: Option<Upsert>,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// The target table.
    pub table: TypeKey,
    /// `OR ...` clause.
    pub conflict: Option<ConflictResolution>,
    /// SET assignments by member identity.
    pub assignments: Vec<(ColumnId, Node)>,
    /// The WHERE clause.
    pub where_: Option<Node>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// The target table.
    pub table: TypeKey,
    /// The WHERE clause.
    pub where_: Option<Node>,
}

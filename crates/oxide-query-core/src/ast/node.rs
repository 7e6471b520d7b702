//! Expression nodes.

use super::function::{AggregateCall, FunctionCall};
use super::statement::{Delete, Insert, Select, Update, With};
use crate::schema::{ColumnId, Mapped, TypeKey};
use crate::types::TypeTag;
use crate::value::Bindable;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Bitwise
    BitAnd,
    BitOr,
    LeftShift,
    RightShift,

    // String
    Concat,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Is,
    IsNot,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::Concat => "||",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Returns true for the operators whose result widens to `Double`.
    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Sub
                | Self::Mul
                | Self::Div
                | Self::Mod
                | Self::BitAnd
                | Self::BitOr
                | Self::LeftShift
                | Self::RightShift
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// The table side of a reference: a mapped record or a common table
/// expression name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableId {
    /// A registered record type.
    Mapped(TypeKey),
    /// A common table expression.
    Moniker(String),
}

/// A table in FROM, JOIN or an asterisk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// The table.
    pub table: TableId,
    /// Alias.
    pub alias: Option<String>,
}

impl TableRef {
    /// References the table of `T`.
    #[must_use]
    pub fn mapped<T: Mapped>() -> Self {
        Self {
            table: TableId::Mapped(TypeKey::of::<T>()),
            alias: None,
        }
    }

    /// References a common table expression.
    #[must_use]
    pub fn moniker(name: impl Into<String>) -> Self {
        Self {
            table: TableId::Moniker(name.into()),
            alias: None,
        }
    }

    /// Adds an alias to this table reference.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Owning table.
    pub table: TableId,
    /// Member identity for mapped tables, column name for monikers.
    pub member: String,
    /// Table alias used to qualify the column.
    pub alias: Option<String>,
}

impl ColumnRef {
    /// Qualifies the column with a table alias.
    #[must_use]
    pub fn of_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// `CASE [subject] WHEN .. THEN .. [ELSE ..] END` with a declared result.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Declared result type.
    pub result: TypeTag,
    /// Subject compared against each WHEN.
    pub subject: Option<Box<Node>>,
    /// `(when, then)` arms.
    pub arms: Vec<(Node, Node)>,
    /// ELSE value.
    pub else_: Option<Box<Node>>,
}

/// Right-hand side of IN.
#[derive(Debug, Clone, PartialEq)]
pub enum InSet {
    /// A list of values.
    List(Vec<Node>),
    /// A subquery.
    Subquery(Box<Select>),
}

/// A query expression node.
///
/// Nodes are immutable values; they never refer back to their parents and
/// carry no serialization state.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A value always rendered inline.
    Literal(Bindable),
    /// A value sent through a placeholder.
    Parameter(Bindable),
    /// Column reference.
    Column(ColumnRef),
    /// `table.*`
    Asterisk(TableRef),
    /// `table.rowid`
    Rowid(TableRef),
    /// `inner AS "name"`
    Alias {
        /// Alias name.
        name: String,
        /// Aliased expression.
        inner: Box<Node>,
    },
    /// Reference to a column alias.
    AliasRef(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Node>,
        /// Result type pinned by the caller.
        pinned: Option<TypeTag>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Node>,
        /// Right operand.
        rhs: Box<Node>,
        /// Result type pinned by the caller.
        pinned: Option<TypeTag>,
    },
    /// `x IS [NOT] NULL`
    IsNull {
        /// Tested expression.
        operand: Box<Node>,
        /// IS NOT NULL.
        negated: bool,
    },
    /// Scalar function call.
    Function(FunctionCall),
    /// Aggregate function call.
    Aggregate(AggregateCall),
    /// An ordered list of expressions, e.g. a projection.
    Tuple(Vec<Node>),
    /// CASE expression.
    Case(Case),
    /// `expr [NOT] BETWEEN lo AND hi`
    Between {
        /// Tested expression.
        expr: Box<Node>,
        /// Lower bound.
        lo: Box<Node>,
        /// Upper bound.
        hi: Box<Node>,
        /// NOT BETWEEN.
        negated: bool,
    },
    /// `arg [NOT] LIKE pattern [ESCAPE e]`, or GLOB.
    Like {
        /// Tested expression.
        arg: Box<Node>,
        /// Pattern.
        pattern: Box<Node>,
        /// Escape character.
        escape: Option<Box<Node>>,
        /// NOT LIKE.
        negated: bool,
        /// GLOB instead of LIKE.
        glob: bool,
    },
    /// `left [NOT] IN (..)`
    In {
        /// Tested expression.
        left: Box<Node>,
        /// Candidate set.
        set: InSet,
        /// NOT IN.
        negated: bool,
    },
    /// `[NOT] EXISTS (SELECT ..)`
    Exists {
        /// The subquery.
        select: Box<Select>,
        /// NOT EXISTS.
        negated: bool,
    },
    /// `CAST(x AS type)`
    Cast {
        /// Converted expression.
        operand: Box<Node>,
        /// Target type.
        to: TypeTag,
    },
    /// `x COLLATE name`
    Collate {
        /// Collated expression.
        operand: Box<Node>,
        /// Collation name.
        collation: String,
    },
    /// Scalar subquery.
    Subquery(Box<Select>),
    /// `excluded."col"` inside an upsert.
    Excluded {
        /// The insert target.
        table: TypeKey,
        /// Member identity.
        member: ColumnId,
    },
    /// SELECT statement.
    Select(Box<Select>),
    /// WITH clause and its statement.
    With(Box<With>),
    /// INSERT statement.
    Insert(Box<Insert>),
    /// UPDATE statement.
    Update(Box<Update>),
    /// DELETE statement.
    Delete(Box<Delete>),
}

impl Node {
    /// Returns true for statement nodes.
    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::Select(_) | Self::With(_) | Self::Insert(_) | Self::Update(_) | Self::Delete(_)
        )
    }

    /// Wraps this node in a boxed alias.
    #[must_use]
    pub fn alias(self, name: impl Into<String>) -> Self {
        Self::Alias {
            name: name.into(),
            inner: Box::new(self),
        }
    }
}

impl From<Select> for Node {
    fn from(select: Select) -> Self {
        Self::Select(Box::new(select))
    }
}

impl From<With> for Node {
    fn from(with: With) -> Self {
        Self::With(Box::new(with))
    }
}

impl From<Insert> for Node {
    fn from(insert: Insert) -> Self {
        Self::Insert(Box::new(insert))
    }
}

impl From<Update> for Node {
    fn from(update: Update) -> Self {
        Self::Update(Box::new(update))
    }
}

impl From<Delete> for Node {
    fn from(delete: Delete) -> Self {
        Self::Delete(Box::new(delete))
    }
}

impl From<ColumnRef> for Node {
    fn from(column: ColumnRef) -> Self {
        Self::Column(column)
    }
}

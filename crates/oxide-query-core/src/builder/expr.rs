//! Expression builders.

use super::{boxed, IntoNode};
use crate::ast::{BinaryOp, Case, ColumnRef, InSet, Node, Select, TableId, TableRef, UnaryOp};
use crate::schema::{Column, Mapped, TypeKey};
use crate::types::TypeTag;
use crate::value::{Bindable, Scalar, ToScalar};

/// References the typed column `C`.
#[must_use]
pub fn col<C: Column>() -> ColumnRef {
    ColumnRef {
        table: TableId::Mapped(TypeKey::of::<C::Table>()),
        member: String::from(C::MEMBER),
        alias: None,
    }
}

/// References member `member` of `T` by name; checked when compiled.
#[must_use]
pub fn column_of<T: Mapped>(member: &str) -> ColumnRef {
    ColumnRef {
        table: TableId::Mapped(TypeKey::of::<T>()),
        member: String::from(member),
        alias: None,
    }
}

/// References column `name` of the common table expression `moniker`.
#[must_use]
pub fn cte_column(moniker: &str, name: &str) -> ColumnRef {
    ColumnRef {
        table: TableId::Moniker(String::from(moniker)),
        member: String::from(name),
        alias: None,
    }
}

/// A bound parameter.
#[must_use]
pub fn param<T: ToScalar>(value: T) -> Node {
    Node::Parameter(Bindable::new(value))
}

/// A value rendered inline, never bound.
#[must_use]
pub fn lit<T: ToScalar>(value: T) -> Node {
    Node::Literal(Bindable::new(value))
}

/// An inline `NULL`.
#[must_use]
pub fn null() -> Node {
    Node::Literal(Bindable::from_scalar(Scalar::Null))
}

fn binary(op: BinaryOp, lhs: impl IntoNode, rhs: impl IntoNode, pinned: Option<TypeTag>) -> Node {
    Node::Binary {
        op,
        lhs: boxed(lhs),
        rhs: boxed(rhs),
        pinned,
    }
}

fn unary(op: UnaryOp, operand: impl IntoNode, pinned: Option<TypeTag>) -> Node {
    Node::Unary {
        op,
        operand: boxed(operand),
        pinned,
    }
}

macro_rules! binary_builders {
    ($($(#[$doc:meta])* $name:ident => $op:ident;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(lhs: impl IntoNode, rhs: impl IntoNode) -> Node {
                binary(BinaryOp::$op, lhs, rhs, None)
            }
        )+
    };
}

binary_builders! {
    /// `lhs = rhs`
    eq => Eq;
    /// `lhs != rhs`
    ne => NotEq;
    /// `lhs < rhs`
    lt => Lt;
    /// `lhs <= rhs`
    le => LtEq;
    /// `lhs > rhs`
    gt => Gt;
    /// `lhs >= rhs`
    ge => GtEq;
    /// `lhs IS rhs`
    is => Is;
    /// `lhs IS NOT rhs`
    is_not => IsNot;
    /// `lhs AND rhs`
    and => And;
    /// `lhs OR rhs`
    or => Or;
    /// `lhs || rhs`
    concat => Concat;
    /// `lhs + rhs`, typed `Double`.
    add => Add;
    /// `lhs - rhs`, typed `Double`.
    sub => Sub;
    /// `lhs * rhs`, typed `Double`.
    mul => Mul;
    /// `lhs / rhs`, typed `Double`.
    div => Div;
    /// `lhs % rhs`, typed `Double`.
    modulo => Mod;
    /// `lhs & rhs`
    bit_and => BitAnd;
    /// `lhs | rhs`
    bit_or => BitOr;
    /// `lhs << rhs`
    shift_left => LeftShift;
    /// `lhs >> rhs`
    shift_right => RightShift;
}

macro_rules! pinned_builders {
    ($($(#[$doc:meta])* $name:ident => $op:ident;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name<R: ToScalar>(lhs: impl IntoNode, rhs: impl IntoNode) -> Node {
                binary(BinaryOp::$op, lhs, rhs, Some(R::type_tag()))
            }
        )+
    };
}

pinned_builders! {
    /// `lhs + rhs`, typed as `R`.
    add_as => Add;
    /// `lhs - rhs`, typed as `R`.
    sub_as => Sub;
    /// `lhs * rhs`, typed as `R`.
    mul_as => Mul;
    /// `lhs / rhs`, typed as `R`.
    div_as => Div;
    /// `lhs % rhs`, typed as `R`.
    modulo_as => Mod;
}

/// `NOT operand`
#[must_use]
pub fn not(operand: impl IntoNode) -> Node {
    unary(UnaryOp::Not, operand, None)
}

/// `-operand`
#[must_use]
pub fn neg(operand: impl IntoNode) -> Node {
    unary(UnaryOp::Neg, operand, None)
}

/// `~operand`
#[must_use]
pub fn bit_not(operand: impl IntoNode) -> Node {
    unary(UnaryOp::BitNot, operand, None)
}

/// `operand IS NULL`
#[must_use]
pub fn is_null(operand: impl IntoNode) -> Node {
    Node::IsNull {
        operand: boxed(operand),
        negated: false,
    }
}

/// `operand IS NOT NULL`
#[must_use]
pub fn is_not_null(operand: impl IntoNode) -> Node {
    Node::IsNull {
        operand: boxed(operand),
        negated: true,
    }
}

/// `expr BETWEEN lo AND hi`
#[must_use]
pub fn between(expr: impl IntoNode, lo: impl IntoNode, hi: impl IntoNode) -> Node {
    Node::Between {
        expr: boxed(expr),
        lo: boxed(lo),
        hi: boxed(hi),
        negated: false,
    }
}

/// `expr NOT BETWEEN lo AND hi`
#[must_use]
pub fn not_between(expr: impl IntoNode, lo: impl IntoNode, hi: impl IntoNode) -> Node {
    Node::Between {
        expr: boxed(expr),
        lo: boxed(lo),
        hi: boxed(hi),
        negated: true,
    }
}

fn pattern(arg: impl IntoNode, pattern: impl IntoNode, negated: bool, glob: bool) -> Node {
    Node::Like {
        arg: boxed(arg),
        pattern: boxed(pattern),
        escape: None,
        negated,
        glob,
    }
}

/// `arg LIKE pattern`
#[must_use]
pub fn like(arg: impl IntoNode, pat: impl IntoNode) -> Node {
    pattern(arg, pat, false, false)
}

/// `arg NOT LIKE pattern`
#[must_use]
pub fn not_like(arg: impl IntoNode, pat: impl IntoNode) -> Node {
    pattern(arg, pat, true, false)
}

/// `arg LIKE pattern ESCAPE escape`
#[must_use]
pub fn like_escape(arg: impl IntoNode, pat: impl IntoNode, escape: impl IntoNode) -> Node {
    Node::Like {
        arg: boxed(arg),
        pattern: boxed(pat),
        escape: Some(boxed(escape)),
        negated: false,
        glob: false,
    }
}

/// `arg GLOB pattern`
#[must_use]
pub fn glob(arg: impl IntoNode, pat: impl IntoNode) -> Node {
    pattern(arg, pat, false, true)
}

/// `left IN (values...)`
#[must_use]
pub fn in_list<I>(left: impl IntoNode, values: I) -> Node
where
    I: IntoIterator,
    I::Item: IntoNode,
{
    Node::In {
        left: boxed(left),
        set: InSet::List(values.into_iter().map(IntoNode::into_node).collect()),
        negated: false,
    }
}

/// `left NOT IN (values...)`
#[must_use]
pub fn not_in<I>(left: impl IntoNode, values: I) -> Node
where
    I: IntoIterator,
    I::Item: IntoNode,
{
    Node::In {
        left: boxed(left),
        set: InSet::List(values.into_iter().map(IntoNode::into_node).collect()),
        negated: true,
    }
}

/// `left IN (SELECT ...)`
#[must_use]
pub fn in_select(left: impl IntoNode, select: Select) -> Node {
    Node::In {
        left: boxed(left),
        set: InSet::Subquery(Box::new(select)),
        negated: false,
    }
}

/// `EXISTS (SELECT ...)`
#[must_use]
pub fn exists(select: Select) -> Node {
    Node::Exists {
        select: Box::new(select),
        negated: false,
    }
}

/// `NOT EXISTS (SELECT ...)`
#[must_use]
pub fn not_exists(select: Select) -> Node {
    Node::Exists {
        select: Box::new(select),
        negated: true,
    }
}

/// Builds a CASE expression typed as `R`.
#[derive(Debug, Clone)]
pub struct CaseBuilder {
    case: Case,
}

impl CaseBuilder {
    /// Adds a `WHEN .. THEN ..` arm.
    #[must_use]
    pub fn when(mut self, when: impl IntoNode, then: impl IntoNode) -> Self {
        self.case.arms.push((when.into_node(), then.into_node()));
        self
    }

    /// Sets the ELSE value and finishes the expression.
    #[must_use]
    pub fn else_(mut self, value: impl IntoNode) -> Node {
        self.case.else_ = Some(boxed(value));
        Node::Case(self.case)
    }

    /// Finishes the expression without ELSE.
    #[must_use]
    pub fn end(self) -> Node {
        Node::Case(self.case)
    }
}

/// `CASE WHEN .. THEN .. END`, typed as `R` regardless of its arms.
#[must_use]
pub fn case<R: ToScalar>() -> CaseBuilder {
    CaseBuilder {
        case: Case {
            result: R::type_tag(),
            subject: None,
            arms: vec![],
            else_: None,
        },
    }
}

/// `CASE subject WHEN .. THEN .. END`, typed as `R`.
#[must_use]
pub fn case_on<R: ToScalar>(subject: impl IntoNode) -> CaseBuilder {
    CaseBuilder {
        case: Case {
            result: R::type_tag(),
            subject: Some(boxed(subject)),
            arms: vec![],
            else_: None,
        },
    }
}

/// `CAST(operand AS <R>)`
#[must_use]
pub fn cast<R: ToScalar>(operand: impl IntoNode) -> Node {
    Node::Cast {
        operand: boxed(operand),
        to: R::type_tag(),
    }
}

/// `operand COLLATE collation`
#[must_use]
pub fn collate(operand: impl IntoNode, collation: &str) -> Node {
    Node::Collate {
        operand: boxed(operand),
        collation: String::from(collation),
    }
}

/// `inner AS "name"`
#[must_use]
pub fn alias(inner: impl IntoNode, name: &str) -> Node {
    inner.into_node().alias(name)
}

/// References a column alias, e.g. in ORDER BY.
#[must_use]
pub fn alias_ref(name: &str) -> Node {
    Node::AliasRef(String::from(name))
}

/// `"table".*` for the table of `T`.
#[must_use]
pub fn asterisk<T: Mapped>() -> Node {
    Node::Asterisk(TableRef::mapped::<T>())
}

/// `*` over an arbitrary table reference (aliased table or CTE).
#[must_use]
pub fn asterisk_of(table: TableRef) -> Node {
    Node::Asterisk(table)
}

/// `"table".rowid` for the table of `T`.
#[must_use]
pub fn rowid<T: Mapped>() -> Node {
    Node::Rowid(TableRef::mapped::<T>())
}

/// `excluded."column"` inside an upsert.
#[must_use]
pub fn excluded<C: Column>() -> Node {
    Node::Excluded {
        table: TypeKey::of::<C::Table>(),
        member: C::MEMBER,
    }
}

/// An ordered list of expressions, typed as a tuple.
#[must_use]
pub fn columns<I>(items: I) -> Node
where
    I: IntoIterator,
    I::Item: IntoNode,
{
    Node::Tuple(items.into_iter().map(IntoNode::into_node).collect())
}

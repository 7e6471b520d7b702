//! Core SQLite scalar functions.
//!
//! Variadic functions take a single value or a tuple of values:
//! `coalesce((col::<UserColumns::Email>(), "none"))`.

use super::IntoNode;
use crate::ast::{FunctionCall, Node, Params, Returns, Signature};
use crate::types::TypeTag;

/// Calls any function with an explicit signature.
#[must_use]
pub fn call(signature: Signature, args: Vec<Node>) -> Node {
    Node::Function(FunctionCall::new(signature, args))
}

pub(crate) fn spread(args: impl IntoNode) -> Vec<Node> {
    match args.into_node() {
        Node::Tuple(items) => items,
        other => vec![other],
    }
}

fn optional(ty: TypeTag) -> TypeTag {
    TypeTag::optional(ty)
}

macro_rules! unary_functions {
    ($($(#[$doc:meta])* $name:ident => $sql:literal, $ret:expr;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(x: impl IntoNode) -> Node {
                call(Signature::fixed($sql, 1, $ret), vec![x.into_node()])
            }
        )+
    };
}

unary_functions! {
    /// `ABS(x)`
    abs => "ABS", optional(TypeTag::Double);
    /// `LENGTH(x)`
    length => "LENGTH", TypeTag::Int;
    /// `LOWER(x)`
    lower => "LOWER", TypeTag::Text;
    /// `UPPER(x)`
    upper => "UPPER", TypeTag::Text;
    /// `TRIM(x)`
    trim => "TRIM", TypeTag::Text;
    /// `LTRIM(x)`
    ltrim => "LTRIM", TypeTag::Text;
    /// `RTRIM(x)`
    rtrim => "RTRIM", TypeTag::Text;
    /// `ROUND(x)`
    round => "ROUND", TypeTag::Double;
    /// `HEX(x)`
    hex => "HEX", TypeTag::Text;
    /// `QUOTE(x)`
    quote => "QUOTE", TypeTag::Text;
    /// `TYPEOF(x)`
    typeof_ => "TYPEOF", TypeTag::Text;
    /// `UNICODE(x)`
    unicode => "UNICODE", optional(TypeTag::Int);
}

/// `TRIM(x, chars)`
#[must_use]
pub fn trim_chars(x: impl IntoNode, chars: impl IntoNode) -> Node {
    call(
        Signature::fixed("TRIM", 2, TypeTag::Text),
        vec![x.into_node(), chars.into_node()],
    )
}

/// `REPLACE(x, from, to)`
#[must_use]
pub fn replace(x: impl IntoNode, from: impl IntoNode, to: impl IntoNode) -> Node {
    call(
        Signature::fixed("REPLACE", 3, TypeTag::Text),
        vec![x.into_node(), from.into_node(), to.into_node()],
    )
}

/// `SUBSTR(x, start)`
#[must_use]
pub fn substr(x: impl IntoNode, start: impl IntoNode) -> Node {
    call(
        Signature::fixed("SUBSTR", 2, TypeTag::Text),
        vec![x.into_node(), start.into_node()],
    )
}

/// `SUBSTR(x, start, len)`
#[must_use]
pub fn substr_len(x: impl IntoNode, start: impl IntoNode, len: impl IntoNode) -> Node {
    call(
        Signature::fixed("SUBSTR", 3, TypeTag::Text),
        vec![x.into_node(), start.into_node(), len.into_node()],
    )
}

/// `INSTR(haystack, needle)`
#[must_use]
pub fn instr(haystack: impl IntoNode, needle: impl IntoNode) -> Node {
    call(
        Signature::fixed("INSTR", 2, TypeTag::Int),
        vec![haystack.into_node(), needle.into_node()],
    )
}

/// `ROUND(x, digits)`
#[must_use]
pub fn round_to(x: impl IntoNode, digits: impl IntoNode) -> Node {
    call(
        Signature::fixed("ROUND", 2, TypeTag::Double),
        vec![x.into_node(), digits.into_node()],
    )
}

/// `RANDOM()`
#[must_use]
pub fn random() -> Node {
    call(Signature::fixed("RANDOM", 0, TypeTag::Int), vec![])
}

/// `CHAR(codes...)`
#[must_use]
pub fn char_(codes: impl IntoNode) -> Node {
    call(
        Signature::variadic("CHAR", Returns::Declared(TypeTag::Text)),
        spread(codes),
    )
}

/// `COALESCE(args...)`, typed by the common type of its arguments.
#[must_use]
pub fn coalesce(args: impl IntoNode) -> Node {
    call(Signature::variadic("COALESCE", Returns::Common), spread(args))
}

/// `IFNULL(x, y)`, typed by the common type of its arguments.
#[must_use]
pub fn ifnull(x: impl IntoNode, y: impl IntoNode) -> Node {
    call(
        Signature {
            name: "IFNULL",
            params: Params::any(2),
            returns: Returns::Common,
        },
        vec![x.into_node(), y.into_node()],
    )
}

/// `NULLIF(x, y)`, typed by the nullable common type of its arguments.
#[must_use]
pub fn nullif(x: impl IntoNode, y: impl IntoNode) -> Node {
    call(
        Signature {
            name: "NULLIF",
            params: Params::any(2),
            returns: Returns::OptionalCommon,
        },
        vec![x.into_node(), y.into_node()],
    )
}

/// Scalar `MIN(args...)`.
#[must_use]
pub fn min(args: impl IntoNode) -> Node {
    call(Signature::variadic("MIN", Returns::OptionalCommon), spread(args))
}

/// Scalar `MAX(args...)`.
#[must_use]
pub fn max(args: impl IntoNode) -> Node {
    call(Signature::variadic("MAX", Returns::OptionalCommon), spread(args))
}

macro_rules! variadic_functions {
    ($($(#[$doc:meta])* $name:ident => $sql:literal, $ret:expr;)+) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(args: impl IntoNode) -> Node {
                call(Signature::variadic($sql, Returns::Declared($ret)), spread(args))
            }
        )+
    };
}

variadic_functions! {
    /// `DATE(time, modifiers...)`
    date => "DATE", optional(TypeTag::Text);
    /// `TIME(time, modifiers...)`
    time => "TIME", optional(TypeTag::Text);
    /// `DATETIME(time, modifiers...)`
    datetime => "DATETIME", optional(TypeTag::Text);
    /// `JULIANDAY(time, modifiers...)`
    julianday => "JULIANDAY", optional(TypeTag::Double);
    /// `STRFTIME(format, time, modifiers...)`
    strftime => "STRFTIME", optional(TypeTag::Text);
    /// `PRINTF(format, args...)`
    printf => "PRINTF", TypeTag::Text;
}

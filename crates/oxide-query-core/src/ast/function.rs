//! Function call nodes and their declared signatures.

use super::Node;
use crate::types::TypeTag;

/// One declared argument slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSlot {
    /// Any value.
    Any,
    /// A pointer carrying the given tag, or NULL.
    Pointer(&'static str),
}

/// The declared argument list of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Raw variadic values: argument checks are skipped.
    RawVariadic,
    /// A fixed list of slots; the call must supply exactly this many.
    Fixed(Vec<ArgSlot>),
}

impl Params {
    /// A fixed list of `n` untyped slots.
    #[must_use]
    pub fn any(n: usize) -> Self {
        Self::Fixed(vec![ArgSlot::Any; n])
    }
}

/// How the result type of a call is determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returns {
    /// A declared type.
    Declared(TypeTag),
    /// The common type of the arguments.
    Common,
    /// The common type of the arguments, made nullable.
    OptionalCommon,
}

/// A function signature: name, argument slots and return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// SQL function name.
    pub name: &'static str,
    /// Declared parameters.
    pub params: Params,
    /// Declared result.
    pub returns: Returns,
}

impl Signature {
    /// Creates a signature with a fixed list of untyped slots.
    #[must_use]
    pub fn fixed(name: &'static str, arity: usize, returns: TypeTag) -> Self {
        Self {
            name,
            params: Params::any(arity),
            returns: Returns::Declared(returns),
        }
    }

    /// Creates a signature with explicit slots.
    #[must_use]
    pub fn with_slots(name: &'static str, slots: Vec<ArgSlot>, returns: TypeTag) -> Self {
        Self {
            name,
            params: Params::Fixed(slots),
            returns: Returns::Declared(returns),
        }
    }

    /// Creates a signature that accepts any arguments.
    #[must_use]
    pub const fn variadic(name: &'static str, returns: Returns) -> Self {
        Self {
            name,
            params: Params::RawVariadic,
            returns,
        }
    }
}

/// A scalar function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The callee.
    pub signature: Signature,
    /// The arguments.
    pub args: Vec<Node>,
}

impl FunctionCall {
    /// Creates a call.
    #[must_use]
    pub fn new(signature: Signature, args: Vec<Node>) -> Self {
        Self { signature, args }
    }
}

/// An aggregate function call.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    /// The callee.
    pub signature: Signature,
    /// The arguments.
    pub args: Vec<Node>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
    /// Whether the call is `name(*)`.
    pub star: bool,
    /// `FILTER (WHERE ..)` condition.
    pub filter: Option<Box<Node>>,
}

impl AggregateCall {
    /// Creates an aggregate call.
    #[must_use]
    pub fn new(signature: Signature, args: Vec<Node>) -> Self {
        Self {
            signature,
            args,
            distinct: false,
            star: false,
            filter: None,
        }
    }
}

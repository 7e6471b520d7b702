//! Typed node constructors.
//!
//! Every builder returns plain [`Node`] values (or the statement structs
//! that convert into one). Rust values passed where an expression is
//! expected become bound parameters; use [`lit`] to inline a value instead.
//!
//! ```rust
//! use oxide_query_core::builder::{eq, lit, param};
//! use oxide_query_core::ast::Node;
//!
//! let cond = eq(param(2), lit(2));
//! assert!(matches!(cond, Node::Binary { .. }));
//! ```

mod delete;
mod expr;
pub mod aggregates;
pub mod functions;
mod insert;
mod record;
mod select;
mod update;

pub use delete::delete_from;
pub use expr::{
    add, add_as, alias, alias_ref, and, asterisk, asterisk_of, between, bit_and, bit_not, bit_or,
    case, case_on, cast, col, collate, column_of, columns, concat, cte_column, div, div_as, eq,
    excluded, exists, ge, glob, gt, in_list, in_select, is, is_not, is_not_null, is_null, le,
    like, like_escape, lit, lt, modulo, modulo_as, mul, mul_as, ne, neg, not, not_between,
    not_exists, not_in, not_like, null, or, param, rowid, shift_left, shift_right, sub, sub_as,
    CaseBuilder,
};
pub use insert::{do_nothing, do_update, insert_into};
pub use record::{get_by_id, insert_record, insert_records, remove_by_id, replace_record, update_record};
pub use select::{select, with, with_recursive};
pub use update::{set, update};

use crate::ast::{AggregateCall, ColumnRef, Node, Select};
use crate::value::{Bindable, ToScalar};

/// Conversion into an expression node.
///
/// Implemented for nodes, column references, selects (as scalar
/// subqueries), aggregate calls, tuples of convertible values (as
/// [`Node::Tuple`]) and every [`ToScalar`] value (as a bound parameter).
pub trait IntoNode {
    /// Converts `self` into a node.
    fn into_node(self) -> Node;
}

impl IntoNode for Node {
    fn into_node(self) -> Node {
        self
    }
}

impl IntoNode for ColumnRef {
    fn into_node(self) -> Node {
        Node::Column(self)
    }
}

impl IntoNode for Select {
    fn into_node(self) -> Node {
        Node::Subquery(Box::new(self))
    }
}

impl IntoNode for AggregateCall {
    fn into_node(self) -> Node {
        Node::Aggregate(self)
    }
}

impl<T: ToScalar> IntoNode for T {
    fn into_node(self) -> Node {
        Node::Parameter(Bindable::new(self))
    }
}

macro_rules! impl_into_node_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoNode),+> IntoNode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_node(self) -> Node {
                let ($($name,)+) = self;
                Node::Tuple(vec![$($name.into_node()),+])
            }
        }
    };
}

impl_into_node_tuple!(A, B);
impl_into_node_tuple!(A, B, C);
impl_into_node_tuple!(A, B, C, D);
impl_into_node_tuple!(A, B, C, D, E);
impl_into_node_tuple!(A, B, C, D, E, F);
impl_into_node_tuple!(A, B, C, D, E, F, G);
impl_into_node_tuple!(A, B, C, D, E, F, G, H);

pub(crate) fn boxed(value: impl IntoNode) -> Box<Node> {
    Box::new(value.into_node())
}

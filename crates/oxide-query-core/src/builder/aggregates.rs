//! Aggregate functions.

use super::{boxed, IntoNode};
use crate::ast::{AggregateCall, Params, Returns, Signature};
use crate::types::TypeTag;

impl AggregateCall {
    /// Aggregates distinct values only.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds `FILTER (WHERE condition)`.
    #[must_use]
    pub fn filter(mut self, condition: impl IntoNode) -> Self {
        self.filter = Some(boxed(condition));
        self
    }
}

fn aggregate(name: &'static str, returns: Returns, x: impl IntoNode) -> AggregateCall {
    AggregateCall::new(
        Signature {
            name,
            params: Params::any(1),
            returns,
        },
        vec![x.into_node()],
    )
}

/// `COUNT(x)`
#[must_use]
pub fn count(x: impl IntoNode) -> AggregateCall {
    aggregate("COUNT", Returns::Declared(TypeTag::Int), x)
}

/// `COUNT(*)`
#[must_use]
pub fn count_all() -> AggregateCall {
    let mut call = AggregateCall::new(Signature::fixed("COUNT", 0, TypeTag::Int), vec![]);
    call.star = true;
    call
}

/// `SUM(x)`, NULL over an empty set.
#[must_use]
pub fn sum(x: impl IntoNode) -> AggregateCall {
    aggregate("SUM", Returns::Declared(TypeTag::optional(TypeTag::Double)), x)
}

/// `TOTAL(x)`, 0.0 over an empty set.
#[must_use]
pub fn total(x: impl IntoNode) -> AggregateCall {
    aggregate("TOTAL", Returns::Declared(TypeTag::Double), x)
}

/// `AVG(x)`
#[must_use]
pub fn avg(x: impl IntoNode) -> AggregateCall {
    aggregate("AVG", Returns::Declared(TypeTag::optional(TypeTag::Double)), x)
}

/// Aggregate `MIN(x)`.
#[must_use]
pub fn min(x: impl IntoNode) -> AggregateCall {
    aggregate("MIN", Returns::OptionalCommon, x)
}

/// Aggregate `MAX(x)`.
#[must_use]
pub fn max(x: impl IntoNode) -> AggregateCall {
    aggregate("MAX", Returns::OptionalCommon, x)
}

/// `GROUP_CONCAT(x)`
#[must_use]
pub fn group_concat(x: impl IntoNode) -> AggregateCall {
    aggregate(
        "GROUP_CONCAT",
        Returns::Declared(TypeTag::optional(TypeTag::Text)),
        x,
    )
}

/// `GROUP_CONCAT(x, separator)`
#[must_use]
pub fn group_concat_sep(x: impl IntoNode, separator: impl IntoNode) -> AggregateCall {
    AggregateCall::new(
        Signature::fixed("GROUP_CONCAT", 2, TypeTag::optional(TypeTag::Text)),
        vec![x.into_node(), separator.into_node()],
    )
}

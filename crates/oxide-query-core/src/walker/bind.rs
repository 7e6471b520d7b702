//! Writing parameter values into an executor's statement slots.

use std::ops::ControlFlow;

use tracing::debug;

use super::{walk, Visitor};
use crate::ast::Node;
use crate::error::BindError;
use crate::value::{Bindable, PointerValue, Scalar};

/// Receives parameter values by one-based slot index.
///
/// Implemented by executor adapters; [`RecordingSink`] keeps the values in
/// memory.
pub trait BindSink {
    /// Binds SQL NULL.
    fn bind_null(&mut self, index: usize) -> Result<(), BindError>;
    /// Binds a boolean.
    fn bind_bool(&mut self, index: usize, value: bool) -> Result<(), BindError>;
    /// Binds a 64-bit integer.
    fn bind_int(&mut self, index: usize, value: i64) -> Result<(), BindError>;
    /// Binds a double.
    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), BindError>;
    /// Binds text.
    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), BindError>;
    /// Binds a blob as a single value.
    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), BindError>;
    /// Binds a tagged pointer.
    fn bind_pointer(&mut self, index: usize, value: &PointerValue) -> Result<(), BindError>;
}

/// A sink that records every bound value.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// `(slot, value)` pairs in binding order.
    pub bound: Vec<(usize, Scalar)>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { bound: vec![] }
    }

    /// The recorded values without their slots.
    #[must_use]
    pub fn values(&self) -> Vec<Scalar> {
        self.bound.iter().map(|(_, v)| v.clone()).collect()
    }

    fn push(&mut self, index: usize, value: Scalar) -> Result<(), BindError> {
        self.bound.push((index, value));
        Ok(())
    }
}

impl BindSink for RecordingSink {
    fn bind_null(&mut self, index: usize) -> Result<(), BindError> {
        self.push(index, Scalar::Null)
    }

    fn bind_bool(&mut self, index: usize, value: bool) -> Result<(), BindError> {
        self.push(index, Scalar::Bool(value))
    }

    fn bind_int(&mut self, index: usize, value: i64) -> Result<(), BindError> {
        self.push(index, Scalar::Int(value))
    }

    fn bind_double(&mut self, index: usize, value: f64) -> Result<(), BindError> {
        self.push(index, Scalar::Double(value))
    }

    fn bind_text(&mut self, index: usize, value: &str) -> Result<(), BindError> {
        self.push(index, Scalar::Text(value.to_owned()))
    }

    fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<(), BindError> {
        self.push(index, Scalar::Blob(value.to_vec()))
    }

    fn bind_pointer(&mut self, index: usize, value: &PointerValue) -> Result<(), BindError> {
        self.push(index, Scalar::Pointer(value.clone()))
    }
}

/// Dispatches one scalar to the matching sink method.
fn bind_scalar(sink: &mut dyn BindSink, index: usize, value: &Scalar) -> Result<(), BindError> {
    match value {
        Scalar::Null => sink.bind_null(index),
        Scalar::Bool(b) => sink.bind_bool(index, *b),
        Scalar::Int(n) => sink.bind_int(index, *n),
        Scalar::Double(f) => sink.bind_double(index, *f),
        Scalar::Text(s) => sink.bind_text(index, s),
        Scalar::Blob(b) => sink.bind_blob(index, b),
        Scalar::Pointer(p) => sink.bind_pointer(index, p),
    }
}

/// Visitor writing parameters into a sink as the walk reaches them.
///
/// With `overrides` set, the n-th parameter slot receives the n-th
/// override instead of the tree's own value.
pub struct Binder<'a> {
    sink: &'a mut dyn BindSink,
    overrides: Option<&'a [Scalar]>,
    next: usize,
    error: Option<BindError>,
}

impl<'a> Binder<'a> {
    /// Binds the tree's own values.
    pub fn new(sink: &'a mut dyn BindSink) -> Self {
        Self {
            sink,
            overrides: None,
            next: 0,
            error: None,
        }
    }

    /// Binds `values` in place of the tree's own values.
    pub fn with_values(sink: &'a mut dyn BindSink, values: &'a [Scalar]) -> Self {
        Self {
            overrides: Some(values),
            ..Self::new(sink)
        }
    }

    /// Number of slots written, or the first sink failure.
    ///
    /// # Errors
    ///
    /// Returns the `BindValueError` that stopped the walk.
    pub fn finish(self) -> Result<usize, BindError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.next),
        }
    }
}

impl Visitor for Binder<'_> {
    fn visit_parameter(&mut self, value: &Bindable) -> ControlFlow<()> {
        let position = self.next;
        let index = position + 1;
        let scalar = match self.overrides {
            Some(values) => match values.get(position) {
                Some(scalar) => scalar,
                None => {
                    self.error = Some(BindError::value(index, "no value supplied"));
                    return ControlFlow::Break(());
                }
            },
            None => &value.value,
        };
        match bind_scalar(self.sink, index, scalar) {
            Ok(()) => {
                self.next = index;
                ControlFlow::Continue(())
            }
            Err(err) => {
                self.error = Some(match err {
                    BindError::BindValueError { .. } => err,
                    other => BindError::value(index, other.to_string()),
                });
                ControlFlow::Break(())
            }
        }
    }
}

/// Counts the parameters of `node` without binding anything.
#[must_use]
pub fn parameter_count(node: &Node) -> usize {
    struct Count(usize);

    impl Visitor for Count {
        fn visit_parameter(&mut self, _value: &Bindable) -> ControlFlow<()> {
            self.0 += 1;
            ControlFlow::Continue(())
        }
    }

    let mut count = Count(0);
    walk(node, &mut count);
    count.0
}

/// Binds the parameter values carried by `node`, in serialization order.
///
/// Returns the number of slots written.
///
/// # Errors
///
/// Returns `BindValueError` when the sink rejects a value; binding stops at
/// that slot.
pub fn bind(node: &Node, sink: &mut dyn BindSink) -> Result<usize, BindError> {
    let mut binder = Binder::new(sink);
    walk(node, &mut binder);
    let bound = binder.finish()?;
    debug!(params = bound, "bound parameters");
    Ok(bound)
}

/// Binds `values` to the parameter slots of `node`, ignoring the values the
/// tree carries.
///
/// # Errors
///
/// Returns `BindCountMismatch` before touching the sink when `values` does
/// not match the number of parameters, and `BindValueError` when the sink
/// rejects a value.
pub fn bind_values(
    node: &Node,
    values: &[Scalar],
    sink: &mut dyn BindSink,
) -> Result<usize, BindError> {
    let expected = parameter_count(node);
    if expected != values.len() {
        return Err(BindError::BindCountMismatch {
            expected,
            found: values.len(),
        });
    }
    let mut binder = Binder::with_values(sink, values);
    walk(node, &mut binder);
    let bound = binder.finish()?;
    debug!(params = bound, "bound supplied values");
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{and, col, eq, lit, param, select};
    use crate::fixtures::UserColumns;
    use pretty_assertions::assert_eq;

    fn query() -> Node {
        select(col::<UserColumns::Id>())
            .filter(and(
                eq(col::<UserColumns::Name>(), "alice"),
                eq(col::<UserColumns::Grade>(), lit(3)),
            ))
            .limit(param(vec![0xde_u8, 0xad]))
            .into()
    }

    struct Rejecting {
        at: usize,
        seen: Vec<usize>,
    }

    impl Rejecting {
        fn check(&mut self, index: usize) -> Result<(), BindError> {
            self.seen.push(index);
            if index == self.at {
                Err(BindError::value(index, "datatype mismatch"))
            } else {
                Ok(())
            }
        }
    }

    impl BindSink for Rejecting {
        fn bind_null(&mut self, index: usize) -> Result<(), BindError> {
            self.check(index)
        }
        fn bind_bool(&mut self, index: usize, _: bool) -> Result<(), BindError> {
            self.check(index)
        }
        fn bind_int(&mut self, index: usize, _: i64) -> Result<(), BindError> {
            self.check(index)
        }
        fn bind_double(&mut self, index: usize, _: f64) -> Result<(), BindError> {
            self.check(index)
        }
        fn bind_text(&mut self, index: usize, _: &str) -> Result<(), BindError> {
            self.check(index)
        }
        fn bind_blob(&mut self, index: usize, _: &[u8]) -> Result<(), BindError> {
            self.check(index)
        }
        fn bind_pointer(&mut self, index: usize, _: &PointerValue) -> Result<(), BindError> {
            self.check(index)
        }
    }

    #[test]
    fn test_bind_own_values() {
        let mut sink = RecordingSink::new();
        assert_eq!(bind(&query(), &mut sink).unwrap(), 2);
        assert_eq!(
            sink.bound,
            vec![
                (1, Scalar::Text(String::from("alice"))),
                (2, Scalar::Blob(vec![0xde, 0xad])),
            ]
        );
    }

    #[test]
    fn test_bind_values_overrides() {
        let mut sink = RecordingSink::new();
        let values = [Scalar::Text(String::from("bob")), Scalar::Null];
        assert_eq!(bind_values(&query(), &values, &mut sink).unwrap(), 2);
        assert_eq!(sink.values(), values.to_vec());
    }

    #[test]
    fn test_count_mismatch_writes_nothing() {
        let mut sink = RecordingSink::new();
        let err = bind_values(&query(), &[Scalar::Int(1)], &mut sink).unwrap_err();
        assert_eq!(
            err,
            BindError::BindCountMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(sink.bound.is_empty());
    }

    #[test]
    fn test_sink_failure_aborts() {
        let node: Node = select((param(1), param(2), param(3))).into();
        let mut sink = Rejecting { at: 2, seen: vec![] };
        let err = bind(&node, &mut sink).unwrap_err();
        assert_eq!(err, BindError::value(2, "datatype mismatch"));
        assert_eq!(sink.seen, vec![1, 2]);
    }

    #[test]
    fn test_no_parameters() {
        let node: Node = select(lit(1)).into();
        let mut sink = RecordingSink::new();
        assert_eq!(bind(&node, &mut sink).unwrap(), 0);
        assert_eq!(parameter_count(&node), 0);
    }
}

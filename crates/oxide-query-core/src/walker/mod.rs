//! Depth-first traversal over query trees.
//!
//! [`walk`] visits the leaves of a tree in exactly the order the serializer
//! emits them, so the n-th parameter the walker reports is the n-th `?` in
//! the rendered SQL.

mod bind;
mod collect;

use std::ops::ControlFlow;

pub use bind::{bind, bind_values, parameter_count, BindSink, Binder, RecordingSink};
pub use collect::{ParameterCollector, TableCollector};

use crate::ast::{
    ColumnRef, InSet, InsertSource, JoinConstraint, Node, Select, TableRef, UpsertAction,
};
use crate::value::Bindable;

/// Callbacks invoked by [`walk`].
///
/// Every callback defaults to continuing; return `ControlFlow::Break(())`
/// to stop the traversal immediately.
pub trait Visitor {
    /// Called for every bindable value.
    fn visit_parameter(&mut self, _value: &Bindable) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called for every inline value.
    fn visit_literal(&mut self, _value: &Bindable) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called for every column reference.
    fn visit_column(&mut self, _column: &ColumnRef) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called for tables named by an asterisk or a rowid.
    fn visit_table(&mut self, _table: &TableRef) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Whether to descend into SELECTs nested in expressions.
    fn descend_into_subqueries(&self) -> bool {
        true
    }
}

/// Walks `node` depth-first, left to right.
///
/// A compound's ORDER BY and LIMIT are visited after its last arm. A SELECT
/// at the root is always traversed; SELECTs nested in expressions
/// are traversed when the visitor agrees.
pub fn walk(node: &Node, visitor: &mut dyn Visitor) {
    let _ = Walker { visitor }.root(node);
}

/// Walks `node` as an expression: a SELECT at the root counts as nested.
pub(crate) fn walk_expr(node: &Node, visitor: &mut dyn Visitor) {
    let _ = Walker { visitor }.node(node);
}

struct Walker<'v> {
    visitor: &'v mut dyn Visitor,
}

impl Walker<'_> {
    fn root(&mut self, node: &Node) -> ControlFlow<()> {
        match node {
            Node::Select(select) => self.select(select),
            other => self.node(other),
        }
    }

    fn nested(&mut self, select: &Select) -> ControlFlow<()> {
        if self.visitor.descend_into_subqueries() {
            self.select(select)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn nodes(&mut self, nodes: &[Node]) -> ControlFlow<()> {
        for node in nodes {
            self.node(node)?;
        }
        ControlFlow::Continue(())
    }

    fn opt(&mut self, node: Option<&Node>) -> ControlFlow<()> {
        match node {
            Some(node) => self.node(node),
            None => ControlFlow::Continue(()),
        }
    }

    fn node(&mut self, node: &Node) -> ControlFlow<()> {
        match node {
            Node::Parameter(value) => self.visitor.visit_parameter(value),
            Node::Literal(value) => self.visitor.visit_literal(value),
            Node::Column(column) => self.visitor.visit_column(column),
            Node::Asterisk(table) | Node::Rowid(table) => self.visitor.visit_table(table),
            Node::AliasRef(_) | Node::Excluded { .. } => ControlFlow::Continue(()),
            Node::Alias { inner, .. } => self.node(inner),
            Node::Unary { operand, .. } => self.node(operand),
            Node::Binary { lhs, rhs, .. } => {
                self.node(lhs)?;
                self.node(rhs)
            }
            Node::IsNull { operand, .. } => self.node(operand),
            Node::Function(call) => self.nodes(&call.args),
            Node::Aggregate(call) => {
                self.nodes(&call.args)?;
                self.opt(call.filter.as_deref())
            }
            Node::Tuple(items) => self.nodes(items),
            Node::Case(case) => {
                self.opt(case.subject.as_deref())?;
                for (when, then) in &case.arms {
                    self.node(when)?;
                    self.node(then)?;
                }
                self.opt(case.else_.as_deref())
            }
            Node::Between { expr, lo, hi, .. } => {
                self.node(expr)?;
                self.node(lo)?;
                self.node(hi)
            }
            Node::Like {
                arg,
                pattern,
                escape,
                ..
            } => {
                self.node(arg)?;
                self.node(pattern)?;
                self.opt(escape.as_deref())
            }
            Node::In { left, set, .. } => {
                self.node(left)?;
                match set {
                    InSet::List(values) => self.nodes(values),
                    InSet::Subquery(select) => self.nested(select),
                }
            }
            Node::Exists { select, .. } => self.nested(select),
            Node::Cast { operand, .. } | Node::Collate { operand, .. } => self.node(operand),
            Node::Subquery(select) | Node::Select(select) => self.nested(select),
            Node::With(with) => {
                for cte in &with.ctes {
                    self.select(&cte.select)?;
                }
                self.root(&with.statement)
            }
            Node::Insert(insert) => {
                match &insert.source {
                    InsertSource::Values(rows) => {
                        for row in rows {
                            self.nodes(row)?;
                        }
                    }
                    InsertSource::Select(select) => self.select(select)?,
                    InsertSource::DefaultValues => {}
                }
                if let Some(upsert) = &insert.upsert {
                    if let UpsertAction::Update {
                        assignments,
                        where_,
                    } = &upsert.action
                    {
                        for (_, value) in assignments {
                            self.node(value)?;
                        }
                        self.opt(where_.as_ref())?;
                    }
                }
                ControlFlow::Continue(())
            }
            Node::Update(update) => {
                for (_, value) in &update.assignments {
                    self.node(value)?;
                }
                self.opt(update.where_.as_ref())
            }
            Node::Delete(delete) => self.opt(delete.where_.as_ref()),
        }
    }

    fn select(&mut self, select: &Select) -> ControlFlow<()> {
        self.nodes(&select.columns)?;
        for join in &select.joins {
            if let Some(JoinConstraint::On(on)) = &join.constraint {
                self.node(on)?;
            }
        }
        self.opt(select.where_.as_ref())?;
        self.nodes(&select.group_by)?;
        self.opt(select.having.as_ref())?;
        if let Some((_, right)) = &select.compound {
            self.select(right)?;
        }
        for key in &select.order_by {
            self.node(&key.expr)?;
        }
        if let Some(limit) = &select.limit {
            self.node(&limit.count)?;
            self.opt(limit.offset.as_ref())?;
        }
        ControlFlow::Continue(())
    }
}

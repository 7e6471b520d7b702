//! Static type inference over query trees.
//!
//! [`infer_type`] derives the result type of a node from its shape and the
//! registered schema, and checks every column reference, function call and
//! compound select it passes on the way.

use tracing::trace;

use crate::ast::{
    ArgSlot, BinaryOp, ColumnRef, Cte, Delete, InSet, Insert, InsertSource, JoinConstraint, Node,
    Params, Returns, Select, Signature, TableId, TableRef, UnaryOp, Update, UpsertAction, With,
};
use crate::error::{SchemaError, TypeError};
use crate::schema::{SchemaRegistry, TypeKey};
use crate::types::{common_type, TypeTag};

/// Infers the result type of `node`.
///
/// # Errors
///
/// Returns a [`TypeError`] for unmapped tables, unknown columns or common
/// table expressions, wrong function arity or pointer tags, compound arms of
/// different types, arguments without a common type, and empty projections.
pub fn infer_type(node: &Node, schema: &SchemaRegistry) -> Result<TypeTag, TypeError> {
    Inference::new(schema).node(node)
}

/// Column names and types of a common table expression in scope.
#[derive(Debug)]
struct CteShape {
    moniker: String,
    columns: Vec<(String, TypeTag)>,
}

struct Inference<'s> {
    schema: &'s SchemaRegistry,
    ctes: Vec<CteShape>,
    aliases: Vec<(String, TypeTag)>,
}

impl<'s> Inference<'s> {
    const fn new(schema: &'s SchemaRegistry) -> Self {
        Self {
            schema,
            ctes: Vec::new(),
            aliases: Vec::new(),
        }
    }

    fn node(&mut self, node: &Node) -> Result<TypeTag, TypeError> {
        match node {
            Node::Literal(value) | Node::Parameter(value) => Ok(value.ty.clone()),
            Node::Column(column) => self.column(column),
            Node::Asterisk(table) => self.row_type(table),
            Node::Rowid(table) => {
                self.row_type(table)?;
                Ok(TypeTag::Int)
            }
            Node::Alias { inner, .. } => self.node(inner),
            Node::AliasRef(name) => Ok(self
                .aliases
                .iter()
                .rev()
                .find(|(alias, _)| alias == name)
                .map_or(TypeTag::Null, |(_, ty)| ty.clone())),
            Node::Unary {
                op,
                operand,
                pinned,
            } => {
                let operand = self.node(operand)?;
                Ok(pinned.clone().unwrap_or(match op {
                    UnaryOp::Not => TypeTag::Bool,
                    UnaryOp::Neg => operand,
                    UnaryOp::BitNot => TypeTag::Int,
                }))
            }
            Node::Binary {
                op,
                lhs,
                rhs,
                pinned,
            } => {
                self.node(lhs)?;
                self.node(rhs)?;
                Ok(pinned.clone().unwrap_or(if op.is_arithmetic() {
                    TypeTag::Double
                } else if *op == BinaryOp::Concat {
                    TypeTag::Text
                } else {
                    TypeTag::Bool
                }))
            }
            Node::IsNull { operand, .. } => {
                self.node(operand)?;
                Ok(TypeTag::Bool)
            }
            Node::Function(call) => self.call(&call.signature, &call.args),
            Node::Aggregate(call) => {
                if let Some(filter) = &call.filter {
                    self.node(filter)?;
                }
                self.call(&call.signature, &call.args)
            }
            Node::Tuple(items) => Ok(TypeTag::Tuple(self.nodes(items)?)),
            Node::Case(case) => {
                if let Some(subject) = &case.subject {
                    self.node(subject)?;
                }
                for (when, then) in &case.arms {
                    self.node(when)?;
                    self.node(then)?;
                }
                if let Some(else_) = &case.else_ {
                    self.node(else_)?;
                }
                Ok(case.result.clone())
            }
            Node::Between { expr, lo, hi, .. } => {
                self.node(expr)?;
                self.node(lo)?;
                self.node(hi)?;
                Ok(TypeTag::Bool)
            }
            Node::Like {
                arg,
                pattern,
                escape,
                ..
            } => {
                self.node(arg)?;
                self.node(pattern)?;
                if let Some(escape) = escape {
                    self.node(escape)?;
                }
                Ok(TypeTag::Bool)
            }
            Node::In { left, set, .. } => {
                self.node(left)?;
                match set {
                    InSet::List(values) => {
                        self.nodes(values)?;
                    }
                    InSet::Subquery(select) => {
                        self.select(select)?;
                    }
                }
                Ok(TypeTag::Bool)
            }
            Node::Exists { select, .. } => {
                self.select(select)?;
                Ok(TypeTag::Bool)
            }
            Node::Cast { operand, to } => {
                self.node(operand)?;
                Ok(to.clone())
            }
            Node::Collate { operand, .. } => self.node(operand),
            Node::Subquery(select) | Node::Select(select) => self.select(select),
            Node::Excluded { table, member } => {
                Ok(self.schema.column(*table, member)?.value_type())
            }
            Node::With(with) => self.with(with),
            Node::Insert(insert) => self.insert(insert),
            Node::Update(update) => self.update(update),
            Node::Delete(delete) => self.delete(delete),
        }
    }

    fn nodes(&mut self, nodes: &[Node]) -> Result<Vec<TypeTag>, TypeError> {
        nodes.iter().map(|n| self.node(n)).collect()
    }

    fn cte(&self, moniker: &str) -> Result<&CteShape, TypeError> {
        self.ctes
            .iter()
            .rev()
            .find(|cte| cte.moniker == moniker)
            .ok_or_else(|| TypeError::UnknownMoniker(moniker.to_string()))
    }

    fn column(&self, column: &ColumnRef) -> Result<TypeTag, TypeError> {
        match &column.table {
            TableId::Mapped(key) => Ok(self.schema.column(*key, &column.member)?.value_type()),
            TableId::Moniker(moniker) => self
                .cte(moniker)?
                .columns
                .iter()
                .find(|(name, _)| *name == column.member)
                .map(|(_, ty)| ty.clone())
                .ok_or_else(|| {
                    SchemaError::ColumnNotFound {
                        table: moniker.clone(),
                        member: column.member.clone(),
                    }
                    .into()
                }),
        }
    }

    fn row_type(&self, table: &TableRef) -> Result<TypeTag, TypeError> {
        match &table.table {
            TableId::Mapped(key) => Ok(self.schema.row_type(*key)?),
            TableId::Moniker(moniker) => Ok(TypeTag::Tuple(
                self.cte(moniker)?
                    .columns
                    .iter()
                    .map(|(_, ty)| ty.clone())
                    .collect(),
            )),
        }
    }

    fn check_member(&self, table: &TableRef, member: &str) -> Result<(), TypeError> {
        let column = ColumnRef {
            table: table.table.clone(),
            member: member.to_string(),
            alias: None,
        };
        self.column(&column).map(drop)
    }

    fn call(&mut self, signature: &Signature, args: &[Node]) -> Result<TypeTag, TypeError> {
        let types = self.nodes(args)?;

        if let Params::Fixed(slots) = &signature.params {
            if slots.len() != args.len() {
                return Err(TypeError::ArityMismatch {
                    function: signature.name.to_string(),
                    expected: slots.len(),
                    found: args.len(),
                });
            }
            for (position, (slot, ty)) in slots.iter().zip(&types).enumerate() {
                let ArgSlot::Pointer(expected) = slot else {
                    continue;
                };
                match ty.non_null() {
                    TypeTag::Null => {}
                    TypeTag::Pointer(tag) if tag == expected => {}
                    other => {
                        return Err(TypeError::PointerTypeMismatch {
                            function: signature.name.to_string(),
                            position,
                            expected: *expected,
                            found: other.to_string(),
                        })
                    }
                }
            }
        }

        match &signature.returns {
            Returns::Declared(ty) => Ok(ty.clone()),
            Returns::Common => common_type(&types).ok_or_else(|| TypeError::NoCommonType {
                function: signature.name.to_string(),
            }),
            Returns::OptionalCommon => common_type(&types)
                .map(TypeTag::optional)
                .ok_or_else(|| TypeError::NoCommonType {
                    function: signature.name.to_string(),
                }),
        }
    }

    fn select(&mut self, select: &Select) -> Result<TypeTag, TypeError> {
        if select.columns.is_empty() {
            return Err(TypeError::EmptySelect);
        }
        for table in &select.from {
            self.row_type(table)?;
        }
        for join in &select.joins {
            self.row_type(&join.table)?;
            match &join.constraint {
                Some(JoinConstraint::On(on)) => {
                    self.node(on)?;
                }
                Some(JoinConstraint::Using(members)) => {
                    for member in members {
                        self.check_member(&join.table, member)?;
                    }
                }
                None => {}
            }
        }

        let mark = self.aliases.len();
        let mut items = Vec::with_capacity(select.columns.len());
        for column in &select.columns {
            let ty = self.node(column)?;
            if let Node::Alias { name, .. } = column {
                self.aliases.push((name.clone(), ty.clone()));
            }
            items.push(ty);
        }

        let clauses = select
            .where_
            .iter()
            .chain(&select.group_by)
            .chain(&select.having)
            .chain(select.order_by.iter().map(|key| &key.expr));
        for clause in clauses {
            self.node(clause)?;
        }
        if let Some(limit) = &select.limit {
            self.node(&limit.count)?;
            if let Some(offset) = &limit.offset {
                self.node(offset)?;
            }
        }
        self.aliases.truncate(mark);

        let ty = if items.len() == 1 {
            items.swap_remove(0)
        } else {
            TypeTag::Tuple(items)
        };

        if let Some((op, right)) = &select.compound {
            let right = self.select(right)?;
            if right != ty {
                return Err(TypeError::CompoundTypeMismatch {
                    operator: op.as_str(),
                    left: ty,
                    right,
                });
            }
        }
        Ok(ty)
    }

    /// Derives the column names and types a CTE exposes from its projection.
    fn shape(&mut self, cte: &Cte, select: &Select) -> Result<CteShape, TypeError> {
        self.select(select)?;

        let mut columns = Vec::new();
        for (i, item) in select.columns.iter().enumerate() {
            match item {
                Node::Asterisk(table) => match &table.table {
                    TableId::Mapped(key) => {
                        let descriptor = self.schema.resolve(*key)?;
                        columns.extend(
                            descriptor
                                .columns
                                .iter()
                                .map(|c| (c.name.clone(), c.value_type())),
                        );
                    }
                    TableId::Moniker(moniker) => {
                        columns.extend(self.cte(moniker)?.columns.iter().cloned());
                    }
                },
                Node::Alias { name, inner } => columns.push((name.clone(), self.node(inner)?)),
                Node::Column(column) => {
                    let name = self.column_name(column)?;
                    columns.push((name, self.column(column)?));
                }
                other => columns.push((i.to_string(), self.node(other)?)),
            }
        }

        if !cte.columns.is_empty() {
            for ((name, _), explicit) in columns.iter_mut().zip(&cte.columns) {
                name.clone_from(explicit);
            }
        }

        trace!(moniker = %cte.moniker, columns = columns.len(), "typed common table expression");
        Ok(CteShape {
            moniker: cte.moniker.clone(),
            columns,
        })
    }

    fn column_name(&self, column: &ColumnRef) -> Result<String, TypeError> {
        match &column.table {
            TableId::Mapped(key) => Ok(self.schema.column_name(*key, &column.member)?.to_string()),
            TableId::Moniker(_) => Ok(column.member.clone()),
        }
    }

    fn with(&mut self, with: &With) -> Result<TypeTag, TypeError> {
        let mark = self.ctes.len();
        for cte in &with.ctes {
            if with.recursive && cte.select.compound.is_some() {
                // The recursive arm reads the CTE itself, so the anchor arm
                // fixes its columns before the whole select is checked.
                let anchor = Select {
                    compound: None,
                    ..cte.select.clone()
                };
                let shape = self.shape(cte, &anchor)?;
                self.ctes.push(shape);
                self.select(&cte.select)?;
            } else {
                let shape = self.shape(cte, &cte.select)?;
                self.ctes.push(shape);
            }
        }
        let ty = self.node(&with.statement);
        self.ctes.truncate(mark);
        ty
    }

    fn check_members(&self, table: TypeKey, members: &[&'static str]) -> Result<(), TypeError> {
        for member in members {
            self.schema.column(table, member)?;
        }
        Ok(())
    }

    fn insert(&mut self, insert: &Insert) -> Result<TypeTag, TypeError> {
        self.schema.resolve(insert.table)?;
        self.check_members(insert.table, &insert.columns)?;
        match &insert.source {
            InsertSource::Values(rows) => {
                for row in rows {
                    self.nodes(row)?;
                }
            }
            InsertSource::Select(select) => {
                self.select(select)?;
            }
            InsertSource::DefaultValues => {}
        }
        if let Some(upsert) = &insert.upsert {
            self.check_members(insert.table, &upsert.target)?;
            if let UpsertAction::Update {
                assignments,
                where_,
            } = &upsert.action
            {
                if assignments.is_empty() {
                    return Err(TypeError::EmptyAssignments);
                }
                for (member, value) in assignments {
                    self.schema.column(insert.table, member)?;
                    self.node(value)?;
                }
                if let Some(condition) = where_ {
                    self.node(condition)?;
                }
            }
        }
        Ok(TypeTag::Unit)
    }

    fn update(&mut self, update: &Update) -> Result<TypeTag, TypeError> {
        self.schema.resolve(update.table)?;
        if update.assignments.is_empty() {
            return Err(TypeError::EmptyAssignments);
        }
        for (member, value) in &update.assignments {
            self.schema.column(update.table, member)?;
            self.node(value)?;
        }
        if let Some(condition) = &update.where_ {
            self.node(condition)?;
        }
        Ok(TypeTag::Unit)
    }

    fn delete(&mut self, delete: &Delete) -> Result<TypeTag, TypeError> {
        self.schema.resolve(delete.table)?;
        if let Some(condition) = &delete.where_ {
            self.node(condition)?;
        }
        Ok(TypeTag::Unit)
    }
}

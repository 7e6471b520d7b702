//! Rendering query trees as SQLite SQL text.
//!
//! Serialization is a pure function of a node and a [`Context`]. The
//! context is copied into every recursive call, so a flag overridden for one
//! subtree never leaks into its siblings.

mod select;
mod statement;

use crate::ast::{AggregateCall, ColumnRef, InSet, Node, TableId, TableRef, UnaryOp};
use crate::error::TypeError;
use crate::schema::SchemaRegistry;
use crate::value::Bindable;

/// Flags controlling how a subtree is rendered.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Registry used to resolve table and column names.
    pub schema: &'a SchemaRegistry,
    /// Render columns without their table qualifier.
    pub skip_table_name: bool,
    /// Parenthesize operator nodes.
    pub use_parentheses: bool,
    /// Render parameters as `?` instead of inline literals.
    pub replace_bindable_with_question: bool,
}

impl<'a> Context<'a> {
    /// Qualified columns, no outer parentheses, `?` placeholders.
    #[must_use]
    pub const fn new(schema: &'a SchemaRegistry) -> Self {
        Self {
            schema,
            skip_table_name: false,
            use_parentheses: false,
            replace_bindable_with_question: true,
        }
    }

    /// Like [`Context::new`] but with parameters rendered inline.
    #[must_use]
    pub const fn inline(schema: &'a SchemaRegistry) -> Self {
        Self::new(schema).with_placeholders(false)
    }

    /// Overrides `skip_table_name`.
    #[must_use]
    pub const fn with_skip_table_name(mut self, skip: bool) -> Self {
        self.skip_table_name = skip;
        self
    }

    /// Overrides `use_parentheses`.
    #[must_use]
    pub const fn with_parentheses(mut self, parens: bool) -> Self {
        self.use_parentheses = parens;
        self
    }

    /// Overrides `replace_bindable_with_question`.
    #[must_use]
    pub const fn with_placeholders(mut self, placeholders: bool) -> Self {
        self.replace_bindable_with_question = placeholders;
        self
    }
}

/// Renders `node` as SQL.
///
/// # Errors
///
/// Returns `TypeError::Schema` when a table or column cannot be resolved.
pub fn serialize(node: &Node, ctx: &Context<'_>) -> Result<String, TypeError> {
    statement(node, *ctx)
}

/// Renders a node in statement position, where a SELECT is left bare unless
/// `use_parentheses` asks otherwise.
fn statement(node: &Node, ctx: Context<'_>) -> Result<String, TypeError> {
    match node {
        Node::Select(query) => Ok(wrap(select::select(query, ctx.with_parentheses(false))?, ctx)),
        other => expr(other, ctx),
    }
}

/// Double-quotes an identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_name(table: &TableId, ctx: &Context<'_>) -> Result<String, TypeError> {
    match table {
        TableId::Mapped(key) => Ok(ctx.schema.table_name(*key)?.to_owned()),
        TableId::Moniker(moniker) => Ok(moniker.clone()),
    }
}

/// `"alias"` when aliased, else `"table"`.
fn qualifier(
    table: &TableId,
    alias: Option<&String>,
    ctx: &Context<'_>,
) -> Result<String, TypeError> {
    match alias {
        Some(alias) => Ok(quote_identifier(alias)),
        None => Ok(quote_identifier(&table_name(table, ctx)?)),
    }
}

/// `"table"` or `"table" AS "alias"` for FROM and JOIN lists.
fn table_ref(table: &TableRef, ctx: &Context<'_>) -> Result<String, TypeError> {
    let name = quote_identifier(&table_name(&table.table, ctx)?);
    Ok(match &table.alias {
        Some(alias) => format!("{name} AS {}", quote_identifier(alias)),
        None => name,
    })
}

fn column_name(column: &ColumnRef, ctx: &Context<'_>) -> Result<String, TypeError> {
    let name = match &column.table {
        TableId::Mapped(key) => ctx.schema.column_name(*key, &column.member)?,
        TableId::Moniker(_) => column.member.as_str(),
    };
    Ok(quote_identifier(name))
}

fn value(value: &Bindable, ctx: Context<'_>) -> String {
    if ctx.replace_bindable_with_question {
        String::from("?")
    } else {
        value.value.to_sql_inline()
    }
}

fn wrap(sql: String, ctx: Context<'_>) -> String {
    if ctx.use_parentheses {
        format!("({sql})")
    } else {
        sql
    }
}

/// Renders a comma-separated list, each item as a clause root.
fn list(nodes: &[Node], ctx: Context<'_>) -> Result<String, TypeError> {
    let inner = ctx.with_parentheses(false);
    let parts = nodes
        .iter()
        .map(|node| expr(node, inner))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(", "))
}

fn aggregate(call: &AggregateCall, ctx: Context<'_>) -> Result<String, TypeError> {
    let args = if call.star {
        String::from("*")
    } else {
        list(&call.args, ctx)?
    };
    let distinct = if call.distinct { "DISTINCT " } else { "" };
    let mut sql = format!("{}({distinct}{args})", call.signature.name);
    if let Some(filter) = &call.filter {
        sql.push_str(" FILTER (WHERE ");
        sql.push_str(&expr(filter, ctx.with_parentheses(false))?);
        sql.push(')');
    }
    Ok(sql)
}

fn expr(node: &Node, ctx: Context<'_>) -> Result<String, TypeError> {
    let operand = ctx.with_parentheses(true);
    let root = ctx.with_parentheses(false);
    let sql = match node {
        Node::Literal(v) => v.value.to_sql_inline(),
        Node::Parameter(v) => value(v, ctx),
        Node::Column(column) => {
            let name = column_name(column, &ctx)?;
            if ctx.skip_table_name {
                name
            } else {
                let table = qualifier(&column.table, column.alias.as_ref(), &ctx)?;
                format!("{table}.{name}")
            }
        }
        Node::Asterisk(table) => {
            if ctx.skip_table_name {
                String::from("*")
            } else {
                format!("{}.*", qualifier(&table.table, table.alias.as_ref(), &ctx)?)
            }
        }
        Node::Rowid(table) => {
            if ctx.skip_table_name {
                String::from("rowid")
            } else {
                format!("{}.rowid", qualifier(&table.table, table.alias.as_ref(), &ctx)?)
            }
        }
        Node::Alias { name, inner } => {
            format!("{} AS {}", expr(inner, ctx)?, quote_identifier(name))
        }
        Node::AliasRef(name) => quote_identifier(name),
        Node::Unary {
            op, operand: inner, ..
        } => {
            let inner = expr(inner, operand)?;
            let sql = match op {
                UnaryOp::Not => format!("NOT {inner}"),
                // `--` would open a line comment
                UnaryOp::Neg | UnaryOp::BitNot if inner.starts_with('-') => {
                    format!("{} {inner}", op.as_str())
                }
                UnaryOp::Neg | UnaryOp::BitNot => format!("{}{inner}", op.as_str()),
            };
            wrap(sql, ctx)
        }
        Node::Binary { op, lhs, rhs, .. } => {
            let sql = format!(
                "{} {} {}",
                expr(lhs, operand)?,
                op.as_str(),
                expr(rhs, operand)?
            );
            wrap(sql, ctx)
        }
        Node::IsNull {
            operand: inner,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            wrap(format!("{} IS {not}NULL", expr(inner, operand)?), ctx)
        }
        Node::Function(call) => format!("{}({})", call.signature.name, list(&call.args, ctx)?),
        Node::Aggregate(call) => aggregate(call, ctx)?,
        Node::Tuple(items) => wrap(list(items, ctx)?, ctx),
        Node::Case(case) => {
            let mut sql = String::from("CASE");
            if let Some(subject) = &case.subject {
                sql.push(' ');
                sql.push_str(&expr(subject, root)?);
            }
            for (when, then) in &case.arms {
                sql.push_str(" WHEN ");
                sql.push_str(&expr(when, root)?);
                sql.push_str(" THEN ");
                sql.push_str(&expr(then, root)?);
            }
            if let Some(else_) = &case.else_ {
                sql.push_str(" ELSE ");
                sql.push_str(&expr(else_, root)?);
            }
            sql.push_str(" END");
            sql
        }
        Node::Between {
            expr: tested,
            lo,
            hi,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            let sql = format!(
                "{} {not}BETWEEN {} AND {}",
                expr(tested, operand)?,
                expr(lo, operand)?,
                expr(hi, operand)?
            );
            wrap(sql, ctx)
        }
        Node::Like {
            arg,
            pattern,
            escape,
            negated,
            glob,
        } => {
            let not = if *negated { "NOT " } else { "" };
            let keyword = if *glob { "GLOB" } else { "LIKE" };
            let mut sql = format!(
                "{} {not}{keyword} {}",
                expr(arg, operand)?,
                expr(pattern, operand)?
            );
            if let Some(escape) = escape {
                sql.push_str(" ESCAPE ");
                sql.push_str(&expr(escape, operand)?);
            }
            wrap(sql, ctx)
        }
        Node::In { left, set, negated } => {
            let not = if *negated { "NOT " } else { "" };
            let set = match set {
                InSet::List(values) => list(values, ctx)?,
                InSet::Subquery(select) => select::select(select, root)?,
            };
            wrap(format!("{} {not}IN ({set})", expr(left, operand)?), ctx)
        }
        Node::Exists { select, negated } => {
            let not = if *negated { "NOT " } else { "" };
            format!("{not}EXISTS ({})", select::select(select, root)?)
        }
        Node::Cast { operand: inner, to } => {
            format!("CAST({} AS {})", expr(inner, root)?, to.sql_type())
        }
        Node::Collate {
            operand: inner,
            collation,
        } => format!("{} COLLATE {collation}", expr(inner, operand)?),
        Node::Subquery(select) => format!("({})", select::select(select, root)?),
        Node::Excluded { table, member } => {
            format!(
                "excluded.{}",
                quote_identifier(ctx.schema.column_name(*table, member)?)
            )
        }
        Node::Select(select) => format!("({})", select::select(select, root)?),
        Node::With(with) => select::with(with, root)?,
        Node::Insert(insert) => statement::insert(insert, root)?,
        Node::Update(update) => statement::update(update, root)?,
        Node::Delete(delete) => statement::delete(delete, root)?,
    };
    Ok(sql)
}

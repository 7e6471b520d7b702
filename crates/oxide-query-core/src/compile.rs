//! Entry points used by executors: type-check and render a tree in one go.

use tracing::debug;

use crate::ast::Node;
use crate::error::TypeError;
use crate::infer::infer_type;
use crate::schema::SchemaRegistry;
use crate::serializer::{serialize, Context};
use crate::types::TypeTag;
use crate::walker::parameter_count;

/// A statement ready to be prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Row type of the statement; [`TypeTag::Unit`] for writes.
    pub result_type: TypeTag,
    /// Number of `?` placeholders in `sql`.
    pub parameter_count: usize,
}

/// Infers the result type of `node`, then renders it in placeholder mode.
///
/// # Errors
///
/// Returns the first [`TypeError`] found by inference or serialization.
pub fn compile(node: &Node, schema: &SchemaRegistry) -> Result<CompiledQuery, TypeError> {
    let result_type = infer_type(node, schema)?;
    let sql = serialize(node, &Context::new(schema))?;
    let parameter_count = parameter_count(node);
    debug!(
        sql = %sql,
        params = parameter_count,
        result_type = ?result_type,
        "compiled query"
    );
    Ok(CompiledQuery {
        sql,
        result_type,
        parameter_count,
    })
}

/// Renders `node` with every parameter inlined, for logs and `EXPLAIN`.
///
/// # Errors
///
/// Returns `TypeError::Schema` when a table or column cannot be resolved.
pub fn dump(node: &Node, schema: &SchemaRegistry) -> Result<String, TypeError> {
    serialize(node, &Context::inline(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Signature;
    use crate::builder::functions::call;
    use crate::builder::{col, columns, eq, lit, param, select};
    use crate::fixtures::{schema, UserColumns};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_select() {
        let query: Node = select(columns([col::<UserColumns::Id>(), col::<UserColumns::Name>()]))
            .filter(eq(col::<UserColumns::Grade>(), 2))
            .into();
        let compiled = compile(&query, &schema()).unwrap();
        assert_eq!(
            compiled,
            CompiledQuery {
                sql: String::from(r#"SELECT "id", "name" FROM "users" WHERE "grade" = ?"#),
                result_type: TypeTag::Tuple(vec![TypeTag::Int, TypeTag::Text]),
                parameter_count: 1,
            }
        );
    }

    #[test]
    fn test_compile_stops_on_type_error() {
        let abs_two = call(Signature::fixed("ABS", 1, TypeTag::Double), vec![param(1), param(2)]);
        let query: Node = select(abs_two).into();
        assert!(matches!(
            compile(&query, &schema()),
            Err(TypeError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_dump_inlines_values() {
        let query: Node = select(col::<UserColumns::Name>())
            .filter(eq(col::<UserColumns::Name>(), "o'hara"))
            .limit(lit(1))
            .into();
        assert_eq!(
            dump(&query, &schema()).unwrap(),
            r#"SELECT "name" FROM "users" WHERE "name" = 'o''hara' LIMIT 1"#
        );
    }
}

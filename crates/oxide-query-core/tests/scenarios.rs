//! End-to-end behaviour of the compiler on the reference scenarios:
//! qualification, parameter binding, projection typing, compound type
//! checks and function arity.

mod common;
use common::*;

use oxide_query_core::ast::{Node, Signature};
use oxide_query_core::builder::functions::{abs, call};
use oxide_query_core::builder::{col, columns, eq, lit, select};
use oxide_query_core::{
    compile, infer_type, serialize, Context, Scalar, TypeError, TypeTag,
};
use pretty_assertions::assert_eq;

#[test]
fn qualified_column_reference() {
    let schema = schema();
    let node: Node = col::<UserColumns::Id>().into();
    assert_eq!(
        serialize(&node, &Context::new(&schema)).unwrap(),
        r#""users"."id""#
    );
    assert_eq!(infer_type(&node, &schema).unwrap(), TypeTag::Int);
}

#[test]
fn comparison_binds_one_parameter() {
    let node = eq(col::<UserColumns::Grade>(), 2);
    let compiled = compiled(node.clone());
    assert_eq!(compiled.sql, r#""users"."grade" = ?"#);
    assert_eq!(compiled.parameter_count, 1);
    assert_eq!(compiled.result_type, TypeTag::Bool);
    assert_eq!(bound(node), vec![Scalar::Int(2)]);
}

#[test]
fn projection_of_two_columns() {
    let query = select(columns([col::<UserColumns::Id>(), col::<UserColumns::Name>()]))
        .filter(eq(col::<UserColumns::Grade>(), 2));
    let compiled = compiled(query);
    assert_eq!(
        compiled.sql,
        r#"SELECT "id", "name" FROM "users" WHERE "grade" = ?"#
    );
    assert_eq!(
        compiled.result_type,
        TypeTag::Tuple(vec![TypeTag::Int, TypeTag::Text])
    );
}

#[test]
fn union_of_different_types_is_rejected() {
    let query: Node = select(col::<UserColumns::Id>())
        .union(select(col::<UserColumns::Name>()))
        .into();
    let err = compile(&query, &schema()).unwrap_err();
    assert_eq!(
        err,
        TypeError::CompoundTypeMismatch {
            operator: "UNION",
            left: TypeTag::Int,
            right: TypeTag::Text,
        }
    );
}

#[test]
fn union_of_equal_types_compiles() {
    let query = select(col::<UserColumns::Id>()).union(select(col::<PostColumns::UserId>()));
    assert_eq!(
        compiled(query).sql,
        r#"SELECT "id" FROM "users" UNION SELECT "user_id" FROM "posts""#
    );
}

#[test]
fn function_arity() {
    let compiled = compiled(abs(lit(-3)));
    assert_eq!(compiled.sql, "ABS(-3)");
    assert_eq!(compiled.result_type, TypeTag::optional(TypeTag::Double));

    let wrong = call(Signature::fixed("ABS", 1, TypeTag::Double), vec![lit(1), lit(2)]);
    assert_eq!(
        compile(&wrong, &schema()).unwrap_err(),
        TypeError::ArityMismatch {
            function: String::from("ABS"),
            expected: 1,
            found: 2,
        }
    );
}

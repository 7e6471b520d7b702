#![allow(dead_code)]

use oxide_query_core::ast::Node;
use oxide_query_core::{bind, compile, CompiledQuery, RecordingSink, Scalar, SchemaRegistry};
use oxide_query_derive::Table;

#[derive(Debug, Clone, Table)]
#[table(name = "users")]
pub struct User {
    #[column(primary_key)]
    pub id: i64,
    pub name: String,
    pub grade: i64,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Table)]
#[table(name = "posts")]
pub struct Post {
    #[column(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub score: f64,
    #[column(generated, name = "title_length")]
    pub title_len: i64,
}

/// Join table keyed on both references.
#[derive(Debug, Clone, Table)]
#[table(name = "likes")]
pub struct Like {
    #[column(primary_key)]
    pub user_id: i64,
    #[column(primary_key)]
    pub post_id: i64,
    pub weight: f64,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn schema() -> SchemaRegistry {
    SchemaRegistry::builder()
        .register_keyed::<User>()
        .register_keyed::<Post>()
        .register_keyed::<Like>()
        .build()
        .unwrap_or_else(|e| panic!("Failed to build schema: {e}"))
}

pub fn compiled(node: impl Into<Node>) -> CompiledQuery {
    init_tracing();
    let node = node.into();
    compile(&node, &schema()).unwrap_or_else(|e| panic!("Failed to compile {node:?}\nError: {e}"))
}

pub fn sql(node: impl Into<Node>) -> String {
    compiled(node).sql
}

pub fn bound(node: impl Into<Node>) -> Vec<Scalar> {
    let mut sink = RecordingSink::new();
    bind(&node.into(), &mut sink).unwrap_or_else(|e| panic!("Failed to bind: {e}"));
    sink.values()
}

//! INSERT, UPDATE and DELETE rendering.
//!
//! Columns are never qualified here: the target table is the only table in
//! scope, except inside subqueries which decide for themselves.

use super::{expr, list, quote_identifier, select::select, Context};
use crate::ast::{ConflictResolution, Delete, Insert, InsertSource, Node, Update, UpsertAction};
use crate::error::TypeError;
use crate::schema::{ColumnId, TypeKey};
use crate::value::Bindable;

fn assignments(
    table: TypeKey,
    assignments: &[(ColumnId, Node)],
    ctx: Context<'_>,
) -> Result<String, TypeError> {
    if assignments.is_empty() {
        return Err(TypeError::EmptyAssignments);
    }
    let parts = assignments
        .iter()
        .map(|(member, value)| {
            Ok(format!(
                "{} = {}",
                quote_identifier(ctx.schema.column_name(table, member)?),
                expr(value, ctx)?
            ))
        })
        .collect::<Result<Vec<_>, TypeError>>()?;
    Ok(parts.join(", "))
}

fn where_clause(where_: Option<&Node>, ctx: Context<'_>) -> Result<String, TypeError> {
    match where_ {
        Some(condition) => Ok(format!(" WHERE {}", expr(condition, ctx)?)),
        None => Ok(String::new()),
    }
}

pub(super) fn insert(insert: &Insert, ctx: Context<'_>) -> Result<String, TypeError> {
    let clause = ctx.with_skip_table_name(true).with_parentheses(false);
    let table = ctx.schema.table_name(insert.table)?;

    let mut sql = match insert.conflict {
        Some(ConflictResolution::Replace) => String::from("REPLACE INTO "),
        Some(resolution) => format!("INSERT OR {} INTO ", resolution.as_str()),
        None => String::from("INSERT INTO "),
    };
    sql.push_str(&quote_identifier(table));

    if !insert.columns.is_empty() {
        let names = insert
            .columns
            .iter()
            .map(|member| Ok(quote_identifier(ctx.schema.column_name(insert.table, member)?)))
            .collect::<Result<Vec<_>, TypeError>>()?;
        sql.push_str(" (");
        sql.push_str(&names.join(", "));
        sql.push(')');
    }

    match &insert.source {
        InsertSource::Values(rows) => {
            let rows = rows
                .iter()
                .map(|row| Ok(format!("({})", list(row, clause)?)))
                .collect::<Result<Vec<_>, TypeError>>()?;
            sql.push_str(" VALUES ");
            sql.push_str(&rows.join(", "));
        }
        InsertSource::Select(query) if insert.upsert.is_some() && query.where_.is_none() => {
            // Without a WHERE, SQLite would parse ON CONFLICT as a join constraint
            let mut query = query.as_ref().clone();
            query.where_ = Some(Node::Literal(Bindable::new(true)));
            sql.push(' ');
            sql.push_str(&select(&query, ctx.with_parentheses(false))?);
        }
        InsertSource::Select(query) => {
            sql.push(' ');
            sql.push_str(&select(query, ctx.with_parentheses(false))?);
        }
        InsertSource::DefaultValues => sql.push_str(" DEFAULT VALUES"),
    }

    if let Some(upsert) = &insert.upsert {
        sql.push_str(" ON CONFLICT");
        if !upsert.target.is_empty() {
            let target = upsert
                .target
                .iter()
                .map(|member| Ok(quote_identifier(ctx.schema.column_name(insert.table, member)?)))
                .collect::<Result<Vec<_>, TypeError>>()?;
            sql.push_str(" (");
            sql.push_str(&target.join(", "));
            sql.push(')');
        }
        match &upsert.action {
            UpsertAction::Nothing => sql.push_str(" DO NOTHING"),
            UpsertAction::Update {
                assignments: set,
                where_,
            } => {
                sql.push_str(" DO UPDATE SET ");
                sql.push_str(&assignments(insert.table, set, clause)?);
                sql.push_str(&where_clause(where_.as_ref(), clause)?);
            }
        }
    }

    Ok(sql)
}

pub(super) fn update(update: &Update, ctx: Context<'_>) -> Result<String, TypeError> {
    let clause = ctx.with_skip_table_name(true).with_parentheses(false);
    let mut sql = String::from("UPDATE ");
    if let Some(resolution) = update.conflict {
        sql.push_str("OR ");
        sql.push_str(resolution.as_str());
        sql.push(' ');
    }
    sql.push_str(&quote_identifier(ctx.schema.table_name(update.table)?));
    sql.push_str(" SET ");
    sql.push_str(&assignments(update.table, &update.assignments, clause)?);
    sql.push_str(&where_clause(update.where_.as_ref(), clause)?);
    Ok(sql)
}

pub(super) fn delete(delete: &Delete, ctx: Context<'_>) -> Result<String, TypeError> {
    let clause = ctx.with_skip_table_name(true).with_parentheses(false);
    let mut sql = String::from("DELETE FROM ");
    sql.push_str(&quote_identifier(ctx.schema.table_name(delete.table)?));
    sql.push_str(&where_clause(delete.where_.as_ref(), clause)?);
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::super::serialize;
    use super::*;
    use crate::builder::{
        add_as, col, delete_from, do_nothing, do_update, eq, excluded, get_by_id, gt,
        insert_into, insert_record, lit, lt, remove_by_id, replace_record, select, set, update,
        update_record,
    };
    use crate::error::SchemaError;
    use crate::fixtures::{schema, Membership, Post, PostColumns, User, UserColumns};
    use crate::value::Scalar;
    use pretty_assertions::assert_eq;

    fn render(node: impl Into<Node>) -> String {
        let schema = schema();
        serialize(&node.into(), &Context::new(&schema)).unwrap()
    }

    fn alice() -> User {
        User {
            id: 7,
            name: String::from("alice"),
            grade: 3,
            email: Some(String::from("a@example.com")),
        }
    }

    #[test]
    fn test_insert_values() {
        let stmt = insert_into::<User>()
            .column::<UserColumns::Name>()
            .column::<UserColumns::Grade>()
            .values(("bob", 2))
            .values(("eve", lit(5)));
        assert_eq!(
            render(stmt),
            r#"INSERT INTO "users" ("name", "grade") VALUES (?, ?), (?, 5)"#
        );
    }

    #[test]
    fn test_insert_default_and_conflict() {
        assert_eq!(
            render(insert_into::<Post>()),
            r#"INSERT INTO "posts" DEFAULT VALUES"#
        );
        let stmt = insert_into::<User>()
            .or(ConflictResolution::Ignore)
            .column::<UserColumns::Name>()
            .values("x");
        assert_eq!(
            render(stmt),
            r#"INSERT OR IGNORE INTO "users" ("name") VALUES (?)"#
        );
    }

    #[test]
    fn test_insert_select() {
        let stmt = insert_into::<Post>()
            .column::<PostColumns::UserId>()
            .column::<PostColumns::Title>()
            .select(select((col::<UserColumns::Id>(), col::<UserColumns::Name>())).filter(gt(
                col::<UserColumns::Grade>(),
                4,
            )));
        assert_eq!(
            render(stmt),
            r#"INSERT INTO "posts" ("user_id", "title") SELECT "id", "name" FROM "users" WHERE "grade" > ?"#
        );
    }

    #[test]
    fn test_upsert_from_select_gets_a_where() {
        let stmt = insert_into::<User>()
            .column::<UserColumns::Id>()
            .column::<UserColumns::Name>()
            .select(select((col::<PostColumns::UserId>(), col::<PostColumns::Title>())))
            .on_conflict(&["id"], do_nothing());
        assert_eq!(
            render(stmt),
            concat!(
                r#"INSERT INTO "users" ("id", "name") SELECT "user_id", "title" FROM "posts" "#,
                r#"WHERE TRUE ON CONFLICT ("id") DO NOTHING"#
            )
        );
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let schema = schema();
        let err = serialize(&update::<User>().into(), &Context::new(&schema)).unwrap_err();
        assert_eq!(err, TypeError::EmptyAssignments);

        let upsert = insert_into::<User>()
            .column::<UserColumns::Id>()
            .values(1)
            .on_conflict(&["id"], do_update(vec![], None));
        let err = serialize(&upsert.into(), &Context::new(&schema)).unwrap_err();
        assert_eq!(err, TypeError::EmptyAssignments);
    }

    #[test]
    fn test_upsert() {
        let stmt = insert_into::<User>()
            .column::<UserColumns::Id>()
            .column::<UserColumns::Name>()
            .values((1, "a"))
            .on_conflict(&["id"], do_nothing());
        assert_eq!(
            render(stmt),
            r#"INSERT INTO "users" ("id", "name") VALUES (?, ?) ON CONFLICT ("id") DO NOTHING"#
        );

        let stmt = insert_into::<User>()
            .column::<UserColumns::Id>()
            .column::<UserColumns::Name>()
            .values((1, "a"))
            .on_conflict(
                &["id"],
                do_update(
                    vec![set::<UserColumns::Name>(excluded::<UserColumns::Name>())],
                    Some(lt(col::<UserColumns::Grade>(), 9)),
                ),
            );
        assert_eq!(
            render(stmt),
            concat!(
                r#"INSERT INTO "users" ("id", "name") VALUES (?, ?) "#,
                r#"ON CONFLICT ("id") DO UPDATE SET "name" = excluded."name" WHERE "grade" < ?"#
            )
        );
    }

    #[test]
    fn test_update_and_delete() {
        let stmt = update::<User>()
            .or(ConflictResolution::Rollback)
            .set::<UserColumns::Grade>(add_as::<i64>(col::<UserColumns::Grade>(), 1))
            .filter(eq(col::<UserColumns::Id>(), 7));
        assert_eq!(
            render(stmt),
            r#"UPDATE OR ROLLBACK "users" SET "grade" = "grade" + ? WHERE "id" = ?"#
        );

        assert_eq!(render(delete_from::<Post>()), r#"DELETE FROM "posts""#);
        assert_eq!(
            render(delete_from::<Post>().filter(lt(col::<PostColumns::Score>(), 0.5))),
            r#"DELETE FROM "posts" WHERE "score" < ?"#
        );
    }

    #[test]
    fn test_record_statements() {
        let schema = schema();
        assert_eq!(
            render(insert_record(&schema, &alice()).unwrap()),
            r#"INSERT INTO "users" ("name", "grade", "email") VALUES (?, ?, ?)"#
        );
        assert_eq!(
            render(replace_record(&schema, &alice()).unwrap()),
            r#"REPLACE INTO "users" ("id", "name", "grade", "email") VALUES (?, ?, ?, ?)"#
        );
        assert_eq!(
            render(update_record(&schema, &alice()).unwrap()),
            r#"UPDATE "users" SET "name" = ?, "grade" = ?, "email" = ? WHERE "id" = ?"#
        );
        assert_eq!(
            render(get_by_id::<User>(&schema, &[Scalar::Int(7)]).unwrap()),
            r#"SELECT * FROM "users" WHERE "id" = ?"#
        );
        assert_eq!(
            render(
                remove_by_id::<Membership>(&schema, &[Scalar::Int(1), Scalar::Int(2)]).unwrap()
            ),
            r#"DELETE FROM "memberships" WHERE ("user_id" = ?) AND ("group_id" = ?)"#
        );
    }

    #[test]
    fn test_unknown_column_is_reported() {
        let schema = schema();
        let stmt: Node = insert_into::<User>().columns(&["nickname"]).values(1).into();
        let err = serialize(&stmt, &Context::new(&schema)).unwrap_err();
        assert_eq!(
            err,
            TypeError::Schema(SchemaError::ColumnNotFound {
                table: String::from("users"),
                member: String::from("nickname"),
            })
        );
    }
}

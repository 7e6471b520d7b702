//! SELECT, compound and WITH rendering.

use super::{expr, list, quote_identifier, statement, table_name, table_ref, Context};
use crate::ast::{JoinConstraint, OrderKey, Select, With};
use crate::error::TypeError;
use crate::walker::{walk_expr, TableCollector};

/// The FROM entries of `select`, and whether it references a table that
/// is not among them (a correlated outer table).
///
/// An explicit FROM list is complete: tables referenced by the projection,
/// WHERE or join constraints that it does not name belong to an enclosing
/// query. Without one, every referenced table that is not joined is listed.
fn from_tables(select: &Select, ctx: &Context<'_>) -> Result<(Vec<String>, bool), TypeError> {
    let mut listed = Vec::with_capacity(select.from.len());
    let mut rendered = Vec::with_capacity(select.from.len());
    for table in &select.from {
        listed.push((table_name(&table.table, ctx)?, table.alias.clone()));
        rendered.push(table_ref(table, ctx)?);
    }
    for join in &select.joins {
        listed.push((table_name(&join.table.table, ctx)?, join.table.alias.clone()));
    }

    let mut collector = TableCollector::new(ctx.schema);
    for column in &select.columns {
        walk_expr(column, &mut collector);
    }
    for join in &select.joins {
        if let Some(JoinConstraint::On(on)) = &join.constraint {
            walk_expr(on, &mut collector);
        }
    }
    if let Some(where_) = &select.where_ {
        walk_expr(where_, &mut collector);
    }

    let explicit = !select.from.is_empty();
    let mut outer = false;
    for (name, alias) in collector.finish()? {
        if listed.iter().any(|(n, a)| *n == name && *a == alias) {
            continue;
        }
        if explicit {
            outer = true;
            continue;
        }
        let table = quote_identifier(&name);
        rendered.push(match alias {
            Some(alias) => format!("{table} AS {}", quote_identifier(&alias)),
            None => table,
        });
    }
    Ok((rendered, outer))
}

fn order_key(key: &OrderKey, ctx: Context<'_>) -> Result<String, TypeError> {
    let mut sql = expr(&key.expr, ctx)?;
    if let Some(collation) = &key.collation {
        sql.push_str(" COLLATE ");
        sql.push_str(collation);
    }
    if let Some(direction) = key.direction {
        sql.push(' ');
        sql.push_str(direction.as_str());
    }
    if let Some(nulls) = key.nulls {
        sql.push(' ');
        sql.push_str(nulls.as_str());
    }
    Ok(sql)
}

/// Renders `select` without surrounding parentheses.
///
/// A compound's ORDER BY and LIMIT come from its leftmost select and are
/// rendered after the last arm.
pub(super) fn select(select: &Select, ctx: Context<'_>) -> Result<String, TypeError> {
    let (from, outer) = from_tables(select, &ctx)?;
    let skip = from.len() == 1 && select.joins.is_empty() && !outer;
    let clause = ctx.with_skip_table_name(skip).with_parentheses(false);

    let mut sql = String::from("SELECT ");
    if select.distinct {
        sql.push_str("DISTINCT ");
    }
    sql.push_str(&list(&select.columns, clause)?);

    if !from.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&from.join(", "));
    }

    for join in &select.joins {
        sql.push(' ');
        sql.push_str(join.kind.as_str());
        sql.push(' ');
        sql.push_str(&table_ref(&join.table, &ctx)?);
        match &join.constraint {
            Some(JoinConstraint::On(on)) => {
                sql.push_str(" ON ");
                sql.push_str(&expr(on, clause.with_skip_table_name(false))?);
            }
            Some(JoinConstraint::Using(members)) => {
                let members: Vec<String> = members.iter().map(|m| quote_identifier(m)).collect();
                sql.push_str(" USING (");
                sql.push_str(&members.join(", "));
                sql.push(')');
            }
            None => {}
        }
    }

    if let Some(where_) = &select.where_ {
        sql.push_str(" WHERE ");
        sql.push_str(&expr(where_, clause)?);
    }

    if !select.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&list(&select.group_by, clause)?);
    }

    if let Some(having) = &select.having {
        sql.push_str(" HAVING ");
        sql.push_str(&expr(having, clause)?);
    }

    if let Some((op, right)) = &select.compound {
        sql.push(' ');
        sql.push_str(op.as_str());
        sql.push(' ');
        sql.push_str(&self::select(right, ctx.with_parentheses(false))?);
    }

    if !select.order_by.is_empty() {
        let keys = select
            .order_by
            .iter()
            .map(|key| order_key(key, clause))
            .collect::<Result<Vec<_>, _>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    if let Some(limit) = &select.limit {
        sql.push_str(" LIMIT ");
        sql.push_str(&expr(&limit.count, clause)?);
        if let Some(offset) = &limit.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&expr(offset, clause)?);
        }
    }

    Ok(sql)
}

/// Renders `WITH [RECURSIVE] ctes statement`.
pub(super) fn with(with: &With, ctx: Context<'_>) -> Result<String, TypeError> {
    let mut sql = String::from("WITH ");
    if with.recursive {
        sql.push_str("RECURSIVE ");
    }
    let ctes = with
        .ctes
        .iter()
        .map(|cte| {
            let mut part = quote_identifier(&cte.moniker);
            if !cte.columns.is_empty() {
                let columns: Vec<String> = cte.columns.iter().map(|c| quote_identifier(c)).collect();
                part.push('(');
                part.push_str(&columns.join(", "));
                part.push(')');
            }
            part.push_str(" AS (");
            part.push_str(&select(&cte.select, ctx)?);
            part.push(')');
            Ok(part)
        })
        .collect::<Result<Vec<_>, TypeError>>()?;
    sql.push_str(&ctes.join(", "));
    sql.push(' ');
    sql.push_str(&statement(&with.statement, ctx)?);
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::super::serialize;
    use super::*;
    use crate::ast::{Node, Signature, TableRef};
    use crate::builder::aggregates::count;
    use crate::builder::functions::call;
    use crate::builder::{
        add_as, and, col, column_of, columns, cte_column, eq, exists, gt, in_select, lit, lt,
        param, select, with, with_recursive,
    };
    use crate::fixtures::{schema, Post, PostColumns, User, UserColumns};
    use crate::types::TypeTag;
    use pretty_assertions::assert_eq;

    fn render(node: impl Into<Node>) -> String {
        let schema = schema();
        serialize(&node.into(), &Context::new(&schema)).unwrap()
    }

    #[test]
    fn test_single_table_skips_qualifier() {
        let query = select(columns([col::<UserColumns::Id>(), col::<UserColumns::Name>()]))
            .filter(eq(col::<UserColumns::Grade>(), 2));
        assert_eq!(
            render(query),
            r#"SELECT "id", "name" FROM "users" WHERE "grade" = ?"#
        );
    }

    #[test]
    fn test_constant_select_has_no_from() {
        assert_eq!(render(select(lit(1))), "SELECT 1");
    }

    #[test]
    fn test_two_tables_are_qualified() {
        let query = select((col::<UserColumns::Name>(), col::<PostColumns::Title>()))
            .filter(eq(col::<PostColumns::UserId>(), col::<UserColumns::Id>()));
        assert_eq!(
            render(query),
            r#"SELECT "users"."name", "posts"."title" FROM "posts", "users" WHERE "posts"."user_id" = "users"."id""#
        );
    }

    #[test]
    fn test_explicit_from_comes_first() {
        let query = select(col::<PostColumns::Title>().of_alias("p"))
            .from_as::<Post>("p")
            .filter(gt(col::<PostColumns::Score>().of_alias("p"), 1.5));
        assert_eq!(
            render(query),
            r#"SELECT "title" FROM "posts" AS "p" WHERE "score" > ?"#
        );
    }

    #[test]
    fn test_join_tables_leave_from() {
        let query = select((col::<UserColumns::Name>(), col::<PostColumns::Title>()))
            .join(
                TableRef::mapped::<Post>(),
                eq(col::<PostColumns::UserId>(), col::<UserColumns::Id>()),
            )
            .order_by(OrderKey::new(col::<PostColumns::Score>().into()).desc());
        assert_eq!(
            render(query),
            concat!(
                r#"SELECT "users"."name", "posts"."title" FROM "users" "#,
                r#"INNER JOIN "posts" ON "posts"."user_id" = "users"."id" "#,
                r#"ORDER BY "posts"."score" DESC"#
            )
        );
    }

    #[test]
    fn test_join_using() {
        let query = select(col::<UserColumns::Name>())
            .from::<User>()
            .join_using(TableRef::mapped::<Post>().alias("p"), &["id"]);
        assert_eq!(
            render(query),
            r#"SELECT "users"."name" FROM "users" INNER JOIN "posts" AS "p" USING ("id")"#
        );
    }

    #[test]
    fn test_group_having_limit_offset() {
        let query = select((col::<PostColumns::UserId>(), count(col::<PostColumns::Id>())))
            .group_by(col::<PostColumns::UserId>())
            .having(gt(count(col::<PostColumns::Id>()), 2))
            .limit(10)
            .offset(20);
        assert_eq!(
            render(query),
            r#"SELECT "user_id", COUNT("id") FROM "posts" GROUP BY "user_id" HAVING COUNT("id") > ? LIMIT ? OFFSET ?"#
        );
        assert_eq!(
            render(select(col::<UserColumns::Id>()).offset(5)),
            r#"SELECT "id" FROM "users" LIMIT -1 OFFSET ?"#
        );
    }

    #[test]
    fn test_distinct() {
        assert_eq!(
            render(select(col::<UserColumns::Grade>()).distinct()),
            r#"SELECT DISTINCT "grade" FROM "users""#
        );
    }

    #[test]
    fn test_subqueries_have_their_own_from() {
        let inner = select(col::<PostColumns::UserId>()).filter(gt(col::<PostColumns::Score>(), 3.0));
        let query = select(col::<UserColumns::Name>())
            .filter(in_select(col::<UserColumns::Id>(), inner));
        assert_eq!(
            render(query),
            r#"SELECT "name" FROM "users" WHERE "id" IN (SELECT "user_id" FROM "posts" WHERE "score" > ?)"#
        );

        let query = select(col::<UserColumns::Name>()).filter(exists(select(lit(1)).from::<Post>()));
        assert_eq!(
            render(query),
            r#"SELECT "name" FROM "users" WHERE EXISTS (SELECT 1 FROM "posts")"#
        );

        let query = select((col::<UserColumns::Id>(), select(lit(2))));
        assert_eq!(render(query), r#"SELECT "id", (SELECT 2) FROM "users""#);
    }

    #[test]
    fn test_compound_order_after_last_arm() {
        let query = select(col::<UserColumns::Name>())
            .union(select(col::<PostColumns::Title>()))
            .order_by(OrderKey::new(lit(1)).asc())
            .limit(3);
        assert_eq!(
            render(query),
            r#"SELECT "name" FROM "users" UNION SELECT "title" FROM "posts" ORDER BY 1 ASC LIMIT ?"#
        );
    }

    #[test]
    fn test_with_clause() {
        let top = select(col::<UserColumns::Id>())
            .filter(gt(col::<UserColumns::Grade>(), 3))
            .as_cte_with("top", &["uid"]);
        let query = with(
            vec![top],
            select(cte_column("top", "uid")).from_table(TableRef::moniker("top")),
        );
        assert_eq!(
            render(query),
            r#"WITH "top"("uid") AS (SELECT "id" FROM "users" WHERE "grade" > ?) SELECT "uid" FROM "top""#
        );
    }

    #[test]
    fn test_recursive_with() {
        let counter = select(lit(1).alias("n"))
            .union_all(
                select(add_as::<i64>(cte_column("cnt", "n"), 1))
                    .filter(lt(cte_column("cnt", "n"), param(5))),
            )
            .as_cte("cnt");
        let query = with_recursive(vec![counter], select(cte_column("cnt", "n")));
        assert_eq!(
            render(query),
            concat!(
                r#"WITH RECURSIVE "cnt" AS (SELECT 1 AS "n" UNION ALL "#,
                r#"SELECT "n" + ? FROM "cnt" WHERE "n" < ?) SELECT "n" FROM "cnt""#
            )
        );
    }

    #[test]
    fn test_nested_select_parenthesizes_in_operand_position() {
        let schema = schema();
        let query: Node = select(column_of::<User>("id")).into();
        let ctx = Context::new(&schema).with_parentheses(true);
        assert_eq!(
            serialize(&query, &ctx).unwrap(),
            r#"(SELECT "id" FROM "users")"#
        );
        assert_eq!(
            render(and(exists(select(lit(1))), lit(true))),
            "EXISTS (SELECT 1) AND TRUE"
        );
    }

    #[test]
    fn test_explicit_from_keeps_outer_tables_out() {
        let correlated = select(lit(1))
            .from::<Post>()
            .filter(eq(col::<PostColumns::UserId>(), col::<UserColumns::Id>()));
        let query = select(col::<UserColumns::Name>()).filter(exists(correlated));
        assert_eq!(
            render(query),
            concat!(
                r#"SELECT "name" FROM "users" WHERE EXISTS "#,
                r#"(SELECT 1 FROM "posts" WHERE "posts"."user_id" = "users"."id")"#
            )
        );
    }

    #[test]
    fn test_nested_select_in_clause_root_is_parenthesized() {
        let inner: Node = select(col::<PostColumns::Score>()).into();
        let node = call(Signature::fixed("ABS", 1, TypeTag::Double), vec![inner.clone()]);
        assert_eq!(render(node), r#"ABS((SELECT "score" FROM "posts"))"#);

        let query = with(vec![select(lit(1).alias("n")).as_cte("one")], inner);
        assert_eq!(
            render(query),
            r#"WITH "one" AS (SELECT 1 AS "n") SELECT "score" FROM "posts""#
        );
    }
}

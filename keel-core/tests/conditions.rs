#[cfg(test)]
mod tests {
    use indoc::indoc;
    use keel_core::{
        Condition, Conditions, Connective, Context, Fragment, GenericSqlWriter, JoinType, Operator,
        Order, Query, QueryBuilder, SqlWriter, Value, col, raw,
    };

    const WRITER: GenericSqlWriter = GenericSqlWriter;

    fn render(conditions: &Conditions) -> keel_core::Result<String> {
        let mut out = String::new();
        WRITER.write_conditions(
            &mut Context::new(Fragment::SqlSelectWhere, true),
            &mut out,
            conditions,
        )?;
        Ok(out)
    }

    #[test]
    fn operator_parse() {
        assert_eq!(Operator::parse("not  in"), Operator::NotIn);
        assert_eq!(Operator::parse("<>"), Operator::NotEqual);
        assert_eq!(Operator::parse("like"), Operator::Like);
        assert_eq!(
            Operator::parse("~~"),
            Operator::Unknown("~~".into())
        );
    }

    #[test]
    fn condition_precedence() {
        let mut conditions = Conditions::new();
        conditions
            .and("a", "=", 1)
            .or("b", "=", 1)
            .and("c", "=", 1)
            .begin_group(Connective::Or)
            .and("x", "=", 3)
            .begin_group(Connective::And)
            .and("d", "=", 1)
            .and("e", "=", 1)
            .end_group()
            .end_group();
        assert_eq!(
            render(&conditions).unwrap(),
            r#""a" = 1 OR "b" = 1 AND "c" = 1 OR ("x" = 3 AND ("d" = 1 AND "e" = 1))"#
        );
    }

    #[test]
    fn condition_empty_groups_are_skipped() {
        let mut conditions = Conditions::new();
        conditions
            .begin_group(Connective::And)
            .end_group()
            .and("a", "=", 1)
            .begin_group(Connective::Or)
            .end_group();
        assert_eq!(render(&conditions).unwrap(), r#""a" = 1"#);
        assert_eq!(render(&Conditions::new()).unwrap(), "");
    }

    #[test]
    fn condition_unbalanced_groups() {
        let mut conditions = Conditions::new();
        conditions.begin_group(Connective::And).and("a", "=", 1);
        assert!(render(&conditions).unwrap_err().is_configuration());
        let mut conditions = Conditions::new();
        conditions.and("a", "=", 1).end_group();
        assert!(render(&conditions).unwrap_err().is_configuration());
    }

    #[test]
    fn condition_null_rewrite() {
        let mut conditions = Conditions::new();
        conditions
            .and("deleted_at", "=", Value::Null)
            .and("name", "!=", Option::<String>::None)
            .and("parent", "is null", Value::Null);
        assert_eq!(
            render(&conditions).unwrap(),
            r#""deleted_at" IS NULL AND "name" IS NOT NULL AND "parent" IS NULL"#
        );
    }

    #[test]
    fn condition_is_keeps_operand() {
        assert_eq!(Operator::parse("is"), Operator::Is);
        assert_eq!(Operator::parse("IS  not"), Operator::IsNot);
        assert_eq!(Operator::parse("is null"), Operator::IsNull);

        let sql = QueryBuilder::table("t")
            .and_where("flag", "IS", true)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, r#"SELECT "t".* FROM "t" WHERE "flag" IS true"#);

        let mut conditions = Conditions::new();
        conditions
            .and("a", "is", Value::Null)
            .and("b", "is not", false)
            .and("c", "is not", Option::<i64>::None)
            .and("d", "is", col("e"));
        assert_eq!(
            render(&conditions).unwrap(),
            r#""a" IS NULL AND "b" IS NOT false AND "c" IS NOT NULL AND "d" IS "e""#
        );
    }

    #[test]
    fn condition_is_null_rejects_operand() {
        let mut conditions = Conditions::new();
        conditions.and("flag", "is null", true);
        assert!(render(&conditions).unwrap_err().is_configuration());

        let result = QueryBuilder::table("t")
            .and_where("flag", "is not null", 1)
            .compile(&WRITER);
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn condition_in_lists() {
        let mut conditions = Conditions::new();
        conditions
            .and("id", "in", [1, 2, 3])
            .or("tag", "not in", vec!["x".to_owned(), "y's".to_owned()]);
        assert_eq!(
            render(&conditions).unwrap(),
            r#""id" IN (1, 2, 3) OR "tag" NOT IN ('x', 'y''s')"#
        );
        let mut conditions = Conditions::new();
        conditions
            .and("id", "IN", Vec::<i64>::new())
            .and("id", "NOT IN", Vec::<i64>::new());
        assert_eq!(render(&conditions).unwrap(), "1 = 0 AND 1 = 1");
    }

    #[test]
    fn condition_between() {
        let mut conditions = Conditions::new();
        conditions.and("age", "between", (18, 65));
        assert_eq!(render(&conditions).unwrap(), r#""age" BETWEEN 18 AND 65"#);
        let mut conditions = Conditions::new();
        conditions.and("age", "between", [18, 30, 65]);
        assert!(render(&conditions).unwrap_err().is_configuration());
        let mut conditions = Conditions::new();
        conditions.and("age", "between", 18);
        assert!(render(&conditions).unwrap_err().is_configuration());
    }

    #[test]
    fn condition_unknown_operator() {
        let mut conditions = Conditions::new();
        conditions.and("a", "=~", 1);
        let error = render(&conditions).unwrap_err();
        assert!(error.is_configuration());
        assert!(error.to_string().contains("=~"), "{error}");
    }

    #[test]
    fn condition_raw_and_columns() {
        let mut conditions = Conditions::new();
        conditions
            .push(Connective::And, Condition::Raw(raw("score > 2 * bonus")))
            .and("posts.author_id", "=", col("users.id"))
            .or("title", "like", "%rust%");
        assert_eq!(
            render(&conditions).unwrap(),
            r#"score > 2 * bonus AND "posts"."author_id" = "users"."id" OR "title" LIKE '%rust%'"#
        );
    }

    #[test]
    fn condition_render_is_deterministic() {
        let mut conditions = Conditions::new();
        conditions
            .and("a", ">", 1)
            .begin_group(Connective::Or)
            .and("b", "<", 2.5)
            .or("c", "in", ['p'.to_string(), 'q'.to_string()])
            .end_group();
        let first = render(&conditions).unwrap();
        let second = render(&conditions.clone()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn builder_select() {
        let sql = QueryBuilder::new()
            .select(["name"])
            .from("table")
            .and_where("field", "=", 1)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, r#"SELECT "table"."name" FROM "table" WHERE "field" = 1"#);

        let sql = QueryBuilder::table(("users", "u"))
            .select([("email", "mail")])
            .select_also(Vec::<&str>::new())
            .distinct()
            .join(("posts", "p"), JoinType::Left)
            .on("p.author_id", "=", "u.id")
            .on_value("p.published", "=", true)
            .and_where_group(|group| {
                group.and("u.age", ">=", 18).or("u.admin", "=", true);
            })
            .group_by(["u.id"])
            .having("total", ">", 2)
            .order_by("u.name", Order::Asc)
            .order_by("u.id", Order::Desc)
            .limit(10)
            .offset(20)
            .for_update()
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            indoc! {r#"
                SELECT DISTINCT "u"."email" AS "mail" FROM "users" AS "u"
                 LEFT JOIN "posts" AS "p" ON ("p"."author_id" = "u"."id" AND "p"."published" = true)
                 WHERE ("u"."age" >= 18 OR "u"."admin" = true)
                 GROUP BY "u"."id" HAVING "total" > 2
                 ORDER BY "u"."name" ASC, "u"."id" DESC LIMIT 10 OFFSET 20 FOR UPDATE
            "#}
            .trim()
            .replace('\n', "")
        );
    }

    #[test]
    fn builder_default_select_list() {
        let sql = QueryBuilder::table("books").compile(&WRITER).unwrap();
        assert_eq!(sql, r#"SELECT "books".* FROM "books""#);
        let sql = QueryBuilder::table("books")
            .select_also([raw("COUNT(*) OVER () AS total")])
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "books".*, COUNT(*) OVER () AS total FROM "books""#
        );
    }

    #[test]
    fn builder_begin_end_group() {
        let sql = QueryBuilder::table("t")
            .and_where("a", "=", 1)
            .or_begin_group()
            .and_where("b", "=", 2)
            .and_where("c", "=", 3)
            .end_group()
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "t".* FROM "t" WHERE "a" = 1 OR ("b" = 2 AND "c" = 3)"#
        );
        let error = QueryBuilder::table("t")
            .begin_group()
            .and_where("a", "=", 1)
            .compile(&WRITER)
            .unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn builder_misuse() {
        assert!(
            QueryBuilder::new()
                .select(["a"])
                .compile(&WRITER)
                .unwrap_err()
                .is_configuration()
        );
        assert!(
            QueryBuilder::table("t")
                .on("a", "=", "b")
                .compile(&WRITER)
                .unwrap_err()
                .is_configuration()
        );
        assert!(
            QueryBuilder::update("t")
                .and_where("id", "=", 1)
                .compile(&WRITER)
                .unwrap_err()
                .is_configuration()
        );
        assert!(
            QueryBuilder::insert("t")
                .columns(["a", "b"])
                .values([1])
                .compile(&WRITER)
                .unwrap_err()
                .is_configuration()
        );
    }

    #[test]
    fn builder_modify_statements() {
        let sql = QueryBuilder::insert("t")
            .columns(["a", "b"])
            .values([1, 2])
            .values([3, 4])
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "t" ("a", "b") VALUES (1, 2), (3, 4)"#);

        let sql = QueryBuilder::insert_row("t", Vec::<(&str, Value)>::new())
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "t" DEFAULT VALUES"#);

        let sql = QueryBuilder::update("t")
            .set([("name", "O'Hara")])
            .and_where("id", "=", 7)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, r#"UPDATE "t" SET "name" = 'O''Hara' WHERE "id" = 7"#);

        let sql = QueryBuilder::delete("t")
            .and_where("id", "in", [1, 2])
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, r#"DELETE FROM "t" WHERE "id" IN (1, 2)"#);
    }

    #[test]
    fn builder_bound_parameters() {
        let query = QueryBuilder::table("t")
            .and_where("a", "=", 1)
            .and_where("b", "in", ["x".to_owned(), "y".to_owned()])
            .and_where("c", "between", (2, 3))
            .and_where("d", "=", Value::Null)
            .build(&WRITER)
            .unwrap();
        assert_eq!(
            query.sql(),
            r#"SELECT "t".* FROM "t" WHERE "a" = ? AND "b" IN (?, ?) AND "c" BETWEEN ? AND ? AND "d" IS NULL"#
        );
        assert_eq!(
            query.parameters(),
            &[
                Value::Int64(Some(1)),
                Value::Varchar(Some("x".into())),
                Value::Varchar(Some("y".into())),
                Value::Int64(Some(2)),
                Value::Int64(Some(3)),
            ]
        );
        assert!(matches!(query, Query::Bound { .. }));
        assert_eq!(
            query.to_string(),
            r#"SELECT "t".* FROM "t" WHERE "a" = ? AND "b" IN (?, ?) AND "c" BETWEEN ? AND ? AND "d" IS NULL -- [1, 'x', 'y', 2, 3]"#
        );
    }

    #[test]
    fn builder_values_as_literals() {
        let sql = QueryBuilder::table("t")
            .and_where("f", "=", f64::INFINITY)
            .and_where("b", "=", Value::Blob(Some(Box::new([0xde, 0xad]))))
            .and_where("j", "=", serde_json::json!({"k": "it's"}))
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT "t".* FROM "t" WHERE "f" = 'Infinity' AND "b" = X'DEAD' AND "j" = '{"k":"it''s"}'"#
        );
        assert_eq!(WRITER.quote_identifier(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(WRITER.quote_literal(&Value::Boolean(Some(false))), "false");
    }

    #[test]
    fn builder_is_reusable() {
        let base = QueryBuilder::table("t").and_where("a", "=", 1);
        let limited = base.clone().limit(5);
        assert_eq!(
            base.compile(&WRITER).unwrap(),
            r#"SELECT "t".* FROM "t" WHERE "a" = 1"#
        );
        assert_eq!(
            limited.compile(&WRITER).unwrap(),
            r#"SELECT "t".* FROM "t" WHERE "a" = 1 LIMIT 5"#
        );
        assert_eq!(base.compile(&WRITER).unwrap(), base.compile(&WRITER).unwrap());
    }
}

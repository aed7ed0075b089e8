#[cfg(test)]
mod tests {
    use indoc::indoc;
    use keel::{
        Conditions, Connective, JoinType, Order, Query, QueryBuilder, SqlWriter, Value, raw,
    };
    use keel_sqlite::SqliteSqlWriter;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    const WRITER: SqliteSqlWriter = SqliteSqlWriter::new();

    #[test]
    fn sqlite_select() {
        let sql = QueryBuilder::table("t").compile(&WRITER).unwrap();
        assert_eq!(sql, "SELECT `t`.* FROM `t`");

        let sql = QueryBuilder::table(("orders", "o"))
            .select(["id", "c.name"])
            .join(("customers", "c"), JoinType::Inner)
            .on("c.id", "=", "o.customer_id")
            .and_where("o.total", ">", 100)
            .or_where("o.status", "in", ["open".to_string(), "held".to_string()])
            .order_by("o.id", Order::Desc)
            .offset(40)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            indoc! {"
                SELECT `o`.`id`, `c`.`name` FROM `orders` AS `o`
                 INNER JOIN `customers` AS `c` ON (`c`.`id` = `o`.`customer_id`)
                 WHERE `o`.`total` > 100 OR `o`.`status` IN ('open', 'held')
                 ORDER BY `o`.`id` DESC LIMIT -1 OFFSET 40
            "}
            .trim()
            .replace('\n', "")
        );
    }

    #[test]
    fn sqlite_simple_statements() {
        let sql = QueryBuilder::new()
            .select(["name"])
            .from("table")
            .and_where("field", "=", 1)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, "SELECT `table`.`name` FROM `table` WHERE `field` = 1");
        let sql = QueryBuilder::insert_row("t", [("a", 1), ("b", 2)])
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, "INSERT INTO `t` (`a`, `b`) VALUES (1, 2)");
        assert_eq!(WRITER.quote_identifier("a`b"), "`a``b`");
        assert_eq!(WRITER.quote_literal(&Value::from("o'k")), "'o''k'");
    }

    #[test]
    fn sqlite_condition_precedence() {
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
        let sql = QueryBuilder::table("t")
            .with_conditions(conditions)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            "SELECT `t`.* FROM `t` WHERE `a` = 1 OR `b` = 1 AND `c` = 1 OR (`x` = 3 AND (`d` = 1 AND `e` = 1))"
        );
    }

    #[test]
    fn sqlite_literals() {
        let sql = QueryBuilder::update("t")
            .set([
                ("a", Value::from("it's")),
                ("b", Value::from(f64::INFINITY)),
                ("c", Value::from(f64::NEG_INFINITY)),
                ("d", Value::from(f64::NAN)),
                ("e", Value::from(true)),
                ("f", Value::from(Decimal::from_str("12.50").unwrap())),
                ("g", Value::from(date!(2024 - 02 - 29))),
                ("h", Value::from(time!(23:59:01.5))),
                ("i", Value::from(datetime!(2024-02-29 23:59:01))),
                ("j", Value::from(Uuid::nil())),
                ("k", Value::Null),
            ])
            .and_where("id", "=", 1)
            .compile(&WRITER)
            .unwrap();
        assert_eq!(
            sql,
            indoc! {"
                UPDATE `t` SET `a` = 'it''s', `b` = 1.0e+10000, `c` = -1.0e+10000, `d` = NULL,
                 `e` = true, `f` = 12.50, `g` = '2024-02-29', `h` = '23:59:01.5',
                 `i` = '2024-02-29 23:59:01', `j` = '00000000-0000-0000-0000-000000000000',
                 `k` = NULL WHERE `id` = 1
            "}
            .trim()
            .replace('\n', "")
        );
    }

    #[test]
    fn sqlite_identifiers() {
        let sql = QueryBuilder::table("we`ird")
            .select(["co`l"])
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, "SELECT `we``ird`.`co``l` FROM `we``ird`");
    }

    #[test]
    fn sqlite_bound() {
        let query = QueryBuilder::insert("t")
            .columns(["a", "b"])
            .values([Value::from(1), Value::from("x")])
            .values([Value::from(2), Value::Null])
            .build(&WRITER)
            .unwrap();
        let Query::Bound { sql, parameters } = query else {
            panic!("Expected a bound query");
        };
        assert_eq!(sql, "INSERT INTO `t` (`a`, `b`) VALUES (?, ?), (?, ?)");
        assert_eq!(
            parameters,
            [Value::from(1), Value::from("x"), Value::from(2), Value::Null]
        );

        let query = QueryBuilder::delete("t")
            .and_where("a", "=", Option::<i64>::None)
            .and_where_raw("b > 0")
            .build(&WRITER)
            .unwrap();
        assert_eq!(query.sql(), "DELETE FROM `t` WHERE `a` IS NULL AND b > 0");
        assert!(query.parameters().is_empty());
    }

    #[test]
    fn sqlite_for_update_is_omitted() {
        let sql = QueryBuilder::table("t")
            .select([raw("1")])
            .for_update()
            .compile(&WRITER)
            .unwrap();
        assert_eq!(sql, "SELECT 1 FROM `t`");
    }
}

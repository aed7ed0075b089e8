use crate::setup;
use keel::{AsValue, Driver, Executor, Order, QueryBuilder, SqlWriter, Value};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

pub fn counting<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    setup(
        executor,
        "
        DROP TABLE IF EXISTS keel_numbers;
        CREATE TABLE keel_numbers (
            id INTEGER PRIMARY KEY,
            value INTEGER NOT NULL,
            parity VARCHAR(4) NOT NULL
        );
        ",
    );
    let mut insert = QueryBuilder::insert("keel_numbers").columns(["value", "parity"]);
    for i in 0..100 {
        insert = insert.values([
            Value::from(i),
            Value::from(if i % 2 == 0 { "even" } else { "odd" }),
        ]);
    }
    let result = insert.execute(executor).expect("Could not insert the numbers");
    assert_eq!(result.rows_affected, 100);

    // Counting leaves the builder untouched
    let query = QueryBuilder::table("keel_numbers")
        .select(["value"])
        .and_where("parity", "=", "even")
        .order_by("value", Order::Desc)
        .limit(5);
    let writer = executor.driver().sql_writer();
    let before = query.compile(&writer).expect("Could not compile");
    assert_eq!(query.count(executor).expect("Could not count"), 50);
    assert_eq!(query.compile(&writer).expect("Could not compile"), before);
    let values = query
        .get(executor)
        .expect("Could not query")
        .column_values("value")
        .expect("Missing column");
    assert_eq!(
        values,
        [98, 96, 94, 92, 90].map(Value::from).to_vec(),
        "ORDER BY and LIMIT still apply after a count"
    );
    assert_eq!(
        QueryBuilder::table("keel_numbers")
            .offset(95)
            .count(executor)
            .expect("Could not count"),
        100
    );

    // Distinct and grouped counts count the groups
    assert_eq!(
        QueryBuilder::table("keel_numbers")
            .select(["parity"])
            .distinct()
            .count(executor)
            .expect("Could not count"),
        2
    );
    assert_eq!(
        QueryBuilder::table("keel_numbers")
            .select(["parity"])
            .group_by(["parity"])
            .count(executor)
            .expect("Could not count"),
        2
    );

    // Ids are 1 to 100
    let query = QueryBuilder::table("keel_numbers")
        .and_where("id", ">", 50)
        .order_by("id", Order::Asc);
    assert_eq!(query.count(executor).expect("Could not count"), 50);
    let sql = query.compile(&writer).expect("Could not compile");
    assert!(
        sql.ends_with(&format!(" ORDER BY {} ASC", writer.quote_identifier("id"))),
        "Unexpected query {sql}"
    );

    // Existence and single rows
    assert!(
        QueryBuilder::table("keel_numbers")
            .and_where("value", ">", 98)
            .exists(executor)
            .expect("Could not query")
    );
    assert!(
        !QueryBuilder::table("keel_numbers")
            .and_where("value", ">", 99)
            .exists(executor)
            .expect("Could not query")
    );
    let first = QueryBuilder::table("keel_numbers")
        .and_where("value", "between", [10, 20])
        .order_by("value", Order::Desc)
        .first(executor)
        .expect("Could not query")
        .expect("A row matches");
    assert_eq!(first["value"], Value::from(20));
    assert!(
        QueryBuilder::table("keel_numbers")
            .and_where("value", "<", 0)
            .first(executor)
            .expect("Could not query")
            .is_none()
    );

    // Empty sets
    let none = QueryBuilder::table("keel_numbers")
        .and_where("value", "in", Vec::<i64>::new())
        .get(executor)
        .expect("Could not query");
    assert!(none.is_empty());
    assert!(none.scalar().expect_err("No row").is_not_found());
    let all = QueryBuilder::table("keel_numbers")
        .and_where("value", "not in", Vec::<i64>::new())
        .count(executor)
        .expect("Could not count");
    assert_eq!(all, 100);

    // Aggregates through raw select items
    let total = QueryBuilder::table("keel_numbers")
        .select([keel::raw("SUM(value)")])
        .and_where_group(|group| {
            group.or("value", "<", 3);
            group.or("value", ">=", 98);
        })
        .scalar(executor)
        .expect("Could not query");
    assert_eq!(
        i64::try_from_value(total).expect("The sum is an integer"),
        200
    );
}

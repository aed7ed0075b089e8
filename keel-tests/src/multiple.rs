use crate::setup;
use keel::{Executor, Order, Query, QueryBuilder, QueryResult, Value};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

pub fn multiple<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    setup(
        executor,
        "
        DROP TABLE IF EXISTS keel_stock;
        CREATE TABLE keel_stock (
            id INTEGER PRIMARY KEY,
            sku VARCHAR(16) NOT NULL,
            quantity INTEGER NOT NULL,
            price REAL,
            note TEXT
        );
        ",
    );

    let result = QueryBuilder::insert("keel_stock")
        .columns(["sku", "quantity", "price", "note"])
        .values([
            Value::from("A-1"),
            Value::from(5),
            Value::from(1.5),
            Value::Null,
        ])
        .values([
            Value::from("B-2"),
            Value::from(0),
            Value::from(20.25),
            Value::from("it's fragile"),
        ])
        .values([
            Value::from("C-3"),
            Value::from(12),
            Value::Null,
            Value::from("bulk"),
        ])
        .execute(executor)
        .expect("Could not insert the stock");
    assert_eq!(result.rows_affected, 3);
    assert_eq!(result.last_affected_id, Some(3));

    // Null aware filters
    let missing_price = QueryBuilder::table("keel_stock")
        .select(["sku"])
        .and_where("price", "=", Value::Null)
        .scalar(executor)
        .expect("Could not query");
    assert_eq!(missing_price, Value::from("C-3"));
    let noted = QueryBuilder::table("keel_stock")
        .and_where("note", "!=", Option::<String>::None)
        .count(executor)
        .expect("Could not count");
    assert_eq!(noted, 2);
    let quoted = QueryBuilder::table("keel_stock")
        .select(["sku"])
        .and_where("note", "like", "%'s%")
        .scalar(executor)
        .expect("Could not query");
    assert_eq!(quoted, Value::from("B-2"));

    // Update and delete through the builder
    let updated = QueryBuilder::update("keel_stock")
        .set([("quantity", Value::from(0)), ("note", Value::from("sold out"))])
        .and_where("sku", "in", vec!["A-1".to_string(), "C-3".to_string()])
        .execute(executor)
        .expect("Could not update");
    assert_eq!(updated.rows_affected, 2);
    assert_eq!(updated.last_affected_id, None);
    let empty = QueryBuilder::table("keel_stock")
        .select(["sku"])
        .and_where("quantity", "=", 0)
        .order_by("sku", Order::Asc)
        .get(executor)
        .expect("Could not query")
        .column_values("sku")
        .expect("Missing column");
    assert_eq!(empty, ["A-1", "B-2", "C-3"].map(Value::from));
    let deleted = QueryBuilder::delete("keel_stock")
        .and_where("quantity", "=", 0)
        .and_where_raw("price IS NOT NULL")
        .execute(executor)
        .expect("Could not delete");
    assert_eq!(deleted.rows_affected, 2);

    // Several statements in one raw query
    let results = executor
        .run(Query::Raw(
            "
            INSERT INTO keel_stock (sku, quantity) VALUES ('D-4', 1);
            SELECT sku FROM keel_stock ORDER BY sku;
            DELETE FROM keel_stock;
            "
            .into(),
        ))
        .expect("Could not run the script");
    let rows = results
        .iter()
        .filter(|v| matches!(v, QueryResult::Row(..)))
        .count();
    assert_eq!(rows, 2);
    let QueryResult::Affected(affected) = results.last().expect("Missing results") else {
        panic!("The last result should be the DELETE");
    };
    assert_eq!(affected.rows_affected, 2);
    assert_eq!(
        QueryBuilder::table("keel_stock")
            .count(executor)
            .expect("Could not count"),
        0
    );
}

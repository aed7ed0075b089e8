use crate::setup;
use keel::{Executor, QueryBuilder, Value};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

pub fn locking<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    setup(
        executor,
        "
        DROP TABLE IF EXISTS keel_accounts;
        CREATE TABLE keel_accounts (id INTEGER PRIMARY KEY, balance INTEGER NOT NULL);
        INSERT INTO keel_accounts (id, balance) VALUES (1, 100);
        ",
    );
    let balance = QueryBuilder::table("keel_accounts")
        .select(["balance"])
        .and_where("id", "=", 1)
        .for_update()
        .scalar(executor)
        .expect("Could not lock the account");
    assert_eq!(balance, Value::from(100));
}

#[cfg(test)]
mod tests {
    use keel_core::Connection;
    use keel_sqlite::SqliteConnection;
    use keel_tests::{execute_tests, init_logs};
    use std::{env, fs, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn sqlite_memory() {
        init_logs();
        let connection =
            SqliteConnection::connect("sqlite://:memory:").expect("Could not open the database");
        execute_tests(connection);
    }

    #[test]
    fn sqlite_file() {
        init_logs();
        let path = env::temp_dir().join("keel_tests.sqlite");
        let db_path = path.display().to_string();
        let _guard = MUTEX.lock().unwrap();
        if path.exists() {
            fs::remove_file(&path).unwrap_or_else(|e| {
                panic!("Failed to remove existing test database file {db_path}: {e}")
            });
        }
        let connection = SqliteConnection::connect(&format!("sqlite://{db_path}?mode=rwc"))
            .expect("Could not open the database");
        assert!(
            path.exists(),
            "Database file should be created after connection"
        );
        execute_tests(connection);
    }
}

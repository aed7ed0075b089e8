#[cfg(test)]
mod tests {
    use keel::{
        Connection, Driver, Entity, EntityState, Error, Executor, GenericSqlWriter, Hooks, Model,
        Query, QueryResult, RowLabeled, RowsAffected, Value, anyhow,
    };
    use serde_json::json;
    use std::{cell::RefCell, collections::VecDeque, sync::Arc};

    struct MockDriver;

    impl Driver for MockDriver {
        type Connection = MockConnection;
        type SqlWriter = GenericSqlWriter;
        const NAME: &'static str = "mock";
        fn sql_writer(&self) -> GenericSqlWriter {
            GenericSqlWriter
        }
    }

    /// Records every query and answers with the queued results.
    #[derive(Default)]
    struct MockConnection {
        queries: Vec<Query>,
        results: VecDeque<anyhow::Result<Vec<QueryResult>>>,
    }

    impl MockConnection {
        fn answer(&mut self, result: anyhow::Result<Vec<QueryResult>>) -> &mut Self {
            self.results.push_back(result);
            self
        }
        fn affected(&mut self, rows_affected: u64, last_affected_id: Option<i64>) -> &mut Self {
            self.answer(Ok(vec![
                RowsAffected {
                    rows_affected,
                    last_affected_id,
                }
                .into(),
            ]))
        }
        fn sql(&self) -> Vec<&str> {
            self.queries.iter().map(Query::sql).collect()
        }
    }

    impl Executor for MockConnection {
        type Driver = MockDriver;

        fn driver(&self) -> &Self::Driver {
            &MockDriver
        }

        fn run(&mut self, query: Query) -> anyhow::Result<Vec<QueryResult>> {
            self.queries.push(query);
            self.results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    impl Connection for MockConnection {
        fn connect(_url: &str) -> anyhow::Result<Self> {
            Ok(Self::default())
        }
    }

    #[derive(Model)]
    #[keel(name = "posts", cast(published = bool, tags = array))]
    struct Post;

    fn stored_post() -> Entity<Post> {
        let row = RowLabeled::new(
            Arc::from(["id", "title", "published", "tags"].map(String::from)),
            Box::new([
                Value::from(7),
                Value::from("Hello"),
                Value::from(0),
                Value::from(r#"["a"]"#),
            ]),
        );
        Entity::from_row(&row).unwrap()
    }

    #[test]
    fn entity_loaded_from_row() {
        let post = stored_post();
        assert_eq!(post.state(), EntityState::Loaded);
        assert!(post.loaded());
        assert!(!post.is_dirty());
        assert_eq!(post.key(), Some(&Value::from(7)));
        assert_eq!(post.get("published"), Some(&Value::Boolean(Some(false))));
        assert_eq!(post.get("tags"), Some(&Value::Json(Some(json!(["a"])))));
        assert_eq!(post.original()["published"], Value::from(0));
        assert_eq!(
            post.to_json().unwrap(),
            json!({"id": 7, "title": "Hello", "published": false, "tags": ["a"]})
        );
        assert_eq!(post.get_as::<Option<String>>("missing").unwrap(), None);
    }

    #[test]
    fn entity_dirty_tracking() {
        let mut post = stored_post();
        post.set("title", "Changed").unwrap();
        assert!(post.changed("title"));
        assert_eq!(post.state(), EntityState::Dirty);
        assert!(post.loaded());
        post.set("title", "Hello").unwrap();
        assert!(!post.changed("title"));
        assert!(!post.is_dirty());

        // Comparison is on the stored form
        post.set("published", 0).unwrap();
        post.set("tags", "[\"a\"]").unwrap();
        assert!(!post.is_dirty());
        post.set("published", "true").unwrap();
        post.set("extra", 1).unwrap();
        assert_eq!(post.dirty().collect::<Vec<_>>(), ["published", "extra"]);
        assert!(post.changed_any(["title", "extra"]));
        assert!(!post.changed_any(["title", "tags"]));
    }

    #[test]
    fn entity_update_without_changes_is_silent() {
        let mut connection = MockConnection::default();
        let mut post = stored_post();
        post.set("title", "Hello").unwrap();
        assert_eq!(post.update(&mut connection).unwrap(), 0);
        assert_eq!(post.save(&mut connection).unwrap(), 0);
        assert!(connection.queries.is_empty());
    }

    #[test]
    fn entity_update_writes_dirty_attributes() {
        let mut connection = MockConnection::default();
        connection.affected(1, None);
        let mut post = stored_post();
        post.set("published", true).unwrap();
        assert_eq!(post.save(&mut connection).unwrap(), 1);
        assert_eq!(
            connection.sql(),
            [r#"UPDATE "posts" SET "published" = ? WHERE "id" = ?"#]
        );
        assert_eq!(
            connection.queries[0].parameters(),
            [Value::from(1), Value::from(7)]
        );
        assert!(!post.is_dirty());
        assert!(post.was_changed("published"));
        assert!(!post.was_changed("title"));
        assert_eq!(post.original()["published"], Value::from(1));

        // A later save forgets the previous changes
        connection.affected(1, None);
        post.set("title", "Other").unwrap();
        post.update(&mut connection).unwrap();
        assert!(post.was_changed("title"));
        assert!(!post.was_changed("published"));
    }

    #[test]
    fn entity_failed_update_keeps_changes() {
        let mut connection = MockConnection::default();
        connection.answer(Err(anyhow::anyhow!("disk I/O error")));
        let mut post = stored_post();
        post.set("title", "Changed").unwrap();
        let error = post.update(&mut connection).unwrap_err();
        assert!(error.is_storage(), "Unexpected error {error:?}");
        assert_eq!(error.to_string(), "disk I/O error");
        assert_eq!(post.state(), EntityState::Dirty);
        assert!(post.changed("title"));
        assert_eq!(post.original()["title"], Value::from("Hello"));
    }

    #[test]
    fn entity_create_takes_generated_key() {
        let mut connection = MockConnection::default();
        connection.affected(1, Some(42));
        let mut post = Entity::<Post>::with_attributes([("title", "New")]).unwrap();
        assert_eq!(post.state(), EntityState::Transient);
        assert_eq!(post.save(&mut connection).unwrap(), 1);
        assert_eq!(post.key(), Some(&Value::from(42)));
        assert_eq!(post.state(), EntityState::Loaded);
        assert!(post.was_changed("title"));
        assert_eq!(
            connection.sql(),
            [r#"INSERT INTO "posts" ("title") VALUES (?)"#]
        );
        let error = post.create(&mut connection).unwrap_err();
        assert!(error.is_configuration());
        assert_eq!(connection.queries.len(), 1);

        // An explicit key wins over the generated one
        connection.affected(1, Some(43));
        let mut post = Entity::<Post>::new();
        post.set("id", 5).unwrap().set("title", "Keyed").unwrap();
        post.create(&mut connection).unwrap();
        assert_eq!(post.key(), Some(&Value::from(5)));
    }

    #[test]
    fn entity_delete_transitions() {
        let mut connection = MockConnection::default();
        let mut transient = Entity::<Post>::new();
        assert_eq!(transient.delete(&mut connection).unwrap(), 0);
        assert_eq!(transient.state(), EntityState::Deleted);
        assert!(connection.queries.is_empty());

        connection.affected(1, None);
        let mut post = stored_post();
        assert_eq!(post.delete(&mut connection).unwrap(), 1);
        assert_eq!(connection.sql(), [r#"DELETE FROM "posts" WHERE "id" = ?"#]);
        assert_eq!(post.state(), EntityState::Deleted);
        assert_eq!(post.key(), None);
        assert_eq!(post.get("title"), Some(&Value::from("Hello")));
        assert_eq!(post.delete(&mut connection).unwrap(), 0);
        post.set("title", "Ghost").unwrap();
        assert!(post.update(&mut connection).unwrap_err().is_configuration());
        assert!(post.create(&mut connection).unwrap_err().is_configuration());
        assert_eq!(connection.queries.len(), 1);
    }

    #[test]
    fn entity_changed_key_targets_stored_row() {
        let mut connection = MockConnection::default();
        connection.affected(1, None).affected(1, None);
        let mut post = stored_post();
        post.set("id", 99).unwrap();
        assert_eq!(post.key(), Some(&Value::from(99)));
        assert_eq!(post.update(&mut connection).unwrap(), 1);
        assert_eq!(
            connection.sql(),
            [r#"UPDATE "posts" SET "id" = ? WHERE "id" = ?"#]
        );
        assert_eq!(
            connection.queries[0].parameters(),
            [Value::from(99), Value::from(7)]
        );
        assert_eq!(post.original()["id"], Value::from(99));

        // The row now lives under the new key
        post.set("title", "Moved").unwrap();
        post.update(&mut connection).unwrap();
        assert_eq!(
            connection.queries[1].parameters(),
            [Value::from("Moved"), Value::from(99)]
        );

        connection.affected(1, None);
        let mut post = stored_post();
        post.set("id", 99).unwrap();
        assert_eq!(post.delete(&mut connection).unwrap(), 1);
        assert_eq!(connection.sql()[2], r#"DELETE FROM "posts" WHERE "id" = ?"#);
        assert_eq!(connection.queries[2].parameters(), [Value::from(7)]);
        assert_eq!(post.state(), EntityState::Deleted);
    }

    #[test]
    fn entity_lookup() {
        let mut connection = MockConnection::default();
        connection.answer(Ok(Vec::new()));
        let error = Entity::<Post>::one_or_fail(&mut connection, 9).unwrap_err();
        assert!(error.is_not_found(), "Unexpected error {error:?}");
        assert_eq!(
            connection.sql(),
            [r#"SELECT "posts".* FROM "posts" WHERE "id" = ? LIMIT 1"#]
        );
        assert_eq!(connection.queries[0].parameters(), [Value::from(9)]);

        let row = RowLabeled::new(
            Arc::from(["id".to_string(), "title".to_string()]),
            Box::new([Value::from(9), Value::from("Found")]),
        );
        connection.answer(Ok(vec![row.into()]));
        let post = Entity::<Post>::one(&mut connection, 9).unwrap().unwrap();
        assert_eq!(post.get("title"), Some(&Value::from("Found")));
    }

    #[test]
    fn entity_insert_query_is_not_executed() {
        let mut post = Entity::<Post>::new();
        post.set("title", "Draft")
            .unwrap()
            .set("tags", json!(["x", "y"]))
            .unwrap();
        let query = post.insert_query(&GenericSqlWriter).unwrap();
        assert_eq!(
            query.sql(),
            r#"INSERT INTO "posts" ("title", "tags") VALUES (?, ?)"#
        );
        assert_eq!(
            query.parameters(),
            [Value::from("Draft"), Value::from(r#"["x","y"]"#)]
        );
        assert_eq!(post.state(), EntityState::Transient);
    }

    #[test]
    fn entity_type_errors() {
        let mut post = stored_post();
        let error = post.set("published", "maybe").unwrap_err();
        assert!(matches!(error, Error::Type(..)), "Unexpected error {error:?}");
        assert!(error.to_string().contains("posts.published"));
        assert_eq!(post.get("published"), Some(&Value::Boolean(Some(false))));
        assert!(!post.is_dirty());
    }

    thread_local! {
        static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    #[derive(Model)]
    #[keel(name = "articles", hooks)]
    struct Article;

    impl Hooks for Article {
        fn on_create(entity: &mut Entity<Self>) -> keel::Result<()> {
            let title = entity.get_as::<Option<String>>("title")?.ok_or_else(|| {
                Error::configuration("An article needs a title")
            })?;
            entity.set("slug", title.to_lowercase().replace(' ', "-"))?;
            EVENTS.with_borrow_mut(|v| v.push("create".into()));
            Ok(())
        }

        fn on_change(_entity: &mut Entity<Self>, name: &str) {
            EVENTS.with_borrow_mut(|v| v.push(format!("change {name}")));
        }
    }

    #[test]
    fn entity_hooks() {
        EVENTS.with_borrow_mut(Vec::clear);
        let mut connection = MockConnection::default();

        let mut article = Entity::<Article>::new();
        let error = article.create(&mut connection).unwrap_err();
        assert!(error.is_configuration());
        assert!(connection.queries.is_empty());
        assert_eq!(article.state(), EntityState::Transient);

        article.set("title", "Hello World").unwrap();
        article.set("title", "Hello World").unwrap();
        connection.affected(1, Some(1));
        article.create(&mut connection).unwrap();
        assert_eq!(article.get("slug"), Some(&Value::from("hello-world")));
        assert_eq!(
            connection.sql(),
            [r#"INSERT INTO "articles" ("title", "slug") VALUES (?, ?)"#]
        );

        // Setting the stored value again is not a change
        article.set("title", "Hello World").unwrap();
        article.set("title", "Bye").unwrap();
        assert_eq!(
            EVENTS.with_borrow(Clone::clone),
            ["change title", "change slug", "create", "change title"]
        );
    }
}

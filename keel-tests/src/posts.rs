use crate::setup;
use keel::{
    AsValue, BackedEnum, EntityState, EnumCase, Error, Executor, Model, Order, Value,
};
use serde_json::json;
use std::sync::Mutex;
use time::macros::datetime;

static MUTEX: Mutex<()> = Mutex::new(());

const SCHEMA: &str = "
    DROP TABLE IF EXISTS keel_posts;
    CREATE TABLE keel_posts (
        id INTEGER PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        views INTEGER,
        published INTEGER,
        tags TEXT,
        status VARCHAR(16),
        published_at VARCHAR(32)
    );
";

struct Status;
impl BackedEnum for Status {
    const NAME: &'static str = "Status";
    const CASES: &'static [EnumCase] = &[
        EnumCase::Str("draft"),
        EnumCase::Str("review"),
        EnumCase::Str("published"),
    ];
}

#[derive(Model)]
#[keel(
    name = "keel_posts",
    alias = "p",
    cast(published = bool, tags = array, status = Status, published_at = datetime)
)]
struct Post;

type Entity = keel::Entity<Post>;

pub fn posts<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    setup(executor, SCHEMA);

    // Create
    let mut post = Entity::with_attributes([
        ("title", Value::from("Hello")),
        ("views", Value::from(3)),
    ])
    .expect("Could not build the post");
    assert_eq!(post.state(), EntityState::Transient);
    assert!(post.is_dirty());
    post.create(executor).expect("Could not create the post");
    assert_eq!(post.state(), EntityState::Loaded);
    assert!(!post.is_dirty());
    assert!(post.was_changed("title"));
    let id = post.key().cloned().expect("The key was not assigned");
    assert!(matches!(id, Value::Int64(Some(..))));

    // Find
    let found = Entity::one_or_fail(executor, id.clone()).expect("Could not find the post");
    assert_eq!(found.get("title"), Some(&Value::from("Hello")));
    assert_eq!(found.get_as::<i64>("views").expect("Views is an integer"), 3);
    assert_eq!(found.state(), EntityState::Loaded);

    // Update only what changed
    let mut found = found;
    found.set("views", 4).expect("Could not set views");
    found.set("title", "Hello").expect("Could not set title");
    assert_eq!(found.dirty().collect::<Vec<_>>(), ["views"]);
    assert_eq!(found.state(), EntityState::Dirty);
    assert_eq!(found.update(executor).expect("Could not update the post"), 1);
    assert!(found.was_changed("views"));
    assert!(!found.was_changed("title"));
    assert_eq!(found.update(executor).expect("A clean update is a no-op"), 0);
    let views = Entity::find()
        .select(["views"])
        .and_where("id", "=", id.clone())
        .scalar(executor)
        .expect("Could not read the views");
    assert_eq!(views, Value::from(4));

    // Reload discards pending changes
    found.set("title", "Changed").expect("Could not set title");
    found.reload(executor).expect("Could not reload the post");
    assert_eq!(found.get("title"), Some(&Value::from("Hello")));
    assert!(!found.is_dirty());

    // Delete
    assert_eq!(found.delete(executor).expect("Could not delete the post"), 1);
    assert_eq!(found.state(), EntityState::Deleted);
    assert_eq!(found.key(), None);
    assert_eq!(found.delete(executor).expect("Deleting twice is a no-op"), 0);
    assert!(
        Entity::one(executor, id.clone())
            .expect("Could not query the post")
            .is_none()
    );
    let error = Entity::one_or_fail(executor, id).expect_err("The post was deleted");
    assert!(error.is_not_found(), "Unexpected error {error:?}");

    // Ordering and filtering through the entity
    for (title, views) in [("c", 30), ("a", 10), ("b", 20)] {
        Entity::with_attributes([("title", Value::from(title)), ("views", Value::from(views))])
            .and_then(|mut v| v.create(executor))
            .expect("Could not create the post");
    }
    let titles = Entity::filter("views", ">=", 20)
        .order_by("title", Order::Asc)
        .all(executor)
        .expect("Could not query the posts")
        .into_iter()
        .map(|v| v.get_as::<String>("title"))
        .collect::<Result<Vec<_>, Error>>()
        .expect("Titles are text");
    assert_eq!(titles, ["b", "c"]);
}

pub fn post_casts<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    setup(executor, SCHEMA);

    let mut post = Entity::new();
    post.set("title", "Casts")
        .and_then(|v| v.set("published", "1"))
        .and_then(|v| v.set("tags", "[\"rust\", \"sql\"]"))
        .and_then(|v| v.set("status", "review"))
        .and_then(|v| v.set("published_at", "2025-01-02T03:04:05"))
        .expect("Could not set the attributes");
    assert_eq!(post.get("published"), Some(&Value::Boolean(Some(true))));
    assert_eq!(post.get("tags"), Some(&Value::Json(Some(json!(["rust", "sql"])))));
    post.create(executor).expect("Could not create the post");
    let key = post.key().cloned().expect("The key was not assigned");

    // Stored in the encoded form
    let stored = Entity::find()
        .hydrate::<keel::Record>()
        .select(["published", "tags", "published_at"])
        .and_where("id", "=", key.clone())
        .first(executor)
        .expect("Could not query the post")
        .expect("The post exists");
    assert_eq!(stored["published"], Value::from(1));
    assert_eq!(stored["tags"], Value::from(r#"["rust","sql"]"#));
    assert_eq!(stored["published_at"], Value::from("2025-01-02 03:04:05"));

    // Read back decoded, with no spurious dirty attribute
    let mut post = Entity::one_or_fail(executor, key).expect("Could not find the post");
    assert!(!post.is_dirty());
    assert!(post.get_as::<bool>("published").expect("Published is a bool"));
    assert_eq!(post.get("status"), Some(&Value::from("review")));
    assert_eq!(
        post.get("published_at"),
        Some(&datetime!(2025-01-02 03:04:05).as_value())
    );
    post.set("published", true).expect("Could not set published");
    post.set("tags", json!(["rust", "sql"])).expect("Could not set tags");
    assert!(!post.is_dirty());

    // Out of domain values are rejected, the attribute keeps its value
    let error = post
        .set("status", "archived")
        .expect_err("Archived is not a status");
    assert!(error.is_type(), "Unexpected error {error:?}");
    assert_eq!(post.get("status"), Some(&Value::from("review")));
    assert!(post.set("published", 2).is_err());
    assert!(post.set("tags", "\"scalar\"").is_err());
    assert!(!post.is_dirty());

    post.set("status", "published").expect("Could not set status");
    assert_eq!(post.update(executor).expect("Could not update the post"), 1);
    let count = Entity::filter("status", "=", "published")
        .count(executor)
        .expect("Could not count the posts");
    assert_eq!(count, 1);
    assert_eq!(
        serde_json::to_value(&post).expect("Could not serialize the post")["tags"],
        json!(["rust", "sql"])
    );
}


use crate::setup;
use keel::{Entity, Executor, JoinType, Model, Order, QueryBuilder, Record, Value};
use std::sync::Mutex;

static MUTEX: Mutex<()> = Mutex::new(());

#[derive(Model)]
#[keel(name = "keel_authors", alias = "a", primary_key = "author_id")]
pub struct Author;

#[derive(Model)]
#[keel(name = "keel_books", alias = "b", cast(year = int))]
pub struct Book;

pub fn books<E: Executor>(executor: &mut E) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    setup(
        executor,
        "
        DROP TABLE IF EXISTS keel_books;
        DROP TABLE IF EXISTS keel_authors;
        CREATE TABLE keel_authors (
            author_id INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            country VARCHAR(64) NOT NULL
        );
        CREATE TABLE keel_books (
            id INTEGER PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            author INTEGER NOT NULL,
            year INTEGER
        );
        ",
    );

    // Explicit keys are kept
    for (id, name, country) in [
        (10, "J.K. Rowling", "UK"),
        (15, "J.R.R. Tolkien", "USA"),
        (20, "Dmitrij Gluchovskij", "Russia"),
    ] {
        let mut author = Entity::<Author>::with_attributes([
            ("author_id", Value::from(id)),
            ("name", Value::from(name)),
            ("country", Value::from(country)),
        ])
        .expect("Could not build the author");
        author.create(executor).expect("Could not create the author");
        assert_eq!(author.key(), Some(&Value::from(id)));
    }
    for (title, author, year) in [
        ("Harry Potter and the Philosopher's Stone", 10, "1997"),
        ("Harry Potter and the Deathly Hallows", 10, "2007"),
        ("The Hobbit", 15, "1937"),
        ("The Fellowship of the Ring", 15, "1954"),
        ("Metro 2033", 20, "2002"),
    ] {
        Entity::<Book>::with_attributes([
            ("title", Value::from(title)),
            ("author", Value::from(author)),
            ("year", Value::from(year)),
        ])
        .and_then(|mut v| v.create(executor))
        .expect("Could not create the book");
    }

    // Index by key
    let authors = Entity::<Author>::find()
        .get(executor)
        .expect("Could not query the authors");
    let indexed = authors
        .index_by("author_id")
        .expect("Could not index the authors");
    assert_eq!(
        indexed.keys().cloned().collect::<Vec<_>>(),
        [10, 15, 20].map(Value::from).to_vec()
    );
    assert_eq!(
        indexed[&Value::from(15)].get("name"),
        Some(&Value::from("J.R.R. Tolkien"))
    );
    assert!(authors.is_hydrated());
    assert_eq!(authors.len(), 3);

    let tolkien = Entity::<Author>::one_or_fail(executor, 15).expect("Could not find Tolkien");
    assert_eq!(tolkien.get("country"), Some(&Value::from("USA")));

    // Joins
    let rows = QueryBuilder::table(Book::table())
        .select(["title", "a.name"])
        .join(Author::table(), JoinType::Inner)
        .on("b.author", "=", "a.author_id")
        .and_where("a.country", "=", "UK")
        .order_by("b.year", Order::Asc)
        .all(executor)
        .expect("Could not query the books");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0]["title"],
        Value::from("Harry Potter and the Philosopher's Stone")
    );
    assert_eq!(rows[1]["name"], Value::from("J.K. Rowling"));

    // Groups
    let per_author = QueryBuilder::table(Author::table())
        .select(["name"])
        .select_also([keel::raw("COUNT(b.id) AS books")])
        .join(Book::table(), JoinType::Left)
        .on("a.author_id", "=", "b.author")
        .group_by(["a.name"])
        .having("books", ">", 1)
        .order_by("a.name", Order::Asc)
        .get(executor)
        .expect("Could not query the authors");
    assert_eq!(
        per_author
            .column_values("name")
            .expect("Missing column"),
        [Value::from("J.K. Rowling"), Value::from("J.R.R. Tolkien")]
    );
    let counts: Vec<Record> = per_author.into_vec().expect("Could not hydrate");
    assert!(counts.iter().all(|v| v["books"] == Value::from(2)));

    // Entities of a model with typed attributes
    let books = Entity::<Book>::filter("year", "<", 2000)
        .order_by("year", Order::Desc)
        .all(executor)
        .expect("Could not query the books");
    assert_eq!(
        books
            .iter()
            .map(|v| v.get("year").cloned())
            .collect::<Vec<_>>(),
        [Some(Value::from(1997)), Some(Value::from(1954)), Some(Value::from(1937))]
    );
}

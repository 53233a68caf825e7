#![allow(dead_code)]

use nestrow::{Cell, RowSet};

/// In-memory result set with the given column names.
pub fn rows(names: &[&str], data: Vec<Vec<Cell>>) -> RowSet {
    data.into_iter()
        .fold(RowSet::new(names.iter().copied()), RowSet::with_row)
}

#[cfg(feature = "rusqlite")]
pub fn setup_db() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().expect("in-memory database");
    conn.execute_batch(
        "CREATE TABLE blogs (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE posts (
             id INTEGER PRIMARY KEY,
             blog_id INTEGER NOT NULL REFERENCES blogs(id),
             title TEXT NOT NULL,
             published_at TEXT
         );
         CREATE TABLE labels (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE post_labels (
             post_id INTEGER NOT NULL REFERENCES posts(id),
             label_id INTEGER NOT NULL REFERENCES labels(id)
         );
         INSERT INTO blogs VALUES (1, 'Engineering'), (2, 'Empty');
         INSERT INTO posts VALUES
             (10, 1, 'Intro', '2024-01-02 03:04:05'),
             (11, 1, 'Joins', '2024-02-03 04:05:06');
         INSERT INTO labels VALUES (100, 'rust'), (101, 'sql');
         INSERT INTO post_labels VALUES (10, 100), (10, 101), (11, 101);",
    )
    .expect("schema setup");
    conn
}

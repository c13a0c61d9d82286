#![allow(dead_code)]

use reminder_db::{CrudService, DataBaseService, DatabaseConfig, DbError, Fields, Session, Tables, Users, USERS};
use serde_json::{json, Value};

pub const MEMORY_URL: &str = "sqlite::memory:";

/// Route library events to the test output; `RUST_LOG=reminder_db=debug` shows every statement.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Service over a private in-memory database with no tables yet.
pub async fn memory_db() -> DataBaseService {
    init_tracing();
    DataBaseService::connect(DatabaseConfig::new(MEMORY_URL))
        .await
        .expect("in-memory sqlite connects")
}

/// Service over a private in-memory database with the `users` table created.
pub async fn users_db() -> DataBaseService {
    let db = memory_db().await;
    db.drop_tables(Tables::All).await.unwrap();
    db.create_tables(&USERS).await.unwrap();
    db
}

pub fn fields(v: Value) -> Fields {
    v.as_object().cloned().expect("object literal")
}

pub fn user(nickname: &str, name: &str, surname: &str) -> Fields {
    fields(json!({"nickname": nickname, "name": name, "surname": surname}))
}

/// The three-user seed used by the filtering cases.
pub fn three_users() -> Vec<Fields> {
    vec![
        user("user1", "Иван", "Иванов"),
        user("user2", "Алексей", "Петров"),
        user("user3", "Мария", "Сидорова"),
    ]
}

/// Four users whose nickname, name and surname orders all differ.
pub fn four_users() -> Vec<Fields> {
    vec![
        user("B", "A", "C"),
        user("A", "C", "A"),
        user("C", "B", "B"),
        user("D", "A", "B"),
    ]
}

/// Queue every row and flush.
pub async fn seed_users(session: &mut Session, rows: &[Fields]) -> Result<(), DbError> {
    let mut users = CrudService::<Users>::new(session);
    for row in rows {
        users.create(row.clone())?;
    }
    session.flush().await
}

pub fn nicknames(users: &[Users]) -> Vec<&str> {
    users.iter().map(|u| u.nickname.as_str()).collect()
}

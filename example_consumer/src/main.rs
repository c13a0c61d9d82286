//! Smoke harness: a separate crate that uses reminder-db as a dependency.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Environment: `DATABASE_TYPE` (default `sqlite_test`), `DATABASE_CONFIG` (default
//! `data_base/config.ini`), `RUST_LOG`. A `.env` file is honored.

use reminder_db::{
    load_config, CrudService, DataBaseService, DatabaseType, ReadQuery, Tables, Users,
};
use serde_json::json;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reminder_db=info,example_consumer=info")),
        )
        .init();

    let database_type: DatabaseType = std::env::var("DATABASE_TYPE")
        .unwrap_or_else(|_| "sqlite_test".into())
        .parse()?;
    let config_path = std::env::var("DATABASE_CONFIG").ok().map(PathBuf::from);
    let config = load_config(database_type, config_path.as_deref())?;

    let db = DataBaseService::connect(config).await?;
    db.create_tables(Tables::All).await?;
    let tables = db.table_manager().table_names().await?;
    tracing::info!(?tables, "schema ready");

    let users = db
        .session_scope(true, |s| {
            Box::pin(async move {
                let mut users = CrudService::<Users>::new(s);
                if users.count(&[Users::NICKNAME.eq("john_doe")], false).await? == 0 {
                    let fields = json!({"nickname": "john_doe", "name": "John", "surname": "Doe"});
                    if let Some(fields) = fields.as_object() {
                        users.create(fields.clone())?;
                    }
                }
                users.read(&ReadQuery::new().order_by(Users::ID)).await
            })
        })
        .await?;
    for u in &users {
        tracing::info!(user = %u, "stored");
    }

    db.close().await;
    Ok(())
}

//! Reminder DB: configuration-driven data-access layer for the `users` and `reminders` tables.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod service;
pub mod session;
pub mod sql;
pub mod table_manager;

pub use config::{load_config, load_config_str, DatabaseConfig, DatabaseType};
pub use engine::DatabaseEngine;
pub use error::{ConfigError, DbError};
pub use model::{Column, Entity, Filter, OrderBy, Reminders, SchemaRegistry, TableSchema, Users, REMINDERS, USERS};
pub use service::{Created, CrudService, DataBaseService, ReadQuery};
pub use session::{Session, SessionOptions};
pub use sql::Fields;
pub use table_manager::{TableManager, Tables};

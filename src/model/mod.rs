//! Entity models: schema descriptors, typed columns and the registry.

mod column;
mod registry;
mod reminders;
mod schema;
mod users;

pub use column::{Column, CompareOp, Filter, OrderBy};
pub use registry::SchemaRegistry;
pub use reminders::{Reminders, REMINDERS};
pub use schema::{ColumnDef, ColumnType, ForeignKey, ServerDefault, TableSchema};
pub use users::{Users, USERS};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A row type mapped to one table. Instances are built from field maps and rows via serde;
/// missing fields fall back to `Default`.
pub trait Entity: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    fn schema() -> &'static TableSchema;

    fn table_name() -> &'static str {
        Self::schema().name
    }
}

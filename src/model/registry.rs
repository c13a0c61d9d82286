//! Append-only registry of entity schemas. Registration order is dependency order.

use crate::error::DbError;
use crate::model::schema::TableSchema;
use crate::model::{reminders::REMINDERS, users::USERS};

#[derive(Clone, Debug)]
pub struct SchemaRegistry {
    tables: Vec<&'static TableSchema>,
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        SchemaRegistry { tables: Vec::new() }
    }

    /// Register a schema. Its foreign keys must point at tables already registered
    /// (or at itself), which keeps the list in creation order.
    pub fn register(&mut self, schema: &'static TableSchema) -> Result<(), DbError> {
        if self.tables.iter().any(|t| t.name == schema.name) {
            return Err(DbError::InvalidArgument(format!(
                "table '{}' is already registered",
                schema.name
            )));
        }
        for dep in schema.dependencies() {
            if !self.tables.iter().any(|t| t.name == dep) {
                return Err(DbError::InvalidArgument(format!(
                    "table '{}' references unregistered table '{}'",
                    schema.name, dep
                )));
            }
        }
        self.tables.push(schema);
        Ok(())
    }

    /// True when this exact schema (name and shape) was registered.
    pub fn contains(&self, schema: &TableSchema) -> bool {
        self.tables.iter().any(|t| *t == schema)
    }

    pub fn get(&self, name: &str) -> Option<&'static TableSchema> {
        self.tables.iter().copied().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[&'static TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name).collect()
    }

    /// Registration index; used to order DDL.
    pub(crate) fn position(&self, schema: &TableSchema) -> Option<usize> {
        self.tables.iter().position(|t| *t == schema)
    }
}

impl Default for SchemaRegistry {
    /// `users` then `reminders`.
    fn default() -> Self {
        SchemaRegistry {
            tables: vec![&USERS, &REMINDERS],
        }
    }
}

//! Create and drop entity tables. Targets are checked against the registry before any DDL,
//! then applied in registration order (reverse for drop).

use crate::engine::DatabaseEngine;
use crate::error::DbError;
use crate::model::{SchemaRegistry, TableSchema};
use crate::sql::{create_table, drop_table};
use sqlx::Row;

/// Which tables a DDL call applies to.
#[derive(Clone, Debug, Default)]
pub enum Tables {
    /// Every registered table.
    #[default]
    All,
    One(&'static TableSchema),
    Many(Vec<&'static TableSchema>),
}

impl From<&'static TableSchema> for Tables {
    fn from(schema: &'static TableSchema) -> Self {
        Tables::One(schema)
    }
}

impl From<Vec<&'static TableSchema>> for Tables {
    fn from(schemas: Vec<&'static TableSchema>) -> Self {
        Tables::Many(schemas)
    }
}

impl<const N: usize> From<[&'static TableSchema; N]> for Tables {
    fn from(schemas: [&'static TableSchema; N]) -> Self {
        Tables::Many(schemas.to_vec())
    }
}

pub struct TableManager<'e> {
    engine: &'e DatabaseEngine,
    registry: SchemaRegistry,
}

impl<'e> TableManager<'e> {
    /// Manager over the built-in `users` and `reminders` tables.
    pub fn new(engine: &'e DatabaseEngine) -> Self {
        Self::with_registry(engine, SchemaRegistry::default())
    }

    pub fn with_registry(engine: &'e DatabaseEngine, registry: SchemaRegistry) -> Self {
        TableManager { engine, registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// `CREATE TABLE IF NOT EXISTS` for each target, parents first.
    pub async fn create_tables(&self, targets: impl Into<Tables>) -> Result<(), DbError> {
        let schemas = self.resolve(targets.into())?;
        let pool = self.engine.get_engine(true).await?;
        for schema in schemas {
            let sql = create_table(schema, self.engine.dialect());
            tracing::debug!(%sql, "ddl");
            sqlx::query(&sql).execute(pool).await?;
            tracing::info!(table = schema.name, "table created");
        }
        Ok(())
    }

    /// `DROP TABLE IF EXISTS` for each target, dependents first.
    pub async fn drop_tables(&self, targets: impl Into<Tables>) -> Result<(), DbError> {
        let schemas = self.resolve(targets.into())?;
        let pool = self.engine.get_engine(true).await?;
        for schema in schemas.into_iter().rev() {
            let sql = drop_table(schema);
            tracing::debug!(%sql, "ddl");
            sqlx::query(&sql).execute(pool).await?;
            tracing::info!(table = schema.name, "table dropped");
        }
        Ok(())
    }

    /// Names of the tables that currently exist, sorted.
    pub async fn table_names(&self) -> Result<Vec<String>, DbError> {
        let pool = self.engine.get_engine(false).await?;
        let rows = sqlx::query(self.engine.dialect().list_tables_sql())
            .fetch_all(pool)
            .await?;
        rows.iter()
            .map(|r| r.try_get::<String, _>(0).map_err(DbError::from))
            .collect()
    }

    pub async fn has_table(&self, name: &str) -> Result<bool, DbError> {
        Ok(self.table_names().await?.iter().any(|t| t == name))
    }

    /// Registered schemas for `targets`, deduplicated and in registration order.
    fn resolve(&self, targets: Tables) -> Result<Vec<&'static TableSchema>, DbError> {
        let requested = match targets {
            Tables::All => return Ok(self.registry.tables().to_vec()),
            Tables::One(schema) => vec![schema],
            Tables::Many(schemas) => schemas,
        };
        let mut positions = requested
            .iter()
            .map(|s| {
                self.registry.position(s).ok_or_else(|| {
                    DbError::InvalidArgument(format!("'{}' is not a registered table", s.name))
                })
            })
            .collect::<Result<Vec<usize>, DbError>>()?;
        positions.sort_unstable();
        positions.dedup();
        Ok(positions
            .into_iter()
            .map(|i| self.registry.tables()[i])
            .collect())
    }
}

//! Generic CRUD over one entity type, executed inside a caller-owned session.

use crate::error::DbError;
use crate::model::{ColumnType, Entity, Filter, TableSchema};
use crate::service::query::ReadQuery;
use crate::service::validation::FieldValidator;
use crate::session::Session;
use crate::sql::{
    bind_all, count, delete, parse_timestamp, row_to_json, select_list, timestamp_to_iso, update, Fields, Junction,
    QueryBuf,
};
use serde_json::Value;
use sqlx::Row;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Instance returned by [`CrudService::create`]. It shares state with the queued insert:
/// after the session flushes, `id`, `created_at` and other generated fields are filled in.
pub struct Created<T> {
    inner: Arc<Mutex<T>>,
}

impl<T: Clone> Created<T> {
    fn new(instance: T) -> Self {
        Created {
            inner: Arc::new(Mutex::new(instance)),
        }
    }

    /// Snapshot of the instance as of the last flush.
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    fn replace(&self, instance: T) {
        *self.lock() = instance;
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Created<T> {
    fn clone(&self) -> Self {
        Created {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Created<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Created").field(&self.get()).finish()
    }
}

impl<T: Clone + fmt::Display> fmt::Display for Created<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|t| fmt::Display::fmt(t, f))
    }
}

/// Never commits or rolls back; transaction boundaries belong to the session's owner.
pub struct CrudService<'s, T: Entity> {
    session: &'s mut Session,
    _entity: PhantomData<fn() -> T>,
}

impl<'s, T: Entity> CrudService<'s, T> {
    pub fn new(session: &'s mut Session) -> Self {
        CrudService {
            session,
            _entity: PhantomData,
        }
    }

    pub fn session(&mut self) -> &mut Session {
        &mut *self.session
    }

    /// Build an instance from `fields` and queue its insert. Generated fields (`id`,
    /// server defaults) stay unset until the session flushes, which writes the stored row
    /// back into the returned handle. Constraint violations surface at flush or commit.
    pub fn create(&mut self, fields: Fields) -> Result<Created<T>, DbError> {
        let schema = T::schema();
        FieldValidator::validate(schema, &fields)?;
        let created = Created::new(instance_from_fields::<T>(schema, &fields)?);
        let target = created.clone();
        self.session.add(
            schema,
            fields,
            Box::new(move |stored| {
                target.replace(entity_from_json::<T>(stored, schema)?);
                Ok(())
            }),
        );
        Ok(created)
    }

    /// Bulk delete of rows matching the filters (AND, or OR with `use_or`).
    /// An empty filter list matches every row. Returns the number of rows removed.
    pub async fn delete(&mut self, filters: &[Filter<T>], use_or: bool) -> Result<u64, DbError> {
        let schema = T::schema();
        let predicates = FieldValidator::predicates(schema, filters)?;
        self.session.autoflush().await?;
        let q = delete(schema, &predicates, Junction::from_use_or(use_or), self.session.dialect());
        execute(&mut *self.session, &q).await
    }

    /// Bulk update of rows matching the filters. Both `filters` and `updates` must be
    /// non-empty. Returns the number of rows updated.
    pub async fn update(&mut self, filters: &[Filter<T>], updates: &Fields, use_or: bool) -> Result<u64, DbError> {
        let schema = T::schema();
        if filters.is_empty() {
            return Err(DbError::InvalidValue(format!(
                "update of '{}' needs at least one filter",
                schema.name
            )));
        }
        FieldValidator::validate_updates(schema, updates)?;
        let predicates = FieldValidator::predicates(schema, filters)?;
        self.session.autoflush().await?;
        let q = update(schema, updates, &predicates, Junction::from_use_or(use_or), self.session.dialect());
        execute(&mut *self.session, &q).await
    }

    /// Rows matching the query's filters, in its order, after its limit and offset.
    pub async fn read(&mut self, query: &ReadQuery<T>) -> Result<Vec<T>, DbError> {
        let schema = T::schema();
        let predicates = FieldValidator::predicates(schema, &query.filters)?;
        let ordering = FieldValidator::orderings(schema, &query.order_by)?;
        self.session.autoflush().await?;
        let q = select_list(
            schema,
            &predicates,
            Junction::from_use_or(query.use_or),
            &ordering,
            query.limit,
            query.offset,
            self.session.dialect(),
        );
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let conn = self.session.connection().await?;
        let rows = bind_all(sqlx::query(&q.sql), &q.params).fetch_all(conn).await?;
        rows.iter()
            .map(|r| entity_from_json::<T>(row_to_json(r, schema)?, schema))
            .collect()
    }

    /// Every row of the table.
    pub async fn read_all(&mut self) -> Result<Vec<T>, DbError> {
        self.read(&ReadQuery::new()).await
    }

    /// Number of rows matching the filters.
    pub async fn count(&mut self, filters: &[Filter<T>], use_or: bool) -> Result<u64, DbError> {
        let schema = T::schema();
        let predicates = FieldValidator::predicates(schema, filters)?;
        self.session.autoflush().await?;
        let q = count(schema, &predicates, Junction::from_use_or(use_or), self.session.dialect());
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let conn = self.session.connection().await?;
        let row = bind_all(sqlx::query(&q.sql), &q.params).fetch_one(conn).await?;
        let n: i64 = row.try_get(0)?;
        Ok(n.max(0) as u64)
    }
}

async fn execute(session: &mut Session, q: &QueryBuf) -> Result<u64, DbError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let conn = session.connection().await?;
    let result = bind_all(sqlx::query(&q.sql), &q.params).execute(conn).await?;
    Ok(result.rows_affected())
}

/// Nulls are dropped so the entity's defaults apply; timestamps are normalized to the
/// serde spelling.
fn instance_from_fields<T: Entity>(schema: &TableSchema, fields: &Fields) -> Result<T, DbError> {
    let mut map = serde_json::Map::new();
    for (name, value) in fields {
        let Some(column) = schema.column(name) else { continue };
        let value = match (column.ty, value) {
            (_, Value::Null) => continue,
            (ColumnType::Timestamp, Value::String(s)) => parse_timestamp(s)
                .map(|dt| Value::String(timestamp_to_iso(&dt)))
                .unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        };
        map.insert(name.clone(), value);
    }
    serde_json::from_value(Value::Object(map))
        .map_err(|e| DbError::InvalidArgument(format!("cannot build '{}' instance: {}", schema.name, e)))
}

fn entity_from_json<T: Entity>(row: Fields, schema: &TableSchema) -> Result<T, DbError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| DbError::Decode(format!("'{}' row: {}", schema.name, e)))
}

//! Unit of work: one connection (and, unless autocommit, one transaction) plus the
//! inserts queued by `CrudService::create` until the next flush.

use crate::error::DbError;
use crate::model::TableSchema;
use crate::sql::{bind_all, insert, row_to_json, Dialect, Fields};
use sqlx::AnyConnection;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyPool, Connection, Transaction};

/// Session behavior taken from `DatabaseConfig`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Run statements on a plain pooled connection, each committing on its own.
    pub autocommit: bool,
    /// Flush queued inserts before every query.
    pub autoflush: bool,
}

/// Receives the stored row of a flushed insert.
pub(crate) type Writeback = Box<dyn FnOnce(Fields) -> Result<(), DbError> + Send>;

struct PendingInsert {
    schema: &'static TableSchema,
    fields: Fields,
    writeback: Writeback,
}

enum SessionConn {
    Transaction(Transaction<'static, Any>),
    Autocommit(PoolConnection<Any>),
}

/// Not shared between tasks; open one per logical group of operations.
pub struct Session {
    pool: AnyPool,
    dialect: Dialect,
    options: SessionOptions,
    conn: Option<SessionConn>,
    pending: Vec<PendingInsert>,
}

impl Session {
    /// The connection is acquired lazily, on first use.
    pub fn new(pool: AnyPool, dialect: Dialect, options: SessionOptions) -> Self {
        Session {
            pool,
            dialect,
            options,
            conn: None,
            pending: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Inserts queued and not yet flushed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn add(&mut self, schema: &'static TableSchema, fields: Fields, writeback: Writeback) {
        self.pending.push(PendingInsert {
            schema,
            fields,
            writeback,
        });
    }

    /// Connection for this unit of work; begins the transaction on first call.
    pub async fn connection(&mut self) -> Result<&mut AnyConnection, DbError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None if self.options.autocommit => SessionConn::Autocommit(self.pool.acquire().await?),
            None => SessionConn::Transaction(self.pool.begin().await?),
        };
        Ok(match self.conn.insert(conn) {
            SessionConn::Transaction(tx) => &mut **tx,
            SessionConn::Autocommit(c) => &mut **c,
        })
    }

    /// Send queued inserts to the database. They run inside a savepoint: if one fails,
    /// none of this flush is applied, earlier flushes stay, and the error is returned.
    /// Each stored row, generated values included, is handed back to the instance
    /// `CrudService::create` returned once the savepoint is released.
    pub async fn flush(&mut self) -> Result<(), DbError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        // the queue stays intact when no connection can be had
        self.connection().await?;
        let pending = std::mem::take(&mut self.pending);
        let dialect = self.dialect;
        let conn = self.connection().await?;
        let mut savepoint = conn.begin().await?;
        let mut stored = Vec::with_capacity(pending.len());
        let mut failure = None;
        for p in pending {
            let q = insert(p.schema, &p.fields, dialect);
            tracing::debug!(sql = %q.sql, params = ?q.params, "flush insert");
            let row = match bind_all(sqlx::query(&q.sql), &q.params).fetch_one(&mut *savepoint).await {
                Ok(row) => row,
                Err(e) => {
                    failure = Some(DbError::from(e));
                    break;
                }
            };
            match row_to_json(&row, p.schema) {
                Ok(fields) => stored.push((p.writeback, fields)),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            if let Err(rb) = savepoint.rollback().await {
                tracing::warn!(error = %rb, "rollback of failed flush did not complete");
            }
            return Err(e);
        }
        savepoint.commit().await?;
        tracing::debug!(rows = stored.len(), "flushed");
        for (writeback, fields) in stored {
            writeback(fields)?;
        }
        Ok(())
    }

    /// Flush only when autoflush is on. Called before every query.
    pub(crate) async fn autoflush(&mut self) -> Result<(), DbError> {
        if self.options.autoflush {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flush and commit. The session stays usable; the next statement opens a new transaction.
    pub async fn commit(&mut self) -> Result<(), DbError> {
        self.flush().await?;
        if let Some(SessionConn::Transaction(tx)) = self.conn.take() {
            tx.commit().await?;
            tracing::debug!("session committed");
        }
        Ok(())
    }

    /// Discard queued inserts and roll back the open transaction, if any.
    pub async fn rollback(&mut self) -> Result<(), DbError> {
        self.pending.clear();
        if let Some(SessionConn::Transaction(tx)) = self.conn.take() {
            tx.rollback().await?;
            tracing::debug!("session rolled back");
        }
        Ok(())
    }

    /// Release the connection. Uncommitted work is rolled back.
    pub async fn close(mut self) {
        if let Err(e) = self.rollback().await {
            tracing::warn!(error = %e, "rollback on close did not complete");
        }
    }
}

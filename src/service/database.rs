//! Entry point for callers: owns the engine built from a `DatabaseConfig` and hands out
//! sessions, either bare or wrapped in a commit/rollback scope.

use crate::config::DatabaseConfig;
use crate::engine::DatabaseEngine;
use crate::error::DbError;
use crate::model::SchemaRegistry;
use crate::session::{Session, SessionOptions};
use crate::table_manager::{TableManager, Tables};
use futures::future::BoxFuture;

tokio::task_local! {
    static SESSION_ACTIVE: ();
}

pub struct DataBaseService {
    config: DatabaseConfig,
    engine: DatabaseEngine,
    registry: SchemaRegistry,
}

impl DataBaseService {
    pub fn new(config: DatabaseConfig, engine: DatabaseEngine) -> Self {
        DataBaseService {
            config,
            engine,
            registry: SchemaRegistry::default(),
        }
    }

    /// Connect the engine described by `config`.
    pub async fn connect(config: DatabaseConfig) -> Result<Self, DbError> {
        let engine = DatabaseEngine::from_config(&config).await?;
        Ok(Self::new(config, engine))
    }

    /// Replace the registry the table operations work from.
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn engine(&self) -> &DatabaseEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DatabaseEngine {
        &mut self.engine
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn table_manager(&self) -> TableManager<'_> {
        TableManager::with_registry(&self.engine, self.registry.clone())
    }

    pub async fn create_tables(&self, targets: impl Into<Tables>) -> Result<(), DbError> {
        self.table_manager().create_tables(targets).await
    }

    pub async fn drop_tables(&self, targets: impl Into<Tables>) -> Result<(), DbError> {
        self.table_manager().drop_tables(targets).await
    }

    /// A new session with this configuration's autocommit/autoflush. The caller owns
    /// commit, rollback and close.
    ///
    /// An in-memory SQLite engine has one connection. While a session holds it, another
    /// session, `create_tables` or `drop_tables` blocks until that session is closed.
    pub fn session(&self) -> Session {
        Session::new(
            self.engine.pool().clone(),
            self.engine.dialect(),
            SessionOptions {
                autocommit: self.config.autocommit(),
                autoflush: self.config.autoflush(),
            },
        )
    }

    /// Run `body` in a fresh session. On success the session is committed when `commit`
    /// is set; any error from the body or the commit rolls back and is returned as is.
    /// The session is closed either way. Calling this again from inside `body` fails
    /// with [`DbError::NestedSession`].
    ///
    /// ```ignore
    /// let n = db
    ///     .session_scope(true, |s| Box::pin(async move {
    ///         CrudService::<Users>::new(s).count(&[], false).await
    ///     }))
    ///     .await?;
    /// ```
    pub async fn session_scope<T, F>(&self, commit: bool, body: F) -> Result<T, DbError>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T, DbError>>,
    {
        if SESSION_ACTIVE.try_with(|_| ()).is_ok() {
            return Err(DbError::NestedSession);
        }
        SESSION_ACTIVE.scope((), self.run_scope(commit, body)).await
    }

    async fn run_scope<T, F>(&self, commit: bool, body: F) -> Result<T, DbError>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T, DbError>>,
    {
        let mut session = self.session();
        let result = body(&mut session).await;
        let result = match result {
            Ok(value) if commit => session.commit().await.map(|()| value),
            other => other,
        };
        if let Err(e) = &result {
            tracing::error!(error = %e, "session failed, rolling back");
            if let Err(rb) = session.rollback().await {
                tracing::warn!(error = %rb, "rollback did not complete");
            }
        }
        session.close().await;
        result
    }

    pub async fn close(&self) {
        self.engine.close().await;
    }
}

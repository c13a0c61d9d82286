//! Database engine: owns the `AnyPool` and its lifecycle (connect, liveness, restart).

use crate::config::DatabaseConfig;
use crate::error::DbError;
use crate::sql::Dialect;
use log::LevelFilter;
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::{AnyPool, ConnectOptions};
use std::str::FromStr;

pub struct DatabaseEngine {
    url: String,
    echo: bool,
    dialect: Dialect,
    pool: AnyPool,
}

impl DatabaseEngine {
    /// Open a pool for `url`. With `echo`, every statement is logged at INFO.
    pub async fn connect(url: &str, echo: bool) -> Result<Self, DbError> {
        let (dialect, pool) = create_pool(url, echo)
            .await
            .map_err(DbError::Initialization)?;
        tracing::info!(url = %redact(url), ?dialect, echo, "database engine connected");
        Ok(DatabaseEngine {
            url: url.to_string(),
            echo,
            dialect,
            pool,
        })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DbError> {
        Self::connect(config.url(), config.echo()).await
    }

    /// Run `SELECT 1`; any failure means the database is unavailable.
    pub async fn check_connection(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DbError::Unavailable)?;
        Ok(())
    }

    /// Close the pool and reopen it with the given or previous parameters.
    /// Callers must let open sessions finish first; an in-memory SQLite database
    /// starts empty again.
    pub async fn restart(&mut self, url: Option<&str>, echo: Option<bool>) -> Result<(), DbError> {
        self.pool.close().await;
        let url = url.map(str::to_string).unwrap_or_else(|| self.url.clone());
        let echo = echo.unwrap_or(self.echo);
        let (dialect, pool) = create_pool(&url, echo)
            .await
            .map_err(DbError::Initialization)?;
        tracing::info!(url = %redact(&url), ?dialect, echo, "database engine restarted");
        self.url = url;
        self.echo = echo;
        self.dialect = dialect;
        self.pool = pool;
        Ok(())
    }

    /// The pool, optionally after a liveness check.
    pub async fn get_engine(&self, ensure_available: bool) -> Result<&AnyPool, DbError> {
        if ensure_available {
            self.check_connection().await?;
        }
        Ok(&self.pool)
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Release every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn create_pool(url: &str, echo: bool) -> Result<(Dialect, AnyPool), sqlx::Error> {
    sqlx::any::install_default_drivers();
    let dialect = Dialect::from_url(url).ok_or_else(|| {
        sqlx::Error::Configuration(format!("unsupported database url scheme: {}", redact(url)).into())
    })?;
    let level = if echo { LevelFilter::Info } else { LevelFilter::Off };
    let options = AnyConnectOptions::from_str(url)?.log_statements(level);

    let mut pool_options = AnyPoolOptions::new();
    if is_in_memory_sqlite(url) {
        // each connection would get its own empty database. With a single connection, a
        // second session or a create/drop call waits until the open session is closed.
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_options.connect_with(options).await?;
    Ok((dialect, pool))
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}

/// URL without the password, for logs.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            match creds.find(':') {
                Some(colon) => format!("{}{}:***{}", &url[..scheme_end + 3], &creds[..colon], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_only() {
        assert_eq!(redact("postgres://app:secret@db:5432/rem"), "postgres://app:***@db:5432/rem");
        assert_eq!(redact("postgres://app@db/rem"), "postgres://app@db/rem");
        assert_eq!(redact("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn recognizes_in_memory_sqlite() {
        assert!(is_in_memory_sqlite("sqlite::memory:"));
        assert!(is_in_memory_sqlite("sqlite://file:test?mode=memory&cache=shared"));
        assert!(!is_in_memory_sqlite("sqlite://reminders.db"));
        assert!(!is_in_memory_sqlite("postgres://localhost/db"));
    }
}

//! SQL differences between the two supported backends.

use crate::model::{ColumnDef, ColumnType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Backend for a connection URL, by scheme.
    pub fn from_url(url: &str) -> Option<Dialect> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" => Some(Dialect::Sqlite),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            _ => None,
        }
    }

    /// Bind placeholder for parameter `n` (1-based). Timestamps are bound as text,
    /// which PostgreSQL needs cast explicitly.
    pub fn placeholder(&self, n: u32, ty: ColumnType) -> String {
        match (self, ty) {
            (Dialect::Postgres, ColumnType::Timestamp) => format!("CAST(${} AS TIMESTAMP)", n),
            (Dialect::Postgres, _) => format!("${}", n),
            (Dialect::Sqlite, _) => format!("?{}", n),
        }
    }

    /// SELECT list entry. Timestamps are read back as text and PostgreSQL integers widened,
    /// so every backend decodes the same way.
    pub fn select_column(&self, column: &ColumnDef) -> String {
        let q = quoted(column.name);
        match (self, column.ty) {
            (_, ColumnType::Timestamp) => format!("CAST({} AS TEXT) AS {}", q, q),
            (Dialect::Postgres, ColumnType::Integer) => format!("CAST({} AS BIGINT) AS {}", q, q),
            _ => q,
        }
    }

    pub fn column_type(&self, ty: ColumnType) -> String {
        match ty {
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::String(len) => format!("VARCHAR({})", len),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
        }
    }

    /// Column definition for an auto-incrementing integer primary key.
    pub fn serial_primary_key(&self, name: &str) -> String {
        match self {
            Dialect::Sqlite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(name)),
            Dialect::Postgres => format!("{} SERIAL PRIMARY KEY", quoted(name)),
        }
    }

    /// Query returning one text column with every user table name in the current schema.
    pub fn list_tables_sql(&self) -> &'static str {
        match self {
            Dialect::Sqlite => {
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
            Dialect::Postgres => {
                "SELECT CAST(tablename AS TEXT) FROM pg_catalog.pg_tables WHERE schemaname = current_schema() ORDER BY tablename"
            }
        }
    }

    /// LIMIT/OFFSET tail. SQLite cannot take OFFSET without LIMIT, so it gets `LIMIT -1`.
    pub fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset, self) {
            (Some(l), Some(o), _) => format!(" LIMIT {} OFFSET {}", l, o),
            (Some(l), None, _) => format!(" LIMIT {}", l),
            (None, Some(o), Dialect::Sqlite) => format!(" LIMIT -1 OFFSET {}", o),
            (None, Some(o), Dialect::Postgres) => format!(" OFFSET {}", o),
            (None, None, _) => String::new(),
        }
    }
}

/// Quote identifier (safe: identifiers only come from schema constants).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

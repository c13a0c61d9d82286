//! Connection settings and the closed set of database selectors.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects which section of the config file to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseType {
    Sqlite,
    SqliteTest,
    Postgresql,
    Url,
}

impl DatabaseType {
    pub const ALL: [DatabaseType; 4] = [
        DatabaseType::Sqlite,
        DatabaseType::SqliteTest,
        DatabaseType::Postgresql,
        DatabaseType::Url,
    ];

    /// Config section name for this selector.
    pub fn section(&self) -> &'static str {
        match self {
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::SqliteTest => "sqlite_test",
            DatabaseType::Postgresql => "postgresql",
            DatabaseType::Url => "url",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

impl FromStr for DatabaseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DatabaseType::ALL
            .into_iter()
            .find(|t| t.section() == wanted)
            .ok_or_else(|| ConfigError::UnknownDatabaseType(s.to_string()))
    }
}

/// Immutable connection settings. `with_*` methods return a modified copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    url: String,
    #[serde(default)]
    echo: bool,
    #[serde(default)]
    autocommit: bool,
    #[serde(default)]
    autoflush: bool,
}

impl DatabaseConfig {
    /// New config for `url`; `echo`, `autocommit` and `autoflush` start as `false`.
    pub fn new(url: impl Into<String>) -> Self {
        DatabaseConfig {
            url: url.into(),
            echo: false,
            autocommit: false,
            autoflush: false,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    pub fn with_autoflush(mut self, autoflush: bool) -> Self {
        self.autoflush = autoflush;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn autoflush(&self) -> bool {
        self.autoflush
    }
}

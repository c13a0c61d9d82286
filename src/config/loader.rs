//! Load `DatabaseConfig` from an INI file, one section per database type.

use crate::config::types::{DatabaseConfig, DatabaseType};
use crate::error::ConfigError;
use ini::Ini;
use std::path::{Path, PathBuf};

/// Config file location relative to the working directory.
pub const CONFIG_FILE: &str = "data_base/config.ini";

const KNOWN_KEYS: &[&str] = &["url", "echo", "autocommit", "autoflush"];

/// `<cwd>/data_base/config.ini`.
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Read the section named after `database_type` from `config_path` (or the default path).
pub fn load_config(
    database_type: DatabaseType,
    config_path: Option<&Path>,
) -> Result<DatabaseConfig, ConfigError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let ini = Ini::load_from_file(&path)
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    config_from_ini(&ini, database_type, &path.display().to_string())
}

/// Same as [`load_config`] but from INI text already in memory.
pub fn load_config_str(database_type: DatabaseType, text: &str) -> Result<DatabaseConfig, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
    config_from_ini(&ini, database_type, "<memory>")
}

fn config_from_ini(ini: &Ini, database_type: DatabaseType, origin: &str) -> Result<DatabaseConfig, ConfigError> {
    let section = database_type.section();
    let props = ini
        .section(Some(section))
        .ok_or_else(|| ConfigError::SectionNotFound {
            section: section.to_string(),
            path: origin.to_string(),
        })?;

    let mut url = None;
    let mut echo = false;
    let mut autocommit = false;
    let mut autoflush = false;
    for (key, value) in props.iter() {
        let key = key.trim().to_ascii_lowercase();
        match key.as_str() {
            "url" => url = Some(value.trim().to_string()),
            "echo" => echo = parse_bool(&key, value)?,
            "autocommit" => autocommit = parse_bool(&key, value)?,
            "autoflush" => autoflush = parse_bool(&key, value)?,
            _ => tracing::warn!(section, key = %key, known = ?KNOWN_KEYS, "ignoring unknown config key"),
        }
    }
    let url = url.ok_or_else(|| ConfigError::MissingKey {
        section: section.to_string(),
        key: "url",
    })?;

    tracing::debug!(section, echo, autocommit, autoflush, "database config loaded");
    Ok(DatabaseConfig::new(url)
        .with_echo(echo)
        .with_autocommit(autocommit)
        .with_autoflush(autoflush))
}

/// Boolean-ish strings as accepted by INI tooling: 1/yes/true/on and 0/no/false/off.
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

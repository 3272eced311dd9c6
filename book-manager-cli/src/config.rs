//! Catalog database location.
//!
//! Priority: `BOOK_MANAGER_DB` env var > `[database] path` in the config file
//! > `<data_dir>/book-manager/catalog.db`.

use std::path::{Path, PathBuf};

use crate::CliError;

/// Environment variable overriding the database path.
pub(crate) const DB_ENV_VAR: &str = "BOOK_MANAGER_DB";

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct DatabaseConfig {
    path: Option<PathBuf>,
}

/// Return the path to the config file.
pub(crate) fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("book-manager").join("config.toml"))
}

/// Database path used when nothing else is configured.
pub(crate) fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("book-manager")
        .join("catalog.db")
}

/// Resolve the catalog database path.
pub(crate) fn resolve_db_path() -> Result<PathBuf, CliError> {
    if let Some(path) = std::env::var(DB_ENV_VAR).ok().filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let configured = match config_path() {
        Some(path) => load_config_file(&path)?.and_then(db_path_from),
        None => None,
    };
    Ok(configured.unwrap_or_else(default_db_path))
}

/// Read and parse a config file. A missing file is `Ok(None)`.
fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, CliError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let config = toml::from_str(&content)
        .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

fn db_path_from(config: ConfigFile) -> Option<PathBuf> {
    config.database.and_then(|db| db.path)
}

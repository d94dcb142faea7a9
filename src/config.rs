//! User configuration at `~/.bdcrm/config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::db::CrmDb;
use crate::error::{CrmError, CrmResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Database file; defaults to `~/.bdcrm/bdcrm.db`.
    #[serde(default)]
    pub db_path: Option<String>,
    /// Acting user for CLI commands.
    #[serde(default)]
    pub user_id: Option<String>,
    /// `env_logger` filter, e.g. "info" or "bdcrm_lib=debug".
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    pub fn resolved_db_path(&self) -> CrmResult<PathBuf> {
        match self.db_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Ok(expand_home(path)),
            _ => Ok(CrmDb::default_path()?),
        }
    }
}

/// Expand a leading `~/` using the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Get the canonical config file path (~/.bdcrm/config.json)
pub fn config_path() -> CrmResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CrmError::Config("Could not find home directory".to_string()))?;
    Ok(home.join(".bdcrm").join("config.json"))
}

/// Load configuration from ~/.bdcrm/config.json
pub fn load_config() -> CrmResult<Config> {
    load_config_from(config_path()?)
}

pub fn load_config_from(path: impl AsRef<Path>) -> CrmResult<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CrmError::Config(format!(
            "Config file not found at {}. Create it with: {{ \"userId\": \"<your user id>\" }}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CrmError::Config(format!("Failed to read config: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| CrmError::Config(format!("Failed to parse config: {}", e)))
}

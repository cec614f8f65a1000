//! Application configuration
//!
//! Defaults, optionally overridden by a JSON file and then by `CRACKALGO_*`
//! environment variables.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::services::executor::ExecutorConfig;
use crate::services::identity::IdentityConfig;
use crate::utils;

pub const ENV_DATA_DIR: &str = "CRACKALGO_DATA_DIR";
pub const ENV_IDENTITY_API_KEY: &str = "CRACKALGO_IDENTITY_API_KEY";
pub const ENV_LOG: &str = "CRACKALGO_LOG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    pub log_level: String,
    pub executor: ExecutorConfig,
    pub identity: IdentityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "crackalgo.db".to_string(),
            log_level: "info".to_string(),
            executor: ExecutorConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `path` if given (a missing file is an error) and applies the
    /// environment overrides
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = lookup(ENV_IDENTITY_API_KEY).filter(|v| !v.is_empty()) {
            self.identity.api_key = Some(key);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }

    pub fn database_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.join(&self.database_file),
            None => utils::get_database_path(&self.database_file),
        }
    }

    /// Unknown levels fall back to `info`
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

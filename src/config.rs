//! Store configuration loaded from a JSON file.
//!
//! Credentials never appear literally in the file; each one names a file to
//! read or an environment variable to look up:
//!
//! ```json
//! {
//!   "backend": "supabase",
//!   "url": "https://project.supabase.co",
//!   "api_key": { "file": "/run/secrets/supabase_key" },
//!   "max_concurrent_uploads": 3
//! }
//! ```

use crate::errors::ConfigError;
use crate::storage::S3Provider;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 3;

fn default_max_concurrent_uploads() -> usize {
    DEFAULT_MAX_CONCURRENT_UPLOADS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    File(PathBuf),
    Env(String),
}

impl SecretSource {
    pub fn resolve(&self) -> Result<String, ConfigError> {
        match self {
            SecretSource::File(path) => read_value_from_file(path),
            SecretSource::Env(name) => std::env::var(name)
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::MissingEnv(name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    Supabase {
        url: String,
        api_key: SecretSource,
    },
    S3 {
        provider: S3Provider,
        access_key_id: SecretSource,
        secret_access_key: SecretSource,
        #[serde(default)]
        public_base_url: Option<String>,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub backend: BackendConfig,
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,
    /// Directory `local://` locators and relative paths resolve under.
    #[serde(default)]
    pub source_root: Option<PathBuf>,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            backend: BackendConfig::Memory,
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            source_root: None,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = serde_json::from_str(raw)?;
        if config.max_concurrent_uploads == 0 {
            return Err(ConfigError::MissingField(
                "max_concurrent_uploads must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

/// Read a secret from a file, trimming whitespace and newlines.
pub fn read_value_from_file(file_path: &Path) -> Result<String, ConfigError> {
    let value = fs::read_to_string(file_path).map_err(|source| ConfigError::Io {
        path: file_path.display().to_string(),
        source,
    })?;
    Ok(value.trim().to_string())
}

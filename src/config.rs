use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use crate::Result;

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite file; created on first open.
    #[serde(rename = "Path")]
    pub path: PathBuf,
    #[serde(rename = "connection_max")]
    pub conn_max: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Root directory that attachment files are resolved against.
    #[serde(rename = "Root")]
    pub root: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(rename = "Logfile")]
    pub logfile: Option<String>,
    #[serde(rename = "Loglevel")]
    pub loglevel: Option<String>,
    #[serde(rename = "LocalizedAttachmentType")]
    pub localized_attachment_type: Option<String>,
    #[serde(rename = "Database")]
    pub db: DatabaseConfig,
    #[serde(rename = "Storage")]
    pub storage: StorageConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn loglevel(&self) -> &str {
        self.loglevel.as_deref().unwrap_or("info")
    }

    pub fn conn_max(&self) -> u32 {
        self.db.conn_max.unwrap_or(4).max(1)
    }

    pub fn localized_attachment_type(&self) -> &str {
        self.localized_attachment_type.as_deref().unwrap_or("Attachment")
    }
}

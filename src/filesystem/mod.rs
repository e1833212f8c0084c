use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::Result;
use crate::zotero::LibraryIdentifier;

pub mod local;

pub use local::LocalFileStore;

/// Resolves and inspects the on-disk files backing attachment items.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug {
    fn attachment_file(&self, library_id: &LibraryIdentifier, key: &str, filename: &str) -> PathBuf;
    async fn file_exists(&self, path: &Path) -> Result<bool>;
    async fn file_read(&self, path: &Path) -> Result<Vec<u8>>;
    async fn file_stat(&self, path: &Path) -> Result<FileInfo>;

    async fn file_md5(&self, path: &Path) -> Result<String> {
        let data = self.file_read(path).await?;
        Ok(format!("{:x}", md5::compute(&data)))
    }
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: chrono::DateTime<chrono::Utc>,
    pub is_dir: bool,
}

impl std::fmt::Display for FileInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} bytes, modified: {})", self.name, self.size, self.modified)
    }
}

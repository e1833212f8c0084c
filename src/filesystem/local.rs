use async_trait::async_trait;
use std::path::{Path, PathBuf};
use crate::Result;
use crate::zotero::LibraryIdentifier;
use super::{FileInfo, FileStore};

/// Attachment files laid out as `<root>/<library>/<key>/<filename>`.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn library_dir(library_id: &LibraryIdentifier) -> String {
        match library_id {
            LibraryIdentifier::Custom(_) => "user".to_string(),
            LibraryIdentifier::Group(id) => format!("group_{}", id),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn attachment_file(&self, library_id: &LibraryIdentifier, key: &str, filename: &str) -> PathBuf {
        self.root
            .join(Self::library_dir(library_id))
            .join(key)
            .join(filename)
    }

    async fn file_exists(&self, path: &Path) -> Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn file_read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }

    async fn file_stat(&self, path: &Path) -> Result<FileInfo> {
        let meta = tokio::fs::metadata(path).await?;
        let modified = meta
            .modified()
            .map(chrono::DateTime::<chrono::Utc>::from)
            .unwrap_or_default();

        Ok(FileInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: meta.len(),
            modified,
            is_dir: meta.is_dir(),
        })
    }
}

impl std::fmt::Display for LocalFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalFileStore(root: {})", self.root.display())
    }
}

#![allow(dead_code)]

use std::path::Path;
use zotero_localdb::zotero::{
    Attachment, AttachmentKind, ConditionResponse, CustomLibraryType, LibraryIdentifier,
    LibraryResponse, LinkMode, SearchDataResponse, SearchResponse,
};
use zotero_localdb::filesystem::{FileStore, LocalFileStore};
use zotero_localdb::Database;

pub async fn make_db() -> Database {
    Database::in_memory().await.unwrap()
}

pub fn my_library() -> LibraryIdentifier {
    LibraryIdentifier::Custom(CustomLibraryType::MyLibrary)
}

pub fn file_attachment(key: &str, title: &str, library_id: LibraryIdentifier, filename: &str) -> Attachment {
    Attachment {
        key: key.to_string(),
        title: title.to_string(),
        library_id,
        kind: AttachmentKind::File {
            filename: filename.to_string(),
            content_type: "application/pdf".to_string(),
            link_mode: LinkMode::ImportedFile,
        },
    }
}

pub fn url_attachment(key: &str, title: &str, library_id: LibraryIdentifier, url: &str) -> Attachment {
    Attachment {
        key: key.to_string(),
        title: title.to_string(),
        library_id,
        kind: AttachmentKind::Url { url: url.to_string() },
    }
}

/// Writes the backing file for a file attachment under the store root.
pub async fn write_attachment_file(store: &LocalFileStore, attachment: &Attachment, contents: &[u8]) {
    if let AttachmentKind::File { filename, .. } = &attachment.kind {
        let path = store.attachment_file(&attachment.library_id, &attachment.key, filename);
        let parent: &Path = path.parent().unwrap();
        tokio::fs::create_dir_all(parent).await.unwrap();
        tokio::fs::write(&path, contents).await.unwrap();
    }
}

pub fn condition(condition: &str, operator: &str, value: &str) -> ConditionResponse {
    ConditionResponse {
        condition: condition.to_string(),
        operator: operator.to_string(),
        value: value.to_string(),
    }
}

pub fn search_response(
    key: &str,
    library_type: &str,
    library_id: i64,
    name: &str,
    version: i64,
    conditions: Vec<ConditionResponse>,
) -> SearchResponse {
    SearchResponse {
        key: key.to_string(),
        version,
        library: LibraryResponse {
            library_type: library_type.to_string(),
            id: library_id,
            name: String::new(),
            links: None,
        },
        links: None,
        data: SearchDataResponse {
            key: Some(key.to_string()),
            version: Some(version),
            name: name.to_string(),
            conditions,
            is_trash: false,
        },
    }
}

use serde::{Deserialize, Serialize};
use super::LibraryIdentifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    ImportedFile,
    ImportedUrl,
    LinkedFile,
    LinkedUrl,
    EmbeddedImage,
}

impl LinkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMode::ImportedFile => "imported_file",
            LinkMode::ImportedUrl => "imported_url",
            LinkMode::LinkedFile => "linked_file",
            LinkMode::LinkedUrl => "linked_url",
            LinkMode::EmbeddedImage => "embedded_image",
        }
    }

    /// Imported files live in Zotero storage and have to be uploaded.
    pub fn is_imported(&self) -> bool {
        matches!(
            self,
            LinkMode::ImportedFile | LinkMode::ImportedUrl | LinkMode::EmbeddedImage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AttachmentKind {
    File {
        filename: String,
        #[serde(rename = "contentType")]
        content_type: String,
        #[serde(rename = "linkMode")]
        link_mode: LinkMode,
    },
    Url {
        url: String,
    },
}

/// A file or link to attach, as described by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub key: String,
    pub title: String,
    #[serde(rename = "libraryId")]
    pub library_id: LibraryIdentifier,
    #[serde(flatten)]
    pub kind: AttachmentKind,
}

impl Attachment {
    pub fn link_mode(&self) -> LinkMode {
        match &self.kind {
            AttachmentKind::File { link_mode, .. } => *link_mode,
            AttachmentKind::Url { .. } => LinkMode::LinkedUrl,
        }
    }
}

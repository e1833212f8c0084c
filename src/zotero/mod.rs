use regex::Regex;
use lazy_static::lazy_static;
use crate::{Error, Result};

pub mod attachment;
pub mod collection;
pub mod item;
pub mod library;
pub mod search;
pub mod sync;
pub mod types;

pub use attachment::{Attachment, AttachmentKind, LinkMode};
pub use collection::Collection;
pub use item::{Item, ItemChanges};
pub use library::{CustomLibraryType, LibraryIdentifier};
pub use search::{Condition, Search, SearchChanges};
pub use sync::{ChangeOwner, ObjectChange, ObjectSyncState, UpdatableChangeType};
pub use types::*;

/// Characters the Zotero API uses for object keys.
pub const KEY_ALPHABET: &str = "23456789ABCDEFGHIJKLMNPQRSTUVWXYZ";
pub const KEY_LENGTH: usize = 8;

lazy_static! {
    static ref KEY_REGEX: Regex =
        Regex::new(&format!("^[{}]{{{}}}$", KEY_ALPHABET, KEY_LENGTH)).unwrap();
}

pub fn is_valid_key(key: &str) -> bool {
    KEY_REGEX.is_match(key)
}

pub fn validate_key(key: &str) -> Result<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

pub mod config;
pub mod db;
pub mod error;
pub mod filesystem;
pub mod zotero;

pub use db::{Database, DbRequest, DbResponseRequest};
pub use error::{Error, Result};

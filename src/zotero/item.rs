use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};
use sqlx::sqlite::SqliteRow;
use crate::{Error, Result};
use super::{LibraryIdentifier, ObjectSyncState, UpdatableChangeType};

pub const ITEM_TYPE_ATTACHMENT: &str = "attachment";

pub mod field_keys {
    pub const TITLE: &str = "title";
    pub const LINK_MODE: &str = "linkMode";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const FILENAME: &str = "filename";
    pub const MD5: &str = "md5";
    pub const MTIME: &str = "mtime";
    pub const URL: &str = "url";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemChanges {
    Type,
    Trash,
    Parent,
    Fields,
    Collections,
    Tags,
}

impl AsRef<str> for ItemChanges {
    fn as_ref(&self) -> &str {
        match self {
            ItemChanges::Type => "type",
            ItemChanges::Trash => "trash",
            ItemChanges::Parent => "parent",
            ItemChanges::Fields => "fields",
            ItemChanges::Collections => "collections",
            ItemChanges::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub key: String,
    pub library_id: LibraryIdentifier,
    pub raw_type: String,
    pub localized_type: String,
    pub display_title: String,
    pub version: i64,
    pub parent_id: Option<i64>,
    pub sync_state: ObjectSyncState,
    pub change_type: UpdatableChangeType,
    pub trash: bool,
    pub deleted: bool,
    pub attachment_needs_sync: bool,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

const ITEM_COLUMNS: &str = "id, key, library_type, library_id, raw_type, localized_type, display_title, \
    version, parent_id, sync_state, change_type, trash, deleted, attachment_needs_sync, date_added, date_modified";

impl Item {
    /// A fresh, not yet persisted item created by the local user.
    pub fn new(key: &str, library_id: LibraryIdentifier, raw_type: &str, localized_type: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            key: key.to_string(),
            library_id,
            raw_type: raw_type.to_string(),
            localized_type: localized_type.to_string(),
            display_title: String::new(),
            version: 0,
            parent_id: None,
            sync_state: ObjectSyncState::Synced,
            change_type: UpdatableChangeType::User,
            trash: false,
            deleted: false,
            attachment_needs_sync: false,
            date_added: now,
            date_modified: now,
        }
    }

    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            library_id: LibraryIdentifier::from_row(row)?,
            raw_type: row.try_get("raw_type")?,
            localized_type: row.try_get("localized_type")?,
            display_title: row.try_get("display_title")?,
            version: row.try_get("version")?,
            parent_id: row.try_get("parent_id")?,
            sync_state: row.try_get("sync_state")?,
            change_type: row.try_get("change_type")?,
            trash: row.try_get("trash")?,
            deleted: row.try_get("deleted")?,
            attachment_needs_sync: row.try_get("attachment_needs_sync")?,
            date_added: row.try_get("date_added")?,
            date_modified: row.try_get("date_modified")?,
        })
    }

    pub fn is_attachment(&self) -> bool {
        self.raw_type == ITEM_TYPE_ATTACHMENT
    }

    pub async fn find(conn: &mut SqliteConnection, key: &str, library_id: &LibraryIdentifier) -> Result<Option<Self>> {
        let query = format!(
            "SELECT {} FROM items WHERE key = ?1 AND library_type = ?2 AND library_id = ?3",
            ITEM_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(key)
            .bind(library_id.library_type())
            .bind(library_id.id())
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    pub async fn count(conn: &mut SqliteConnection, library_id: &LibraryIdentifier) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE library_type = ?1 AND library_id = ?2",
        )
        .bind(library_id.library_type())
        .bind(library_id.id())
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }

    /// Inserts the item and stores the new row id on `self`.
    pub async fn insert(&mut self, conn: &mut SqliteConnection) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO items (
                key, library_type, library_id, raw_type, localized_type, display_title, version,
                parent_id, sync_state, change_type, trash, deleted, attachment_needs_sync,
                date_added, date_modified
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&self.key)
        .bind(self.library_id.library_type())
        .bind(self.library_id.id())
        .bind(&self.raw_type)
        .bind(&self.localized_type)
        .bind(&self.display_title)
        .bind(self.version)
        .bind(self.parent_id)
        .bind(self.sync_state)
        .bind(self.change_type)
        .bind(self.trash)
        .bind(self.deleted)
        .bind(self.attachment_needs_sync)
        .bind(self.date_added)
        .bind(self.date_modified)
        .execute(&mut *conn)
        .await
        .map_err(Error::from_sqlx_error)?;

        self.id = result.last_insert_rowid();
        Ok(self.id)
    }

    pub async fn set_parent(&mut self, conn: &mut SqliteConnection, parent: &Item) -> Result<()> {
        if parent.library_id != self.library_id {
            return Err(Error::Validation(format!(
                "parent {} belongs to {}, attachment {} to {}",
                parent.key, parent.library_id, self.key, self.library_id
            )));
        }

        sqlx::query("UPDATE items SET parent_id = ?1 WHERE id = ?2")
            .bind(parent.id)
            .bind(self.id)
            .execute(&mut *conn)
            .await?;

        self.parent_id = Some(parent.id);
        Ok(())
    }

    pub async fn set_field(conn: &mut SqliteConnection, item_id: i64, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO item_fields (item_id, key, value) VALUES (?1, ?2, ?3)
            ON CONFLICT (item_id, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(item_id)
        .bind(key)
        .bind(value)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn fields(conn: &mut SqliteConnection, item_id: i64) -> Result<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM item_fields WHERE item_id = ?1")
                .bind(item_id)
                .fetch_all(&mut *conn)
                .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn collection_keys(conn: &mut SqliteConnection, item_id: i64) -> Result<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.key FROM collections c
            JOIN collection_items ci ON ci.collection_id = c.id
            WHERE ci.item_id = ?1
            ORDER BY c.key
            "#,
        )
        .bind(item_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(keys)
    }

    pub async fn children(conn: &mut SqliteConnection, parent_id: i64) -> Result<Vec<Self>> {
        let query = format!("SELECT {} FROM items WHERE parent_id = ?1 ORDER BY id", ITEM_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(Self::from_row).collect()
    }
}

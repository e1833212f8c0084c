use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};
use sqlx::sqlite::SqliteRow;
use crate::{Error, Result};
use super::LibraryIdentifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub key: String,
    pub library_id: LibraryIdentifier,
    pub name: String,
    pub version: i64,
}

impl Collection {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            library_id: LibraryIdentifier::from_row(row)?,
            name: row.try_get("name")?,
            version: row.try_get("version")?,
        })
    }

    pub async fn find(conn: &mut SqliteConnection, key: &str, library_id: &LibraryIdentifier) -> Result<Option<Self>> {
        let row = sqlx::query(
            "SELECT id, key, library_type, library_id, name, version FROM collections \
             WHERE key = ?1 AND library_type = ?2 AND library_id = ?3",
        )
        .bind(key)
        .bind(library_id.library_type())
        .bind(library_id.id())
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// Existing collections among `keys`, in key order. Unknown keys are skipped.
    pub async fn find_all<'a, I>(conn: &mut SqliteConnection, keys: I, library_id: &LibraryIdentifier) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut keys: Vec<&String> = keys.into_iter().collect();
        keys.sort();

        let mut found = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(collection) = Self::find(&mut *conn, key, library_id).await? {
                found.push(collection);
            }
        }
        Ok(found)
    }

    pub async fn insert(conn: &mut SqliteConnection, key: &str, name: &str, library_id: &LibraryIdentifier) -> Result<Self> {
        let result = sqlx::query(
            "INSERT INTO collections (key, library_type, library_id, name, version) VALUES (?1, ?2, ?3, ?4, 0)",
        )
        .bind(key)
        .bind(library_id.library_type())
        .bind(library_id.id())
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(Error::from_sqlx_error)?;

        Ok(Self {
            id: result.last_insert_rowid(),
            key: key.to_string(),
            library_id: *library_id,
            name: name.to_string(),
            version: 0,
        })
    }

    pub async fn add_item(&self, conn: &mut SqliteConnection, item_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO collection_items (collection_id, item_id) VALUES (?1, ?2)")
            .bind(self.id)
            .bind(item_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

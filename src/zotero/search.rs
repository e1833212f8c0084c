use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};
use sqlx::sqlite::SqliteRow;
use crate::{Error, Result};
use super::{LibraryIdentifier, ObjectSyncState, UpdatableChangeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchChanges {
    Name,
    Conditions,
    Trash,
}

impl AsRef<str> for SearchChanges {
    fn as_ref(&self) -> &str {
        match self {
            SearchChanges::Name => "name",
            SearchChanges::Conditions => "conditions",
            SearchChanges::Trash => "trash",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub condition: String,
    pub operator: String,
    pub value: String,
    pub sort_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Search {
    pub id: i64,
    pub key: String,
    pub library_id: LibraryIdentifier,
    pub name: String,
    pub version: i64,
    pub sync_state: ObjectSyncState,
    pub sync_retries: i64,
    pub last_sync_date: Option<DateTime<Utc>>,
    pub change_type: UpdatableChangeType,
    pub trash: bool,
    pub deleted: bool,
    /// Ordered by `sort_id`.
    pub conditions: Vec<Condition>,
}

impl Search {
    fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            library_id: LibraryIdentifier::from_row(row)?,
            name: row.try_get("name")?,
            version: row.try_get("version")?,
            sync_state: row.try_get("sync_state")?,
            sync_retries: row.try_get("sync_retries")?,
            last_sync_date: row.try_get("last_sync_date")?,
            change_type: row.try_get("change_type")?,
            trash: row.try_get("trash")?,
            deleted: row.try_get("deleted")?,
            conditions: Vec::new(),
        })
    }

    pub async fn find_id(conn: &mut SqliteConnection, key: &str, library_id: &LibraryIdentifier) -> Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM searches WHERE key = ?1 AND library_type = ?2 AND library_id = ?3",
        )
        .bind(key)
        .bind(library_id.library_type())
        .bind(library_id.id())
        .fetch_optional(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Loads the search together with its conditions.
    pub async fn find(conn: &mut SqliteConnection, key: &str, library_id: &LibraryIdentifier) -> Result<Option<Self>> {
        let row = sqlx::query(
            r#"
            SELECT id, key, library_type, library_id, name, version, sync_state, sync_retries,
                   last_sync_date, change_type, trash, deleted
            FROM searches
            WHERE key = ?1 AND library_type = ?2 AND library_id = ?3
            "#,
        )
        .bind(key)
        .bind(library_id.library_type())
        .bind(library_id.id())
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut search = Self::from_row(&row)?;
        search.conditions = Self::conditions(&mut *conn, search.id).await?;
        Ok(Some(search))
    }

    /// Allocates an empty record for `key`; callers fill in the fields.
    pub async fn create(conn: &mut SqliteConnection, key: &str, library_id: &LibraryIdentifier) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO searches (key, library_type, library_id) VALUES (?1, ?2, ?3)",
        )
        .bind(key)
        .bind(library_id.library_type())
        .bind(library_id.id())
        .execute(&mut *conn)
        .await
        .map_err(Error::from_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    pub async fn conditions(conn: &mut SqliteConnection, search_id: i64) -> Result<Vec<Condition>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT condition, operator, value, sort_id FROM conditions WHERE search_id = ?1 ORDER BY sort_id",
        )
        .bind(search_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(condition, operator, value, sort_id)| Condition {
                condition,
                operator,
                value,
                sort_id,
            })
            .collect())
    }

    pub async fn delete_conditions(conn: &mut SqliteConnection, search_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM conditions WHERE search_id = ?1")
            .bind(search_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn insert_condition(conn: &mut SqliteConnection, search_id: i64, condition: &Condition) -> Result<()> {
        sqlx::query(
            "INSERT INTO conditions (search_id, condition, operator, value, sort_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(search_id)
        .bind(&condition.condition)
        .bind(&condition.operator)
        .bind(&condition.value)
        .bind(condition.sort_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

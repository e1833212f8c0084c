use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ObjectSyncState {
    Synced,
    Dirty,
    Outdated,
}

impl Default for ObjectSyncState {
    fn default() -> Self {
        ObjectSyncState::Synced
    }
}

/// Who made the last change to an object: the sync engine or the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UpdatableChangeType {
    Sync,
    User,
}

impl Default for UpdatableChangeType {
    fn default() -> Self {
        UpdatableChangeType::Sync
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum ChangeOwner {
    Item,
    Search,
}

/// A pending local modification of an object, listing the changed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectChange {
    pub identifier: Uuid,
    pub fields: Vec<String>,
}

impl ObjectChange {
    pub fn create<C: AsRef<str>>(changes: &[C]) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            fields: changes.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    pub fn contains(&self, field: impl AsRef<str>) -> bool {
        self.fields.iter().any(|f| f == field.as_ref())
    }

    pub async fn insert(&self, conn: &mut SqliteConnection, owner: ChangeOwner, object_id: i64) -> Result<()> {
        let fields = serde_json::to_string(&self.fields)?;

        sqlx::query(
            "INSERT INTO object_changes (identifier, object_type, object_id, fields) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(self.identifier)
        .bind(owner)
        .bind(object_id)
        .bind(&fields)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn load_all(conn: &mut SqliteConnection, owner: ChangeOwner, object_id: i64) -> Result<Vec<Self>> {
        let rows = sqlx::query(
            "SELECT identifier, fields FROM object_changes WHERE object_type = ?1 AND object_id = ?2 ORDER BY id",
        )
        .bind(owner)
        .bind(object_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter()
            .map(|row| -> Result<Self> {
                let fields: String = row.try_get("fields")?;
                Ok(Self {
                    identifier: row.try_get("identifier")?,
                    fields: serde_json::from_str(&fields)?,
                })
            })
            .collect()
    }

    pub async fn delete_all(conn: &mut SqliteConnection, owner: ChangeOwner, object_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM object_changes WHERE object_type = ?1 AND object_id = ?2")
            .bind(owner)
            .bind(object_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}

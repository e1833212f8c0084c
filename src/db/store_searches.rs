use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, error};
use crate::{Error, Result};
use crate::zotero::{
    ChangeOwner, Condition, ConditionResponse, LibraryIdentifier, ObjectChange, ObjectSyncState,
    Search, SearchResponse, UpdatableChangeType,
};
use super::{Database, DbRequest};

/// Upserts remote saved searches, one transaction per search.
///
/// A payload without a usable library aborts the request with
/// [`Error::PrimaryKeyUnavailable`]; searches stored before it stay committed
/// and the ones after it are not processed.
#[derive(Debug, Clone)]
pub struct StoreSearchesDbRequest {
    pub response: Vec<SearchResponse>,
}

impl StoreSearchesDbRequest {
    pub fn new(response: Vec<SearchResponse>) -> Self {
        Self { response }
    }

    async fn store(&self, database: &Database, data: &SearchResponse) -> Result<()> {
        let mut tx = database.begin().await?;

        let library_id = data.library.library_id().ok_or(Error::PrimaryKeyUnavailable)?;

        let search_id = match Search::find_id(&mut tx, &data.key, &library_id).await? {
            Some(id) => id,
            None => {
                debug!("Creating search {} in {}", data.key, library_id);
                Search::create(&mut tx, &data.key, &library_id).await?
            }
        };

        ObjectChange::delete_all(&mut tx, ChangeOwner::Search, search_id).await?;
        update(&mut tx, search_id, data, &library_id).await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DbRequest for StoreSearchesDbRequest {
    async fn process(&self, database: &Database) -> Result<()> {
        for data in &self.response {
            if let Err(e) = self.store(database, data).await {
                error!("StoreSearchesDbRequest: could not store search {} - {}", data.key, e);
                return Err(e);
            }
        }
        debug!("Stored {} searches", self.response.len());
        Ok(())
    }
}

/// Overwrites every synced field of the search with the remote values.
pub async fn update(
    conn: &mut SqliteConnection,
    search_id: i64,
    response: &SearchResponse,
    library_id: &LibraryIdentifier,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE searches SET
            key = ?1,
            name = ?2,
            version = ?3,
            sync_state = ?4,
            sync_retries = 0,
            last_sync_date = ?5,
            change_type = ?6,
            library_type = ?7,
            library_id = ?8,
            trash = ?9,
            deleted = 0
        WHERE id = ?10
        "#,
    )
    .bind(&response.key)
    .bind(&response.data.name)
    .bind(response.version)
    .bind(ObjectSyncState::Synced)
    .bind(Utc::now())
    .bind(UpdatableChangeType::Sync)
    .bind(library_id.library_type())
    .bind(library_id.id())
    .bind(response.data.is_trash)
    .bind(search_id)
    .execute(&mut *conn)
    .await?;

    sync_conditions(conn, search_id, &response.data.conditions).await
}

/// Replaces the stored conditions, keeping the payload order in `sort_id`.
pub async fn sync_conditions(
    conn: &mut SqliteConnection,
    search_id: i64,
    conditions: &[ConditionResponse],
) -> Result<()> {
    Search::delete_conditions(&mut *conn, search_id).await?;

    for (index, response) in conditions.iter().enumerate() {
        let condition = Condition {
            condition: response.condition.clone(),
            operator: response.operator.clone(),
            value: response.value.clone(),
            sort_id: index as i64,
        };
        Search::insert_condition(&mut *conn, search_id, &condition).await?;
    }

    Ok(())
}

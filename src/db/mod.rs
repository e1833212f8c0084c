//! Local database handle and the request types that mutate it.
//!
//! Every request owns its transaction boundaries: `Database` only hands out
//! connections and transactions, so a bulk request can commit each object on
//! its own.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use crate::Result;
use crate::zotero::{
    ChangeOwner, Collection, Item, LibraryIdentifier, ObjectChange, Search, SearchChanges,
};

pub mod create_attachments;
pub mod store_searches;

pub use create_attachments::{CreateAttachmentDbRequest, CreateAttachmentsDbRequest};
pub use store_searches::StoreSearchesDbRequest;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// A database request that produces a value.
#[async_trait]
pub trait DbResponseRequest: Send + Sync {
    type Response: Send;

    async fn process(&self, database: &Database) -> Result<Self::Response>;
}

/// A database request run for its side effects only.
#[async_trait]
pub trait DbRequest: Send + Sync {
    async fn process(&self, database: &Database) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to a SQLite URL. In-memory URLs get the same single-connection
    /// pool as [`Database::in_memory`], since every new connection would see
    /// its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if database_url.contains(":memory:") || database_url.contains("mode=memory") {
            return Self::in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let database = Self { pool };
        database.init().await?;
        Ok(database)
    }

    pub async fn open(path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        let database = Self { pool };
        database.init().await?;
        Ok(database)
    }

    /// Private in-memory database on a single connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;
        let database = Self { pool };
        database.init().await?;
        Ok(database)
    }

    pub async fn init(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn perform<R: DbResponseRequest>(&self, request: &R) -> Result<R::Response> {
        debug!("Performing {}", std::any::type_name::<R>());
        request.process(self).await
    }

    pub async fn perform_write<R: DbRequest>(&self, request: &R) -> Result<()> {
        debug!("Performing {}", std::any::type_name::<R>());
        request.process(self).await
    }

    pub async fn find_item(&self, key: &str, library_id: &LibraryIdentifier) -> Result<Option<Item>> {
        let mut conn = self.pool.acquire().await?;
        Item::find(&mut conn, key, library_id).await
    }

    pub async fn count_items(&self, library_id: &LibraryIdentifier) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Item::count(&mut conn, library_id).await
    }

    pub async fn child_items(&self, parent_id: i64) -> Result<Vec<Item>> {
        let mut conn = self.pool.acquire().await?;
        Item::children(&mut conn, parent_id).await
    }

    pub async fn item_fields(&self, item_id: i64) -> Result<BTreeMap<String, String>> {
        let mut conn = self.pool.acquire().await?;
        Item::fields(&mut conn, item_id).await
    }

    pub async fn item_collections(&self, item_id: i64) -> Result<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        Item::collection_keys(&mut conn, item_id).await
    }

    pub async fn item_changes(&self, item_id: i64) -> Result<Vec<ObjectChange>> {
        let mut conn = self.pool.acquire().await?;
        ObjectChange::load_all(&mut conn, ChangeOwner::Item, item_id).await
    }

    /// Persists a plain item, e.g. a parent that attachments are created under.
    pub async fn create_item(&self, item: &mut Item) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        item.insert(&mut conn).await?;
        Ok(())
    }

    pub async fn create_collection(&self, key: &str, name: &str, library_id: &LibraryIdentifier) -> Result<Collection> {
        let mut conn = self.pool.acquire().await?;
        Collection::insert(&mut conn, key, name, library_id).await
    }

    pub async fn find_search(&self, key: &str, library_id: &LibraryIdentifier) -> Result<Option<Search>> {
        let mut conn = self.pool.acquire().await?;
        Search::find(&mut conn, key, library_id).await
    }

    pub async fn search_changes(&self, search_id: i64) -> Result<Vec<ObjectChange>> {
        let mut conn = self.pool.acquire().await?;
        ObjectChange::load_all(&mut conn, ChangeOwner::Search, search_id).await
    }

    /// Records a local edit on a search so the next upload picks it up.
    pub async fn mark_search_changed(&self, search_id: i64, changes: &[SearchChanges]) -> Result<()> {
        let mut tx = self.begin().await?;

        sqlx::query("UPDATE searches SET change_type = 'user', sync_state = 'dirty' WHERE id = ?1")
            .bind(search_id)
            .execute(&mut *tx)
            .await?;
        ObjectChange::create(changes)
            .insert(&mut tx, ChangeOwner::Search, search_id)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zotero::{CustomLibraryType, ObjectSyncState, UpdatableChangeType};
    use std::path::PathBuf;

    fn my_library() -> LibraryIdentifier {
        LibraryIdentifier::Custom(CustomLibraryType::MyLibrary)
    }

    #[tokio::test]
    async fn create_and_find_item() {
        let db = Database::in_memory().await.unwrap();
        let mut item = Item::new("AAAA2222", my_library(), "book", "Book");
        item.display_title = "Systems Programming".to_string();

        db.create_item(&mut item).await.unwrap();
        let found = db.find_item("AAAA2222", &my_library()).await.unwrap().unwrap();

        assert_eq!(found.id, item.id);
        assert_eq!(found.display_title, "Systems Programming");
        assert_eq!(found.change_type, UpdatableChangeType::User);
        assert_eq!(found.sync_state, ObjectSyncState::Synced);
        assert!(db.find_item("AAAA2222", &LibraryIdentifier::Group(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_item_key_is_a_unique_violation() {
        let db = Database::in_memory().await.unwrap();
        let mut first = Item::new("AAAA2222", my_library(), "book", "Book");
        let mut second = Item::new("AAAA2222", my_library(), "book", "Book");

        db.create_item(&mut first).await.unwrap();
        let err = db.create_item(&mut second).await.unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn mark_search_changed_records_change() {
        let db = Database::in_memory().await.unwrap();
        let search_id = {
            let mut conn = db.pool().acquire().await.unwrap();
            Search::create(&mut conn, "SRCH2222", &my_library()).await.unwrap()
        };

        db.mark_search_changed(search_id, &[SearchChanges::Name]).await.unwrap();

        let changes = db.search_changes(search_id).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].contains(SearchChanges::Name));
        let search = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
        assert_eq!(search.sync_state, ObjectSyncState::Dirty);
        assert_eq!(search.change_type, UpdatableChangeType::User);
    }

    #[tokio::test]
    async fn open_creates_file_and_persists_items() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("nested").join("library").join("zotero.sqlite");

        let db = Database::open(&path, 2).await.unwrap();
        assert!(path.is_file());
        let mut item = Item::new("AAAA2222", my_library(), "book", "Book");
        db.create_item(&mut item).await.unwrap();
        db.pool().close().await;

        let reopened = Database::open(&path, 2).await.unwrap();
        let found = reopened.find_item("AAAA2222", &my_library()).await.unwrap().unwrap();
        assert_eq!(found.id, item.id);
    }

    #[tokio::test]
    async fn connect_to_file_url_and_memory_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connect.sqlite");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url).await.unwrap();
        assert!(path.is_file());
        let mut item = Item::new("BBBB2222", my_library(), "book", "Book");
        db.create_item(&mut item).await.unwrap();
        db.pool().close().await;
        let reopened = Database::connect(&url).await.unwrap();
        assert!(reopened.find_item("BBBB2222", &my_library()).await.unwrap().is_some());

        // every query must see the migrated schema
        let memory = Database::connect("sqlite::memory:").await.unwrap();
        let mut item = Item::new("CCCC2222", my_library(), "book", "Book");
        memory.create_item(&mut item).await.unwrap();
        assert_eq!(memory.count_items(&my_library()).await.unwrap(), 1);
    }
}

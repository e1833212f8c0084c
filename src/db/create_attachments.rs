use std::collections::HashSet;
use std::sync::Arc;
use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::{debug, error, info, warn};
use url::Url;
use crate::{Error, Result};
use crate::filesystem::FileStore;
use crate::zotero::item::{field_keys, ITEM_TYPE_ATTACHMENT};
use crate::zotero::{
    validate_key, Attachment, AttachmentKind, ChangeOwner, Collection, Item, ItemChanges,
    ObjectChange,
};
use super::{Database, DbResponseRequest};

/// Creates a single attachment item. Used on its own it opens a transaction;
/// bulk callers run it inside theirs through [`CreateAttachmentDbRequest::create_in`].
#[derive(Debug)]
pub struct CreateAttachmentDbRequest<'a> {
    pub attachment: &'a Attachment,
    pub parent_key: Option<&'a str>,
    pub localized_type: &'a str,
    pub collections: &'a HashSet<String>,
    pub file_store: &'a dyn FileStore,
}

impl<'a> CreateAttachmentDbRequest<'a> {
    pub async fn create_in(&self, conn: &mut SqliteConnection) -> Result<Item> {
        let attachment = self.attachment;
        validate_key(&attachment.key)?;

        let mut item = Item::new(
            &attachment.key,
            attachment.library_id,
            ITEM_TYPE_ATTACHMENT,
            self.localized_type,
        );
        item.display_title = attachment.title.clone();

        let link_mode = attachment.link_mode();
        let mut fields: Vec<(&str, String)> = vec![
            (field_keys::TITLE, attachment.title.clone()),
            (field_keys::LINK_MODE, link_mode.as_str().to_string()),
        ];

        match &attachment.kind {
            AttachmentKind::File { filename, content_type, .. } => {
                let path = self.file_store.attachment_file(&attachment.library_id, &attachment.key, filename);
                if !self.file_store.file_exists(&path).await? {
                    return Err(Error::ObjectNotFound(path.display().to_string()));
                }
                let info = self.file_store.file_stat(&path).await?;
                let md5 = self.file_store.file_md5(&path).await?;

                fields.push((field_keys::CONTENT_TYPE, content_type.clone()));
                fields.push((field_keys::FILENAME, filename.clone()));
                fields.push((field_keys::MD5, md5));
                fields.push((field_keys::MTIME, info.modified.timestamp_millis().to_string()));
                item.attachment_needs_sync = link_mode.is_imported();
            }
            AttachmentKind::Url { url } => {
                let url = Url::parse(url)?;
                fields.push((field_keys::URL, url.to_string()));
            }
        }

        item.insert(&mut *conn).await?;
        for (key, value) in &fields {
            Item::set_field(&mut *conn, item.id, key, value).await?;
        }

        let mut changes = vec![ItemChanges::Type, ItemChanges::Fields];
        let collections = Collection::find_all(&mut *conn, self.collections, &attachment.library_id).await?;
        if collections.len() < self.collections.len() {
            debug!(
                "Attachment {}: {} of {} collections exist",
                attachment.key,
                collections.len(),
                self.collections.len()
            );
        }
        for collection in &collections {
            collection.add_item(&mut *conn, item.id).await?;
        }
        if !collections.is_empty() {
            changes.push(ItemChanges::Collections);
        }

        if let Some(parent_key) = self.parent_key {
            let parent = Item::find(&mut *conn, parent_key, &attachment.library_id)
                .await?
                .ok_or_else(|| Error::ObjectNotFound(format!("parent item {}", parent_key)))?;
            item.set_parent(&mut *conn, &parent).await?;
            changes.push(ItemChanges::Parent);
        }

        ObjectChange::create(changes.as_slice())
            .insert(&mut *conn, ChangeOwner::Item, item.id)
            .await?;

        Ok(item)
    }
}

#[async_trait]
impl<'a> DbResponseRequest for CreateAttachmentDbRequest<'a> {
    type Response = Item;

    async fn process(&self, database: &Database) -> Result<Item> {
        let mut tx = database.begin().await?;
        let item = self.create_in(&mut tx).await?;
        tx.commit().await?;
        Ok(item)
    }
}

/// Creates attachments one transaction at a time and reports the ones that
/// failed as `(key, title)` pairs.
#[derive(Debug)]
pub struct CreateAttachmentsDbRequest {
    pub attachments: Vec<Attachment>,
    pub parent_key: Option<String>,
    pub localized_type: String,
    pub collections: HashSet<String>,
    pub file_store: Arc<dyn FileStore>,
}

impl CreateAttachmentsDbRequest {
    async fn create(&self, database: &Database, attachment: &Attachment, parent: Option<&Item>) -> Result<Item> {
        let mut tx = database.begin().await?;

        let mut item = CreateAttachmentDbRequest {
            attachment,
            parent_key: None,
            localized_type: &self.localized_type,
            collections: &self.collections,
            file_store: self.file_store.as_ref(),
        }
        .create_in(&mut tx)
        .await?;

        if let Some(parent) = parent {
            item.set_parent(&mut tx, parent).await?;
            ObjectChange::create(&[ItemChanges::Parent])
                .insert(&mut tx, ChangeOwner::Item, item.id)
                .await?;
        }

        tx.commit().await?;
        Ok(item)
    }
}

#[async_trait]
impl DbResponseRequest for CreateAttachmentsDbRequest {
    type Response = Vec<(String, String)>;

    async fn process(&self, database: &Database) -> Result<Self::Response> {
        let Some(library_id) = self.attachments.first().map(|a| a.library_id) else {
            return Ok(Vec::new());
        };

        let parent = match &self.parent_key {
            Some(key) => {
                let parent = database.find_item(key, &library_id).await?;
                if parent.is_none() {
                    warn!("CreateAttachmentsDbRequest: parent {} not found in {}", key, library_id);
                }
                parent
            }
            None => None,
        };

        let mut failed = Vec::new();
        for attachment in &self.attachments {
            match self.create(database, attachment, parent.as_ref()).await {
                Ok(item) => debug!("Created attachment {} ({})", item.key, item.id),
                Err(e) => {
                    error!("CreateAttachmentsDbRequest: could not create attachment {} - {}", attachment.key, e);
                    failed.push((attachment.key.clone(), attachment.title.clone()));
                }
            }
        }

        info!(
            "Created {} of {} attachments in {}",
            self.attachments.len() - failed.len(),
            self.attachments.len(),
            library_id
        );
        Ok(failed)
    }
}

mod common;

use common::*;
use zotero_localdb::db::StoreSearchesDbRequest;
use zotero_localdb::zotero::{
    LibraryIdentifier, ObjectSyncState, SearchChanges, SearchResponse, UpdatableChangeType,
};
use zotero_localdb::Error;

fn unread_pdfs(version: i64) -> SearchResponse {
    search_response(
        "SRCH2222",
        "user",
        991,
        "Unread PDFs",
        version,
        vec![
            condition("itemType", "is", "attachment"),
            condition("tag", "isNot", "read"),
            condition("fileTypeID", "is", "pdf"),
        ],
    )
}

#[tokio::test]
async fn creates_search_with_ordered_conditions() {
    let db = make_db().await;

    db.perform_write(&StoreSearchesDbRequest::new(vec![unread_pdfs(4)])).await.unwrap();

    let search = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    assert_eq!(search.name, "Unread PDFs");
    assert_eq!(search.version, 4);
    assert_eq!(search.sync_state, ObjectSyncState::Synced);
    assert_eq!(search.change_type, UpdatableChangeType::Sync);
    assert_eq!(search.sync_retries, 0);
    assert!(search.last_sync_date.is_some());
    assert!(!search.trash);
    assert!(!search.deleted);

    let conditions: Vec<(&str, &str, &str, i64)> = search
        .conditions
        .iter()
        .map(|c| (c.condition.as_str(), c.operator.as_str(), c.value.as_str(), c.sort_id))
        .collect();
    assert_eq!(
        conditions,
        vec![
            ("itemType", "is", "attachment", 0),
            ("tag", "isNot", "read", 1),
            ("fileTypeID", "is", "pdf", 2),
        ]
    );
}

#[tokio::test]
async fn update_replaces_fields_conditions_and_local_changes() {
    let db = make_db().await;
    db.perform_write(&StoreSearchesDbRequest::new(vec![unread_pdfs(4)])).await.unwrap();
    let original = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    db.mark_search_changed(original.id, &[SearchChanges::Name, SearchChanges::Conditions])
        .await
        .unwrap();

    let mut updated = search_response(
        "SRCH2222",
        "user",
        991,
        "Read PDFs",
        9,
        vec![
            condition("tag", "is", "read"),
            condition("itemType", "is", "attachment"),
        ],
    );
    updated.data.is_trash = true;
    db.perform_write(&StoreSearchesDbRequest::new(vec![updated])).await.unwrap();

    let search = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    assert_eq!(search.id, original.id);
    assert_eq!(search.name, "Read PDFs");
    assert_eq!(search.version, 9);
    assert!(search.trash);
    assert_eq!(search.sync_state, ObjectSyncState::Synced);
    assert_eq!(search.change_type, UpdatableChangeType::Sync);
    assert!(db.search_changes(search.id).await.unwrap().is_empty());

    let conditions: Vec<(&str, i64)> = search
        .conditions
        .iter()
        .map(|c| (c.condition.as_str(), c.sort_id))
        .collect();
    assert_eq!(conditions, vec![("tag", 0), ("itemType", 1)]);
}

#[tokio::test]
async fn storing_same_payload_twice_is_idempotent() {
    let db = make_db().await;
    let request = StoreSearchesDbRequest::new(vec![unread_pdfs(4)]);

    db.perform_write(&request).await.unwrap();
    let mut first = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    db.perform_write(&request).await.unwrap();
    let mut second = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();

    assert!(second.last_sync_date >= first.last_sync_date);
    first.last_sync_date = None;
    second.last_sync_date = None;
    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_library_fails_only_that_payload() {
    let db = make_db().await;
    let group = LibraryIdentifier::Group(5);
    let stored = search_response("SRCA2222", "group", 5, "Stored", 1, vec![condition("tag", "is", "a")]);
    let broken = search_response("SRCB2222", "publications", 5, "Broken", 1, Vec::new());

    let err = db
        .perform_write(&StoreSearchesDbRequest::new(vec![stored, broken]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PrimaryKeyUnavailable));
    let kept = db.find_search("SRCA2222", &group).await.unwrap().unwrap();
    assert_eq!(kept.name, "Stored");
    assert_eq!(kept.conditions.len(), 1);
    assert!(db.find_search("SRCB2222", &group).await.unwrap().is_none());
}

#[tokio::test]
async fn same_key_in_different_libraries_is_stored_twice() {
    let db = make_db().await;
    let mine = search_response("SRCH2222", "user", 991, "Mine", 1, vec![condition("tag", "is", "a")]);
    let theirs = search_response("SRCH2222", "group", 8, "Theirs", 2, Vec::new());

    db.perform_write(&StoreSearchesDbRequest::new(vec![mine, theirs])).await.unwrap();

    let mine = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    let theirs = db.find_search("SRCH2222", &LibraryIdentifier::Group(8)).await.unwrap().unwrap();
    assert_ne!(mine.id, theirs.id);
    assert_eq!(mine.name, "Mine");
    assert_eq!(mine.conditions.len(), 1);
    assert_eq!(theirs.name, "Theirs");
    assert!(theirs.conditions.is_empty());
}

#[tokio::test]
async fn payload_from_api_json_is_stored() {
    let db = make_db().await;
    let json = r#"[{
        "key": "SRCH2222",
        "version": 3,
        "library": {"type": "group", "id": 12, "name": "Lab"},
        "data": {
            "key": "SRCH2222",
            "version": 3,
            "name": "Trashed",
            "conditions": [{"condition": "title", "operator": "contains", "value": "rust"}],
            "deleted": 1
        }
    }]"#;
    let response: Vec<SearchResponse> = serde_json::from_str(json).unwrap();

    db.perform_write(&StoreSearchesDbRequest::new(response)).await.unwrap();

    let search = db.find_search("SRCH2222", &LibraryIdentifier::Group(12)).await.unwrap().unwrap();
    assert!(search.trash);
    assert_eq!(search.conditions[0].value, "rust");
}

#[tokio::test]
async fn sync_clears_deleted_flag() {
    let db = make_db().await;
    db.perform_write(&StoreSearchesDbRequest::new(vec![unread_pdfs(4)])).await.unwrap();
    let search = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    sqlx::query("UPDATE searches SET deleted = 1 WHERE id = ?1")
        .bind(search.id)
        .execute(db.pool())
        .await
        .unwrap();
    assert!(db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap().deleted);

    db.perform_write(&StoreSearchesDbRequest::new(vec![unread_pdfs(5)])).await.unwrap();

    let search = db.find_search("SRCH2222", &my_library()).await.unwrap().unwrap();
    assert!(!search.deleted);
    assert_eq!(search.version, 5);
}

#[tokio::test]
async fn missing_library_stops_later_payloads() {
    let db = make_db().await;
    let broken = search_response("SRCB2222", "publications", 5, "Broken", 1, Vec::new());
    let later = search_response("SRCC2222", "group", 5, "Later", 1, vec![condition("tag", "is", "b")]);

    let err = db
        .perform_write(&StoreSearchesDbRequest::new(vec![broken, later]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PrimaryKeyUnavailable));
    assert!(db.find_search("SRCC2222", &LibraryIdentifier::Group(5)).await.unwrap().is_none());
}

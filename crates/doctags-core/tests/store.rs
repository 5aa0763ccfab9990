use chrono::{Duration, TimeZone, Utc};

use doctags_core::error::PersistError;
use doctags_core::models::{Document, SavedSearch, SearchQuery, TagGroup};
use doctags_core::store::memory::InMemoryStore;
use doctags_core::store::{
    find_saved_search, persist_batch, recent_saved_searches, retag_document, save_query,
    DocumentStore, SAVED_SEARCH_LIMIT,
};
use doctags_core::tag_set::TagSet;
use doctags_core::taxonomy::Taxonomy;

fn family_store() -> InMemoryStore {
    InMemoryStore::with_taxonomy(Taxonomy::new(vec![TagGroup::new(
        "g1",
        "Family",
        ["Alice", "Bob"],
    )]))
}

fn doc(id: &str, tags: &[&str]) -> Document {
    Document {
        id: id.to_string(),
        title: Some(format!("Doc {}", id)),
        tags: TagSet::from_values(tags.iter().copied()),
        ..Default::default()
    }
}

#[tokio::test]
async fn batch_is_all_or_nothing() {
    let store = family_store();

    let err = persist_batch(&store, &[doc("1", &["Alice"]), doc("2", &["Urgent"])])
        .await
        .unwrap_err();
    match err.downcast_ref::<PersistError>() {
        Some(PersistError::MissingRequiredTags { failures }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].document_id, "2");
            assert_eq!(failures[0].missing[0].group_name, "Family");
        }
        None => panic!("expected PersistError, got {err:#}"),
    }
    assert!(store.list_documents().await.unwrap().is_empty());

    let n = persist_batch(&store, &[doc("1", &["Alice"]), doc("2", &["Bob", "Urgent"])])
        .await
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(store.list_documents().await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_taxonomy_accepts_anything() {
    let store = InMemoryStore::new();
    persist_batch(&store, &[doc("1", &[])]).await.unwrap();
    assert!(store.get_document("1").await.unwrap().is_some());
}

#[tokio::test]
async fn reinsert_replaces_in_place() {
    let store = InMemoryStore::new();
    persist_batch(&store, &[doc("1", &[]), doc("2", &[])])
        .await
        .unwrap();
    let mut changed = doc("1", &["x"]);
    changed.title = Some("Renamed".to_string());
    persist_batch(&store, &[changed]).await.unwrap();

    let all = store.list_documents().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn retag_is_revalidated() {
    let store = family_store();
    persist_batch(&store, &[doc("1", &["Alice"])]).await.unwrap();

    let err = retag_document(&store, "1", TagSet::from_values(["Urgent"]))
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<PersistError>().is_some());
    let stored = store.get_document("1").await.unwrap().unwrap();
    assert_eq!(stored.tags.as_slice(), &["Alice"]);

    retag_document(&store, "1", TagSet::from_values(["Bob"]))
        .await
        .unwrap();
    let stored = store.get_document("1").await.unwrap().unwrap();
    assert_eq!(stored.tags.as_slice(), &["Bob"]);

    assert!(retag_document(&store, "missing", TagSet::new()).await.is_err());
}

#[tokio::test]
async fn saved_searches_newest_first_and_capped() {
    let store = InMemoryStore::new();
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for i in 0..12 {
        store
            .save_search(&SavedSearch {
                id: format!("s{}", i),
                name: format!("search {}", i),
                query: SearchQuery::default(),
                created_at: base + Duration::minutes(i),
            })
            .await
            .unwrap();
    }

    let recent = recent_saved_searches(&store).await.unwrap();
    assert_eq!(recent.len(), SAVED_SEARCH_LIMIT);
    assert_eq!(recent[0].id, "s11");
    assert_eq!(recent[9].id, "s2");

    // Older entries stay reachable by name.
    let old = find_saved_search(&store, "search 0").await.unwrap().unwrap();
    assert_eq!(old.id, "s0");
    assert!(store.delete_saved_search("s0").await.unwrap());
    assert!(find_saved_search(&store, "s0").await.unwrap().is_none());
}

#[tokio::test]
async fn save_query_requires_name() {
    let store = InMemoryStore::new();
    let query = SearchQuery {
        text: "tax".to_string(),
        ..Default::default()
    };
    assert!(save_query(&store, "   ", &query).await.is_err());

    let saved = save_query(&store, " Taxes ", &query).await.unwrap();
    assert_eq!(saved.name, "Taxes");
    let found = find_saved_search(&store, &saved.id).await.unwrap().unwrap();
    assert_eq!(found.query, query);
}

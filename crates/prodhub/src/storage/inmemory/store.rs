//! In-memory document store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use prodhub_core::storage::{
    apply_patch, prepare_upsert, CollectionPath, Document, DocumentStore, Result, StoreError,
};

/// Documents of one collection, in insertion order.
type Collection = Vec<(String, Document)>;

/// In-memory storage backend for testing.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<CollectionPath, Collection>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(collection: &Collection, id: &str) -> Option<usize> {
    collection.iter().position(|(doc_id, _)| doc_id == id)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default())
    }

    async fn insert(&self, path: &CollectionPath, id: &str, document: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(path.clone()).or_default();
        if position(docs, id).is_some() {
            return Err(StoreError::AlreadyExists {
                collection: path.collection.clone(),
                id: id.to_string(),
            });
        }
        docs.push((id.to_string(), document));
        Ok(())
    }

    async fn merge(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: Document,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        let (_, existing) = collections
            .get_mut(path)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id))
            .ok_or_else(|| StoreError::not_found(&path.collection, id))?;
        apply_patch(existing, patch, now);
        Ok(())
    }

    async fn upsert(
        &self,
        path: &CollectionPath,
        id: &str,
        document: Document,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(path.clone()).or_default();
        match position(docs, id) {
            Some(index) => {
                let stored = prepare_upsert(Some(&docs[index].1), document, id, now);
                docs[index].1 = stored;
            }
            None => {
                let stored = prepare_upsert(None, document, id, now);
                docs.push((id.to_string(), stored));
            }
        }
        Ok(())
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(path)
            .ok_or_else(|| StoreError::not_found(&path.collection, id))?;
        let index = position(docs, id).ok_or_else(|| StoreError::not_found(&path.collection, id))?;
        docs.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prodhub_core::serde::to_datetime;
    use prodhub_core::storage::prepare_insert;
    use serde_json::{json, Value};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn tasks(user: &str) -> CollectionPath {
        CollectionPath::new(user, "tasks")
    }

    // ==================== Insert / Get Tests ====================

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryDocumentStore::new();
        let stored = prepare_insert(doc(json!({"title": "a"})), "t1", now());

        store.insert(&tasks("u1"), "t1", stored.clone()).await.unwrap();

        assert_eq!(store.get(&tasks("u1"), "t1").await.unwrap(), Some(stored));
        assert_eq!(store.get(&tasks("u2"), "t1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let store = InMemoryDocumentStore::new();
        store.insert(&tasks("u1"), "t1", doc(json!({}))).await.unwrap();

        let result = store.insert(&tasks("u1"), "t1", doc(json!({}))).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_and_scope() {
        let store = InMemoryDocumentStore::new();
        for id in ["c", "a", "b"] {
            store.insert(&tasks("u1"), id, doc(json!({"id": id}))).await.unwrap();
        }
        store.insert(&tasks("u2"), "z", doc(json!({"id": "z"}))).await.unwrap();

        let listed = store.list(&tasks("u1")).await.unwrap();

        let ids: Vec<_> = listed.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(store.list(&tasks("nobody")).await.unwrap().is_empty());
    }

    // ==================== Merge / Upsert / Remove Tests ====================

    #[tokio::test]
    async fn test_merge_patches_fields() {
        let store = InMemoryDocumentStore::new();
        let stored = prepare_insert(doc(json!({"title": "a", "completed": false})), "t1", now());
        store.insert(&tasks("u1"), "t1", stored).await.unwrap();

        store
            .merge(&tasks("u1"), "t1", doc(json!({"completed": true})), now())
            .await
            .unwrap();

        let merged = store.get(&tasks("u1"), "t1").await.unwrap().unwrap();
        assert_eq!(merged["completed"], json!(true));
        assert_eq!(merged["title"], json!("a"));
        assert!(to_datetime(&merged["updatedAt"]).unwrap() > now());
    }

    #[tokio::test]
    async fn test_merge_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();

        let result = store.merge(&tasks("u1"), "nope", doc(json!({})), now()).await;

        assert_eq!(result, Err(StoreError::not_found("tasks", "nope")));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        let store = InMemoryDocumentStore::new();
        let prefs = CollectionPath::new("u1", "notification-preferences");

        store
            .upsert(&prefs, "preferences", doc(json!({"reminderTiming": 30})), now())
            .await
            .unwrap();
        store
            .upsert(&prefs, "preferences", doc(json!({"reminderTiming": 10})), now())
            .await
            .unwrap();

        let listed = store.list(&prefs).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["reminderTiming"], json!(10));
        assert_eq!(listed[0]["id"], json!("preferences"));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryDocumentStore::new();
        store.insert(&tasks("u1"), "t1", doc(json!({}))).await.unwrap();

        store.remove(&tasks("u1"), "t1").await.unwrap();

        assert!(store.get(&tasks("u1"), "t1").await.unwrap().is_none());
        assert_eq!(
            store.remove(&tasks("u1"), "t1").await,
            Err(StoreError::not_found("tasks", "t1"))
        );
    }
}

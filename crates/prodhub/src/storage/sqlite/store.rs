//! SQLite document store implementation.
//!
//! Implements [`DocumentStore`] from `prodhub_core::storage` over a single
//! `documents` table.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::OptionalExtension;
use serde_json::Value;
use tokio_rusqlite::Connection;

use prodhub_core::storage::{
    apply_patch, prepare_upsert, CollectionPath, Document, DocumentStore, Result, StoreError,
    CREATED_AT, UPDATED_AT,
};

use super::error::map_tokio_rusqlite_error;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn parse_body(body: &str) -> std::result::Result<Document, tokio_rusqlite::Error> {
    serde_json::from_str(body).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

fn to_body(document: &Document) -> std::result::Result<String, tokio_rusqlite::Error> {
    serde_json::to_string(document).map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

/// Reads a timestamp column value out of a stamped document.
fn timestamp_field(document: &Document, field: &str, fallback: DateTime<Utc>) -> String {
    document
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// SQLite-based document store.
///
/// Every operation runs on the connection's background thread; merges
/// read and write inside one transaction.
pub struct SqliteDocumentStore {
    conn: Connection,
}

impl SqliteDocumentStore {
    /// Opens (or creates) a file-based database.
    ///
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a store with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Document>> {
        let namespace = path.namespace();
        let collection = path.collection.clone();
        let doc_id = id.to_string();

        self.conn
            .call(move |conn| {
                let body: Option<String> = conn
                    .query_row(
                        schema::SELECT_DOCUMENT,
                        [&namespace, &collection, &doc_id],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(wrap_err)?;
                body.as_deref().map(parse_body).transpose()
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, path, id))
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        let namespace = path.namespace();
        let collection = path.collection.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_DOCUMENTS).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([&namespace, &collection], |row| row.get::<_, String>(0))
                    .map_err(wrap_err)?;

                let mut documents = Vec::new();
                for row_result in rows {
                    let body = row_result.map_err(wrap_err)?;
                    documents.push(parse_body(&body)?);
                }
                Ok(documents)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, path, ""))
    }

    async fn insert(&self, path: &CollectionPath, id: &str, document: Document) -> Result<()> {
        let namespace = path.namespace();
        let collection = path.collection.clone();
        let doc_id = id.to_string();
        let now = Utc::now();
        let created_at = timestamp_field(&document, CREATED_AT, now);
        let updated_at = timestamp_field(&document, UPDATED_AT, now);
        let body = serde_json::to_string(&document)?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_DOCUMENT,
                    [&namespace, &collection, &doc_id, &body, &created_at, &updated_at],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, path, id))
    }

    async fn merge(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: Document,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let namespace = path.namespace();
        let collection = path.collection.clone();
        let doc_id = id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let body: String = tx
                    .query_row(
                        schema::SELECT_DOCUMENT,
                        [&namespace, &collection, &doc_id],
                        |row| row.get(0),
                    )
                    .map_err(wrap_err)?;

                let mut existing = parse_body(&body)?;
                apply_patch(&mut existing, patch, now);
                let updated_at = timestamp_field(&existing, UPDATED_AT, now);
                let body = to_body(&existing)?;

                let rows = tx
                    .execute(
                        schema::UPDATE_DOCUMENT,
                        [&namespace, &collection, &doc_id, &body, &updated_at],
                    )
                    .map_err(wrap_err)?;
                if rows == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, path, id))
    }

    async fn upsert(
        &self,
        path: &CollectionPath,
        id: &str,
        document: Document,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let namespace = path.namespace();
        let collection = path.collection.clone();
        let doc_id = id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let previous: Option<String> = tx
                    .query_row(
                        schema::SELECT_DOCUMENT,
                        [&namespace, &collection, &doc_id],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(wrap_err)?;
                let previous = previous.as_deref().map(parse_body).transpose()?;

                let stored = prepare_upsert(previous.as_ref(), document, &doc_id, now);
                let created_at = timestamp_field(&stored, CREATED_AT, now);
                let updated_at = timestamp_field(&stored, UPDATED_AT, now);
                let body = to_body(&stored)?;

                tx.execute(
                    schema::UPSERT_DOCUMENT,
                    [&namespace, &collection, &doc_id, &body, &created_at, &updated_at],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, path, id))
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<()> {
        let namespace = path.namespace();
        let collection = path.collection.clone();
        let doc_id = id.to_string();

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_DOCUMENT, [&namespace, &collection, &doc_id])
                    .map_err(wrap_err)?;
                if rows == 0 {
                    return Err(wrap_err(rusqlite::Error::QueryReturnedNoRows));
                }
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, path, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prodhub_core::serde::to_datetime;
    use prodhub_core::storage::prepare_insert;
    use serde_json::json;

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

    async fn setup() -> SqliteDocumentStore {
        SqliteDocumentStore::new_in_memory().await.unwrap()
    }

    // ==================== Insert / Get Tests ====================

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = setup().await;
        let stored = prepare_insert(doc(json!({"title": "a", "tags": ["x"]})), "t1", now());

        store.insert(&tasks("u1"), "t1", stored.clone()).await.unwrap();

        assert_eq!(store.get(&tasks("u1"), "t1").await.unwrap(), Some(stored));
        assert_eq!(store.get(&tasks("u2"), "t1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let store = setup().await;
        store.insert(&tasks("u1"), "t1", doc(json!({}))).await.unwrap();

        let result = store.insert(&tasks("u1"), "t1", doc(json!({}))).await;

        assert_eq!(
            result,
            Err(StoreError::AlreadyExists {
                collection: "tasks".into(),
                id: "t1".into()
            })
        );
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_and_scope() {
        let store = setup().await;
        for id in ["c", "a", "b"] {
            store.insert(&tasks("u1"), id, doc(json!({"id": id}))).await.unwrap();
        }
        store.insert(&tasks("u2"), "z", doc(json!({"id": "z"}))).await.unwrap();
        store
            .insert(&CollectionPath::new("u1", "notes"), "n", doc(json!({"id": "n"})))
            .await
            .unwrap();

        let listed = store.list(&tasks("u1")).await.unwrap();

        let ids: Vec<_> = listed.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    // ==================== Merge / Upsert / Remove Tests ====================

    #[tokio::test]
    async fn test_merge_patches_fields() {
        let store = setup().await;
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
        let store = setup().await;

        let result = store.merge(&tasks("u1"), "nope", doc(json!({})), now()).await;

        assert_eq!(result, Err(StoreError::not_found("tasks", "nope")));
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = setup().await;
        let prefs = CollectionPath::new("u1", "notification-preferences");
        store.insert(&prefs, "other", doc(json!({"id": "other"}))).await.unwrap();

        store
            .upsert(&prefs, "preferences", doc(json!({"reminderTiming": 30})), now())
            .await
            .unwrap();
        store
            .upsert(&prefs, "preferences", doc(json!({"reminderTiming": 10})), now())
            .await
            .unwrap();

        let listed = store.list(&prefs).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1]["reminderTiming"], json!(10));
        assert_eq!(to_datetime(&listed[1]["createdAt"]), Some(now()));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = setup().await;
        store.insert(&tasks("u1"), "t1", doc(json!({}))).await.unwrap();

        store.remove(&tasks("u1"), "t1").await.unwrap();

        assert!(store.get(&tasks("u1"), "t1").await.unwrap().is_none());
        assert_eq!(
            store.remove(&tasks("u1"), "t1").await,
            Err(StoreError::not_found("tasks", "t1"))
        );
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let path = std::env::temp_dir().join(format!("prodhub-test-{}.db", uuid::Uuid::new_v4()));
        let path_str = path.to_string_lossy().to_string();

        {
            let store = SqliteDocumentStore::new(&path_str).await.unwrap();
            store.insert(&tasks("u1"), "t1", doc(json!({"id": "t1"}))).await.unwrap();
        }

        let reopened = SqliteDocumentStore::new(&path_str).await.unwrap();
        assert!(reopened.get(&tasks("u1"), "t1").await.unwrap().is_some());

        let _ = std::fs::remove_file(&path);
    }
}

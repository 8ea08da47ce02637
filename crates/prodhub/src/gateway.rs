//! Remote store gateway.
//!
//! Resolves `users/{id}/{collection}` from the current identity and runs
//! CRUD and predicate queries through a [`DocumentStore`]. Holds no cache.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use prodhub_core::clock::Clock;
use prodhub_core::storage::{
    apply_query, decode, encode, prepare_insert, CollectionPath, Document, DocumentStore,
    OrderBy, Predicate, Result, StoreError,
};

use crate::identity::IdentityStream;

/// Identity-scoped access to the document store.
#[derive(Clone)]
pub struct RemoteStoreGateway {
    store: Arc<dyn DocumentStore>,
    identity: IdentityStream,
    clock: Arc<dyn Clock>,
}

impl RemoteStoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>, identity: IdentityStream, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            identity,
            clock,
        }
    }

    pub fn identity(&self) -> &IdentityStream {
        &self.identity
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn scope(&self, collection: &str) -> Result<CollectionPath> {
        self.identity
            .current_user_id()
            .map(|user_id| CollectionPath::new(user_id, collection))
            .ok_or(StoreError::NotAuthenticated)
    }

    /// Lists a collection of the signed-in user. Empty when logged out.
    pub async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        match self.identity.current_user_id() {
            Some(user_id) => self.list_in(&user_id, collection).await,
            None => Ok(Vec::new()),
        }
    }

    /// Lists a collection of an explicit user.
    ///
    /// Documents that no longer decode into `T` are skipped with a warning.
    pub async fn list_in<T: DeserializeOwned>(&self, user_id: &str, collection: &str) -> Result<Vec<T>> {
        let path = CollectionPath::new(user_id, collection);
        let documents = self.store.list(&path).await?;
        Ok(decode_all(&path, documents))
    }

    /// Fetches one record of the signed-in user.
    pub async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let Some(user_id) = self.identity.current_user_id() else {
            return Ok(None);
        };
        let path = CollectionPath::new(user_id, collection);
        self.store
            .get(&path, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Stores a new record and returns its server-generated id.
    ///
    /// Whatever `id`, `createdAt` and `updatedAt` the record carries are
    /// replaced.
    pub async fn create<T: Serialize + ?Sized>(&self, collection: &str, record: &T) -> Result<String> {
        let path = self.scope(collection)?;
        let id = Uuid::new_v4().to_string();
        let document = prepare_insert(encode(record)?, &id, self.clock.now());

        self.store.insert(&path, &id, document).await?;
        tracing::debug!(path = %path, id = %id, "document created");
        Ok(id)
    }

    /// Shallow-merges a partial record into an existing one.
    pub async fn update<P: Serialize + ?Sized>(&self, collection: &str, id: &str, patch: &P) -> Result<()> {
        let path = self.scope(collection)?;
        let patch = encode(patch)?;

        self.store.merge(&path, id, patch, self.clock.now()).await?;
        tracing::debug!(path = %path, id = %id, "document updated");
        Ok(())
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let path = self.scope(collection)?;

        self.store.remove(&path, id).await?;
        tracing::debug!(path = %path, id = %id, "document deleted");
        Ok(())
    }

    /// Creates or replaces a record under a fixed id.
    pub async fn put<T: Serialize + ?Sized>(&self, collection: &str, id: &str, record: &T) -> Result<()> {
        let path = self.scope(collection)?;
        let document = encode(record)?;

        self.store.upsert(&path, id, document, self.clock.now()).await
    }

    /// Filters a collection with every predicate and an optional sort key.
    ///
    /// Empty when logged out.
    pub async fn query<T: DeserializeOwned>(
        &self,
        collection: &str,
        predicates: &[Predicate],
        order_by: Option<&OrderBy>,
    ) -> Result<Vec<T>> {
        let Some(user_id) = self.identity.current_user_id() else {
            return Ok(Vec::new());
        };
        let path = CollectionPath::new(user_id, collection);
        let documents = self.store.list(&path).await?;
        Ok(decode_all(&path, apply_query(documents, predicates, order_by)))
    }
}

fn decode_all<T: DeserializeOwned>(path: &CollectionPath, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string();
            match decode(document) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(path = %path, id = %id, error = %error, "skipping undecodable document");
                    None
                }
            }
        })
        .collect()
}

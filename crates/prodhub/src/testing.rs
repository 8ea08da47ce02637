//! Test doubles shared by the shell's unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::watch;
use tokio::time::timeout;

use prodhub_core::auth::{Identity, SignInMethod};
use prodhub_core::clock::ManualClock;
use prodhub_core::storage::{CollectionPath, Document, DocumentStore, Result, StoreError};

use crate::gateway::RemoteStoreGateway;
use crate::identity::IdentityStream;
use crate::storage::InMemoryDocumentStore;

/// In-memory store with scriptable list delays and failures.
#[derive(Default)]
pub struct ScriptedStore {
    inner: InMemoryDocumentStore,
    list_delays: Mutex<VecDeque<Duration>>,
    user_delays: Mutex<Vec<(String, Duration)>>,
    fail_lists: AtomicBool,
    fail_writes: AtomicBool,
    duplicate_lists: AtomicBool,
    lists: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays the next `list` call, in call order.
    pub fn delay_next_list(&self, by: Duration) {
        self.list_delays.lock().unwrap().push_back(by);
    }

    /// Delays every `list` of one user's collections.
    pub fn delay_user(&self, user_id: &str, by: Duration) {
        self.user_delays.lock().unwrap().push((user_id.to_string(), by));
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn duplicate_lists(&self, duplicate: bool) {
        self.duplicate_lists.store(duplicate, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionFailed("store unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn get(&self, path: &CollectionPath, id: &str) -> Result<Option<Document>> {
        self.inner.get(path, id).await
    }

    async fn list(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        // Read before sleeping so a delayed list returns the state at call time.
        let mut documents = self.inner.list(path).await?;
        let queued = self.list_delays.lock().unwrap().pop_front();
        let per_user = self
            .user_delays
            .lock()
            .unwrap()
            .iter()
            .find(|(user, _)| *user == path.user_id)
            .map(|(_, delay)| *delay);
        if let Some(delay) = queued.or(per_user) {
            tokio::time::sleep(delay).await;
        }

        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed("list unavailable".into()));
        }
        if self.duplicate_lists.load(Ordering::SeqCst) {
            documents.extend(documents.clone());
        }
        Ok(documents)
    }

    async fn insert(&self, path: &CollectionPath, id: &str, document: Document) -> Result<()> {
        self.check_writes()?;
        self.inner.insert(path, id, document).await
    }

    async fn merge(
        &self,
        path: &CollectionPath,
        id: &str,
        patch: Document,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writes()?;
        self.inner.merge(path, id, patch, now).await
    }

    async fn upsert(
        &self,
        path: &CollectionPath,
        id: &str,
        document: Document,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writes()?;
        self.inner.upsert(path, id, document, now).await
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<()> {
        self.check_writes()?;
        self.inner.remove(path, id).await
    }
}

/// 2024-05-01 10:00 UTC.
pub fn ten_am() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub struct Harness {
    pub store: Arc<ScriptedStore>,
    pub clock: Arc<ManualClock>,
    pub gateway: RemoteStoreGateway,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(ScriptedStore::new());
        let clock = Arc::new(ManualClock::new(ten_am()));
        let gateway = RemoteStoreGateway::new(store.clone(), IdentityStream::new(), clock.clone());
        Self {
            store,
            clock,
            gateway,
        }
    }

    pub fn sign_in(&self, user_id: &str) {
        self.gateway
            .identity()
            .publish(Some(Identity::new(user_id, SignInMethod::Password, "token")));
    }

    pub fn sign_out(&self) {
        self.gateway.identity().publish(None);
    }
}

/// Waits until the watched value satisfies `pred`, failing after 2 seconds.
pub async fn wait_for<T: Clone>(rx: &mut watch::Receiver<T>, pred: impl FnMut(&T) -> bool) -> T {
    timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for watch value")
        .expect("watch sender dropped")
        .clone()
}

//! Reactive cached collection.
//!
//! A [`CachedCollection`] mirrors one per-user collection of the remote
//! store into an in-memory snapshot. The snapshot is replaced wholesale by
//! [`CachedCollection::reload`], which runs whenever the identity changes
//! and after every successful mutation.
//!
//! Reloads carry a ticket. Issuing a reload or applying a new identity
//! bumps the ticket, and a reload that completes with an outdated ticket
//! is discarded, so a slow response for an old scope never overwrites a
//! newer snapshot.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use prodhub_core::auth::Identity;
use prodhub_core::record::Record;

use crate::error::Result;
use crate::gateway::RemoteStoreGateway;

/// Loading state of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No identity has been applied yet.
    #[default]
    Uninitialized,
    Loading,
    Loaded,
    /// Logged out, or the first load for this identity failed.
    Empty,
}

#[derive(Debug, Default)]
struct Scope {
    user_id: Option<String>,
    /// False until the first identity is applied.
    applied: bool,
    ticket: u64,
    /// A reload succeeded for the current user.
    populated: bool,
}

/// In-memory mirror of `users/{id}/{T::COLLECTION}`.
pub struct CachedCollection<T: Record> {
    gateway: RemoteStoreGateway,
    snapshot: watch::Sender<Vec<T>>,
    state: watch::Sender<LoadState>,
    scope: Mutex<Scope>,
}

impl<T: Record> CachedCollection<T> {
    pub fn new(gateway: RemoteStoreGateway) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        let (state, _) = watch::channel(LoadState::Uninitialized);
        Self {
            gateway,
            snapshot,
            state,
            scope: Mutex::new(Scope::default()),
        }
    }

    pub fn gateway(&self) -> &RemoteStoreGateway {
        &self.gateway
    }

    fn scope(&self) -> MutexGuard<'_, Scope> {
        self.scope.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Replay-latest receiver of the snapshot: the first `changed()`
    /// resolves immediately.
    pub fn observe(&self) -> watch::Receiver<Vec<T>> {
        let mut rx = self.snapshot.subscribe();
        rx.mark_changed();
        rx
    }

    /// The snapshot as a stream, starting with the current value.
    pub fn stream(&self) -> WatchStream<Vec<T>> {
        WatchStream::new(self.snapshot.subscribe())
    }

    /// A derived view recomputed on every snapshot.
    pub fn view<R, F>(&self, f: F) -> impl Stream<Item = R> + Send + 'static
    where
        R: 'static,
        F: Fn(&[T]) -> R + Send + 'static,
    {
        self.stream().map(move |records| f(&records))
    }

    /// An owned copy of the current snapshot.
    pub fn snapshot(&self) -> Vec<T> {
        self.snapshot.borrow().clone()
    }

    /// Runs `f` against the current snapshot without copying it.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.snapshot.borrow())
    }

    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    pub fn observe_state(&self) -> watch::Receiver<LoadState> {
        let mut rx = self.state.subscribe();
        rx.mark_changed();
        rx
    }

    // ------------------------------------------------------------------
    // Identity scope
    // ------------------------------------------------------------------

    /// Switches the collection to a new identity.
    ///
    /// A change of user invalidates every in-flight reload and clears the
    /// snapshot immediately. Returns true when the scope changed.
    pub fn apply_identity(&self, identity: Option<&Identity>) -> bool {
        let user_id = identity.map(|identity| identity.user_id.clone());
        let mut scope = self.scope();
        if scope.applied && scope.user_id == user_id {
            return false;
        }

        scope.applied = true;
        scope.user_id = user_id;
        scope.ticket += 1;
        scope.populated = false;

        self.snapshot.send_if_modified(|records| {
            if records.is_empty() {
                return false;
            }
            records.clear();
            true
        });
        let state = if scope.user_id.is_some() {
            LoadState::Loading
        } else {
            LoadState::Empty
        };
        self.state.send_replace(state);

        tracing::debug!(
            collection = T::COLLECTION,
            user_id = scope.user_id.as_deref().unwrap_or("-"),
            ticket = scope.ticket,
            "identity scope applied"
        );
        true
    }

    /// Applies whatever identity the gateway sees right now.
    fn sync_scope(&self) {
        let current = self.gateway.identity().current();
        self.apply_identity(current.as_ref());
    }

    // ------------------------------------------------------------------
    // Reload
    // ------------------------------------------------------------------

    /// Re-fetches the collection and replaces the snapshot.
    ///
    /// Failures are logged and absorbed: the previous snapshot is kept,
    /// unless nothing was loaded for this user yet, in which case the
    /// snapshot stays empty.
    pub async fn reload(&self) {
        self.sync_scope();
        let (ticket, user_id) = {
            let mut scope = self.scope();
            scope.ticket += 1;
            (scope.ticket, scope.user_id.clone())
        };

        let Some(user_id) = user_id else {
            self.snapshot.send_if_modified(|records| {
                let changed = !records.is_empty();
                records.clear();
                changed
            });
            self.state.send_replace(LoadState::Empty);
            return;
        };

        self.state.send_if_modified(|state| {
            let changed = *state != LoadState::Loading;
            *state = LoadState::Loading;
            changed
        });
        let result = self.gateway.list_in::<T>(&user_id, T::COLLECTION).await;

        let mut scope = self.scope();
        if scope.ticket != ticket {
            tracing::debug!(
                collection = T::COLLECTION,
                user_id = %user_id,
                ticket,
                latest = scope.ticket,
                "discarding stale reload"
            );
            return;
        }

        match result {
            Ok(mut records) => {
                let mut seen = HashSet::new();
                records.retain(|record| seen.insert(record.id().to_string()));
                T::sort_snapshot(&mut records);

                tracing::debug!(
                    collection = T::COLLECTION,
                    user_id = %user_id,
                    count = records.len(),
                    "snapshot reloaded"
                );
                scope.populated = true;
                self.snapshot.send_replace(records);
                self.state.send_replace(LoadState::Loaded);
            }
            Err(error) => {
                tracing::warn!(
                    collection = T::COLLECTION,
                    user_id = %user_id,
                    error = %error,
                    "reload failed"
                );
                let state = if scope.populated {
                    LoadState::Loaded
                } else {
                    self.snapshot.send_if_modified(|records| {
                        let changed = !records.is_empty();
                        records.clear();
                        changed
                    });
                    LoadState::Empty
                };
                self.state.send_replace(state);
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Validates and creates a record, then reloads.
    ///
    /// Returns the server-generated id. The record's own id is ignored.
    pub async fn add(&self, record: T) -> Result<String> {
        record.validate()?;
        self.sync_scope();

        match self.gateway.create(T::COLLECTION, &record).await {
            Ok(id) => {
                self.reload().await;
                Ok(id)
            }
            Err(error) => {
                tracing::warn!(collection = T::COLLECTION, error = %error, "add failed");
                Err(error.into())
            }
        }
    }

    /// Merges a partial record into an existing one, then reloads.
    pub async fn update<P: Serialize + ?Sized>(&self, id: &str, patch: &P) -> Result<()> {
        self.sync_scope();

        match self.gateway.update(T::COLLECTION, id, patch).await {
            Ok(()) => {
                self.reload().await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(collection = T::COLLECTION, id, error = %error, "update failed");
                Err(error.into())
            }
        }
    }

    /// Deletes a record, then reloads.
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.sync_scope();

        match self.gateway.delete(T::COLLECTION, id).await {
            Ok(()) => {
                self.reload().await;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(collection = T::COLLECTION, id, error = %error, "remove failed");
                Err(error.into())
            }
        }
    }

    /// Applies several patches in order, stopping at the first failure.
    ///
    /// Reloads once afterwards whether or not every write went through, and
    /// returns the first error.
    pub async fn batch_update<P: Serialize>(&self, patches: &[(String, P)]) -> Result<()> {
        self.sync_scope();

        let mut outcome = Ok(());
        for (id, patch) in patches {
            if let Err(error) = self.gateway.update(T::COLLECTION, id, patch).await {
                tracing::warn!(collection = T::COLLECTION, id = %id, error = %error, "batch update failed");
                outcome = Err(error.into());
                break;
            }
        }

        self.reload().await;
        outcome
    }

    // ------------------------------------------------------------------
    // Identity binding
    // ------------------------------------------------------------------

    /// Follows the identity stream until `shutdown` fires.
    ///
    /// Each change of user is applied to the scope synchronously and a
    /// reload is spawned for it, so clearing the snapshot never waits
    /// behind a reload that is still in flight.
    pub fn bind(self: &Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let collection = Arc::clone(self);
        let mut identity = collection.gateway.identity().subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = identity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let current = identity.borrow_and_update().clone();
                        collection.apply_identity(current.as_ref());

                        let reloader = Arc::clone(&collection);
                        tokio::spawn(async move { reloader.reload().await });
                    }
                    _ = shutdown.recv() => break,
                }
            }
            tracing::debug!(collection = T::COLLECTION, "identity binding stopped");
        })
    }
}

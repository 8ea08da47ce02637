//! Explicitly constructed application context.
//!
//! Everything the app needs is built once here and handed out from the
//! context: the identity stream, the auth provider, the gateway and every
//! service. Background tasks listen on one shutdown channel, and
//! [`AppContext::shutdown`] stops them and waits for them to finish.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use prodhub_core::auth::{generate_token, AuthProvider, Identity, SignInMethod};
use prodhub_core::clock::{Clock, SystemClock};
use prodhub_core::storage::{DocumentStore, StoreError};

use crate::config::{Config, StoreBackend};
use crate::gateway::RemoteStoreGateway;
use crate::identity::{IdentityStream, InMemoryAuthProvider};
use crate::presence::{CollaborationService, MemoryPresence};
use crate::scheduler::ReminderScheduler;
use crate::services::{CalendarService, JournalService, NoteService, NotificationService, TaskService};

#[cfg(feature = "inmemory")]
fn memory_store() -> Result<Arc<dyn DocumentStore>, StoreError> {
    Ok(Arc::new(crate::storage::InMemoryDocumentStore::new()))
}

#[cfg(not(feature = "inmemory"))]
fn memory_store() -> Result<Arc<dyn DocumentStore>, StoreError> {
    Err(StoreError::ConnectionFailed(
        "in-memory store not available: built without the 'inmemory' feature".to_string(),
    ))
}

#[cfg(feature = "sqlite")]
async fn sqlite_store(path: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let store = crate::storage::SqliteDocumentStore::new(path).await?;
    tracing::info!(path, "SQLite store opened");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn sqlite_store(_path: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
    Err(StoreError::ConnectionFailed(
        "SQLite store not available: built without the 'sqlite' feature".to_string(),
    ))
}

/// Shared application context.
pub struct AppContext {
    pub config: Config,
    pub identity: IdentityStream,
    pub auth: Arc<dyn AuthProvider>,
    pub gateway: RemoteStoreGateway,
    pub tasks: TaskService,
    pub notes: NoteService,
    pub journal: JournalService,
    pub calendar: CalendarService,
    pub notifications: NotificationService,
    pub collaboration: CollaborationService,
    clock: Arc<dyn Clock>,
    shutdown_tx: broadcast::Sender<()>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl AppContext {
    /// Opens the configured store and builds the context on the wall clock.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn from_config(config: Config) -> Result<Self, StoreError> {
        let store = match config.store_backend {
            StoreBackend::Memory => memory_store()?,
            StoreBackend::Sqlite => sqlite_store(&config.sqlite_path).await?,
        };
        tracing::info!(backend = %config.store_backend, "document store ready");
        Ok(Self::with_store(config, store, Arc::new(SystemClock)))
    }

    /// Builds the context over an existing store and binds every
    /// collection to the identity stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        let identity = IdentityStream::new();
        let gateway = RemoteStoreGateway::new(store, identity.clone(), Arc::clone(&clock));
        let (shutdown_tx, _) = broadcast::channel(1);

        let context = Self {
            auth: Arc::new(InMemoryAuthProvider::new(identity.clone())),
            tasks: TaskService::new(gateway.clone()),
            notes: NoteService::new(gateway.clone()),
            journal: JournalService::new(gateway.clone()),
            calendar: CalendarService::new(gateway.clone())
                .with_upcoming_days(config.upcoming_event_days),
            notifications: NotificationService::new(gateway.clone()),
            collaboration: CollaborationService::new(Arc::new(MemoryPresence::new()), gateway.clone()),
            config,
            identity,
            gateway,
            clock,
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        };

        let handles = vec![
            context.tasks.bind(context.subscribe_shutdown()),
            context.notes.bind(context.subscribe_shutdown()),
            context.journal.bind(context.subscribe_shutdown()),
            context.calendar.bind(context.subscribe_shutdown()),
            context.notifications.bind(context.subscribe_shutdown()),
            context.collaboration.bind(context.subscribe_shutdown()),
        ];
        context.track(handles);
        context
    }

    fn track(&self, handles: impl IntoIterator<Item = JoinHandle<()>>) {
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(handles);
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Acts as `user_id` without going through the auth provider.
    ///
    /// Used by the CLI, which runs on behalf of a user it trusts.
    pub fn assume_identity(&self, user_id: &str) {
        let identity = Identity::new(user_id, SignInMethod::Password, generate_token());
        self.identity.publish(Some(identity));
    }

    /// Reloads every collection now instead of waiting for the bindings.
    pub async fn reload_all(&self) {
        tokio::join!(
            self.tasks.reload(),
            self.notes.reload(),
            self.journal.reload(),
            self.calendar.reload(),
            self.notifications.reload(),
        );
        if let Err(error) = self.notifications.load_preferences().await {
            tracing::warn!(error = %error, "failed to load notification preferences");
        }
        if let Err(error) = self.collaboration.load_shares().await {
            tracing::warn!(error = %error, "failed to load share settings");
        }
    }

    pub fn scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(
            self.tasks.clone(),
            self.calendar.clone(),
            self.notifications.clone(),
            Arc::clone(&self.clock),
            self.config.notification_check_interval(),
        )
    }

    /// Starts the reminder scheduler in the background.
    pub fn start_scheduler(&self) {
        let handle = self.scheduler().spawn(self.subscribe_shutdown());
        self.track([handle]);
    }

    /// Signals every background task to stop and waits for them.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        let handles: Vec<_> = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        for handle in handles {
            if let Err(error) = handle.await {
                tracing::warn!(error = %error, "background task ended abnormally");
            }
        }
        if let Err(error) = self.collaboration.leave().await {
            tracing::debug!(error = %error, "presence leave on shutdown failed");
        }
        tracing::debug!("context shut down");
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use std::time::Duration;

    use prodhub_core::auth::Credentials;
    use prodhub_core::clock::ManualClock;
    use prodhub_core::sharing::{SharePermission, SharedResourceType};
    use prodhub_core::tasks::Task;

    use crate::collection::LoadState;
    use crate::storage::InMemoryDocumentStore;
    use crate::testing::{ten_am, wait_for};

    fn config() -> Config {
        Config {
            store_backend: StoreBackend::Memory,
            sqlite_path: "unused.db".to_string(),
            notification_check_interval_seconds: 60,
            upcoming_event_days: 7,
        }
    }

    fn context() -> AppContext {
        AppContext::with_store(
            config(),
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(ManualClock::new(ten_am())),
        )
    }

    #[tokio::test]
    async fn test_sign_in_loads_every_collection() {
        let context = context();
        let mut state = context.tasks.collection().observe_state();

        context
            .auth
            .register(&Credentials::new("ada@example.com", "secret1"))
            .await
            .unwrap();

        wait_for(&mut state, |s| *s == LoadState::Loaded).await;
        context.tasks.add(Task::new("first")).await.unwrap();
        assert_eq!(context.tasks.all().len(), 1);

        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_sign_out_clears_snapshots() {
        let context = context();
        context.assume_identity("u1");
        context.reload_all().await;
        context.tasks.add(Task::new("mine")).await.unwrap();
        let mut tasks = context.tasks.observe();

        context.auth.sign_out().await.unwrap();

        wait_for(&mut tasks, |t| t.is_empty()).await;
        context.shutdown().await;
    }

    #[tokio::test]
    async fn test_sign_in_loads_saved_shares() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let clock = Arc::new(ManualClock::new(ten_am()));
        let first = AppContext::with_store(config(), store.clone(), clock.clone());
        first.assume_identity("u1");
        first
            .collaboration
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::View)
            .await
            .unwrap();
        first.shutdown().await;

        let second = AppContext::with_store(config(), store, clock);
        let mut shares = second.collaboration.observe_shares();
        second.assume_identity("u1");

        let loaded = wait_for(&mut shares, |s| s.len() == 1).await;
        assert_eq!(loaded[0].resource_id, "n1");
        second.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_background_tasks() {
        let context = context();
        context.start_scheduler();

        tokio::time::timeout(Duration::from_secs(2), context.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let context = AppContext::from_config(config()).await.unwrap();

        assert!(context.identity.current().is_none());
        context.shutdown().await;
    }
}

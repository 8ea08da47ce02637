use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use prodhub_core::notifications::{
    by_kind, by_priority, unread, unread_count, Notification, NotificationKind,
    NotificationPreferences, NotificationStatus, ReminderWindow, UpdateNotificationRequest,
    UpdatePreferencesRequest, PREFERENCES_COLLECTION, PREFERENCES_DOCUMENT_ID,
};
use prodhub_core::tasks::Priority;
use prodhub_core::views;

use super::owned;
use crate::collection::CachedCollection;
use crate::error::Result;
use crate::gateway::RemoteStoreGateway;

/// Notifications of the signed-in user, plus their notification
/// preferences.
///
/// Preferences live in a single document and are cached in a watch
/// channel of their own. They fall back to the defaults when the user has
/// never saved any, and reset to the defaults on logout.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<CachedCollection<Notification>>,
    preferences: Arc<watch::Sender<NotificationPreferences>>,
    /// Bumped on every identity change; a preferences load that started
    /// under an older value is dropped.
    generation: Arc<AtomicU64>,
}

impl NotificationService {
    pub fn new(gateway: RemoteStoreGateway) -> Self {
        let (preferences, _) = watch::channel(NotificationPreferences::default());
        Self {
            notifications: Arc::new(CachedCollection::new(gateway)),
            preferences: Arc::new(preferences),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn collection(&self) -> &Arc<CachedCollection<Notification>> {
        &self.notifications
    }

    fn gateway(&self) -> &RemoteStoreGateway {
        self.notifications.gateway()
    }

    /// Follows the identity stream for both the notifications and the
    /// preferences document.
    pub fn bind(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let collection = self.notifications.bind(shutdown.resubscribe());
        let mut identity = self.gateway().identity().subscribe();
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = identity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let signed_in = identity.borrow_and_update().is_some();
                        service.generation.fetch_add(1, Ordering::SeqCst);
                        if !signed_in {
                            service.preferences.send_replace(NotificationPreferences::default());
                            continue;
                        }

                        let loader = service.clone();
                        tokio::spawn(async move {
                            if let Err(error) = loader.load_preferences().await {
                                tracing::warn!(error = %error, "failed to load notification preferences");
                            }
                        });
                    }
                    _ = shutdown.recv() => break,
                }
            }
            if let Err(error) = collection.await {
                tracing::warn!(error = %error, "notification collection binding ended abnormally");
            }
        })
    }

    pub fn observe(&self) -> watch::Receiver<Vec<Notification>> {
        self.notifications.observe()
    }

    pub async fn reload(&self) {
        self.notifications.reload().await
    }

    // ==================== Mutations ====================

    /// Stores a new notification as unread.
    pub async fn add(&self, mut notification: Notification) -> Result<String> {
        notification.status = NotificationStatus::Unread;
        notification.read_at = None;
        notification.dismissed_at = None;
        self.notifications.add(notification).await
    }

    pub async fn update(&self, id: &str, request: &UpdateNotificationRequest) -> Result<()> {
        self.notifications.update(id, request).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.notifications.remove(id).await
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<()> {
        let now = self.gateway().clock().now();
        self.update(id, &UpdateNotificationRequest::mark_read(now))
            .await
    }

    /// Marks every unread notification as read, stopping at the first
    /// failed write.
    pub async fn mark_all_as_read(&self) -> Result<()> {
        let now = self.gateway().clock().now();
        let patches: Vec<(String, UpdateNotificationRequest)> = self
            .unread()
            .into_iter()
            .map(|n| (n.id, UpdateNotificationRequest::mark_read(now)))
            .collect();
        if patches.is_empty() {
            return Ok(());
        }
        self.notifications.batch_update(&patches).await
    }

    pub async fn dismiss(&self, id: &str) -> Result<()> {
        let now = self.gateway().clock().now();
        self.update(id, &UpdateNotificationRequest::dismiss(now))
            .await
    }

    // ==================== Preferences ====================

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences.borrow().clone()
    }

    pub fn observe_preferences(&self) -> watch::Receiver<NotificationPreferences> {
        let mut rx = self.preferences.subscribe();
        rx.mark_changed();
        rx
    }

    /// Fetches the preferences document, falling back to the defaults
    /// when none has been saved.
    pub async fn load_preferences(&self) -> Result<NotificationPreferences> {
        let generation = self.generation.load(Ordering::SeqCst);
        let stored = self
            .gateway()
            .get::<NotificationPreferences>(PREFERENCES_COLLECTION, PREFERENCES_DOCUMENT_ID)
            .await?;
        let preferences = stored.unwrap_or_default();

        if self.generation.load(Ordering::SeqCst) == generation {
            self.preferences.send_replace(preferences.clone());
        } else {
            tracing::debug!("discarding superseded preferences load");
        }
        Ok(preferences)
    }

    /// Applies a change to the current preferences and saves the result.
    ///
    /// Quiet hours must parse as `HH:mm`.
    pub async fn update_preferences(&self, request: UpdatePreferencesRequest) -> Result<NotificationPreferences> {
        let mut preferences = self.preferences();
        request.apply_to(&mut preferences);
        ReminderWindow::from_preferences(&preferences)?;

        self.gateway()
            .put(PREFERENCES_COLLECTION, PREFERENCES_DOCUMENT_ID, &preferences)
            .await
            .inspect_err(|error| {
                tracing::warn!(error = %error, "failed to save notification preferences");
            })?;
        // Loads already in flight read the document before this write.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.load_preferences().await
    }

    // ==================== Views ====================

    pub fn all(&self) -> Vec<Notification> {
        self.notifications.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Notification> {
        self.notifications
            .with_snapshot(|notifications| views::find_by_id(notifications, id).cloned())
    }

    pub fn unread(&self) -> Vec<Notification> {
        self.notifications
            .with_snapshot(|notifications| owned(unread(notifications)))
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.with_snapshot(unread_count)
    }

    pub fn by_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.notifications
            .with_snapshot(|notifications| owned(by_kind(notifications, kind)))
    }

    pub fn by_priority(&self, priority: Priority) -> Vec<Notification> {
        self.notifications
            .with_snapshot(|notifications| owned(by_priority(notifications, priority)))
    }
}

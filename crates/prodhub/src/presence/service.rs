//! Collaborators present on a shared resource, and who it is shared with.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use prodhub_core::sharing::{
    remove_share, resource_shares, share_resource, CollaborationUser, PresenceEvent,
    PresenceState, PresenceUser, SharePermission, SharedResourceType, ShareSettings,
    SHARES_COLLECTION,
};

use super::{PresenceError, PresenceTransport, Result};
use crate::gateway::RemoteStoreGateway;

type Collaborators = BTreeMap<u64, CollaborationUser>;

struct Session {
    room: String,
    state: PresenceState,
    listener: JoinHandle<()>,
}

/// Tracks the other clients in a presence room and the share settings of
/// the user's resources.
///
/// A service is in at most one room at a time. Its own client never shows
/// up among the collaborators. Share settings are stored one document per
/// resource and follow the identity stream like any other collection.
#[derive(Clone)]
pub struct CollaborationService {
    transport: Arc<dyn PresenceTransport>,
    gateway: RemoteStoreGateway,
    client_id: u64,
    collaborators: Arc<watch::Sender<Collaborators>>,
    shares: Arc<watch::Sender<Vec<ShareSettings>>>,
    /// Bumped on every identity change and every saved edit; a shares load
    /// that started under an older value is dropped.
    generation: Arc<AtomicU64>,
    session: Arc<Mutex<Option<Session>>>,
}

impl CollaborationService {
    pub fn new(transport: Arc<dyn PresenceTransport>, gateway: RemoteStoreGateway) -> Self {
        let (collaborators, _) = watch::channel(Collaborators::new());
        let (shares, _) = watch::channel(Vec::new());
        Self {
            transport,
            gateway,
            client_id: rand::random(),
            collaborators: Arc::new(collaborators),
            shares: Arc::new(shares),
            generation: Arc::new(AtomicU64::new(0)),
            session: Arc::new(Mutex::new(None)),
        }
    }

    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ==================== Presence ====================

    /// Enters `room`, leaving any previous one, and announces `user`.
    ///
    /// Members already in the room answer a newcomer by announcing
    /// themselves again, so a late joiner sees everyone.
    pub async fn join(&self, room: &str, user: PresenceUser) -> Result<()> {
        self.leave().await?;

        let mut events = self.transport.subscribe(room).await?;
        let service = self.clone();
        let room_name = room.to_string();
        let listener = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if apply_event(&service.collaborators, service.client_id, event) {
                            service.announce(&room_name).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(room = %room_name, skipped, "presence listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let state = PresenceState::new(self.client_id).with_user(user);
        *self.session() = Some(Session {
            room: room.to_string(),
            state: state.clone(),
            listener,
        });
        tracing::debug!(room, client_id = self.client_id, "joined presence room");
        self.transport
            .broadcast(room, PresenceEvent::Update(state))
            .await
    }

    /// Re-broadcasts our state if we are still in `room`.
    async fn announce(&self, room: &str) {
        let state = {
            let session = self.session();
            match session.as_ref() {
                Some(session) if session.room == room => session.state.clone(),
                _ => return,
            }
        };
        if let Err(error) = self
            .transport
            .broadcast(room, PresenceEvent::Update(state))
            .await
        {
            tracing::warn!(room, error = %error, "failed to announce presence");
        }
    }

    /// Announces a new cursor position in the current room.
    pub async fn update_cursor(&self, x: f64, y: f64) -> Result<()> {
        let (room, state) = {
            let mut session = self.session();
            let session = session.as_mut().ok_or(PresenceError::NotJoined)?;
            session.state = session.state.clone().with_cursor(x, y);
            (session.room.clone(), session.state.clone())
        };
        self.transport
            .broadcast(&room, PresenceEvent::Update(state))
            .await
    }

    /// Leaves the current room, if any, and forgets its collaborators.
    pub async fn leave(&self) -> Result<()> {
        let Some(session) = self.session().take() else {
            return Ok(());
        };
        session.listener.abort();
        // The listener owns our subscription; wait for it to drop.
        let _ = session.listener.await;
        self.collaborators.send_replace(Collaborators::new());

        tracing::debug!(room = %session.room, client_id = self.client_id, "left presence room");
        self.transport
            .broadcast(
                &session.room,
                PresenceEvent::Leave {
                    client_id: self.client_id,
                },
            )
            .await
    }

    pub fn collaborators(&self) -> Vec<CollaborationUser> {
        self.collaborators.borrow().values().cloned().collect()
    }

    pub fn observe_collaborators(&self) -> watch::Receiver<Vec<CollaborationUser>> {
        let (tx, rx) = watch::channel(self.collaborators());
        let mut source = self.collaborators.subscribe();
        tokio::spawn(async move {
            while source.changed().await.is_ok() {
                let current: Vec<_> = source.borrow_and_update().values().cloned().collect();
                if tx.send(current).is_err() {
                    break;
                }
            }
        });
        rx
    }

    // ==================== Sharing ====================

    /// Reloads the share settings whenever the identity changes and clears
    /// them on logout.
    pub fn bind(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let mut identity = self.gateway.identity().subscribe();
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
                            service.shares.send_replace(Vec::new());
                            continue;
                        }

                        let loader = service.clone();
                        tokio::spawn(async move {
                            if let Err(error) = loader.load_shares().await {
                                tracing::warn!(error = %error, "failed to load share settings");
                            }
                        });
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }

    /// Fetches every share settings document of the signed-in user.
    pub async fn load_shares(&self) -> crate::error::Result<Vec<ShareSettings>> {
        let generation = self.generation.load(Ordering::SeqCst);
        let stored = self
            .gateway
            .list::<ShareSettings>(SHARES_COLLECTION)
            .await?;

        if self.generation.load(Ordering::SeqCst) == generation {
            self.shares.send_replace(stored.clone());
        } else {
            tracing::debug!("discarding superseded share settings load");
        }
        Ok(stored)
    }

    /// Grants `email` access to a resource and saves its settings.
    pub async fn share(
        &self,
        resource_id: &str,
        resource_type: SharedResourceType,
        email: &str,
        permission: SharePermission,
    ) -> crate::error::Result<()> {
        let now = self.gateway.clock().now();
        let mut settings = self.shares();
        share_resource(&mut settings, resource_id, resource_type, email, permission, now);
        self.save(settings, resource_id).await
    }

    /// Revokes `email`'s access to a resource.
    ///
    /// Returns false, without writing, when `email` had no access.
    pub async fn unshare(&self, resource_id: &str, email: &str) -> crate::error::Result<bool> {
        let now = self.gateway.clock().now();
        let mut settings = self.shares();
        if !remove_share(&mut settings, resource_id, email, now) {
            return Ok(false);
        }
        self.save(settings, resource_id).await?;
        Ok(true)
    }

    /// Writes the settings of `resource_id` and publishes the edited list
    /// once the write succeeded.
    async fn save(&self, settings: Vec<ShareSettings>, resource_id: &str) -> crate::error::Result<()> {
        if let Some(changed) = resource_shares(&settings, resource_id) {
            self.gateway
                .put(SHARES_COLLECTION, &changed.id, changed)
                .await
                .inspect_err(|error| {
                    tracing::warn!(resource_id, error = %error, "failed to save share settings");
                })?;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.shares.send_replace(settings);
        Ok(())
    }

    pub fn shares(&self) -> Vec<ShareSettings> {
        self.shares.borrow().clone()
    }

    pub fn shares_for(&self, resource_id: &str) -> Option<ShareSettings> {
        resource_shares(&self.shares.borrow(), resource_id).cloned()
    }

    pub fn observe_shares(&self) -> watch::Receiver<Vec<ShareSettings>> {
        let mut rx = self.shares.subscribe();
        rx.mark_changed();
        rx
    }
}

/// Folds one event into the collaborator map.
///
/// Returns true when the event announced a client we had not seen yet.
fn apply_event(collaborators: &watch::Sender<Collaborators>, own_id: u64, event: PresenceEvent) -> bool {
    match event {
        PresenceEvent::Update(state) if state.client_id != own_id => {
            let mut newcomer = false;
            collaborators.send_modify(|present| {
                newcomer = present
                    .insert(state.client_id, CollaborationUser::from(&state))
                    .is_none();
            });
            newcomer
        }
        PresenceEvent::Leave { client_id } if client_id != own_id => {
            collaborators.send_if_modified(|present| present.remove(&client_id).is_some());
            false
        }
        _ => false,
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use std::time::Duration;

    use prodhub_core::sharing::ANONYMOUS_EMAIL;

    use crate::presence::MemoryPresence;
    use crate::testing::{wait_for, Harness};

    fn service(presence: &MemoryPresence) -> CollaborationService {
        CollaborationService::new(Arc::new(presence.clone()), Harness::new().gateway)
    }

    fn user(email: &str) -> PresenceUser {
        PresenceUser {
            email: Some(email.to_string()),
            name: None,
            color: Some("#ff0000".to_string()),
        }
    }

    // ==================== Presence Tests ====================

    #[tokio::test]
    async fn test_collaborators_see_each_other() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);
        let bob = service(&presence);
        let mut alice_view = alice.observe_collaborators();

        alice.join("note-1", user("alice@example.com")).await.unwrap();
        bob.join("note-1", user("bob@example.com")).await.unwrap();

        let seen = wait_for(&mut alice_view, |c| c.len() == 1).await;
        assert_eq!(seen[0].email, "bob@example.com");
        assert_eq!(seen[0].id, bob.client_id().to_string());
        assert!(alice.collaborators().iter().all(|c| c.id != alice.client_id().to_string()));
    }

    #[tokio::test]
    async fn test_late_joiner_sees_existing_members() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);
        let bob = service(&presence);
        let carol = service(&presence);
        alice.join("note-1", user("alice@example.com")).await.unwrap();
        bob.join("note-1", user("bob@example.com")).await.unwrap();
        let mut carol_view = carol.observe_collaborators();

        carol.join("note-1", user("carol@example.com")).await.unwrap();

        let seen = wait_for(&mut carol_view, |c| c.len() == 2).await;
        let mut emails: Vec<_> = seen.iter().map(|c| c.email.as_str()).collect();
        emails.sort();
        assert_eq!(emails, ["alice@example.com", "bob@example.com"]);
    }

    #[tokio::test]
    async fn test_known_members_do_not_reannounce_on_cursor_moves() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);
        let bob = service(&presence);
        let mut bob_view = bob.observe_collaborators();
        alice.join("doc", user("alice@example.com")).await.unwrap();
        bob.join("doc", user("bob@example.com")).await.unwrap();
        wait_for(&mut bob_view, |c| c.len() == 1).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut observer = presence.subscribe("doc").await.unwrap();

        bob.update_cursor(1.0, 1.0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(matches!(observer.try_recv(), Ok(PresenceEvent::Update(s)) if s.client_id == bob.client_id()));
        assert!(observer.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cursor_updates_and_leave() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);
        let bob = service(&presence);
        let mut alice_view = alice.observe_collaborators();
        alice.join("doc", user("alice@example.com")).await.unwrap();
        bob.join("doc", PresenceUser::default()).await.unwrap();

        bob.update_cursor(3.0, 4.0).await.unwrap();
        let seen = wait_for(&mut alice_view, |c| c.first().is_some_and(|u| u.cursor.is_some())).await;
        assert_eq!(seen[0].email, ANONYMOUS_EMAIL);

        bob.leave().await.unwrap();
        wait_for(&mut alice_view, |c| c.is_empty()).await;
    }

    #[tokio::test]
    async fn test_cursor_requires_room() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);

        assert_eq!(alice.update_cursor(0.0, 0.0).await, Err(PresenceError::NotJoined));
        assert!(alice.leave().await.is_ok());
    }

    #[tokio::test]
    async fn test_leaving_stops_listening() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);
        let bob = service(&presence);
        alice.join("doc", user("alice@example.com")).await.unwrap();
        alice.leave().await.unwrap();

        bob.join("doc", user("bob@example.com")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(alice.collaborators().is_empty());
    }

    #[tokio::test]
    async fn test_last_leave_frees_the_room() {
        let presence = MemoryPresence::new();
        let alice = service(&presence);
        let bob = service(&presence);
        alice.join("doc", user("alice@example.com")).await.unwrap();
        bob.join("doc", user("bob@example.com")).await.unwrap();

        alice.leave().await.unwrap();
        assert_eq!(presence.room_count().await, 1);
        bob.leave().await.unwrap();

        assert_eq!(presence.room_count().await, 0);
    }

    // ==================== Sharing Tests ====================

    fn sharing(harness: &Harness) -> CollaborationService {
        CollaborationService::new(Arc::new(MemoryPresence::new()), harness.gateway.clone())
    }

    #[tokio::test]
    async fn test_share_and_unshare() {
        let harness = Harness::new();
        harness.sign_in("u1");
        let alice = sharing(&harness);

        alice
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::View)
            .await
            .unwrap();
        alice
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::Edit)
            .await
            .unwrap();

        let settings = alice.shares_for("n1").unwrap();
        assert_eq!(settings.shared_with.len(), 1);
        assert_eq!(settings.permission_for("bob@example.com"), Some(SharePermission::Edit));

        assert!(alice.unshare("n1", "bob@example.com").await.unwrap());
        assert!(!alice.unshare("n1", "bob@example.com").await.unwrap());
        assert!(alice.shares_for("missing").is_none());
    }

    #[tokio::test]
    async fn test_shares_survive_a_new_service() {
        let harness = Harness::new();
        harness.sign_in("u1");
        let first = sharing(&harness);
        first
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::Edit)
            .await
            .unwrap();
        first
            .share("t1", SharedResourceType::Task, "carol@example.com", SharePermission::View)
            .await
            .unwrap();
        first.unshare("t1", "carol@example.com").await.unwrap();

        let second = sharing(&harness);
        let loaded = second.load_shares().await.unwrap();

        assert_eq!(loaded.len(), 2);
        let note = second.shares_for("n1").unwrap();
        assert_eq!(note.resource_type, SharedResourceType::Note);
        assert_eq!(note.permission_for("bob@example.com"), Some(SharePermission::Edit));
        assert!(second.shares_for("t1").unwrap().shared_with.is_empty());
    }

    #[tokio::test]
    async fn test_shares_follow_identity() {
        let harness = Harness::new();
        harness.sign_in("u1");
        let writer = sharing(&harness);
        writer
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::View)
            .await
            .unwrap();
        harness.sign_out();

        let (shutdown_tx, _) = broadcast::channel(1);
        let reader = sharing(&harness);
        let handle = reader.bind(shutdown_tx.subscribe());
        let mut shares = reader.observe_shares();

        harness.sign_in("u1");
        wait_for(&mut shares, |s| s.len() == 1).await;

        harness.sign_in("u2");
        wait_for(&mut shares, |s| s.is_empty()).await;

        harness.sign_in("u1");
        wait_for(&mut shares, |s| s.len() == 1).await;
        harness.sign_out();
        wait_for(&mut shares, |s| s.is_empty()).await;

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_shares() {
        let harness = Harness::new();
        harness.sign_in("u1");
        let alice = sharing(&harness);
        harness.store.fail_writes(true);

        let result = alice
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::View)
            .await;

        assert!(result.is_err());
        assert!(alice.shares().is_empty());
    }

    #[tokio::test]
    async fn test_share_requires_sign_in() {
        let harness = Harness::new();
        let alice = sharing(&harness);

        let error = alice
            .share("n1", SharedResourceType::Note, "bob@example.com", SharePermission::View)
            .await
            .unwrap_err();

        assert!(error.is_not_authenticated());
    }
}

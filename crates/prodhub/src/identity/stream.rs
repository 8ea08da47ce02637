use std::sync::Arc;

use prodhub_core::auth::Identity;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Replay-latest stream of the current identity.
///
/// Subscribers see the current value first and then every change of user.
/// `None` means nobody is signed in. Publishing a refreshed token for the
/// same user stores it without waking subscribers.
#[derive(Debug, Clone)]
pub struct IdentityStream {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl IdentityStream {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// The identity right now.
    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|identity| identity.user_id.clone())
    }

    /// A receiver whose first `changed()` resolves immediately with the
    /// current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        rx
    }

    /// The identity as a stream, starting with the current value.
    pub fn stream(&self) -> WatchStream<Option<Identity>> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Replaces the current identity.
    ///
    /// Returns true when subscribers were notified, i.e. the signed-in user
    /// actually changed.
    pub fn publish(&self, identity: Option<Identity>) -> bool {
        self.tx.send_if_modified(move |current| {
            let changed = match (current.as_ref(), identity.as_ref()) {
                (Some(old), Some(new)) => !old.same_user(new),
                (None, None) => false,
                _ => true,
            };
            *current = identity;
            if changed {
                tracing::debug!(
                    user_id = current.as_ref().map(|i| i.user_id.as_str()).unwrap_or("-"),
                    "identity changed"
                );
            }
            changed
        })
    }
}

impl Default for IdentityStream {
    fn default() -> Self {
        Self::new()
    }
}

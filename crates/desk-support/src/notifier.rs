//! Change notifiers: where view invalidations go after a mutation.

use std::collections::BTreeSet;

use desk_core::errors::NotifyError;
use desk_core::ports::{ChangeNotifier, ViewKey};
use tokio::sync::broadcast;

/// Logs each invalidated view at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    async fn invalidate(&self, keys: &BTreeSet<ViewKey>) -> Result<(), NotifyError> {
        for key in keys {
            tracing::info!(view = %key, "view invalidated");
        }
        Ok(())
    }
}

/// Fans invalidations out to every subscribed cache owner.
///
/// Having no subscribers is not an error: nothing is cached, so nothing is
/// stale. A subscriber that falls more than `capacity` batches behind sees
/// `RecvError::Lagged` and should drop its whole cache.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<BTreeSet<ViewKey>>,
}

impl BroadcastNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BTreeSet<ViewKey>> {
        self.sender.subscribe()
    }
}

impl ChangeNotifier for BroadcastNotifier {
    async fn invalidate(&self, keys: &BTreeSet<ViewKey>) -> Result<(), NotifyError> {
        match self.sender.send(keys.clone()) {
            Ok(receivers) => {
                tracing::trace!(receivers, views = keys.len(), "invalidation broadcast");
            }
            Err(_) => tracing::trace!("no invalidation subscribers"),
        }
        Ok(())
    }
}

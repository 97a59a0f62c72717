//! In-process usage bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use homeflux_domain::error::HomeFluxError;
use homeflux_domain::usage::UsageUpdate;

use crate::ports::UsagePublisher;

/// In-process usage bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the reading is simply dropped).
pub struct UsageBus {
    sender: broadcast::Sender<UsageUpdate>,
}

impl UsageBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to readings on this bus.
    ///
    /// Returns a receiver that will get all readings published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UsageUpdate> {
        self.sender.subscribe()
    }
}

impl UsagePublisher for UsageBus {
    fn publish(&self, update: UsageUpdate) -> impl Future<Output = Result<(), HomeFluxError>> + Send {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — the reading is simply dropped.
        let _ = self.sender.send(update);
        async { Ok(()) }
    }
}

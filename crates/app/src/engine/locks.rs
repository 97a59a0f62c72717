//! Per-device locks serializing state mutations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use homeflux_domain::id::DeviceId;

/// Registry of per-device `tokio::sync::Mutex`es.
///
/// Concurrent actors (engine passes, mode activation, undo) each take the
/// lock for the device they are about to mutate. There is deliberately no
/// home-wide lock; actions on different devices proceed in parallel.
#[derive(Default)]
pub struct DeviceLocks {
    locks: Mutex<HashMap<DeviceId, Arc<tokio::sync::Mutex<()>>>>,
}

impl DeviceLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock guarding one device, created on first use.
    #[must_use]
    pub fn for_device(&self, device_id: DeviceId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(device_id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_hand_out_the_same_lock_for_the_same_device() {
        let locks = DeviceLocks::new();
        let id = DeviceId::new();

        let first = locks.for_device(id);
        let second = locks.for_device(id);

        let _guard = first.lock().await;
        assert!(second.try_lock().is_err());
    }

    #[tokio::test]
    async fn should_not_block_across_different_devices() {
        let locks = DeviceLocks::new();

        let a = locks.for_device(DeviceId::new());
        let b = locks.for_device(DeviceId::new());

        let _guard_a = a.lock().await;
        assert!(b.try_lock().is_ok());
    }
}

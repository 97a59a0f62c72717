//! Mode activation — best-effort one-tap batches with a single log entry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use homeflux_domain::error::{HomeFluxError, InvalidStateError};
use homeflux_domain::id::{DeviceId, HomeId};
use homeflux_domain::log::{EstimatedImpact, ExecutionLogEntry, LoggedAction, SkipReason};
use homeflux_domain::mode::ModeId;
use homeflux_domain::rule::ActionKind;

use crate::engine::locks::DeviceLocks;
use crate::ports::{DeviceGateway, ExecutionLog};

/// Applies a mode preset to a home's device fleet.
///
/// The batch is best-effort: unreachable devices are logged and skipped
/// while the rest of the batch proceeds. Exactly one combined log entry is
/// appended whose `action.devices` records the devices actually switched
/// off — the set an undo must bring back.
pub struct ModeActivator<G, L> {
    gateway: G,
    log: L,
    locks: Arc<DeviceLocks>,
    action_timeout: Duration,
    pending: Mutex<HashSet<HomeId>>,
}

impl<G, L> ModeActivator<G, L>
where
    G: DeviceGateway,
    L: ExecutionLog,
{
    pub fn new(gateway: G, log: L, locks: Arc<DeviceLocks>, action_timeout: Duration) -> Self {
        Self {
            gateway,
            log,
            locks,
            action_timeout,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Activate a mode for a home.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFluxError::InvalidState`] when a batch for the same
    /// home is still in flight, or a gateway/log error when reading the
    /// fleet or appending the entry fails. Per-device failures inside the
    /// batch are not errors.
    #[tracing::instrument(skip(self))]
    pub async fn activate(
        &self,
        home_id: HomeId,
        mode: ModeId,
    ) -> Result<ExecutionLogEntry, HomeFluxError> {
        let _pending = PendingGuard::acquire(&self.pending, home_id)?;

        let devices = self.gateway.devices(home_id).await?;
        let tariff_rate = self.gateway.tariff_rate(home_id).await?;
        let targets = mode.targets(&devices);
        let definition = mode.definition();

        if targets.is_empty() {
            let entry = ExecutionLogEntry::skipped(
                home_id,
                None,
                LoggedAction {
                    kind: ActionKind::SetMode { mode },
                    devices: Vec::new(),
                },
                SkipReason::NoOp,
                format!("mode '{}': no eligible devices to switch off", definition.name),
            );
            return self.log.append(entry).await;
        }

        let mut changed: Vec<DeviceId> = Vec::new();
        let mut savings_per_hour = 0.0;
        for device_id in &targets {
            let lock = self.locks.for_device(*device_id);
            let _guard = lock.lock().await;

            let result = tokio::time::timeout(
                self.action_timeout,
                self.gateway.set_device_state(*device_id, false),
            )
            .await;
            match result {
                Ok(Ok(())) => {
                    changed.push(*device_id);
                    savings_per_hour += devices
                        .iter()
                        .find(|d| d.id == *device_id)
                        .map_or(0.0, |d| d.estimated_savings_per_hour(tariff_rate));
                }
                Ok(Err(error)) => {
                    tracing::warn!(device_id = %device_id, %error, "mode batch skipped device");
                }
                Err(_elapsed) => {
                    tracing::warn!(device_id = %device_id, "mode batch timed out on device");
                }
            }
        }

        let entry = if changed.is_empty() {
            ExecutionLogEntry::skipped(
                home_id,
                None,
                LoggedAction {
                    kind: ActionKind::SetMode { mode },
                    devices: Vec::new(),
                },
                SkipReason::DeviceUpdateFailed,
                format!(
                    "mode '{}': none of {} targeted devices could be reached",
                    definition.name,
                    targets.len()
                ),
            )
        } else {
            ExecutionLogEntry::executed(
                home_id,
                None,
                LoggedAction {
                    kind: ActionKind::SetMode { mode },
                    devices: changed.clone(),
                },
                format!(
                    "mode '{}' activated: switched off {} of {} targeted devices",
                    definition.name,
                    changed.len(),
                    targets.len()
                ),
                EstimatedImpact {
                    affected_devices: changed.len(),
                    savings_per_hour,
                },
            )
        };
        self.log.append(entry).await
    }
}

/// Removes the home from the pending set when the batch finishes,
/// successfully or not.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<HomeId>>,
    home_id: HomeId,
}

impl<'a> PendingGuard<'a> {
    fn acquire(
        pending: &'a Mutex<HashSet<HomeId>>,
        home_id: HomeId,
    ) -> Result<Self, HomeFluxError> {
        let mut set = pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(home_id) {
            return Err(InvalidStateError::ModeActivationPending.into());
        }
        Ok(Self { pending, home_id })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.home_id);
    }
}

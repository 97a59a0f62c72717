//! Device gateway port — the engine's only window onto real devices.

use std::future::Future;

use homeflux_domain::device::DeviceSnapshot;
use homeflux_domain::error::HomeFluxError;
use homeflux_domain::id::{DeviceId, HomeId};

/// Read device snapshots and drive on/off state.
///
/// `set_device_state` is the single mutation the engine performs; everything
/// else about a device is owned by the device subsystem behind this port.
pub trait DeviceGateway {
    /// Snapshot of every device registered to a home.
    fn devices(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<Vec<DeviceSnapshot>, HomeFluxError>> + Send;

    /// Drive a device into the given on/off state.
    ///
    /// Implementations must be idempotent: setting a device to the state it
    /// is already in succeeds without side effects.
    fn set_device_state(
        &self,
        device_id: DeviceId,
        active: bool,
    ) -> impl Future<Output = Result<(), HomeFluxError>> + Send;

    /// The home's flat per-kWh tariff rate, used for savings estimates.
    fn tariff_rate(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<f64, HomeFluxError>> + Send;
}

//! # homeflux-adapter-virtual
//!
//! Virtual device gateway that simulates a small home fleet for testing
//! and demonstration.
//!
//! ## Provided devices (demo fleet)
//!
//! | Device | Kind | Essential | Rated power |
//! |--------|------|-----------|-------------|
//! | Living Room Lights | lighting | no | 120 W |
//! | Television | entertainment | no | 150 W |
//! | Heat Pump | hvac | no | 2200 W |
//! | Water Heater | water_heater | no | 1800 W |
//! | Fridge | appliance | yes | 150 W |
//! | Washing Machine | appliance | no | 900 W |
//!
//! Reachability can be toggled per device to exercise the failure path,
//! and [`VirtualHomeGateway::advance`] simulates energy accumulation so a
//! driver task can feed the usage bus.
//!
//! ## Dependency rule
//!
//! Depends on `homeflux-app` (port traits) and `homeflux-domain` only.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use homeflux_app::ports::DeviceGateway;
use homeflux_domain::device::{AutomationSettings, DeviceKind, DeviceSnapshot};
use homeflux_domain::error::{DeviceUnavailableError, HomeFluxError, NotFoundError};
use homeflux_domain::id::{DeviceId, HomeId};
use homeflux_domain::time;
use homeflux_domain::usage::UsageUpdate;

struct SimulatedDevice {
    snapshot: DeviceSnapshot,
    accumulated_kwh_today: f64,
    reachable: bool,
}

struct Inner {
    devices: Vec<SimulatedDevice>,
    tariff_rate: f64,
}

/// Simulated device gateway for one home.
///
/// Cheaply cloneable handle over shared state, so the engine worker, the
/// HTTP layer, and the simulation driver see the same fleet.
#[derive(Clone)]
pub struct VirtualHomeGateway {
    home_id: HomeId,
    inner: Arc<Mutex<Inner>>,
}

impl VirtualHomeGateway {
    /// An empty fleet with the given tariff rate.
    #[must_use]
    pub fn new(home_id: HomeId, tariff_rate: f64) -> Self {
        Self {
            home_id,
            inner: Arc::new(Mutex::new(Inner {
                devices: Vec::new(),
                tariff_rate,
            })),
        }
    }

    /// The demo fleet used by the daemon's simulation mode.
    #[must_use]
    pub fn demo_home(home_id: HomeId, tariff_rate: f64) -> Self {
        let gateway = Self::new(home_id, tariff_rate);
        gateway.register("Living Room Lights", DeviceKind::Lighting, false, 120.0, true);
        gateway.register("Television", DeviceKind::Entertainment, false, 150.0, true);
        gateway.register("Heat Pump", DeviceKind::Hvac, false, 2200.0, true);
        gateway.register("Water Heater", DeviceKind::WaterHeater, false, 1800.0, true);
        gateway.register("Fridge", DeviceKind::Appliance, true, 150.0, true);
        gateway.register("Washing Machine", DeviceKind::Appliance, false, 900.0, false);
        gateway
    }

    /// Add a simulated device and return its id.
    pub fn register(
        &self,
        name: &str,
        kind: DeviceKind,
        essential: bool,
        rated_power_w: f64,
        active: bool,
    ) -> DeviceId {
        self.register_with_settings(
            name,
            kind,
            essential,
            rated_power_w,
            active,
            AutomationSettings::default(),
        )
    }

    /// Add a simulated device with explicit automation settings.
    pub fn register_with_settings(
        &self,
        name: &str,
        kind: DeviceKind,
        essential: bool,
        rated_power_w: f64,
        active: bool,
        settings: AutomationSettings,
    ) -> DeviceId {
        let id = DeviceId::new();
        self.lock().devices.push(SimulatedDevice {
            snapshot: DeviceSnapshot {
                id,
                home_id: self.home_id,
                name: name.to_string(),
                kind,
                essential,
                is_active: active,
                current_power_w: if active { rated_power_w } else { 0.0 },
                rated_power_w,
                settings,
            },
            accumulated_kwh_today: 0.0,
            reachable: true,
        });
        id
    }

    /// Make a device reachable or unreachable for state changes.
    pub fn set_reachable(&self, device_id: DeviceId, reachable: bool) {
        if let Some(device) = self
            .lock()
            .devices
            .iter_mut()
            .find(|d| d.snapshot.id == device_id)
        {
            device.reachable = reachable;
        }
    }

    /// Advance the simulation clock, accumulating energy for active
    /// devices, and return one reading per device.
    #[must_use]
    pub fn advance(&self, elapsed: Duration) -> Vec<UsageUpdate> {
        let hours = elapsed.as_secs_f64() / 3600.0;
        let timestamp = time::now();
        let mut inner = self.lock();
        inner
            .devices
            .iter_mut()
            .map(|device| {
                if device.snapshot.is_active {
                    device.accumulated_kwh_today +=
                        device.snapshot.rated_power_w / 1000.0 * hours;
                }
                UsageUpdate {
                    device_id: device.snapshot.id,
                    current_power_w: device.snapshot.current_power_w,
                    accumulated_kwh_today: device.accumulated_kwh_today,
                    timestamp,
                }
            })
            .collect()
    }

    /// Reset accumulated energy, as a meter would at local midnight.
    pub fn reset_daily_accumulation(&self) {
        for device in &mut self.lock().devices {
            device.accumulated_kwh_today = 0.0;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceGateway for VirtualHomeGateway {
    fn devices(
        &self,
        home_id: HomeId,
    ) -> impl Future<Output = Result<Vec<DeviceSnapshot>, HomeFluxError>> + Send {
        let fleet = if home_id == self.home_id {
            self.lock()
                .devices
                .iter()
                .map(|d| d.snapshot.clone())
                .collect()
        } else {
            Vec::new()
        };
        async { Ok(fleet) }
    }

    fn set_device_state(
        &self,
        device_id: DeviceId,
        active: bool,
    ) -> impl Future<Output = Result<(), HomeFluxError>> + Send {
        let mut inner = self.lock();
        let result = match inner
            .devices
            .iter_mut()
            .find(|d| d.snapshot.id == device_id)
        {
            Some(device) if device.reachable => {
                device.snapshot.is_active = active;
                device.snapshot.current_power_w =
                    if active { device.snapshot.rated_power_w } else { 0.0 };
                Ok(())
            }
            Some(_) => Err(DeviceUnavailableError {
                device_id,
                reason: "device is unreachable".to_string(),
            }
            .into()),
            None => Err(NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            }
            .into()),
        };
        drop(inner);
        async { result }
    }

    fn tariff_rate(
        &self,
        _home_id: HomeId,
    ) -> impl Future<Output = Result<f64, HomeFluxError>> + Send {
        let rate = self.lock().tariff_rate;
        async move { Ok(rate) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_expose_the_demo_fleet() {
        let home_id = HomeId::new();
        let gateway = VirtualHomeGateway::demo_home(home_id, 0.25);

        let devices = gateway.devices(home_id).await.unwrap();
        assert_eq!(devices.len(), 6);
        assert!(devices.iter().any(|d| d.essential));
        assert!(gateway.tariff_rate(home_id).await.unwrap() > 0.0);
    }

    #[tokio::test]
    async fn should_return_empty_fleet_for_another_home() {
        let gateway = VirtualHomeGateway::demo_home(HomeId::new(), 0.25);
        let devices = gateway.devices(HomeId::new()).await.unwrap();
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn should_toggle_device_state_and_power() {
        let home_id = HomeId::new();
        let gateway = VirtualHomeGateway::new(home_id, 0.25);
        let id = gateway.register("Lamp", DeviceKind::Lighting, false, 60.0, true);

        gateway.set_device_state(id, false).await.unwrap();

        let devices = gateway.devices(home_id).await.unwrap();
        assert!(!devices[0].is_active);
        assert!(devices[0].current_power_w.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_fail_when_device_is_unreachable() {
        let home_id = HomeId::new();
        let gateway = VirtualHomeGateway::new(home_id, 0.25);
        let id = gateway.register("Lamp", DeviceKind::Lighting, false, 60.0, true);
        gateway.set_reachable(id, false);

        let result = gateway.set_device_state(id, false).await;
        assert!(matches!(result, Err(HomeFluxError::DeviceUnavailable(_))));

        // State is untouched.
        let devices = gateway.devices(home_id).await.unwrap();
        assert!(devices[0].is_active);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_device() {
        let gateway = VirtualHomeGateway::new(HomeId::new(), 0.25);
        let result = gateway.set_device_state(DeviceId::new(), false).await;
        assert!(matches!(result, Err(HomeFluxError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_accumulate_energy_only_for_active_devices() {
        let home_id = HomeId::new();
        let gateway = VirtualHomeGateway::new(home_id, 0.25);
        let on = gateway.register("Heater", DeviceKind::Hvac, false, 2000.0, true);
        let off = gateway.register("Lamp", DeviceKind::Lighting, false, 60.0, false);

        // 30 minutes at 2 kW is 1 kWh.
        let readings = gateway.advance(Duration::from_secs(30 * 60));
        let heater = readings.iter().find(|r| r.device_id == on).unwrap();
        let lamp = readings.iter().find(|r| r.device_id == off).unwrap();

        assert!((heater.accumulated_kwh_today - 1.0).abs() < 1e-9);
        assert!(lamp.accumulated_kwh_today.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn should_reset_daily_accumulation() {
        let gateway = VirtualHomeGateway::new(HomeId::new(), 0.25);
        let id = gateway.register("Heater", DeviceKind::Hvac, false, 2000.0, true);

        let _ = gateway.advance(Duration::from_secs(3600));
        gateway.reset_daily_accumulation();

        let readings = gateway.advance(Duration::from_secs(0));
        let heater = readings.iter().find(|r| r.device_id == id).unwrap();
        assert!(heater.accumulated_kwh_today.abs() < f64::EPSILON);
    }
}

//! Usage publisher port — pushing live readings into the engine.

use std::future::Future;

use homeflux_domain::error::HomeFluxError;
use homeflux_domain::usage::UsageUpdate;

/// Publish a usage reading to whoever is listening.
///
/// The measurement side (simulator, meter adapter) publishes; the engine
/// worker subscribes through the concrete bus.
pub trait UsagePublisher {
    /// Publish a single reading.
    fn publish(
        &self,
        update: UsageUpdate,
    ) -> impl Future<Output = Result<(), HomeFluxError>> + Send;
}

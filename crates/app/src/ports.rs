//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod devices;
pub mod execution_log;
pub mod rules;
pub mod usage;

pub use devices::DeviceGateway;
pub use execution_log::ExecutionLog;
pub use rules::RuleRepository;
pub use usage::UsagePublisher;

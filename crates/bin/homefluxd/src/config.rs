//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homeflux.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Engine timing settings.
    pub engine: EngineConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Usage simulation settings.
    pub simulation: SimulationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Engine timing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Clock interval driving time triggers and schedule enforcement.
    pub tick_seconds: u64,
    /// Per-device timeout for one gateway state change.
    pub action_timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Simulated usage feed settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Feed synthetic readings from the virtual fleet onto the usage bus.
    pub enabled: bool,
    /// Seconds between synthetic readings.
    pub interval_seconds: u64,
    /// Flat per-kWh tariff used for savings estimates.
    pub tariff_rate: f64,
}

impl Config {
    /// Load configuration from `homeflux.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homeflux.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HOMEFLUX_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("HOMEFLUX_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("HOMEFLUX_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("HOMEFLUX_TICK_SECONDS") {
            if let Ok(seconds) = val.parse() {
                self.engine.tick_seconds = seconds;
            }
        }
        if let Ok(val) = std::env::var("HOMEFLUX_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.engine.tick_seconds == 0 {
            return Err(ConfigError::Validation(
                "engine.tick_seconds must be non-zero".to_string(),
            ));
        }
        if self.engine.action_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "engine.action_timeout_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 30,
            action_timeout_ms: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homefluxd=info,homeflux=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 15,
            tariff_rate: 0.25,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

//! Configuration management.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, DatabaseConfig, ListenerConfig, ObservabilityConfig, TraceForwardingConfig,
};

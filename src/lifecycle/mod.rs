//! Process lifecycle: startup order and graceful shutdown.

pub mod shutdown;

pub use shutdown::Shutdown;

//! Timezone query service.

pub mod cities;
pub mod service;

pub use service::{ClockError, TimeSnapshot, TimezoneCatalog, WorldClockEntry};

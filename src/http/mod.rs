//! HTTP protocol handling.

pub mod handlers;
pub mod instrument;
pub mod server;

pub use server::{AppState, HttpServer};

//! HTTP surface: batch ingestion, update stream and health

pub mod handlers;
pub mod server;

pub use server::{create_router, run, shutdown_when, AppContext};

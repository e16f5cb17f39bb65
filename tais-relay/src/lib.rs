//! # TAIS Relay Library (tais-relay)
//!
//! Radar track correlation and update normalization.
//!
//! **Purpose:** Accept batches of surveillance and flight-plan records, give
//! every aircraft a persistent identity, correct altitudes against the current
//! altimeter setting, track controller ownership, and stream only changed
//! track and flight-plan updates to each connected consumer.
//!
//! **Architecture:** axum HTTP service; one background altimeter refresh task
//! and one publisher task per stream connection, sharing an in-memory store.

pub mod altimeter;
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod identity;
pub mod ingest;
pub mod kinematics;
pub mod ownership;
pub mod state;
pub mod stream;

pub use error::{Error, Result};
pub use state::AircraftStore;

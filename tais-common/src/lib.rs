//! # TAIS Common Library
//!
//! Shared code for the TAIS relay services:
//! - Configuration file resolution and TOML loading
//! - Common error type
//! - Feed timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};

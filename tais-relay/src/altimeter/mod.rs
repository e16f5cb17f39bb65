//! Barometric altitude correction
//!
//! Holds the current altimeter setting (reference pressure) behind its own
//! lock, separate from the aircraft store. The refresh task in [`refresh`] is
//! the only writer; ingestion reads it for every record.
//!
//! A stale setting is reported, never enforced: correction always proceeds
//! with whatever value is held.

pub mod refresh;
pub mod source;

pub use refresh::{AltimeterRefresher, RefreshPolicy};
pub use source::{MetarClient, PressureSource};

use chrono::{DateTime, Utc};
use std::sync::RwLock;
use std::time::Duration;
use tracing::warn;

/// ISA sea-level pressure in inches of mercury
pub const STANDARD_SETTING_INHG: f64 = 29.92126;

const PRESSURE_ALTITUDE_SCALE_FT: f64 = 145442.2;
const PRESSURE_ALTITUDE_EXPONENT: f64 = 0.190261;

/// Correct a measured (pressure) altitude for the given altimeter setting
///
/// The result is truncated toward zero.
pub fn correct_altitude(measured_ft: i32, setting_inhg: f64) -> i32 {
    let ratio = setting_inhg / STANDARD_SETTING_INHG;
    let correction =
        PRESSURE_ALTITUDE_SCALE_FT * (1.0 - ratio.powf(PRESSURE_ALTITUDE_EXPONENT));
    (measured_ft as f64 + correction).trunc() as i32
}

/// Altimeter setting and when it was last fetched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltimeterReading {
    pub setting_inhg: f64,
    pub updated_at: DateTime<Utc>,
}

/// Shared, refreshable altimeter setting
#[derive(Debug)]
pub struct Altimeter {
    reading: RwLock<AltimeterReading>,
    stale_after: Duration,
}

impl Altimeter {
    /// Start from `initial_setting_inhg`, timestamped now
    pub fn new(initial_setting_inhg: f64, stale_after: Duration) -> Self {
        Self::with_reading(
            AltimeterReading {
                setting_inhg: initial_setting_inhg,
                updated_at: tais_common::time::now(),
            },
            stale_after,
        )
    }

    pub fn with_reading(reading: AltimeterReading, stale_after: Duration) -> Self {
        Self {
            reading: RwLock::new(reading),
            stale_after,
        }
    }

    /// Snapshot of the current reading
    pub fn current(&self) -> AltimeterReading {
        *self.reading.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the reading with a freshly fetched setting
    pub fn update(&self, setting_inhg: f64) -> AltimeterReading {
        let reading = AltimeterReading {
            setting_inhg,
            updated_at: tais_common::time::now(),
        };
        *self.reading.write().unwrap_or_else(|e| e.into_inner()) = reading;
        reading
    }

    /// Seconds since the reading was fetched
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        tais_common::time::age_secs(self.current().updated_at, now)
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.age_secs(now) > self.stale_after.as_secs()
    }

    /// Correct `measured_ft` with the current setting, warning if it is stale
    pub fn correct(&self, measured_ft: i32) -> i32 {
        let now = tais_common::time::now();
        let reading = self.current();
        if self.is_stale(now) {
            warn!(
                age_secs = self.age_secs(now),
                threshold_secs = self.stale_after.as_secs(),
                setting_inhg = reading.setting_inhg,
                "Altimeter setting is stale"
            );
        }
        correct_altitude(measured_ft, reading.setting_inhg)
    }
}

//! Controller ownership and handoff tracking
//!
//! One entry per callsign, created on the first flight-plan sighting and
//! kept for the process lifetime. The stored value is the last committed
//! controller position (CPS); the handoff status is derived per record from
//! the offer status (OCR) and never stored.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Result of observing one flight-plan record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ownership {
    /// Committed owning position; empty until one is seen
    pub owner: String,
    /// Position a handoff is pending to; empty when none
    pub handoff_status: String,
}

/// Per-callsign ownership state machine
#[derive(Debug, Default)]
pub struct OwnershipTracker {
    owners: Mutex<HashMap<String, String>>,
}

impl OwnershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record's CPS/OCR pair and return the resulting ownership
    pub fn observe(&self, callsign: &str, cps: &str, ocr: &str) -> Ownership {
        let mut owners = self.owners.lock().unwrap_or_else(|e| e.into_inner());
        let owner = owners.entry(callsign.to_string()).or_default();

        let ocr = ocr.to_lowercase();
        let handoff_status = if ocr.contains("pending") {
            // Intrafacility handoffs commit the receiving position as soon as offered
            if ocr.contains("intrafacility") && !cps.is_empty() {
                commit(callsign, owner, cps);
            }
            cps.to_string()
        } else {
            if !cps.is_empty() && cps != owner.as_str() {
                commit(callsign, owner, cps);
            }
            String::new()
        };

        Ownership {
            owner: owner.clone(),
            handoff_status,
        }
    }

    /// Current owner of `callsign`, if it has been seen
    pub fn owner(&self, callsign: &str) -> Option<String> {
        self.owners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(callsign)
            .cloned()
    }

    /// Number of callsigns tracked
    pub fn len(&self) -> usize {
        self.owners.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn commit(callsign: &str, owner: &mut String, cps: &str) {
    if owner.as_str() != cps {
        debug!(callsign = %callsign, from = %owner, to = %cps, "Ownership change");
    }
    *owner = cps.to_string();
}

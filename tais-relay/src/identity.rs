//! Persistent identity registry
//!
//! Maps volatile correlation keys (squawk, Mode-S hex, callsign) to stable
//! UUIDs so downstream clients correlate by identity rather than by whichever
//! key the feed happened to carry. Entries are created on first sighting and
//! live for the process lifetime; nothing is ever evicted.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Uncontrolled VFR code; shared by unrelated aircraft so never used as an identity
pub const VFR_SQUAWK: &str = "1200";

/// Opaque persistent identifier
pub type PersistentId = Uuid;

/// Correlation key → persistent identifier
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    ids: Mutex<HashMap<String, PersistentId>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the identifier for `identifier`, creating one on first sighting
    pub fn resolve(&self, identifier: &str) -> PersistentId {
        let mut ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        *ids.entry(identifier.to_string()).or_insert_with(Uuid::new_v4)
    }

    /// Identity keyed by squawk, when the code is a usable correlator
    pub fn squawk_identity(&self, squawk: &str) -> Option<PersistentId> {
        if squawk.is_empty() || squawk == VFR_SQUAWK {
            return None;
        }
        Some(self.resolve(&format!("squawk_{}", squawk)))
    }

    /// Identity for one update
    ///
    /// Squawk wins when usable. Otherwise surveillance-only tracks correlate on
    /// Mode-S hex and flight-plan tracks on callsign, the key both message
    /// kinds share for that aircraft.
    pub fn identify(
        &self,
        squawk: &str,
        has_flight_plan: bool,
        mode_s_hex: &str,
        callsign: &str,
    ) -> PersistentId {
        if let Some(id) = self.squawk_identity(squawk) {
            return id;
        }
        if has_flight_plan {
            self.resolve(callsign)
        } else {
            self.resolve(mode_s_hex)
        }
    }

    /// Number of identities handed out so far
    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Aircraft state store
//!
//! Latest normalized state per aircraft, shared between ingestion (writers)
//! and every stream publisher (readers). Writes replace the whole entry, so a
//! reader sees either the previous snapshot or the new one, never a mix.
//! There is no versioning: the last write for a key wins regardless of the
//! order batches arrived in.

use crate::kinematics::Kinematics;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store key: Mode-S hex when usable, else callsign, else "unknown"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AircraftKey(String);

impl AircraftKey {
    pub fn derive(mode_s_hex: &str, callsign: &str) -> Self {
        if is_usable_mode_s_hex(mode_s_hex) {
            Self(mode_s_hex.to_string())
        } else if !callsign.is_empty() {
            Self(callsign.to_string())
        } else {
            Self("unknown".to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AircraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Present and not the all-zero address
pub fn is_usable_mode_s_hex(mode_s_hex: &str) -> bool {
    !mode_s_hex.is_empty() && !mode_s_hex.chars().all(|c| c == '0')
}

/// Flight-plan and enhanced-data attributes carried with a track
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightPlanFields {
    pub aircraft_type: String,
    pub wake_category: String,
    pub scratchpad1: String,
    pub scratchpad2: String,
    pub requested_altitude: i32,
    pub assigned_altitude: i32,
    pub runway: String,
    pub entry_fix: String,
    pub exit_fix: String,
    pub origin: String,
    pub destination: String,
    pub flight_rules: String,
    pub equipment_suffix: String,
    /// Leader-line direction as an 8-point compass abbreviation
    pub leader_direction: String,
}

/// Latest normalized state of one aircraft
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftState {
    /// Persistent identity assigned at ingestion
    pub identity: Uuid,
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Pressure-corrected altitude, feet
    pub altitude_ft: i32,
    pub vx: i32,
    pub vy: i32,
    pub kinematics: Kinematics,
    pub vertical_rate: i32,
    pub squawk: String,
    pub mode_s_hex: String,
    pub mode_s: Option<u32>,
    pub plan: FlightPlanFields,
    pub owner: String,
    pub handoff_status: String,
    pub has_flight_plan: bool,
    /// Ingestion time, feed timestamp format
    pub timestamp: String,
}

impl AircraftState {
    /// Non-zero Mode-S code present
    pub fn has_mode_s(&self) -> bool {
        matches!(self.mode_s, Some(code) if code != 0)
    }

    /// Radar return with neither squawk nor Mode-S correlation
    pub fn is_primary_only(&self) -> bool {
        self.squawk.is_empty() && !self.has_mode_s()
    }

    /// Whether a flight-plan update exists for this state
    pub fn publishes_flight_plan(&self) -> bool {
        self.has_flight_plan && !self.is_primary_only()
    }
}

/// Point-in-time view of the store, ordered by key
pub type Snapshot = Vec<(AircraftKey, Arc<AircraftState>)>;

/// Concurrent map of latest state per aircraft key
///
/// Entries are never removed: the store holds every aircraft seen since
/// startup.
#[derive(Debug, Default)]
pub struct AircraftStore {
    aircraft: RwLock<HashMap<AircraftKey, Arc<AircraftState>>>,
}

impl AircraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `key` wholesale
    pub async fn upsert(&self, key: AircraftKey, state: AircraftState) {
        self.aircraft.write().await.insert(key, Arc::new(state));
    }

    /// Consistent copy of all entries, sorted by key
    pub async fn snapshot(&self) -> Snapshot {
        let mut entries: Snapshot = {
            let aircraft = self.aircraft.read().await;
            aircraft
                .iter()
                .map(|(key, state)| (key.clone(), Arc::clone(state)))
                .collect()
        };
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub async fn get(&self, key: &AircraftKey) -> Option<Arc<AircraftState>> {
        self.aircraft.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.aircraft.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A transponder-equipped, flight-plan-bearing state for tests
    pub(crate) fn sample_state(callsign: &str) -> AircraftState {
        AircraftState {
            identity: Uuid::new_v4(),
            callsign: callsign.to_string(),
            latitude: 38.7487,
            longitude: -90.37,
            altitude_ft: 5000,
            vx: 100,
            vy: 0,
            kinematics: Kinematics::from_velocity(100, 0),
            vertical_rate: 0,
            squawk: "4521".to_string(),
            mode_s_hex: "A1B2C3".to_string(),
            mode_s: Some(0xA1B2C3),
            plan: FlightPlanFields {
                flight_rules: "IFR".to_string(),
                ..Default::default()
            },
            owner: String::new(),
            handoff_status: String::new(),
            has_flight_plan: true,
            timestamp: "2024-03-09T14:05:07Z".to_string(),
        }
    }

    #[test]
    fn test_key_prefers_mode_s_hex() {
        assert_eq!(AircraftKey::derive("A1B2C3", "AAL12").as_str(), "A1B2C3");
    }

    #[test]
    fn test_key_skips_zero_mode_s() {
        assert_eq!(AircraftKey::derive("000000", "AAL12").as_str(), "AAL12");
        assert_eq!(AircraftKey::derive("", "AAL12").as_str(), "AAL12");
    }

    #[test]
    fn test_key_falls_back_to_unknown() {
        assert_eq!(AircraftKey::derive("", "").as_str(), "unknown");
    }

    #[test]
    fn test_primary_only() {
        let mut state = sample_state("AAL12");
        assert!(!state.is_primary_only());
        state.squawk.clear();
        assert!(!state.is_primary_only());
        state.mode_s = Some(0);
        assert!(state.is_primary_only());
        state.mode_s = None;
        assert!(state.is_primary_only());
        assert!(!state.publishes_flight_plan());
    }

    #[tokio::test]
    async fn test_upsert_replaces_wholesale() {
        let store = AircraftStore::new();
        let key = AircraftKey::derive("A1B2C3", "AAL12");

        let mut first = sample_state("AAL12");
        first.plan.runway = "30R".to_string();
        store.upsert(key.clone(), first).await;

        let second = sample_state("AAL12");
        store.upsert(key.clone(), second.clone()).await;

        let stored = store.get(&key).await.unwrap();
        assert_eq!(*stored, second);
        assert_eq!(stored.plan.runway, "");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time() {
        let store = AircraftStore::new();
        store.upsert(AircraftKey::derive("", "B"), sample_state("B")).await;
        store.upsert(AircraftKey::derive("", "A"), sample_state("A")).await;

        let snapshot = store.snapshot().await;
        store.upsert(AircraftKey::derive("", "C"), sample_state("C")).await;

        let keys: Vec<&str> = snapshot.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(store.len().await, 3);
    }
}

//! Batch ingestion and record normalization
//!
//! Each accepted record is turned into one [`AircraftState`]: altitude is
//! corrected against the current altimeter setting, kinematics derived,
//! ownership advanced and identity resolved, then the state replaces the
//! store entry for its key.

pub mod feed;

use crate::altimeter::Altimeter;
use crate::error::Result;
use crate::format::{self, apply_departure_scratchpad};
use crate::identity::IdentityRegistry;
use crate::kinematics::Kinematics;
use crate::ownership::{Ownership, OwnershipTracker};
use crate::state::{is_usable_mode_s_hex, AircraftKey, AircraftState, AircraftStore, FlightPlanFields};
use feed::{float, int, mode_s_code, text, text_or, Record};
use std::sync::Arc;
use tracing::{debug, trace};

/// Callsign a flight plan reports when it has none; such records are dropped
pub const NO_CALLSIGN: &str = "N/A";

/// Outcome counts for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub received: usize,
    pub accepted: usize,
    pub skipped_no_track: usize,
    pub discarded_no_callsign: usize,
}

/// Turns feed batches into store entries
pub struct Ingestor {
    registry: Arc<IdentityRegistry>,
    altimeter: Arc<Altimeter>,
    ownership: Arc<OwnershipTracker>,
    store: Arc<AircraftStore>,
    emit_primary_targets: bool,
}

impl Ingestor {
    pub fn new(
        registry: Arc<IdentityRegistry>,
        altimeter: Arc<Altimeter>,
        ownership: Arc<OwnershipTracker>,
        store: Arc<AircraftStore>,
        emit_primary_targets: bool,
    ) -> Self {
        Self {
            registry,
            altimeter,
            ownership,
            store,
            emit_primary_targets,
        }
    }

    /// Parse and apply one batch
    ///
    /// A batch that fails to parse is rejected whole and nothing is applied.
    pub async fn ingest(&self, body: &str) -> Result<IngestSummary> {
        let batch = feed::parse_batch(body)?;

        let mut summary = IngestSummary {
            received: batch.records.len(),
            ..Default::default()
        };

        for record in &batch.records {
            match self.normalize(record) {
                Normalized::Accepted(key, state) => {
                    self.trace_updates(&state);
                    self.store.upsert(key, *state).await;
                    summary.accepted += 1;
                }
                Normalized::NoTrack => summary.skipped_no_track += 1,
                Normalized::NoCallsign => summary.discarded_no_callsign += 1,
            }
        }

        debug!(
            received = summary.received,
            accepted = summary.accepted,
            skipped = summary.skipped_no_track,
            discarded = summary.discarded_no_callsign,
            "Batch ingested"
        );
        Ok(summary)
    }

    /// Build the normalized state for one record
    pub fn normalize(&self, record: &Record) -> Normalized {
        let Some(track) = record.track.as_ref() else {
            return Normalized::NoTrack;
        };

        let altitude_ft = self.altimeter.correct(int(&track.reported_altitude));
        let vx = int(&track.vx);
        let vy = int(&track.vy);
        let mode_s_hex = text(&track.ac_address).to_string();

        let enhanced = record.enhanced.as_ref();
        let mut plan = FlightPlanFields {
            origin: enhanced.map(|e| text(&e.departure_airport)).unwrap_or_default().to_string(),
            destination: enhanced.map(|e| text(&e.destination_airport)).unwrap_or_default().to_string(),
            flight_rules: "IFR".to_string(),
            ..Default::default()
        };

        let (callsign, squawk, ownership, has_flight_plan) = match record.flight_plan.as_ref() {
            Some(fp) => {
                let callsign = text_or(&fp.acid, NO_CALLSIGN);
                if callsign == NO_CALLSIGN {
                    return Normalized::NoCallsign;
                }

                plan.scratchpad1 = text(&fp.scratch_pad1).to_string();
                plan.scratchpad2 = text(&fp.scratch_pad2).to_string();
                plan.wake_category = text(&fp.category).to_string();
                plan.requested_altitude = int(&fp.requested_altitude);
                plan.assigned_altitude = int(&fp.assigned_altitude);
                plan.runway = text(&fp.runway).to_string();
                plan.entry_fix = text(&fp.entry_fix).to_string();
                plan.exit_fix = text(&fp.exit_fix).to_string();
                plan.equipment_suffix = text(&fp.eqpt_suffix).to_string();
                plan.aircraft_type = text(&fp.ac_type).to_string();
                plan.leader_direction = text(&fp.lld).to_string();
                let rules = text(&fp.flight_rules);
                if !rules.is_empty() {
                    plan.flight_rules = rules.to_string();
                }
                apply_departure_scratchpad(&mut plan);

                let ownership = self
                    .ownership
                    .observe(callsign, text(&fp.cps), text(&fp.ocr));
                (
                    callsign.to_string(),
                    text(&fp.assigned_beacon_code).to_string(),
                    ownership,
                    true,
                )
            }
            None => {
                // Reported code only counts for transponder-correlated returns
                let squawk = if is_usable_mode_s_hex(&mode_s_hex) {
                    text(&track.reported_beacon_code).to_string()
                } else {
                    String::new()
                };
                let callsign = if !squawk.is_empty() {
                    squawk.clone()
                } else {
                    mode_s_hex.clone()
                };
                (callsign, squawk, Ownership::default(), false)
            }
        };

        if plan.aircraft_type.is_empty() {
            if let Some(e) = enhanced {
                plan.aircraft_type = text(&e.aircraft_type).to_string();
            }
        }

        let identity = self
            .registry
            .identify(&squawk, has_flight_plan, &mode_s_hex, &callsign);
        let key = AircraftKey::derive(&mode_s_hex, &callsign);

        let state = AircraftState {
            identity,
            callsign,
            latitude: float(&track.lat),
            longitude: float(&track.lon),
            altitude_ft,
            vx,
            vy,
            kinematics: Kinematics::from_velocity(vx, vy),
            vertical_rate: int(&track.v_vert),
            squawk,
            mode_s: mode_s_code(&mode_s_hex),
            mode_s_hex,
            plan,
            owner: ownership.owner,
            handoff_status: ownership.handoff_status,
            has_flight_plan,
            timestamp: tais_common::time::feed_timestamp(tais_common::time::now()),
        };

        Normalized::Accepted(key, Box::new(state))
    }

    fn trace_updates(&self, state: &AircraftState) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        if !state.is_primary_only() || self.emit_primary_targets {
            if let Ok(line) = format::to_line(&format::track_update(state)) {
                trace!("TrackUpdate: {}", line);
            }
        }
        if let Some(update) = format::flight_plan_update(state) {
            if let Ok(line) = format::to_line(&update) {
                trace!("FlightPlanUpdate: {}", line);
            }
        }
    }
}

/// Outcome of normalizing one record
#[derive(Debug)]
pub enum Normalized {
    Accepted(AircraftKey, Box<AircraftState>),
    /// No surveillance section
    NoTrack,
    /// Flight plan without a usable callsign
    NoCallsign,
}

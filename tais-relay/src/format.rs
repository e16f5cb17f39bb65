//! Update payloads derived from aircraft state
//!
//! Two update kinds come out of one [`AircraftState`]: a track update for
//! every aircraft and a flight-plan update for correlated aircraft that carry
//! a flight plan. Field order is fixed by the struct declarations and
//! optional fields are omitted rather than nulled, so serializing the same
//! state twice yields identical bytes.

use crate::error::Result;
use crate::state::{AircraftState, FlightPlanFields};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Altitude type for transponder-reported altitude
pub const ALTITUDE_TYPE_NORMAL: u8 = 0;
/// Altitude type for primary-only returns
pub const ALTITUDE_TYPE_PRIMARY: u8 = 2;

const UNASSIGNED: &str = "unassigned";
const UNAVAILABLE: &str = "unavailable";

/// Which payload an emitted line carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpdateKind {
    Track,
    FlightPlan,
}

impl UpdateKind {
    pub fn code(self) -> u8 {
        match self {
            UpdateKind::Track => 0,
            UpdateKind::FlightPlan => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateKind::Track => "TrackUpdate",
            UpdateKind::FlightPlan => "FlightPlanUpdate",
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Altitude {
    pub value: i32,
    pub altitude_type: u8,
}

/// Position report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrackUpdate<'a> {
    pub update_type: u8,
    pub guid: Uuid,
    pub time_stamp: &'a str,
    pub location: Location,
    pub altitude: Altitude,
    pub ground_speed: i32,
    pub ground_track: i32,
    pub vertical_rate: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callsign: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squawk: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_s_code: Option<u32>,
}

/// Flight-plan data block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlightPlanUpdate<'a> {
    pub update_type: u8,
    pub guid: Uuid,
    pub time_stamp: &'a str,
    pub callsign: &'a str,
    pub associated_track_guid: Uuid,
    pub aircraft_type: &'a str,
    pub wake_category: &'a str,
    pub flight_rules: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_suffix: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratchpad1: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratchpad2: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_altitude: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_altitude: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runway: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_fix: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_fix: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<&'a str>,
    pub pending_handoff: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squawk: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_squawk: Option<&'a str>,
    #[serde(rename = "LDRDirection", skip_serializing_if = "Option::is_none")]
    pub ldr_direction: Option<u8>,
}

/// Build the track update for `state`
pub fn track_update(state: &AircraftState) -> TrackUpdate<'_> {
    let primary_only = state.is_primary_only();

    TrackUpdate {
        update_type: UpdateKind::Track.code(),
        guid: state.identity,
        time_stamp: &state.timestamp,
        location: Location {
            latitude: state.latitude,
            longitude: state.longitude,
        },
        altitude: Altitude {
            value: state.altitude_ft,
            altitude_type: if primary_only {
                ALTITUDE_TYPE_PRIMARY
            } else {
                ALTITUDE_TYPE_NORMAL
            },
        },
        ground_speed: state.kinematics.ground_speed,
        ground_track: state.kinematics.ground_track,
        vertical_rate: state.vertical_rate,
        callsign: non_empty(&state.callsign).filter(|_| !primary_only),
        owner: non_empty(&state.owner),
        squawk: non_empty(&state.squawk),
        mode_s_code: state.mode_s.filter(|code| *code != 0),
    }
}

/// Build the flight-plan update, or `None` when `state` has no publishable plan
pub fn flight_plan_update(state: &AircraftState) -> Option<FlightPlanUpdate<'_>> {
    if !state.publishes_flight_plan() {
        return None;
    }

    let plan = &state.plan;
    let assigned_altitude = Some(plan.assigned_altitude).filter(|alt| *alt != 0);
    let requested_altitude = if assigned_altitude.is_none() {
        Some(plan.requested_altitude).filter(|alt| *alt != 0)
    } else {
        None
    };
    let squawk = non_empty(&state.squawk);

    Some(FlightPlanUpdate {
        update_type: UpdateKind::FlightPlan.code(),
        guid: state.identity,
        time_stamp: &state.timestamp,
        callsign: &state.callsign,
        associated_track_guid: state.identity,
        aircraft_type: &plan.aircraft_type,
        wake_category: &plan.wake_category,
        flight_rules: if plan.flight_rules.is_empty() {
            "IFR"
        } else {
            plan.flight_rules.as_str()
        },
        equipment_suffix: assigned(&plan.equipment_suffix, UNAVAILABLE),
        scratchpad1: assigned(&plan.scratchpad1, UNASSIGNED),
        scratchpad2: assigned(&plan.scratchpad2, UNASSIGNED),
        assigned_altitude,
        requested_altitude,
        runway: non_empty(&plan.runway),
        entry_fix: assigned(&plan.entry_fix, UNASSIGNED),
        exit_fix: assigned(&plan.exit_fix, UNASSIGNED),
        origin: non_empty(&plan.origin),
        destination: non_empty(&plan.destination),
        owner: non_empty(&state.owner),
        pending_handoff: &state.handoff_status,
        squawk,
        assigned_squawk: squawk,
        ldr_direction: leader_clock_position(&plan.leader_direction),
    })
}

/// Compact single-line JSON for one update
pub fn to_line<T: Serialize>(update: &T) -> Result<String> {
    Ok(serde_json::to_string(update)?)
}

/// Map an 8-point compass abbreviation to its leader-line clock code
pub fn leader_clock_position(direction: &str) -> Option<u8> {
    match direction.to_ascii_uppercase().as_str() {
        "NW" => Some(1),
        "N" => Some(2),
        "NE" => Some(3),
        "W" => Some(4),
        "E" => Some(6),
        "SW" => Some(7),
        "S" => Some(8),
        "SE" => Some(9),
        _ => None,
    }
}

/// Departures show the exit fix in the first scratch-pad slot when it is empty
pub fn apply_departure_scratchpad(plan: &mut FlightPlanFields) {
    if plan.scratchpad1.is_empty() && !plan.exit_fix.is_empty() {
        plan.scratchpad1 = plan.exit_fix.clone();
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

fn assigned<'a>(value: &'a str, sentinel: &str) -> Option<&'a str> {
    non_empty(value).filter(|v| *v != sentinel)
}

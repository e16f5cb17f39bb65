//! Raw ingestion feed documents
//!
//! A batch is an XML document whose root element holds `<record>` children:
//!
//! ```xml
//! <records>
//!   <record>
//!     <track>...</track>
//!     <flightPlan>...</flightPlan>
//!     <enhancedData>...</enhancedData>
//!   </record>
//! </records>
//! ```
//!
//! Every leaf is kept as text here; numeric interpretation happens during
//! normalization so one bad field cannot reject a record.

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Batch {
    #[serde(rename = "record", default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Record {
    pub track: Option<TrackSection>,
    #[serde(rename = "flightPlan")]
    pub flight_plan: Option<FlightPlanSection>,
    #[serde(rename = "enhancedData")]
    pub enhanced: Option<EnhancedSection>,
}

/// Surveillance track fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSection {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub reported_altitude: Option<String>,
    pub vx: Option<String>,
    pub vy: Option<String>,
    pub v_vert: Option<String>,
    pub ac_address: Option<String>,
    pub reported_beacon_code: Option<String>,
}

/// Flight-plan fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPlanSection {
    pub acid: Option<String>,
    pub scratch_pad1: Option<String>,
    pub scratch_pad2: Option<String>,
    pub assigned_beacon_code: Option<String>,
    pub category: Option<String>,
    pub requested_altitude: Option<String>,
    pub assigned_altitude: Option<String>,
    pub runway: Option<String>,
    pub cps: Option<String>,
    pub ocr: Option<String>,
    pub entry_fix: Option<String>,
    pub exit_fix: Option<String>,
    pub flight_rules: Option<String>,
    pub eqpt_suffix: Option<String>,
    pub ac_type: Option<String>,
    pub lld: Option<String>,
}

/// Enhanced data fields
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedSection {
    pub departure_airport: Option<String>,
    pub destination_airport: Option<String>,
    pub aircraft_type: Option<String>,
}

/// Decode a whole batch; any syntax error rejects all of it
pub fn parse_batch(xml: &str) -> Result<Batch> {
    quick_xml::de::from_str(xml).map_err(|e| Error::MalformedBatch(e.to_string()))
}

/// Text of an optional field, trimmed; missing yields ""
pub fn text(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

/// Text of an optional field, or `default` when the element is absent
pub fn text_or<'a>(field: &'a Option<String>, default: &'a str) -> &'a str {
    field.as_deref().map(str::trim).unwrap_or(default)
}

/// Integer field; missing or unparsable yields 0
pub fn int(field: &Option<String>) -> i32 {
    let raw = text(field);
    raw.parse::<i32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i32)
        })
        .unwrap_or(0)
}

/// Float field; missing or unparsable yields 0.0
pub fn float(field: &Option<String>) -> f64 {
    text(field)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Mode-S address as a number; missing or unparsable yields `None`
pub fn mode_s_code(hex: &str) -> Option<u32> {
    if hex.is_empty() {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let xml = r#"
            <records>
              <record>
                <track>
                  <lat>38.7487</lat>
                  <lon>-90.37</lon>
                  <reportedAltitude>5000</reportedAltitude>
                  <vx>120</vx>
                  <vy>-40</vy>
                  <vVert>-800</vVert>
                  <acAddress>A1B2C3</acAddress>
                  <reportedBeaconCode>4521</reportedBeaconCode>
                </track>
                <flightPlan>
                  <acid>AAL12</acid>
                  <scratchPad1>LINDY</scratchPad1>
                  <assignedBeaconCode>4521</assignedBeaconCode>
                  <requestedAltitude>350</requestedAltitude>
                  <cps>2K</cps>
                  <ocr>normal</ocr>
                  <eqptSuffix>L</eqptSuffix>
                  <acType>B738</acType>
                  <lld>NE</lld>
                </flightPlan>
                <enhancedData>
                  <departureAirport>KSTL</departureAirport>
                  <destinationAirport>KORD</destinationAirport>
                </enhancedData>
              </record>
            </records>"#;

        let batch = parse_batch(xml).unwrap();
        assert_eq!(batch.records.len(), 1);

        let record = &batch.records[0];
        let track = record.track.as_ref().unwrap();
        assert_eq!(float(&track.lat), 38.7487);
        assert_eq!(int(&track.v_vert), -800);
        assert_eq!(text(&track.ac_address), "A1B2C3");

        let plan = record.flight_plan.as_ref().unwrap();
        assert_eq!(text(&plan.acid), "AAL12");
        assert_eq!(text(&plan.scratch_pad1), "LINDY");
        assert_eq!(text(&plan.eqpt_suffix), "L");
        assert_eq!(int(&plan.requested_altitude), 350);
        assert_eq!(text(&plan.runway), "");

        let enhanced = record.enhanced.as_ref().unwrap();
        assert_eq!(text(&enhanced.destination_airport), "KORD");
    }

    #[test]
    fn test_parse_empty_batch() {
        assert!(parse_batch("<records></records>").unwrap().records.is_empty());
    }

    #[test]
    fn test_parse_multiple_records_and_sections() {
        let xml = "<records>\
            <record><track><lat>1</lat></track></record>\
            <record><flightPlan><acid>X</acid></flightPlan></record>\
            </records>";
        let batch = parse_batch(xml).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert!(batch.records[0].flight_plan.is_none());
        assert!(batch.records[1].track.is_none());
    }

    #[test]
    fn test_records_interleaved_with_other_elements() {
        let xml = "<TATrackAndFlightPlan>\
            <src>STL</src>\
            <record><track><lat>1</lat></track></record>\
            <src>T75</src>\
            <record><track><lat>2</lat></track></record>\
            <record><track><lat>3</lat></track></record>\
            </TATrackAndFlightPlan>";
        let batch = parse_batch(xml).unwrap();
        let lats: Vec<f64> = batch
            .records
            .iter()
            .map(|r| float(&r.track.as_ref().unwrap().lat))
            .collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let result = parse_batch("<records><record><track><lat>1</track></record>");
        assert!(matches!(result, Err(Error::MalformedBatch(_))));
    }

    #[test]
    fn test_numeric_defaults() {
        assert_eq!(int(&None), 0);
        assert_eq!(int(&Some("abc".to_string())), 0);
        assert_eq!(int(&Some(" 42 ".to_string())), 42);
        assert_eq!(int(&Some("350.7".to_string())), 350);
        assert_eq!(float(&Some("NaN".to_string())), 0.0);
        assert_eq!(float(&None), 0.0);
    }

    #[test]
    fn test_text_or_default_only_when_absent() {
        assert_eq!(text_or(&None, "N/A"), "N/A");
        assert_eq!(text_or(&Some(String::new()), "N/A"), "");
    }

    #[test]
    fn test_mode_s_code() {
        assert_eq!(mode_s_code("A1B2C3"), Some(0xA1B2C3));
        assert_eq!(mode_s_code("000000"), Some(0));
        assert_eq!(mode_s_code(""), None);
        assert_eq!(mode_s_code("ZZZ"), None);
    }
}

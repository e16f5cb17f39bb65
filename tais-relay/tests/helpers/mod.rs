//! Test helper modules for tais-relay integration tests
//!
//! - TestServer: in-process router with its shared state exposed
//! - batch builders for the XML ingestion feed

#![allow(dead_code)]

pub mod test_server;

pub use test_server::{flight_plan_record, records, surveillance_record, TestServer};

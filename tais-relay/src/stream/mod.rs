//! Per-connection egress of changed updates

pub mod publisher;

pub use publisher::{CycleOutput, DedupCache, Publisher, PublisherSettings};

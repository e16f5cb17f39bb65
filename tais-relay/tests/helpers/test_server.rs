//! Test server wrapper for integration tests
//!
//! Builds the same router as the binary, without binding a socket, and keeps
//! handles to the shared state so tests can inspect what ingestion did.

use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use tais_relay::altimeter::{Altimeter, STANDARD_SETTING_INHG};
use tais_relay::api::{create_router, AppContext};
use tais_relay::identity::IdentityRegistry;
use tais_relay::ingest::Ingestor;
use tais_relay::ownership::OwnershipTracker;
use tais_relay::state::AircraftStore;
use tais_relay::stream::{Publisher, PublisherSettings};

/// In-process relay with fast stream polling
pub struct TestServer {
    pub router: Router,
    pub store: Arc<AircraftStore>,
    pub registry: Arc<IdentityRegistry>,
    pub ownership: Arc<OwnershipTracker>,
    pub altimeter: Arc<Altimeter>,
    pub cancel: CancellationToken,
}

impl TestServer {
    pub fn start() -> Self {
        Self::start_with(true, 1024 * 1024)
    }

    pub fn start_with(emit_primary_targets: bool, max_batch_bytes: usize) -> Self {
        let store = Arc::new(AircraftStore::new());
        let registry = Arc::new(IdentityRegistry::new());
        let ownership = Arc::new(OwnershipTracker::new());
        // Standard pressure leaves reported altitudes unchanged
        let altimeter = Arc::new(Altimeter::new(
            STANDARD_SETTING_INHG,
            Duration::from_secs(300),
        ));
        let cancel = CancellationToken::new();

        let ingestor = Arc::new(Ingestor::new(
            registry.clone(),
            altimeter.clone(),
            ownership.clone(),
            store.clone(),
            emit_primary_targets,
        ));
        let publisher = Arc::new(Publisher::new(
            store.clone(),
            PublisherSettings {
                poll_interval: Duration::from_millis(20),
                fault_backoff: Duration::from_millis(20),
                emit_primary_targets,
                channel_capacity: 64,
            },
        ));

        let ctx = AppContext {
            store: store.clone(),
            ingestor,
            altimeter: altimeter.clone(),
            publisher,
            cancel: cancel.clone(),
        };

        Self {
            router: create_router(ctx, max_batch_bytes),
            store,
            registry,
            ownership,
            altimeter,
            cancel,
        }
    }

    /// POST a raw body to /updates
    pub async fn post_batch(&self, body: impl Into<Body>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/updates")
            .header("content-type", "application/xml")
            .body(body.into())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Open GET /updates; the content type is returned alongside the reader
    pub async fn open_stream(&self) -> (String, UpdateStream) {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/updates")
            .body(Body::empty())
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        (
            content_type,
            UpdateStream {
                body: response.into_body(),
                buffer: String::new(),
            },
        )
    }
}

/// Reads newline-delimited JSON objects off a streaming body
pub struct UpdateStream {
    body: Body,
    buffer: String,
}

impl UpdateStream {
    /// Next complete line, or `None` if nothing arrives within `wait`
    pub async fn next_line_within(&mut self, wait: Duration) -> Option<String> {
        loop {
            if let Some(pos) = self.buffer.find('\n') {
                let line = self.buffer[..pos].to_string();
                self.buffer.drain(..=pos);
                return Some(line);
            }

            let frame = tokio::time::timeout(wait, self.body.frame()).await.ok()??.ok()?;
            if let Ok(data) = frame.into_data() {
                self.buffer.push_str(std::str::from_utf8(&data).ok()?);
            }
        }
    }

    /// Next update as JSON; panics if none arrives within two seconds
    pub async fn next_update(&mut self) -> Value {
        let line = self
            .next_line_within(Duration::from_secs(2))
            .await
            .expect("no update received");
        serde_json::from_str(&line).expect("update is not valid JSON")
    }
}

/// Wrap record fragments in a batch document
pub fn records(records: &[String]) -> String {
    format!("<records>{}</records>", records.concat())
}

/// Surveillance-only record
pub fn surveillance_record(mode_s: &str, squawk: &str, lat: f64, altitude: i32) -> String {
    format!(
        "<record><track><lat>{}</lat><lon>-90.37</lon><reportedAltitude>{}</reportedAltitude>\
         <vx>0</vx><vy>150</vy><vVert>0</vVert><acAddress>{}</acAddress>\
         <reportedBeaconCode>{}</reportedBeaconCode></track></record>",
        lat, altitude, mode_s, squawk
    )
}

/// Record carrying a flight plan; `extra` is spliced into `<flightPlan>`
pub fn flight_plan_record(mode_s: &str, acid: &str, squawk: &str, extra: &str) -> String {
    format!(
        "<record><track><lat>38.75</lat><lon>-90.37</lon><reportedAltitude>4000</reportedAltitude>\
         <vx>100</vx><vy>0</vy><acAddress>{}</acAddress></track>\
         <flightPlan><acid>{}</acid><assignedBeaconCode>{}</assignedBeaconCode>{}</flightPlan>\
         </record>",
        mode_s, acid, squawk, extra
    )
}

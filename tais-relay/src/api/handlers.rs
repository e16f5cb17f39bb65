//! HTTP request handlers

use super::server::AppContext;
use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, State},
    http::header,
    response::{IntoResponse, Json},
};
use futures::stream::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;
use tracing::error;

/// Content type of the egress stream
pub const NDJSON: &str = "application/x-ndjson";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub build: String,
    pub aircraft: usize,
    pub altimeter_setting_inhg: f64,
    pub altimeter_age_secs: u64,
}

/// GET /health - Service status
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let reading = ctx.altimeter.current();
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "tais-relay".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: env!("GIT_HASH").to_string(),
        aircraft: ctx.store.len().await,
        altimeter_setting_inhg: reading.setting_inhg,
        altimeter_age_secs: ctx.altimeter.age_secs(tais_common::time::now()),
    })
}

/// POST /updates - Ingest one batch
///
/// Always acknowledged: a batch that cannot be read or decoded is logged and
/// dropped so the feed never retries it. Bodies over the configured limit are
/// dropped unread.
pub async fn ingest_updates(
    State(ctx): State<AppContext>,
    body: Result<Bytes, BytesRejection>,
) -> &'static str {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!(
                status = %rejection.status(),
                "Dropping unreadable batch: {}",
                rejection.body_text()
            );
            return "OK";
        }
    };

    let text = match std::str::from_utf8(&body) {
        Ok(text) => text,
        Err(e) => {
            error!(bytes = body.len(), "Dropping batch that is not UTF-8: {}", e);
            return "OK";
        }
    };

    if let Err(e) = ctx.ingestor.ingest(text).await {
        error!(bytes = body.len(), "Dropping batch: {}", e);
    }
    "OK"
}

/// GET /updates - Newline-delimited stream of changed updates
pub async fn stream_updates(State(ctx): State<AppContext>) -> impl IntoResponse {
    let rx = ctx.publisher.spawn_connection(ctx.cancel.clone());

    let lines = ReceiverStream::new(rx).map(|mut line| {
        line.push('\n');
        Ok::<_, Infallible>(Bytes::from(line))
    });

    ([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(lines))
}

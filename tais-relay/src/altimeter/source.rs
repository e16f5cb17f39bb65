//! Reference-pressure sources
//!
//! [`MetarClient`] reads the altimeter group from a METAR JSON API
//! (AVWX-style `{"altimeter": {"value": 29.92}}`) with a per-request timeout.

use crate::error::AltimeterError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("tais-relay/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce a current altimeter setting in inHg
#[async_trait]
pub trait PressureSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the current setting
    async fn fetch(&self) -> Result<f64, AltimeterError>;
}

#[derive(Debug, Deserialize)]
struct MetarResponse {
    altimeter: Option<MetarAltimeter>,
}

#[derive(Debug, Deserialize)]
struct MetarAltimeter {
    value: Option<f64>,
}

/// METAR API client
pub struct MetarClient {
    http_client: reqwest::Client,
    url: String,
    token: String,
}

impl MetarClient {
    pub fn new(url: String, token: String, timeout: Duration) -> Result<Self, AltimeterError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AltimeterError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            token,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PressureSource for MetarClient {
    fn name(&self) -> &str {
        "METAR"
    }

    async fn fetch(&self) -> Result<f64, AltimeterError> {
        let mut request = self.http_client.get(&self.url);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        tracing::debug!(url = %self.url, "Fetching METAR");

        let response = request.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AltimeterError::Status(status.as_u16()));
        }

        let body: MetarResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AltimeterError::Timeout
            } else {
                AltimeterError::Parse(e.to_string())
            }
        })?;

        parse_setting(body)
    }
}

fn classify(err: reqwest::Error) -> AltimeterError {
    if err.is_timeout() {
        AltimeterError::Timeout
    } else {
        AltimeterError::Network(err.to_string())
    }
}

fn parse_setting(body: MetarResponse) -> Result<f64, AltimeterError> {
    let value = body
        .altimeter
        .and_then(|a| a.value)
        .ok_or(AltimeterError::MissingValue)?;

    if !value.is_finite() || value <= 0.0 {
        return Err(AltimeterError::Parse(format!(
            "implausible altimeter setting {}",
            value
        )));
    }
    Ok(value)
}

use crate::{BroadcastError, Result};

use std::time::Duration;

use herald_config::TriggerConfig;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::RequestSignature;

/// One event to publish on one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRequest {
    pub channel: String,
    pub event: String,
    pub data: Value,
}

/// Blocking publish call. Always invoked from a blocking-capable thread.
pub trait TriggerTransport: Send + Sync + 'static {
    fn trigger(&self, request: &TriggerRequest) -> Result<()>;
}

#[derive(Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
    channels: [&'a str; 1],
    /// JSON-encoded payload
    data: String,
}

/// `POST {base}/apps/{app_id}/events`, authenticated with a signed query string.
pub struct HttpTriggerTransport {
    events_url: String,
    key: String,
    secret: String,
    timeout: Duration,
}

impl HttpTriggerTransport {
    pub fn new(
        base_url: &str,
        app_id: &str,
        key: impl Into<String>,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            events_url: format!("{}/apps/{}/events", base_url.trim_end_matches('/'), app_id),
            key: key.into(),
            secret: secret.into(),
            timeout,
        }
    }

    /// `None` when the section is incomplete.
    pub fn from_config(config: &TriggerConfig) -> Option<Self> {
        if !config.is_complete() {
            return None;
        }

        Some(Self::new(
            &config.base_url()?,
            config.app_id.as_deref()?,
            config.key.clone()?,
            config.secret.clone()?,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

impl TriggerTransport for HttpTriggerTransport {
    fn trigger(&self, request: &TriggerRequest) -> Result<()> {
        let body = serde_json::to_string(&TriggerBody {
            name: &request.event,
            channels: [&request.channel],
            data: serde_json::to_string(&request.data)?,
        })?;

        let mut url = Url::parse(&self.events_url).map_err(|e| {
            BroadcastError::configuration(format!("invalid trigger URL {}: {}", self.events_url, e))
        })?;

        // The signature covers these exact body bytes
        let signature = RequestSignature::sign(
            &self.key,
            &self.secret,
            "POST",
            url.path(),
            &body,
            chrono::Utc::now().timestamp(),
        )?;
        url.query_pairs_mut().extend_pairs(signature.query_pairs());

        // Built per call: a blocking client owns a runtime and must also be
        // dropped off the async workers.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let response = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .text()
            .ok()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

        Err(BroadcastError::api(status.as_u16(), message))
    }
}

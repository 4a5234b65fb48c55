use std::thread;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CalendarError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    PageView,
    GroupSelected { name: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TelemetryPayload {
    #[serde(flatten)]
    pub event: TelemetryEvent,
    pub timestamp: String,
    pub client: String,
}

impl TelemetryPayload {
    pub fn new(event: TelemetryEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            client: format!("uek-cal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Fire-and-forget analytics. Implementations swallow their own failures.
pub trait TelemetrySink {
    fn record(&self, event: TelemetryEvent);
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn record(&self, event: TelemetryEvent) {
        (**self).record(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, event: TelemetryEvent) {
        debug!(?event, "telemetry disabled");
    }
}

#[derive(Clone)]
pub struct HttpTelemetry {
    client: Client,
    endpoint: String,
}

impl HttpTelemetry {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CalendarError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("uek-cal/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CalendarError::Telemetry(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|err| CalendarError::Telemetry(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn send(
        client: &Client,
        endpoint: &str,
        payload: &TelemetryPayload,
    ) -> Result<(), CalendarError> {
        let response = client
            .post(endpoint)
            .json(payload)
            .send()
            .map_err(|err| CalendarError::Telemetry(err.to_string()))?;
        if !response.status().is_success() {
            return Err(CalendarError::Telemetry(format!(
                "endpoint returned status {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}

impl TelemetrySink for HttpTelemetry {
    fn record(&self, event: TelemetryEvent) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let payload = TelemetryPayload::new(event);
        thread::spawn(move || {
            if let Err(err) = Self::send(&client, &endpoint, &payload) {
                warn!(error = %err, "telemetry event dropped");
            }
        });
    }
}

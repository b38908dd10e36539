// Startpage calendar feed
// Fetches read-only events from an external HTTP endpoint. Any failure
// degrades to "no events"; the calendar never surfaces an error to the user.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use serde_json::Value;
use tracing::{debug, error};

use crate::types::calendar::CalendarEvent;
use crate::types::errors::CalendarError;
use crate::types::settings::CalendarSettings;

/// Source of calendar events.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// Decodes a feed body.
///
/// - an array is the event list
/// - `null` means no events
/// - an object with an `error` member is a feed-side failure
pub fn parse_feed(body: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| CalendarError::Decode(e.to_string()))?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| CalendarError::Decode(e.to_string()))
        }
        Value::Object(ref map) if map.contains_key("error") => {
            let message = match &map["error"] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Err(CalendarError::Feed(message))
        }
        other => Err(CalendarError::Decode(format!(
            "expected an array of events, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches events and swallows every failure, logging it.
pub async fn load_events(source: &dyn CalendarSource) -> Vec<CalendarEvent> {
    match source.fetch_events().await {
        Ok(events) => {
            debug!(count = events.len(), "[CalendarFeed] events loaded");
            events
        }
        Err(e) => {
            error!(error = %e, "[CalendarFeed] failed to load events");
            Vec::new()
        }
    }
}

/// Calendar feed served over HTTP GET.
pub struct HttpCalendarFeed {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCalendarFeed {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CalendarError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CalendarError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CalendarSource for HttpCalendarFeed {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CalendarError::Transport(format!("Failed to read body: {}", e)))?;
        parse_feed(&body)
    }
}

/// Used when no endpoint is configured.
pub struct NoCalendar;

#[async_trait]
impl CalendarSource for NoCalendar {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        Ok(Vec::new())
    }
}

/// Builds the configured calendar source. An empty endpoint, or one the HTTP
/// client rejects, yields [`NoCalendar`].
pub fn source_from_settings(settings: &CalendarSettings) -> Box<dyn CalendarSource> {
    if settings.endpoint.trim().is_empty() {
        return Box::new(NoCalendar);
    }
    match HttpCalendarFeed::new(
        settings.endpoint.trim(),
        Duration::from_secs(settings.timeout_secs.max(1)),
    ) {
        Ok(feed) => Box::new(feed),
        Err(e) => {
            error!(error = %e, "[CalendarFeed] calendar disabled");
            Box::new(NoCalendar)
        }
    }
}

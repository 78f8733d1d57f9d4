//! Display log, session, and event types for stream monitoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a display log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Data,
    Info,
    Error,
    Auth,
}

impl MessageKind {
    /// Lowercase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Data => "data",
            MessageKind::Info => "info",
            MessageKind::Error => "error",
            MessageKind::Auth => "auth",
        }
    }
}

/// A single entry in the append-only display log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(content: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Payload of one parsed stream line.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamData {
    /// The line parsed as a JSON value.
    Json(serde_json::Value),
    /// The line was not valid JSON; carried verbatim.
    Text(String),
}

impl fmt::Display for StreamData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamData::Json(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{value}"),
            },
            StreamData::Text(text) => f.write_str(text),
        }
    }
}

/// Events delivered to the host while a session runs.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// One parsed line of stream data.
    Data(StreamData),
    /// Human-readable failure description; the session has stopped.
    Error(String),
    /// The session performed its stop transition.
    Disconnected,
}

/// Snapshot of the monitor's session state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StreamSession {
    pub is_streaming: bool,
    pub start_time: Option<DateTime<Utc>>,
}

/// Description of a stream to connect to.
#[derive(Debug, Clone, Default)]
pub struct StreamRequest {
    pub url: String,
    /// Extra request headers, appended after the defaults. Pairs with an
    /// empty name or value are dropped at send time.
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL. Same empty-pair rule.
    pub params: Vec<(String, String)>,
}

impl StreamRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

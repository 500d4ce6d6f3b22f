#![forbid(unsafe_code)]

//! Console relay from the preview iframe to the parent page.
//!
//! Inside the iframe every console call is captured with
//! [`ConsoleForwarder::capture`], which turns arbitrary arguments into
//! JSON-safe values. The parent collects the relayed messages in a
//! [`ConsoleLog`]; a `clear` call flushes it instead of being stored.
//!
//! # Sanitization
//!
//! - An [`ConsoleArg::Error`] becomes its string form (`"Name: message"`)
//!   and reclassifies the whole message as `error`.
//! - Any other value is serialized and parsed back; when that round trip
//!   fails (a value that refuses to serialize, such as a cyclic structure)
//!   the value's `Display` form is sent instead. Capture never fails.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::protocol::Timestamp;

/// Wrapped console methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleMethod {
    Log,
    Warn,
    Error,
    Info,
    Debug,
    Clear,
}

impl ConsoleMethod {
    pub const ALL: [Self; 6] = [
        Self::Log,
        Self::Warn,
        Self::Error,
        Self::Info,
        Self::Debug,
        Self::Clear,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for ConsoleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can be logged: JSON-encodable, with a string fallback.
pub trait ConsoleValue: fmt::Display {
    fn to_json(&self) -> serde_json::Result<String>;
}

impl<T> ConsoleValue for T
where
    T: Serialize + fmt::Display,
{
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// One console argument.
pub enum ConsoleArg {
    /// An exception object.
    Error { name: String, message: String },
    Value(Box<dyn ConsoleValue>),
}

impl ConsoleArg {
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn value(value: impl ConsoleValue + 'static) -> Self {
        Self::Value(Box::new(value))
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// JSON-safe form of this argument.
    #[must_use]
    pub fn sanitize(&self) -> Value {
        match self {
            Self::Error { name, message } => Value::String(error_string(name, message)),
            Self::Value(value) => probe(value.as_ref()),
        }
    }
}

impl fmt::Debug for ConsoleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { name, message } => f
                .debug_struct("Error")
                .field("name", name)
                .field("message", message)
                .finish(),
            Self::Value(value) => f.debug_tuple("Value").field(&value.to_string()).finish(),
        }
    }
}

impl From<&str> for ConsoleArg {
    fn from(value: &str) -> Self {
        Self::value(value.to_owned())
    }
}

impl From<String> for ConsoleArg {
    fn from(value: String) -> Self {
        Self::value(value)
    }
}

impl From<Value> for ConsoleArg {
    fn from(value: Value) -> Self {
        Self::value(value)
    }
}

fn error_string(name: &str, message: &str) -> String {
    if message.is_empty() {
        name.to_owned()
    } else {
        format!("{name}: {message}")
    }
}

fn probe(value: &dyn ConsoleValue) -> Value {
    match value
        .to_json()
        .and_then(|json| serde_json::from_str::<Value>(&json))
    {
        Ok(parsed) => parsed,
        Err(err) => {
            trace!(error = %err, "console arg not JSON-safe, using string form");
            Value::String(value.to_string())
        }
    }
}

/// A relayed console call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleMessage {
    /// Wall-clock time of the call.
    pub timestamp: Timestamp,
    /// Seconds since the preview document loaded.
    pub time: f64,
    #[serde(rename = "type")]
    pub method: ConsoleMethod,
    pub args: Vec<Value>,
}

impl ConsoleMessage {
    /// Arguments joined the way a console line shows them: strings raw,
    /// everything else as JSON.
    #[must_use]
    pub fn text(&self) -> String {
        self.args
            .iter()
            .map(|arg| match arg {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Iframe-side console hook.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleForwarder {
    loaded_at: Duration,
}

impl ConsoleForwarder {
    /// `loaded_at` is the monotonic time the preview document loaded.
    #[must_use]
    pub const fn new(loaded_at: Duration) -> Self {
        Self { loaded_at }
    }

    /// Restart elapsed-time accounting (a full document rewrite).
    pub fn reload(&mut self, loaded_at: Duration) {
        self.loaded_at = loaded_at;
    }

    /// Build the message for one console call.
    #[must_use]
    pub fn capture(
        &self,
        method: ConsoleMethod,
        args: &[ConsoleArg],
        now_wall: DateTime<Utc>,
        now_mono: Duration,
    ) -> ConsoleMessage {
        let method = if args.iter().any(ConsoleArg::is_error) {
            ConsoleMethod::Error
        } else {
            method
        };
        ConsoleMessage {
            timestamp: Timestamp::from_datetime(now_wall),
            time: now_mono.saturating_sub(self.loaded_at).as_secs_f64(),
            method,
            args: args.iter().map(ConsoleArg::sanitize).collect(),
        }
    }
}

/// Parent-side console view model.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    entries: Vec<ConsoleMessage>,
    capacity: Option<usize>,
}

impl ConsoleLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the newest `capacity` messages.
    #[must_use]
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// Record a relayed message; `clear` flushes the log instead.
    pub fn push(&mut self, message: ConsoleMessage) {
        if message.method == ConsoleMethod::Clear {
            self.clear();
            return;
        }
        self.entries.push(message);
        if let Some(capacity) = self.capacity {
            let excess = self.entries.len().saturating_sub(capacity);
            self.entries.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn entries(&self) -> &[ConsoleMessage] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

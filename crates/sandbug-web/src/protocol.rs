#![forbid(unsafe_code)]

//! Cross-frame message schema.
//!
//! Parent → iframe: [`UpdateMessage`]. Iframe → parent: [`FrameMessage`]
//! (`ack` or `console`, tagged by `action`). Both travel as JSON strings over
//! `postMessage`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use sandbug_compile::PanelKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::console::ConsoleMessage;

/// Update identity: an ISO-8601 UTC instant with microsecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Truncate `instant` to microseconds.
    #[must_use]
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        let micros = instant.timestamp_micros();
        Self(DateTime::from_timestamp_micros(micros).unwrap_or(instant))
    }

    #[must_use]
    pub const fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parse an RFC 3339 string.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        DateTime::parse_from_rfc3339(text)
            .map(|instant| Self::from_datetime(instant.with_timezone(&Utc)))
            .map_err(|err| ProtocolError::Timestamp(format!("{text:?}: {err}")))
    }

    fn successor(self) -> Self {
        Self(self.0 + TimeDelta::microseconds(1))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Micros, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Issues strictly increasing timestamps from wall-clock readings.
///
/// Two updates in the same microsecond (or a clock stepping backwards) still
/// get distinct, ordered identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampSource {
    last: Option<Timestamp>,
}

impl TimestampSource {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> Timestamp {
        let candidate = Timestamp::from_datetime(now);
        let issued = match self.last {
            Some(last) if candidate <= last => last.successor(),
            _ => candidate,
        };
        self.last = Some(issued);
        issued
    }
}

/// One input panel's mode and source as sent to the iframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelInput {
    pub mode: String,
    pub content: String,
}

impl PanelInput {
    pub fn new(mode: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            content: content.into(),
        }
    }
}

/// Content and mode of every input panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMap {
    pub markup: PanelInput,
    pub style: PanelInput,
    pub script: PanelInput,
}

impl Default for PanelMap {
    fn default() -> Self {
        let empty = |panel: PanelKind| PanelInput::new(panel.default_mode().wire_name(), "");
        Self {
            markup: empty(PanelKind::Markup),
            style: empty(PanelKind::Style),
            script: empty(PanelKind::Script),
        }
    }
}

impl PanelMap {
    #[must_use]
    pub const fn get(&self, panel: PanelKind) -> &PanelInput {
        match panel {
            PanelKind::Markup => &self.markup,
            PanelKind::Style => &self.style,
            PanelKind::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, panel: PanelKind) -> &mut PanelInput {
        match panel {
            PanelKind::Markup => &mut self.markup,
            PanelKind::Style => &mut self.style,
            PanelKind::Script => &mut self.script,
        }
    }
}

/// Rendering hints sent with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateFlags {
    /// Only the style changed: replace the live `<style>` text.
    pub css: bool,
    /// Only the markup changed: diff/patch the live body.
    pub patch: bool,
    /// Build the document without the script panel.
    pub noscript: bool,
}

impl UpdateFlags {
    /// Full rebuild.
    pub const FULL: Self = Self {
        css: false,
        patch: false,
        noscript: false,
    };

    #[must_use]
    pub const fn is_incremental(self) -> bool {
        self.css || self.patch
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Parent → iframe update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub timestamp: Timestamp,
    pub map: PanelMap,
    #[serde(default, skip_serializing_if = "is_false")]
    pub css: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub patch: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub noscript: bool,
}

impl UpdateMessage {
    #[must_use]
    pub const fn new(timestamp: Timestamp, map: PanelMap, flags: UpdateFlags) -> Self {
        Self {
            timestamp,
            map,
            css: flags.css,
            patch: flags.patch,
            noscript: flags.noscript,
        }
    }

    #[must_use]
    pub const fn flags(&self) -> UpdateFlags {
        UpdateFlags {
            css: self.css,
            patch: self.patch,
            noscript: self.noscript,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|err| ProtocolError::Json(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|err| ProtocolError::Json(err.to_string()))
    }
}

/// Iframe → parent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FrameMessage {
    Ack { timestamp: Timestamp },
    Console(ConsoleMessage),
}

impl FrameMessage {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|err| ProtocolError::Json(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|err| ProtocolError::Json(err.to_string()))
    }
}

/// A `postMessage` call the host must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPost {
    /// Origin the receiving window must have; `"*"` for any.
    pub target_origin: String,
    pub payload: String,
}

/// `"*"` accepts any origin.
#[must_use]
pub fn origin_matches(expected: &str, actual: &str) -> bool {
    expected == "*" || expected == actual
}

/// Errors from encoding or decoding cross-frame messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Malformed or schema-violating JSON.
    Json(String),
    /// Unparseable timestamp.
    Timestamp(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::Timestamp(msg) => write!(f, "invalid timestamp {msg}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

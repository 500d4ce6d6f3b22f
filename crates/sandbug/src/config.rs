#![forbid(unsafe_code)]

//! Session configuration as data.
//!
//! [`SandboxConfig`] groups every tunable of a sandbox session so a host can
//! pass one JSON blob at startup. Every field defaults to the per-crate
//! defaults, so `{}` is a valid configuration.
//!
//! ```
//! use sandbug::SandboxConfig;
//!
//! let config = SandboxConfig::from_json_str(
//!     r#"{ "layout": { "initial_layout": "top" }, "channel": { "retry": { "interval": 50 } } }"#,
//! )
//! .unwrap();
//! assert_eq!(config.channel.retry.interval.as_millis(), 50);
//! ```

use std::time::Duration;

use sandbug_layout::LayoutConfig;
use sandbug_web::{
    ChannelConfig, DEFAULT_AUTO_UPDATE_DEBOUNCE, FrameConfig, ResizerPointerConfig,
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Default number of console messages the parent keeps.
pub const DEFAULT_CONSOLE_CAPACITY: usize = 1_000;

/// Auto-update settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoUpdateConfig {
    pub enabled: bool,
    /// Quiet window after the last edit.
    #[serde(with = "sandbug_core::duration_ms")]
    pub debounce: Duration,
}

impl Default for AutoUpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce: DEFAULT_AUTO_UPDATE_DEBOUNCE,
        }
    }
}

/// Top-level configuration for one sandbox session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub layout: LayoutConfig,
    pub pointer: ResizerPointerConfig,
    pub channel: ChannelConfig,
    /// Settings the host hands to the preview frame's runtime.
    pub frame: FrameConfig,
    pub auto_update: AutoUpdateConfig,
    /// Console messages kept on the parent; older ones are dropped.
    pub console_capacity: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            pointer: ResizerPointerConfig::default(),
            channel: ChannelConfig::default(),
            frame: FrameConfig::default(),
            auto_update: AutoUpdateConfig::default(),
            console_capacity: DEFAULT_CONSOLE_CAPACITY,
        }
    }
}

impl SandboxConfig {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(s).map_err(Error::Config)?;
        config.layout.validate()?;
        Ok(config)
    }

    /// Serialize to JSON, e.g. to hand the frame half to the preview page.
    pub fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::Config)
    }

    /// Range problems that deserialization cannot catch. Empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(err) = self.layout.validate() {
            errors.push(format!("layout: {err}"));
        }
        if self.channel.retry.interval.is_zero() {
            errors.push("channel.retry.interval must be > 0".into());
        }
        if self.channel.retry.max_attempts == Some(0) {
            errors.push("channel.retry.max_attempts must be > 0 when set".into());
        }
        if self.frame.dedupe_window == 0 {
            errors.push("frame.dedupe_window must be > 0".into());
        }
        if self.console_capacity == 0 {
            errors.push("console_capacity must be > 0".into());
        }
        errors
    }
}

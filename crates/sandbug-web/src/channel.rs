#![forbid(unsafe_code)]

//! Parent-side update channel with ack/retry delivery.
//!
//! # Lifecycle of one update
//!
//! ```text
//! update() ──> Queued ──poll (every interval)──> Retrying ──ack──> Acknowledged
//!                 │                                 │
//!                 └── newer update + CancelOlder ───┴──> Superseded
//!                                                   └── timeout / attempts ──> Expired
//! ```
//!
//! # Invariants
//!
//! 1. Every pending timestamp is retried independently.
//! 2. An ack removes exactly the matching timestamp and nothing else.
//! 3. Messages whose origin does not match the frame origin are ignored.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::console::{ConsoleMessage, ConsoleMethod};
use crate::protocol::{
    FrameMessage, OutboundPost, PanelMap, ProtocolError, Timestamp, TimestampSource,
    UpdateFlags, UpdateMessage, origin_matches,
};

/// Default retry interval.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Default ceiling on how long one update is retried.
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(10);

/// How retries are paced and when they give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    #[serde(with = "sandbug_core::duration_ms")]
    pub interval: Duration,
    /// Give up this long after the first post. `None` retries until acked.
    #[serde(with = "sandbug_core::duration_ms::option")]
    pub timeout: Option<Duration>,
    /// Give up after this many posts. `None` for no limit.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            timeout: Some(DEFAULT_RETRY_TIMEOUT),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Retry forever, like an unbounded interval loop.
    #[must_use]
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            max_attempts: None,
        }
    }
}

/// What happens to older in-flight updates when a new one is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersedePolicy {
    /// Keep retrying every pending update until it is acked or expires.
    #[default]
    KeepAll,
    /// Drop older pending updates; only the newest is retried.
    CancelOlder,
}

/// Channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Origin of the preview frame. Posts are scoped to it and messages from
    /// other origins are ignored. `"*"` disables the check.
    pub frame_origin: String,
    pub retry: RetryPolicy,
    pub supersede: SupersedePolicy,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            frame_origin: "*".to_owned(),
            retry: RetryPolicy::default(),
            supersede: SupersedePolicy::default(),
        }
    }
}

/// An update awaiting its ack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub timestamp: Timestamp,
    payload: String,
    first_sent: Duration,
    last_sent: Duration,
    attempts: u32,
}

impl PendingUpdate {
    /// Posts made so far, including the first.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Something the parent page should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Acked {
        timestamp: Timestamp,
        attempts: u32,
        latency: Duration,
    },
    Superseded {
        timestamp: Timestamp,
    },
    Expired {
        timestamp: Timestamp,
        attempts: u32,
    },
    Console(ConsoleMessage),
    ConsoleClear,
}

/// Parent → iframe delivery with per-timestamp retry.
#[derive(Debug, Clone, Default)]
pub struct PreviewChannel {
    config: ChannelConfig,
    timestamps: TimestampSource,
    pending: Vec<PendingUpdate>,
    events: VecDeque<ChannelEvent>,
}

impl PreviewChannel {
    #[must_use]
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Queue an update and return its first post.
    pub fn update(
        &mut self,
        map: PanelMap,
        flags: UpdateFlags,
        now_wall: DateTime<Utc>,
        now: Duration,
    ) -> Result<OutboundPost, ProtocolError> {
        let timestamp = self.timestamps.next(now_wall);
        let payload = UpdateMessage::new(timestamp, map, flags).to_json()?;

        if self.config.supersede == SupersedePolicy::CancelOlder {
            for old in self.pending.drain(..) {
                debug!(timestamp = %old.timestamp, "update superseded");
                self.events.push_back(ChannelEvent::Superseded {
                    timestamp: old.timestamp,
                });
            }
        }

        debug!(%timestamp, ?flags, pending = self.pending.len() + 1, "update queued");
        self.pending.push(PendingUpdate {
            timestamp,
            payload: payload.clone(),
            first_sent: now,
            last_sent: now,
            attempts: 1,
        });
        Ok(self.post(payload))
    }

    /// Retry tick: re-post every pending update whose interval elapsed and
    /// expire those past the policy limits.
    pub fn poll(&mut self, now: Duration) -> Vec<OutboundPost> {
        let retry = self.config.retry;
        let mut posts = Vec::new();
        let mut kept = Vec::with_capacity(self.pending.len());

        for mut pending in std::mem::take(&mut self.pending) {
            if now.saturating_sub(pending.last_sent) < retry.interval {
                kept.push(pending);
                continue;
            }
            let timed_out = retry
                .timeout
                .is_some_and(|timeout| now.saturating_sub(pending.first_sent) >= timeout);
            let exhausted = retry
                .max_attempts
                .is_some_and(|max| pending.attempts >= max);
            if timed_out || exhausted {
                warn!(
                    timestamp = %pending.timestamp,
                    attempts = pending.attempts,
                    "update expired without ack"
                );
                self.events.push_back(ChannelEvent::Expired {
                    timestamp: pending.timestamp,
                    attempts: pending.attempts,
                });
                continue;
            }
            pending.attempts += 1;
            pending.last_sent = now;
            trace!(timestamp = %pending.timestamp, attempt = pending.attempts, "update retried");
            posts.push(self.post(pending.payload.clone()));
            kept.push(pending);
        }

        self.pending = kept;
        posts
    }

    /// Handle a message posted by the frame.
    ///
    /// Returns `Ok(None)` for foreign origins and for acks of timestamps that
    /// are no longer pending.
    pub fn handle_message(
        &mut self,
        json: &str,
        origin: &str,
        now: Duration,
    ) -> Result<Option<ChannelEvent>, ProtocolError> {
        if !origin_matches(&self.config.frame_origin, origin) {
            debug!(
                origin,
                expected = %self.config.frame_origin,
                "message from foreign origin ignored"
            );
            return Ok(None);
        }
        let event = match FrameMessage::from_json(json)? {
            FrameMessage::Ack { timestamp } => self.acknowledge(timestamp, now),
            FrameMessage::Console(message) if message.method == ConsoleMethod::Clear => {
                Some(ChannelEvent::ConsoleClear)
            }
            FrameMessage::Console(message) => Some(ChannelEvent::Console(message)),
        };
        Ok(event)
    }

    /// Remove `timestamp` from the pending set.
    pub fn acknowledge(&mut self, timestamp: Timestamp, now: Duration) -> Option<ChannelEvent> {
        let Some(index) = self
            .pending
            .iter()
            .position(|pending| pending.timestamp == timestamp)
        else {
            trace!(%timestamp, "ack for unknown update");
            return None;
        };
        let pending = self.pending.remove(index);
        let latency = now.saturating_sub(pending.first_sent);
        debug!(%timestamp, attempts = pending.attempts, ?latency, "update acked");
        Some(ChannelEvent::Acked {
            timestamp,
            attempts: pending.attempts,
            latency,
        })
    }

    /// Drop every pending update (the page is unloading).
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingUpdate> + '_ {
        self.pending.iter()
    }

    #[must_use]
    pub fn is_pending(&self, timestamp: Timestamp) -> bool {
        self.pending.iter().any(|pending| pending.timestamp == timestamp)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Earliest time [`PreviewChannel::poll`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|pending| pending.last_sent + self.config.retry.interval)
            .min()
    }

    /// Drain supersede/expiry notifications.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ChannelEvent> + '_ {
        self.events.drain(..)
    }

    fn post(&self, payload: String) -> OutboundPost {
        OutboundPost {
            target_origin: self.config.frame_origin.clone(),
            payload,
        }
    }
}

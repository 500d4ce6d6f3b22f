#![forbid(unsafe_code)]

//! Parent-page session object.
//!
//! A [`Workbench`] owns everything the editor page keeps per session: the
//! panel layout engine and its pointer adapter, the input panels' content
//! and modes, the update channel with its auto-update debounce, and the
//! console view model. The host forwards browser events and clock readings
//! and carries the returned posts to the preview frame.
//!
//! # Update flags
//!
//! [`Workbench::update`] compares the panels with the last update sent:
//!
//! | changed since last send | flags |
//! |-------------------------|-------|
//! | nothing sent yet, script, noscript, or nothing at all | full rebuild |
//! | style only | `css` |
//! | markup only | `patch` |
//! | markup and style | `css` + `patch` |

use std::time::Duration;

use chrono::{DateTime, Utc};
use sandbug_compile::{Mode, PanelKind};
use sandbug_layout::{LayoutNode, PanelId, PanelLayoutEngine, PanelSize};
use sandbug_web::{
    AutoUpdate, ChannelEvent, ConsoleLog, OutboundPost, PanelMap, PreviewChannel,
    ResizerPointerAdapter, UpdateFlags,
};
use tracing::debug;

use crate::config::SandboxConfig;
use crate::{Error, Result};

/// Point-in-time view of one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub id: PanelId,
    /// Recorded size; the target when an animation is running.
    pub size: Option<PanelSize>,
    pub default_size: Option<PanelSize>,
    /// Pixel offset accumulated since the last reset.
    pub offset: f64,
    /// Content mode; `None` for the output panel or an unrecognized mode.
    pub mode: Option<Mode>,
}

const fn panel_kind(id: PanelId) -> Option<PanelKind> {
    match id {
        PanelId::Markup => Some(PanelKind::Markup),
        PanelId::Style => Some(PanelKind::Style),
        PanelId::Script => Some(PanelKind::Script),
        PanelId::Output => None,
    }
}

/// What the last update carried.
#[derive(Debug, Clone)]
struct SentUpdate {
    panels: PanelMap,
    noscript: bool,
}

/// One sandbox session on the parent page.
#[derive(Debug, Clone)]
pub struct Workbench {
    engine: PanelLayoutEngine,
    pointer: ResizerPointerAdapter,
    channel: PreviewChannel,
    auto_update: AutoUpdate,
    panels: PanelMap,
    last_sent: Option<SentUpdate>,
    noscript: bool,
    console: ConsoleLog,
}

impl Workbench {
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let engine = PanelLayoutEngine::new(config.layout)?;
        let mut auto_update = AutoUpdate::new(config.auto_update.debounce);
        auto_update.set_enabled(config.auto_update.enabled);
        Ok(Self {
            engine,
            pointer: ResizerPointerAdapter::new(config.pointer),
            channel: PreviewChannel::new(config.channel),
            auto_update,
            panels: PanelMap::default(),
            last_sent: None,
            noscript: false,
            console: ConsoleLog::with_capacity_limit(config.console_capacity),
        })
    }

    #[must_use]
    pub const fn engine(&self) -> &PanelLayoutEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PanelLayoutEngine {
        &mut self.engine
    }

    /// The pointer adapter together with the engine it drives.
    pub fn pointer(&mut self) -> (&mut ResizerPointerAdapter, &mut PanelLayoutEngine) {
        (&mut self.pointer, &mut self.engine)
    }

    #[must_use]
    pub const fn channel(&self) -> &PreviewChannel {
        &self.channel
    }

    #[must_use]
    pub const fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn clear_console(&mut self) {
        self.console.clear();
    }

    #[must_use]
    pub const fn panels(&self) -> &PanelMap {
        &self.panels
    }

    #[must_use]
    pub fn content(&self, panel: PanelKind) -> &str {
        &self.panels.get(panel).content
    }

    #[must_use]
    pub fn mode(&self, panel: PanelKind) -> Option<Mode> {
        Mode::from_wire(&self.panels.get(panel).mode)
    }

    /// Size, offset and mode of `id`.
    #[must_use]
    pub fn panel(&self, id: PanelId) -> PanelSnapshot {
        let node = LayoutNode::Panel(id);
        PanelSnapshot {
            id,
            size: self.engine.size(node),
            default_size: self.engine.default_size(node),
            offset: self.engine.offset(node),
            mode: panel_kind(id).and_then(|panel| self.mode(panel)),
        }
    }

    /// Replace a panel's source (an editor change event).
    pub fn set_content(&mut self, panel: PanelKind, content: impl Into<String>, now: Duration) {
        self.panels.get_mut(panel).content = content.into();
        self.auto_update.trigger(now);
    }

    /// Switch a panel's mode. The mode must belong to the panel.
    pub fn set_mode(&mut self, panel: PanelKind, mode: Mode, now: Duration) -> Result<()> {
        if mode.panel() != panel {
            return Err(Error::ModeMismatch { panel, mode });
        }
        debug!(%panel, %mode, "panel mode changed");
        self.panels.get_mut(panel).mode = mode.wire_name().to_owned();
        self.auto_update.trigger(now);
        Ok(())
    }

    /// Build previews without the script panel.
    pub fn set_noscript(&mut self, noscript: bool) {
        self.noscript = noscript;
    }

    pub fn set_auto_update(&mut self, enabled: bool) {
        self.auto_update.set_enabled(enabled);
    }

    /// Flags for the next update, from what changed since the last one.
    #[must_use]
    pub fn pending_flags(&self) -> UpdateFlags {
        let full = UpdateFlags {
            noscript: self.noscript,
            ..UpdateFlags::FULL
        };
        let Some(last) = &self.last_sent else {
            return full;
        };
        let markup = last.panels.markup != self.panels.markup;
        let style = last.panels.style != self.panels.style;
        let script = last.panels.script != self.panels.script;
        if script || last.noscript != self.noscript || !(markup || style) {
            return full;
        }
        UpdateFlags {
            css: style,
            patch: markup,
            ..full
        }
    }

    /// Send the current panels to the frame now.
    pub fn update(&mut self, now_wall: DateTime<Utc>, now: Duration) -> Result<OutboundPost> {
        self.update_with(self.pending_flags(), now_wall, now)
    }

    /// Send the current panels with explicit flags.
    pub fn update_with(
        &mut self,
        flags: UpdateFlags,
        now_wall: DateTime<Utc>,
        now: Duration,
    ) -> Result<OutboundPost> {
        self.auto_update.cancel();
        let post = self
            .channel
            .update(self.panels.clone(), flags, now_wall, now)?;
        self.last_sent = Some(SentUpdate {
            panels: self.panels.clone(),
            noscript: flags.noscript,
        });
        Ok(post)
    }

    /// Periodic tick: advance layout animations, fire a due auto-update and
    /// collect retries. The auto-update post, if any, comes first.
    pub fn poll(&mut self, now_wall: DateTime<Utc>, now: Duration) -> Result<Vec<OutboundPost>> {
        self.engine.tick(now);
        let mut posts = Vec::new();
        if self.auto_update.poll(now) {
            posts.push(self.update(now_wall, now)?);
        }
        posts.extend(self.channel.poll(now));
        Ok(posts)
    }

    /// Earliest time [`Workbench::poll`] has channel or debounce work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.auto_update.deadline(), self.channel.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handle a message posted by the preview frame. Console output is also
    /// recorded in the console log.
    pub fn handle_frame_message(
        &mut self,
        json: &str,
        origin: &str,
        now: Duration,
    ) -> Result<Option<ChannelEvent>> {
        let event = self.channel.handle_message(json, origin, now)?;
        match &event {
            Some(ChannelEvent::Console(message)) => self.console.push(message.clone()),
            Some(ChannelEvent::ConsoleClear) => self.console.clear(),
            _ => {}
        }
        Ok(event)
    }

    /// Drain superseded/expired notifications from the channel.
    pub fn drain_channel_events(&mut self) -> impl Iterator<Item = ChannelEvent> + '_ {
        self.channel.drain_events()
    }

    /// Stop retrying everything (the page is unloading).
    pub fn shutdown(&mut self) -> usize {
        self.auto_update.cancel();
        self.channel.cancel_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn bench() -> Workbench {
        Workbench::new(SandboxConfig::default()).unwrap()
    }

    #[test]
    fn first_update_is_full_then_incremental() {
        let mut bench = bench();
        bench.set_content(PanelKind::Markup, "<p>a</p>", Duration::ZERO);
        assert_eq!(bench.pending_flags(), UpdateFlags::FULL);
        bench.update(wall(), Duration::ZERO).unwrap();

        bench.set_content(PanelKind::Style, "p { color: red }", Duration::ZERO);
        let flags = bench.pending_flags();
        assert!(flags.css && !flags.patch);

        bench.set_content(PanelKind::Markup, "<p>b</p>", Duration::ZERO);
        let flags = bench.pending_flags();
        assert!(flags.css && flags.patch);

        bench.set_content(PanelKind::Script, "1", Duration::ZERO);
        assert_eq!(bench.pending_flags(), UpdateFlags::FULL);
    }

    #[test]
    fn mode_must_belong_to_panel() {
        let mut bench = bench();
        let err = bench
            .set_mode(PanelKind::Style, Mode::Gfm, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, Error::ModeMismatch { .. }));
        bench
            .set_mode(PanelKind::Markup, Mode::Gfm, Duration::ZERO)
            .unwrap();
        assert_eq!(bench.mode(PanelKind::Markup), Some(Mode::Gfm));
        assert_eq!(bench.panel(PanelId::Markup).mode, Some(Mode::Gfm));
        assert_eq!(bench.panel(PanelId::Output).mode, None);
    }

    #[test]
    fn noscript_is_carried_on_every_flag_set() {
        let mut bench = bench();
        bench.set_noscript(true);
        assert!(bench.pending_flags().noscript);
        bench.update(wall(), Duration::ZERO).unwrap();
        bench.set_content(PanelKind::Style, "a{}", Duration::ZERO);
        let flags = bench.pending_flags();
        assert!(flags.noscript && flags.css);
    }

    #[test]
    fn toggling_noscript_forces_a_full_update() {
        let mut bench = bench();
        bench.set_content(PanelKind::Markup, "<p>a</p>", Duration::ZERO);
        bench.update(wall(), Duration::ZERO).unwrap();

        bench.set_noscript(true);
        bench.set_content(PanelKind::Markup, "<p>b</p>", Duration::ZERO);
        let flags = bench.pending_flags();
        assert!(flags.noscript && !flags.patch && !flags.css);
        bench.update(wall(), Duration::ZERO).unwrap();

        bench.set_content(PanelKind::Markup, "<p>c</p>", Duration::ZERO);
        assert!(bench.pending_flags().patch);
        bench.set_noscript(false);
        assert_eq!(bench.pending_flags(), UpdateFlags::FULL);
    }

    #[test]
    fn console_log_is_bounded_by_config() {
        let mut bench = Workbench::new(SandboxConfig {
            console_capacity: 2,
            ..SandboxConfig::default()
        })
        .unwrap();
        let forwarder = sandbug_web::ConsoleForwarder::new(Duration::ZERO);
        for index in 0..5 {
            let message = forwarder.capture(
                sandbug_web::ConsoleMethod::Log,
                &[sandbug_web::ConsoleArg::from(format!("line {index}"))],
                wall(),
                Duration::from_millis(index),
            );
            let json = sandbug_web::FrameMessage::Console(message).to_json().unwrap();
            bench
                .handle_frame_message(&json, "null", Duration::from_millis(index))
                .unwrap();
        }
        assert_eq!(bench.console().len(), 2);
    }
}

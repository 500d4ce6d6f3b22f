#![forbid(unsafe_code)]

//! Iframe-side runtime: ack, compile, render.
//!
//! [`FrameRuntime::handle_message`] acks every update before doing anything
//! else, then decides how to render it:
//!
//! | flags | live document | action |
//! |-------|---------------|--------|
//! | none | any | [`RenderAction::Rewrite`] (full document write) |
//! | `css` | yes | [`RenderAction::ReplaceStyle`] |
//! | `patch` | yes | [`RenderAction::PatchBody`] |
//! | `css`/`patch` | no | [`RenderAction::Rewrite`] |
//! | `css`/`patch` with a different `noscript` | yes | [`RenderAction::Rewrite`] |
//!
//! A body patch is diffed against the body the host reports through
//! [`FrameRuntime::handle_message_with_body`]. Without that report the frame
//! diffs against its own copy of the last rendered body, which only holds
//! while no script can have touched the document; once one may have, a patch
//! request is rendered as a rewrite.
//!
//! Updates may arrive out of order or more than once. Each distinct timestamp
//! is rendered once; repeats are acked again and otherwise ignored.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sandbug_compile::{CompilerRegistry, PanelKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::console::{ConsoleArg, ConsoleForwarder, ConsoleMethod};
use crate::document::{DocumentParts, DocumentTemplate};
use crate::dom::{self, DomPatch, Node};
use crate::protocol::{
    FrameMessage, OutboundPost, ProtocolError, Timestamp, UpdateMessage, origin_matches,
};

/// Default number of recent timestamps remembered for de-duplication.
pub const DEFAULT_DEDUPE_WINDOW: usize = 64;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Origin of the parent page. Replies are scoped to it and updates from
    /// other origins are ignored. `"*"` disables the check.
    pub parent_origin: String,
    pub template: DocumentTemplate,
    pub dedupe_window: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            parent_origin: "*".to_owned(),
            template: DocumentTemplate::default(),
            dedupe_window: DEFAULT_DEDUPE_WINDOW,
        }
    }
}

/// How the host must update the preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    /// Replace the whole document (open/write/close).
    Rewrite { html: String },
    /// Replace the text of the live style node.
    ReplaceStyle { css: String },
    /// Apply minimal mutations to the live body.
    PatchBody { patches: Vec<DomPatch> },
}

/// Reply to one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameResponse {
    pub timestamp: Timestamp,
    /// Ack to post to the parent, always first.
    pub ack: OutboundPost,
    /// Empty for repeated deliveries.
    pub actions: Vec<RenderAction>,
}

impl FrameResponse {
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Debug, Clone)]
struct LiveDocument {
    body: Vec<Node>,
    css: String,
    /// `noscript` the document was written with.
    noscript: bool,
    /// Scripts may have changed the body since it was rendered.
    scripted: bool,
}

/// Compiles and renders updates inside the preview frame.
#[derive(Debug, Clone)]
pub struct FrameRuntime {
    config: FrameConfig,
    registry: CompilerRegistry,
    live: Option<LiveDocument>,
    seen: VecDeque<Timestamp>,
    console: ConsoleForwarder,
}

impl FrameRuntime {
    #[must_use]
    pub fn new(config: FrameConfig, registry: CompilerRegistry) -> Self {
        Self {
            config,
            registry,
            live: None,
            seen: VecDeque::new(),
            console: ConsoleForwarder::new(Duration::ZERO),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut CompilerRegistry {
        &mut self.registry
    }

    /// Whether a document has been written.
    #[must_use]
    pub const fn has_document(&self) -> bool {
        self.live.is_some()
    }

    /// Live body as last rendered.
    #[must_use]
    pub fn live_body(&self) -> Option<&[Node]> {
        self.live.as_ref().map(|live| live.body.as_slice())
    }

    #[must_use]
    pub fn live_css(&self) -> Option<&str> {
        self.live.as_ref().map(|live| live.css.as_str())
    }

    /// Handle one update posted by the parent.
    ///
    /// Returns `Ok(None)` for messages from a foreign origin.
    pub fn handle_message(
        &mut self,
        json: &str,
        origin: &str,
        now: Duration,
    ) -> Result<Option<FrameResponse>, ProtocolError> {
        self.handle_message_with_body(json, origin, None, now)
    }

    /// Like [`FrameRuntime::handle_message`], with the live body's current
    /// serialization (`document.body.innerHTML`) as the base for patches.
    pub fn handle_message_with_body(
        &mut self,
        json: &str,
        origin: &str,
        live_body: Option<&str>,
        now: Duration,
    ) -> Result<Option<FrameResponse>, ProtocolError> {
        if !origin_matches(&self.config.parent_origin, origin) {
            debug!(origin, "update from foreign origin ignored");
            return Ok(None);
        }
        let message = UpdateMessage::from_json(json)?;
        let timestamp = message.timestamp;
        let ack = OutboundPost {
            target_origin: self.config.parent_origin.clone(),
            payload: FrameMessage::Ack { timestamp }.to_json()?,
        };

        if self.seen.contains(&timestamp) {
            trace!(%timestamp, "duplicate update re-acked");
            return Ok(Some(FrameResponse {
                timestamp,
                ack,
                actions: Vec::new(),
            }));
        }
        self.remember(timestamp);

        let actions = self.render(&message, live_body, now);
        Ok(Some(FrameResponse {
            timestamp,
            ack,
            actions,
        }))
    }

    /// Relay a console call to the parent.
    pub fn console(
        &self,
        method: ConsoleMethod,
        args: &[ConsoleArg],
        now_wall: DateTime<Utc>,
        now: Duration,
    ) -> Result<OutboundPost, ProtocolError> {
        let message = self.console.capture(method, args, now_wall, now);
        Ok(OutboundPost {
            target_origin: self.config.parent_origin.clone(),
            payload: FrameMessage::Console(message).to_json()?,
        })
    }

    fn render(
        &mut self,
        message: &UpdateMessage,
        live_body: Option<&str>,
        now: Duration,
    ) -> Vec<RenderAction> {
        let flags = message.flags();
        let compile = |registry: &CompilerRegistry, panel: PanelKind| {
            let input = message.map.get(panel);
            registry
                .compile_input(panel, &input.mode, &input.content)
                .output
        };

        let incremental = |live: &LiveDocument| {
            flags.is_incremental()
                && live.noscript == flags.noscript
                && (!flags.patch || live_body.is_some() || !live.scripted)
        };
        if let Some(live) = self.live.as_mut().filter(|live| incremental(&**live)) {
            let mut actions = Vec::with_capacity(2);
            if flags.css {
                let css = compile(&self.registry, PanelKind::Style);
                live.css.clone_from(&css);
                actions.push(RenderAction::ReplaceStyle { css });
            }
            if flags.patch {
                let body = body_nodes(dom::parse_fragment(&compile(
                    &self.registry,
                    PanelKind::Markup,
                )));
                let patches = match live_body {
                    Some(html) => dom::diff(&body_nodes(dom::parse_fragment(html)), &body),
                    None => dom::diff(&live.body, &body),
                };
                live.scripted |= runs_scripts(&body);
                debug!(
                    timestamp = %message.timestamp,
                    patches = patches.len(),
                    "body patched"
                );
                live.body = body;
                actions.push(RenderAction::PatchBody { patches });
            }
            return actions;
        }
        if flags.is_incremental() && self.live.is_some() {
            debug!(
                timestamp = %message.timestamp,
                noscript = flags.noscript,
                "live document cannot be patched, rewriting"
            );
        }

        let markup = compile(&self.registry, PanelKind::Markup);
        let css = compile(&self.registry, PanelKind::Style);
        let script = (!flags.noscript).then_some(message.map.script.content.as_str());
        let body = body_nodes(dom::parse_fragment(&markup));
        let scripted =
            script.is_some_and(|script| !script.trim().is_empty()) || runs_scripts(&body);
        let html = self.config.template.assemble(DocumentParts {
            markup: &markup,
            style: &css,
            script,
        });
        debug!(
            timestamp = %message.timestamp,
            bytes = html.len(),
            noscript = flags.noscript,
            "document rewritten"
        );
        self.live = Some(LiveDocument {
            body,
            css,
            noscript: flags.noscript,
            scripted,
        });
        self.console.reload(now);
        vec![RenderAction::Rewrite { html }]
    }

    fn remember(&mut self, timestamp: Timestamp) {
        self.seen.push_back(timestamp);
        while self.seen.len() > self.config.dedupe_window.max(1) {
            self.seen.pop_front();
        }
    }
}

/// Children of the first `<body>` element, or the whole fragment when the
/// markup is not a full document.
fn body_nodes(mut nodes: Vec<Node>) -> Vec<Node> {
    fn find_body(nodes: &mut Vec<Node>) -> Option<Vec<Node>> {
        nodes.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.tag == "body" => {
                Some(std::mem::take(&mut element.children))
            }
            Node::Element(element) if element.tag == "html" => find_body(&mut element.children),
            _ => None,
        })
    }
    find_body(&mut nodes).unwrap_or(nodes)
}

/// Whether any `<script>` element or inline event handler is present.
fn runs_scripts(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Element(element) => {
            element.tag == "script"
                || element.attrs.keys().any(|name| name.starts_with("on"))
                || runs_scripts(&element.children)
        }
        Node::Text { .. } | Node::Comment { .. } => false,
    })
}

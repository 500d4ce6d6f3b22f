#![forbid(unsafe_code)]

//! Live preview plumbing between the editor page and the preview iframe.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page delivers `postMessage` payloads,
//!   pointer signals and clock readings; nothing here touches a browser API.
//! - **Deterministic time**: every stateful type takes `now` explicitly.
//! - **No blocking / no threads**.
//!
//! Parent side: [`PreviewChannel`] sends [`UpdateMessage`]s and retries them
//! until the frame acknowledges each timestamp; [`AutoUpdate`] debounces
//! edits; [`ResizerPointerAdapter`] turns pointer events into layout drags.
//!
//! Frame side: [`FrameRuntime`] compiles the panel contents, rewrites or
//! patches the preview document and forwards console output back up.

pub mod channel;
pub mod console;
pub mod debounce;
pub mod document;
pub mod dom;
pub mod frame;
pub mod protocol;
pub mod resizer_pointer;

pub use channel::{
    ChannelConfig, ChannelEvent, DEFAULT_RETRY_INTERVAL, DEFAULT_RETRY_TIMEOUT, PendingUpdate,
    PreviewChannel, RetryPolicy, SupersedePolicy,
};
pub use console::{
    ConsoleArg, ConsoleForwarder, ConsoleLog, ConsoleMessage, ConsoleMethod, ConsoleValue,
};
pub use debounce::{AutoUpdate, DEFAULT_AUTO_UPDATE_DEBOUNCE};
pub use document::{DocumentParts, DocumentTemplate, STYLE_ELEMENT_ID};
pub use dom::{DomPatch, Element, Node, PatchError, apply, diff, parse_fragment, render};
pub use frame::{DEFAULT_DEDUPE_WINDOW, FrameConfig, FrameResponse, FrameRuntime, RenderAction};
pub use protocol::{
    FrameMessage, OutboundPost, PanelInput, PanelMap, ProtocolError, Timestamp, TimestampSource,
    UpdateFlags, UpdateMessage, origin_matches,
};
pub use resizer_pointer::{
    CaptureCommand, DragEffect, IgnoredReason, InterruptPolicy, LifecyclePhase, LogEntry,
    LogOutcome, PointerButton, ResizerDispatch, ResizerPointerAdapter, ResizerPointerConfig,
};

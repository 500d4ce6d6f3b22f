#![forbid(unsafe_code)]

//! sandbug public facade crate.
//!
//! Re-exports the public surface of the workspace crates and adds the pieces
//! a host page needs to drive one sandbox session: [`SandboxConfig`] loaded
//! from JSON, the [`Workbench`] that ties the layout engine, pointer adapter,
//! update channel and console log together, and a top-level [`Error`].

use std::fmt;

pub mod config;
pub mod workbench;

pub use config::{AutoUpdateConfig, DEFAULT_CONSOLE_CAPACITY, SandboxConfig};
pub use workbench::{PanelSnapshot, Workbench};

// --- Layout re-exports -----------------------------------------------------

pub use sandbug_layout::{
    LayoutConfig, LayoutError, LayoutEvent, LayoutKind, LayoutNode, PanelId, PanelLayoutEngine,
    PanelRects, PanelSize, Resizer, ResizerId, ResizerKind, StyleDeclaration,
};

// --- Compile re-exports ----------------------------------------------------

pub use sandbug_compile::{
    CompileError, CompiledInput, Compiler, CompilerRegistry, Mode, PanelKind,
};

// --- Web re-exports --------------------------------------------------------

pub use sandbug_web::{
    CaptureCommand, ChannelConfig, ChannelEvent, ConsoleArg, ConsoleLog, ConsoleMessage,
    ConsoleMethod, DomPatch, DragEffect, FrameConfig, FrameResponse, FrameRuntime, OutboundPost,
    PanelInput, PanelMap, PatchError, PointerButton, ProtocolError, RenderAction, ResizerDispatch,
    ResizerPointerAdapter, ResizerPointerConfig, RetryPolicy, SupersedePolicy, Timestamp,
    UpdateFlags, UpdateMessage,
};

pub use sandbug_core::clock::{DeterministicClock, MonotonicClock, SystemClock};
pub use sandbug_core::{Point, Rect};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for sandbug hosts.
#[derive(Debug)]
pub enum Error {
    /// Layout engine refused an operation or its configuration.
    Layout(LayoutError),
    /// A cross-frame message could not be encoded or decoded.
    Protocol(ProtocolError),
    /// A DOM patch did not resolve against the live tree.
    Patch(PatchError),
    /// A compiler failed where the caller asked for the error.
    Compile(CompileError),
    /// Configuration JSON was malformed.
    Config(serde_json::Error),
    /// A mode was assigned to a panel it does not belong to.
    ModeMismatch { panel: PanelKind, mode: Mode },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout: {err}"),
            Self::Protocol(err) => write!(f, "protocol: {err}"),
            Self::Patch(err) => write!(f, "dom: {err}"),
            Self::Compile(err) => write!(f, "compile: {err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::ModeMismatch { panel, mode } => {
                write!(f, "mode {mode} is a {} mode, not {panel}", mode.panel())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Protocol(err) => Some(err),
            Self::Patch(err) => Some(err),
            Self::Compile(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::ModeMismatch { .. } => None,
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

impl From<PatchError> for Error {
    fn from(err: PatchError) -> Self {
        Self::Patch(err)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for sandbug APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ChannelEvent, DeterministicClock, Error, LayoutKind, Mode, MonotonicClock, OutboundPost,
        PanelId, PanelKind, Point, Rect, ResizerId, Result, SandboxConfig, Workbench,
    };

    pub use crate::{compile, core, layout, web};
}

pub use sandbug_compile as compile;
pub use sandbug_core as core;
pub use sandbug_layout as layout;
pub use sandbug_web as web;

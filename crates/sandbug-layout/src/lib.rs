#![forbid(unsafe_code)]

//! Resizable multi-panel layout engine.
//!
//! The sandbox page has a fixed set of panels: three inputs (markup, style,
//! script) grouped together, and one output preview. This crate sizes them:
//!
//! - [`panel`]: panel identities and `percent + offset` sizes rendered as CSS.
//! - [`preset`]: the `columns`/`top`/`left` layouts and their proportions.
//! - [`resizer`]: separators derived from the layout and panel order.
//! - [`geometry`]: pure rectangle resolution and drag clamping.
//! - [`engine`]: the per-page [`PanelLayoutEngine`] controller.

pub mod engine;
pub mod geometry;
pub mod panel;
pub mod preset;
pub mod resizer;

pub use engine::{
    DEFAULT_MIN_PANEL_SIZE, DEFAULT_RESET_DURATION, DEFAULT_TRANSITION_DURATION, LayoutConfig,
    LayoutError, LayoutEvent, PanelLayoutEngine, StyleDeclaration,
};
pub use geometry::{PanelRects, clamp_drag_delta, group_min_extent, resolve_rects};
pub use panel::{LayoutNode, PanelId, PanelSize};
pub use preset::{LayoutKind, UnknownLayout};
pub use resizer::{Resizer, ResizerId, ResizerKind};
pub use sandbug_core::geometry::{Axis, Point, Rect};

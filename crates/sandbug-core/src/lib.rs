#![forbid(unsafe_code)]

//! Core: geometry, animation primitives, clocks and logging.
//!
//! # Role in sandbug
//! `sandbug-core` holds the host-agnostic building blocks shared by the panel
//! layout engine (`sandbug-layout`) and the live-preview protocol
//! (`sandbug-web`). Nothing here touches the DOM: the embedding host pushes
//! sizes and clock readings in and applies whatever the engines compute.
//!
//! # Primary responsibilities
//! - **Geometry**: pixel rectangles and split axes.
//! - **Animation**: normalized time-based tweens with easing.
//! - **Clock**: a deterministic host-driven monotonic clock, plus a
//!   wall-backed one for hosts that do not drive time themselves.
//! - **Logging**: `tracing` re-exports and optional JSON subscriber setup.
//! - **Config helpers**: millisecond (de)serialization for `Duration` fields.

pub mod animation;
pub mod clock;
pub mod duration_ms;
pub mod geometry;
pub mod logging;

pub use geometry::{Axis, Point, Rect};

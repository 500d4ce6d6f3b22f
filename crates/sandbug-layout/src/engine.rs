#![forbid(unsafe_code)]

//! Stateful panel layout engine.
//!
//! [`PanelLayoutEngine`] is the per-page controller for the resizable panel
//! set. It owns the recorded sizes, the single active drag, running
//! reset/entrance animations, and the "layout transitioning" flag. The host
//! adapter feeds it pointer positions, container size and clock readings,
//! and writes back the CSS declarations from [`PanelLayoutEngine::styles`].
//!
//! # Lifecycle
//!
//! ```text
//! Idle --begin_drag--> Dragging --drag_move*--> Dragging --end_drag--> Idle
//!                                      \--cancel_drag--> Idle (sizes restored)
//! Idle --set_layout--> Transitioning --tick (entrance done)--> Idle
//! ```
//!
//! # Invariants
//!
//! 1. Exactly one layout is active; the panel set never changes.
//! 2. At most one drag is active.
//! 3. During a drag neither neighbour is resized below its minimum, measured
//!    from the rectangles captured at drag start.
//! 4. While a layout transition runs, drags, resets and further layout
//!    requests are refused and no resizers are exposed.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::time::Duration;

use sandbug_core::animation::{Animation, Fade, swing};
use sandbug_core::{Point, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::{PanelRects, clamp_drag_delta, extent_of, group_min_extent, resolve_rects};
use crate::panel::{LayoutNode, PanelSize};
use crate::preset::LayoutKind;
use crate::resizer::{Resizer, ResizerId, ResizerKind};

/// Default minimum panel extent in pixels.
pub const DEFAULT_MIN_PANEL_SIZE: f64 = 40.0;

/// Default double-click reset animation duration.
pub const DEFAULT_RESET_DURATION: Duration = Duration::from_millis(200);

/// Default layout entrance animation duration.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(400);

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum extent (px) any panel may be dragged down to.
    pub min_panel_size: f64,
    /// Duration of the double-click reset animation.
    #[serde(with = "sandbug_core::duration_ms")]
    pub reset_duration: Duration,
    /// Duration of the layout entrance animation.
    #[serde(with = "sandbug_core::duration_ms")]
    pub transition_duration: Duration,
    /// Layout active after construction.
    pub initial_layout: LayoutKind,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_panel_size: DEFAULT_MIN_PANEL_SIZE,
            reset_duration: DEFAULT_RESET_DURATION,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            initial_layout: LayoutKind::Columns,
        }
    }
}

impl LayoutConfig {
    /// Validate numeric fields.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.min_panel_size.is_finite() || self.min_panel_size < 0.0 {
            return Err(LayoutError::InvalidMinPanelSize {
                value: self.min_panel_size,
            });
        }
        Ok(())
    }
}

/// Engine errors. Layout requests that are merely redundant are not errors;
/// they return `false` from [`PanelLayoutEngine::set_layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutError {
    InvalidMinPanelSize { value: f64 },
    UnknownResizer { resizer: ResizerId },
    DragInProgress { active: ResizerId },
    NoActiveDrag,
    Transitioning { target: LayoutKind },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMinPanelSize { value } => {
                write!(f, "minimum panel size must be finite and >= 0 (got {value})")
            }
            Self::UnknownResizer { resizer } => write!(f, "no such resizer: {resizer}"),
            Self::DragInProgress { active } => {
                write!(f, "a drag on {active} is already in progress")
            }
            Self::NoActiveDrag => write!(f, "no drag in progress"),
            Self::Transitioning { target } => {
                write!(f, "layout transition to {target} in progress")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Notifications for dependents (editor panels re-measure on resize, the page
/// swaps the container class on layout changes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LayoutEvent {
    ResizeStarted { resizer: ResizerId },
    Resized { resizer: ResizerId, delta: f64 },
    ResizeComplete { resizer: ResizerId },
    ResizeCanceled { resizer: ResizerId },
    ResetFinished { resizer: ResizerId },
    LayoutTransitionStarted { from: LayoutKind, to: LayoutKind },
    LayoutChanged { layout: LayoutKind },
}

/// One inline style the adapter must apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDeclaration {
    pub node: LayoutNode,
    pub property: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    resizer: Resizer,
    origin: f64,
    prev_start: PanelSize,
    next_start: PanelSize,
    prev_extent: f64,
    next_extent: f64,
    prev_min: f64,
    next_min: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimationKind {
    Reset(ResizerId),
    Entrance(LayoutKind),
}

#[derive(Debug, Clone, Copy)]
struct SizeTransition {
    node: LayoutNode,
    from: PanelSize,
    to: PanelSize,
}

#[derive(Debug, Clone)]
struct RunningAnimation {
    kind: AnimationKind,
    fade: Fade,
    transitions: Vec<SizeTransition>,
}

impl RunningAnimation {
    fn displayed(&self, node: LayoutNode) -> Option<PanelSize> {
        let t = f64::from(self.fade.value());
        self.transitions
            .iter()
            .find(|transition| transition.node == node)
            .map(|transition| transition.from.lerp(transition.to, t))
    }
}

/// Per-page controller for the resizable panel set.
#[derive(Debug, Clone)]
pub struct PanelLayoutEngine {
    config: LayoutConfig,
    layout: LayoutKind,
    container: Rect,
    sizes: BTreeMap<LayoutNode, PanelSize>,
    resizers: Vec<Resizer>,
    drag: Option<DragSession>,
    animations: Vec<RunningAnimation>,
    transitioning: Option<LayoutKind>,
    now: Duration,
    events: VecDeque<LayoutEvent>,
}

impl PanelLayoutEngine {
    /// Capture the fixed panel set: default sizes for the initial layout,
    /// zeroed offsets, resizers derived.
    pub fn new(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let layout = config.initial_layout;
        Ok(Self {
            config,
            layout,
            container: Rect::default(),
            sizes: presets(layout),
            resizers: Resizer::derive_all(layout),
            drag: None,
            animations: Vec::new(),
            transitioning: None,
            now: Duration::ZERO,
            events: VecDeque::new(),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Active layout.
    #[must_use]
    pub const fn layout(&self) -> LayoutKind {
        self.layout
    }

    /// Class the container element should carry.
    #[must_use]
    pub fn layout_class(&self) -> String {
        self.layout.class_name()
    }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.transitioning.is_some()
    }

    #[must_use]
    pub const fn container(&self) -> Rect {
        self.container
    }

    /// Update the container rectangle (page resize). An active drag keeps
    /// using the geometry captured when it started.
    pub fn set_container(&mut self, container: Rect) {
        self.container = container;
    }

    /// Resizers with installed handlers. Empty while a layout transition runs.
    #[must_use]
    pub fn resizers(&self) -> &[Resizer] {
        &self.resizers
    }

    #[must_use]
    pub fn resizer(&self, id: ResizerId) -> Option<&Resizer> {
        self.resizers.iter().find(|resizer| resizer.id == id)
    }

    /// Recorded size of `node` (animation targets, not intermediate frames).
    #[must_use]
    pub fn size(&self, node: LayoutNode) -> Option<PanelSize> {
        self.sizes.get(&node).copied()
    }

    /// Accumulated pixel offset of `node` since its last reset.
    #[must_use]
    pub fn offset(&self, node: LayoutNode) -> f64 {
        self.size(node).map(|size| size.offset).unwrap_or(0.0)
    }

    /// Default size of `node` in the active layout.
    #[must_use]
    pub fn default_size(&self, node: LayoutNode) -> Option<PanelSize> {
        self.layout.preset(node)
    }

    /// Size currently on screen, including running animations.
    #[must_use]
    pub fn displayed_size(&self, node: LayoutNode) -> Option<PanelSize> {
        self.animations
            .iter()
            .rev()
            .find_map(|animation| animation.displayed(node))
            .or_else(|| self.size(node))
    }

    /// Pixel rectangles of the panels as currently displayed.
    #[must_use]
    pub fn panel_rects(&self) -> PanelRects {
        resolve_rects(self.container, self.layout, &self.displayed_sizes())
    }

    /// Left edge (px) of the master resizer, in layouts that position it.
    #[must_use]
    pub fn master_resizer_position(&self) -> Option<f64> {
        self.displayed_size(LayoutNode::MasterResizer)
            .map(|size| size.resolve(self.container.extent(self.layout.master_axis())))
    }

    /// Inline style for `node`, or `None` when the node is at its layout
    /// default and the stylesheet applies.
    #[must_use]
    pub fn inline_style(&self, node: LayoutNode) -> Option<StyleDeclaration> {
        let displayed = self.displayed_size(node)?;
        if Some(displayed) == self.default_size(node) {
            return None;
        }
        Some(StyleDeclaration {
            node,
            property: self.layout.css_property(node),
            value: displayed.to_css(),
        })
    }

    /// All inline styles, in a stable node order.
    #[must_use]
    pub fn styles(&self) -> Vec<StyleDeclaration> {
        self.layout
            .sized_nodes()
            .filter_map(|node| self.inline_style(node))
            .collect()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Resizer being dragged, if any.
    #[must_use]
    pub fn active_resizer(&self) -> Option<ResizerId> {
        self.drag.map(|drag| drag.resizer.id)
    }

    /// Drain queued notifications.
    pub fn drain_events(&mut self) -> impl Iterator<Item = LayoutEvent> + '_ {
        self.events.drain(..)
    }

    /// Start dragging `id` from `pointer`.
    ///
    /// Records the neighbours' rectangles, sizes and minimums at this moment;
    /// the whole gesture is clamped against them.
    pub fn begin_drag(&mut self, id: ResizerId, pointer: Point) -> Result<(), LayoutError> {
        if let Some(target) = self.transitioning {
            return Err(LayoutError::Transitioning { target });
        }
        if let Some(active) = self.active_resizer() {
            return Err(LayoutError::DragInProgress { active });
        }
        let resizer = *self
            .resizer(id)
            .ok_or(LayoutError::UnknownResizer { resizer: id })?;

        self.settle_resets();

        let rects = self.panel_rects();
        let axis = resizer.axis;
        let min = self.config.min_panel_size;
        let prev_min = match resizer.kind {
            ResizerKind::Master => group_min_extent(self.layout, &self.sizes, min),
            ResizerKind::Input => min,
        };
        let session = DragSession {
            resizer,
            origin: pointer.along(axis),
            prev_start: self.size_or_default(resizer.prev),
            next_start: self.size_or_default(resizer.next),
            prev_extent: extent_of(&rects, resizer.prev, axis),
            next_extent: extent_of(&rects, resizer.next, axis),
            prev_min,
            next_min: min,
        };
        debug!(
            resizer = %id,
            prev = %resizer.prev,
            next = %resizer.next,
            prev_extent = session.prev_extent,
            next_extent = session.next_extent,
            "drag started"
        );
        self.drag = Some(session);
        self.events
            .push_back(LayoutEvent::ResizeStarted { resizer: id });
        Ok(())
    }

    /// Apply the pointer displacement since drag start. Returns the clamped
    /// displacement actually applied.
    pub fn drag_move(&mut self, pointer: Point) -> Result<f64, LayoutError> {
        let drag = self.drag.ok_or(LayoutError::NoActiveDrag)?;
        let raw = pointer.along(drag.resizer.axis) - drag.origin;
        let delta = clamp_drag_delta(
            raw,
            drag.prev_extent,
            drag.next_extent,
            drag.prev_min,
            drag.next_min,
        );

        let prev = drag.prev_start.with_offset(drag.prev_start.offset + delta);
        let next = drag.next_start.with_offset(drag.next_start.offset - delta);
        self.sizes.insert(drag.resizer.prev, prev);
        self.sizes.insert(drag.resizer.next, next);
        if drag.resizer.kind == ResizerKind::Master && self.layout.positions_master_resizer() {
            self.sizes.insert(LayoutNode::MasterResizer, prev);
        }
        trace!(resizer = %drag.resizer.id, raw, delta, "drag move");
        self.events.push_back(LayoutEvent::Resized {
            resizer: drag.resizer.id,
            delta,
        });
        Ok(delta)
    }

    /// Finish the drag, keeping the new sizes.
    pub fn end_drag(&mut self) -> Result<ResizerId, LayoutError> {
        let drag = self.drag.take().ok_or(LayoutError::NoActiveDrag)?;
        let id = drag.resizer.id;
        debug!(
            resizer = %id,
            prev_offset = self.offset(drag.resizer.prev),
            next_offset = self.offset(drag.resizer.next),
            "drag complete"
        );
        self.events
            .push_back(LayoutEvent::ResizeComplete { resizer: id });
        Ok(id)
    }

    /// Abort the drag, restoring the sizes recorded at drag start.
    pub fn cancel_drag(&mut self) -> Result<ResizerId, LayoutError> {
        let drag = self.drag.take().ok_or(LayoutError::NoActiveDrag)?;
        self.sizes.insert(drag.resizer.prev, drag.prev_start);
        self.sizes.insert(drag.resizer.next, drag.next_start);
        if drag.resizer.kind == ResizerKind::Master && self.layout.positions_master_resizer() {
            self.sizes
                .insert(LayoutNode::MasterResizer, drag.prev_start);
        }
        debug!(resizer = %drag.resizer.id, "drag canceled");
        self.events.push_back(LayoutEvent::ResizeCanceled {
            resizer: drag.resizer.id,
        });
        Ok(drag.resizer.id)
    }

    /// Double-click reset: animate both neighbours of `id` back to their
    /// layout defaults and zero their offsets.
    ///
    /// With `with_resizer`, the master resizer position (in layouts that
    /// position it) is animated in lockstep.
    pub fn reset_panel_pair(
        &mut self,
        id: ResizerId,
        with_resizer: bool,
        now: Duration,
    ) -> Result<(), LayoutError> {
        if let Some(target) = self.transitioning {
            return Err(LayoutError::Transitioning { target });
        }
        if let Some(active) = self.active_resizer() {
            return Err(LayoutError::DragInProgress { active });
        }
        let resizer = *self
            .resizer(id)
            .ok_or(LayoutError::UnknownResizer { resizer: id })?;
        self.tick(now);

        let mut nodes = vec![resizer.prev, resizer.next];
        if with_resizer && self.layout.positions_master_resizer() {
            nodes.push(LayoutNode::MasterResizer);
        }

        let mut transitions = Vec::with_capacity(nodes.len());
        for node in nodes {
            let Some(target) = self.default_size(node) else {
                continue;
            };
            let from = self.displayed_size(node).unwrap_or(target);
            self.sizes.insert(node, target);
            transitions.push(SizeTransition {
                node,
                from,
                to: target,
            });
        }
        debug!(resizer = %id, with_resizer, "reset panel pair");

        self.animations
            .retain(|animation| animation.kind != AnimationKind::Reset(id));
        self.start_animation(
            AnimationKind::Reset(id),
            self.config.reset_duration,
            transitions,
        );
        Ok(())
    }

    /// Switch to `layout`.
    ///
    /// Returns `false` (and does nothing) if a transition is already running
    /// or `layout` is already active. Otherwise strips every inline size back
    /// to the new layout's defaults, swaps the layout and runs the entrance
    /// animation; resizers are re-derived when it completes. `immediate`
    /// completes the switch within this call.
    pub fn set_layout(&mut self, layout: LayoutKind, immediate: bool, now: Duration) -> bool {
        if let Some(target) = self.transitioning {
            debug!(requested = %layout, %target, "layout request ignored: transitioning");
            return false;
        }
        if layout == self.layout {
            return false;
        }
        if let Some(drag) = self.drag.take() {
            self.events.push_back(LayoutEvent::ResizeCanceled {
                resizer: drag.resizer.id,
            });
        }
        self.tick(now);
        self.animations.clear();

        let from = self.layout;
        self.transitioning = Some(layout);
        self.resizers.clear();
        self.layout = layout;
        self.sizes = presets(layout);
        debug!(%from, to = %layout, immediate, "layout transition started");
        self.events
            .push_back(LayoutEvent::LayoutTransitionStarted { from, to: layout });

        let transitions = layout
            .sized_nodes()
            .filter_map(|node| {
                let to = layout.preset(node)?;
                let from = if from.css_property(node) == layout.css_property(node) {
                    from.preset(node).unwrap_or(PanelSize::percent(0.0))
                } else {
                    PanelSize::percent(0.0)
                };
                Some(SizeTransition { node, from, to })
            })
            .collect();
        let duration = if immediate {
            Duration::ZERO
        } else {
            self.config.transition_duration
        };
        self.start_animation(AnimationKind::Entrance(layout), duration, transitions);
        true
    }

    /// Advance to the next layout in cycle order.
    pub fn cycle_layout(&mut self, now: Duration) -> bool {
        self.set_layout(self.layout.next(), false, now)
    }

    /// Advance running animations to `now`, finishing any that complete.
    pub fn tick(&mut self, now: Duration) {
        let dt = now.saturating_sub(self.now);
        self.now = self.now.max(now);
        if dt.is_zero() {
            return;
        }
        for animation in &mut self.animations {
            animation.fade.tick(dt);
        }
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.animations)
            .into_iter()
            .partition(|animation| animation.fade.is_complete());
        self.animations = running;
        for animation in done {
            self.finish(animation.kind);
        }
    }

    fn start_animation(
        &mut self,
        kind: AnimationKind,
        duration: Duration,
        transitions: Vec<SizeTransition>,
    ) {
        if duration.is_zero() {
            self.finish(kind);
            return;
        }
        self.animations.push(RunningAnimation {
            kind,
            fade: Fade::new(duration).easing(swing),
            transitions,
        });
    }

    fn finish(&mut self, kind: AnimationKind) {
        match kind {
            AnimationKind::Reset(resizer) => {
                trace!(%resizer, "reset finished");
                self.events.push_back(LayoutEvent::ResetFinished { resizer });
            }
            AnimationKind::Entrance(layout) => {
                self.resizers = Resizer::derive_all(layout);
                self.transitioning = None;
                debug!(%layout, "layout transition complete");
                self.events.push_back(LayoutEvent::LayoutChanged { layout });
            }
        }
    }

    fn settle_resets(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.animations)
            .into_iter()
            .partition(|animation| matches!(animation.kind, AnimationKind::Reset(_)));
        self.animations = running;
        for animation in done {
            self.finish(animation.kind);
        }
    }

    fn size_or_default(&self, node: LayoutNode) -> PanelSize {
        self.size(node)
            .or_else(|| self.default_size(node))
            .unwrap_or_default()
    }

    fn displayed_sizes(&self) -> BTreeMap<LayoutNode, PanelSize> {
        self.layout
            .sized_nodes()
            .filter_map(|node| Some((node, self.displayed_size(node)?)))
            .collect()
    }
}

fn presets(layout: LayoutKind) -> BTreeMap<LayoutNode, PanelSize> {
    layout
        .sized_nodes()
        .filter_map(|node| Some((node, layout.preset(node)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelId;
    use pretty_assertions::assert_eq;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn engine(layout: LayoutKind) -> PanelLayoutEngine {
        let mut engine = PanelLayoutEngine::new(LayoutConfig {
            initial_layout: layout,
            ..LayoutConfig::default()
        })
        .expect("default config is valid");
        engine.set_container(Rect::from_size(1200.0, 800.0));
        engine
    }

    fn markup() -> LayoutNode {
        LayoutNode::Panel(PanelId::Markup)
    }

    fn style() -> LayoutNode {
        LayoutNode::Panel(PanelId::Style)
    }

    #[test]
    fn initialize_records_defaults_and_zero_offsets() {
        let engine = engine(LayoutKind::Columns);
        for node in LayoutKind::Columns.sized_nodes() {
            assert_eq!(engine.size(node), engine.default_size(node));
            assert_eq!(engine.offset(node), 0.0);
        }
        assert_eq!(engine.resizers().len(), 3);
        assert!(engine.styles().is_empty());
    }

    #[test]
    fn drag_moves_space_between_neighbours() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Input(0), Point::new(300.0, 10.0))
            .unwrap();
        let applied = engine.drag_move(Point::new(340.0, 99.0)).unwrap();
        assert_eq!(applied, 40.0);
        assert_eq!(engine.offset(markup()), 40.0);
        assert_eq!(engine.offset(style()), -40.0);
        let rects = engine.panel_rects();
        assert!(approx(rects.panels[&PanelId::Markup].width, 340.0));
        assert_eq!(engine.end_drag().unwrap(), ResizerId::Input(0));
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(
            events.last(),
            Some(&LayoutEvent::ResizeComplete {
                resizer: ResizerId::Input(0)
            })
        );
    }

    #[test]
    fn drag_is_clamped_by_start_geometry() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Input(0), Point::new(300.0, 0.0))
            .unwrap();
        let applied = engine.drag_move(Point::new(-1000.0, 0.0)).unwrap();
        assert!(approx(applied, -(300.0 - DEFAULT_MIN_PANEL_SIZE)));
        let applied = engine.drag_move(Point::new(5000.0, 0.0)).unwrap();
        assert!(approx(applied, 300.0 - DEFAULT_MIN_PANEL_SIZE));
    }

    #[test]
    fn second_drag_is_rejected() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Input(0), Point::default())
            .unwrap();
        assert_eq!(
            engine.begin_drag(ResizerId::Master, Point::default()),
            Err(LayoutError::DragInProgress {
                active: ResizerId::Input(0)
            })
        );
    }

    #[test]
    fn cancel_restores_start_sizes() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Input(1), Point::new(600.0, 0.0))
            .unwrap();
        engine.drag_move(Point::new(650.0, 0.0)).unwrap();
        engine.cancel_drag().unwrap();
        assert_eq!(engine.offset(style()), 0.0);
        assert!(engine.styles().is_empty());
    }

    #[test]
    fn master_drag_in_left_layout_moves_resizer() {
        let mut engine = engine(LayoutKind::Left);
        assert_eq!(engine.master_resizer_position(), Some(600.0));
        engine
            .begin_drag(ResizerId::Master, Point::new(600.0, 0.0))
            .unwrap();
        engine.drag_move(Point::new(700.0, 0.0)).unwrap();
        engine.end_drag().unwrap();
        assert_eq!(engine.master_resizer_position(), Some(700.0));
        assert_eq!(engine.offset(LayoutNode::InputGroup), 100.0);
        assert_eq!(engine.offset(LayoutNode::Panel(PanelId::Output)), -100.0);
        let left = engine
            .styles()
            .into_iter()
            .find(|style| style.node == LayoutNode::MasterResizer)
            .unwrap();
        assert_eq!(left.property, "left");
        assert_eq!(left.value, "calc(50% + 100px)");
    }

    #[test]
    fn master_drag_in_columns_protects_every_input() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Master, Point::new(900.0, 0.0))
            .unwrap();
        let applied = engine.drag_move(Point::new(0.0, 0.0)).unwrap();
        // Group may shrink to 3 * min, not just min.
        assert!(approx(applied, -(900.0 - 3.0 * DEFAULT_MIN_PANEL_SIZE)));
    }

    #[test]
    fn reset_zeroes_offsets_and_animates_to_defaults() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Input(0), Point::new(300.0, 0.0))
            .unwrap();
        engine.drag_move(Point::new(380.0, 0.0)).unwrap();
        engine.end_drag().unwrap();

        engine
            .reset_panel_pair(ResizerId::Input(0), false, ms(1000))
            .unwrap();
        assert_eq!(engine.offset(markup()), 0.0);
        assert_eq!(engine.offset(style()), 0.0);
        // Still animating: the displayed size is between the drag and the default.
        let mid = engine.displayed_size(markup()).unwrap();
        assert_eq!(mid.offset, 80.0);
        engine.tick(ms(1100));
        let mid = engine.displayed_size(markup()).unwrap();
        assert!(mid.offset > 0.0 && mid.offset < 80.0);
        engine.tick(ms(1200));
        assert_eq!(engine.displayed_size(markup()), engine.default_size(markup()));
        assert!(engine.styles().is_empty());
        assert!(
            engine
                .drain_events()
                .any(|event| event == LayoutEvent::ResetFinished {
                    resizer: ResizerId::Input(0)
                })
        );
    }

    #[test]
    fn reset_with_resizer_moves_master_in_lockstep() {
        let mut engine = engine(LayoutKind::Left);
        engine
            .begin_drag(ResizerId::Master, Point::new(600.0, 0.0))
            .unwrap();
        engine.drag_move(Point::new(500.0, 0.0)).unwrap();
        engine.end_drag().unwrap();
        engine
            .reset_panel_pair(ResizerId::Master, true, ms(0))
            .unwrap();
        engine.tick(ms(100));
        let group = engine.displayed_size(LayoutNode::InputGroup).unwrap();
        let handle = engine.displayed_size(LayoutNode::MasterResizer).unwrap();
        assert_eq!(group, handle);
        engine.tick(ms(500));
        assert_eq!(engine.master_resizer_position(), Some(600.0));
    }

    #[test]
    fn set_layout_same_layout_is_noop() {
        let mut engine = engine(LayoutKind::Columns);
        assert!(!engine.set_layout(LayoutKind::Columns, false, ms(0)));
        assert!(!engine.is_transitioning());
        assert_eq!(engine.layout_class(), "layout-columns");
        assert_eq!(engine.drain_events().count(), 0);
    }

    #[test]
    fn set_layout_rejected_while_transitioning() {
        let mut engine = engine(LayoutKind::Columns);
        assert!(engine.set_layout(LayoutKind::Top, false, ms(0)));
        assert!(engine.is_transitioning());
        assert!(engine.resizers().is_empty());
        assert!(!engine.set_layout(LayoutKind::Left, false, ms(10)));
        assert_eq!(engine.layout(), LayoutKind::Top);
        assert_eq!(
            engine.begin_drag(ResizerId::Master, Point::default()),
            Err(LayoutError::Transitioning {
                target: LayoutKind::Top
            })
        );

        engine.tick(ms(400));
        assert!(!engine.is_transitioning());
        assert_eq!(engine.resizers().len(), 3);
        assert!(engine.set_layout(LayoutKind::Left, true, ms(500)));
        assert!(!engine.is_transitioning());
        assert_eq!(engine.layout(), LayoutKind::Left);
    }

    #[test]
    fn set_layout_strips_offsets() {
        let mut engine = engine(LayoutKind::Columns);
        engine
            .begin_drag(ResizerId::Input(0), Point::new(300.0, 0.0))
            .unwrap();
        engine.drag_move(Point::new(350.0, 0.0)).unwrap();
        engine.end_drag().unwrap();
        assert!(engine.set_layout(LayoutKind::Top, true, ms(0)));
        for node in LayoutKind::Top.sized_nodes() {
            assert_eq!(engine.offset(node), 0.0);
        }
        assert!(engine.styles().is_empty());
    }

    #[test]
    fn cycle_layout_returns_home_after_three() {
        let mut engine = engine(LayoutKind::Top);
        let mut now = ms(0);
        for _ in 0..3 {
            assert!(engine.cycle_layout(now));
            now += ms(1000);
            engine.tick(now);
        }
        assert_eq!(engine.layout(), LayoutKind::Top);
    }

    #[test]
    fn entrance_styles_are_inline_until_done() {
        let mut engine = engine(LayoutKind::Columns);
        engine.set_layout(LayoutKind::Left, false, ms(0));
        engine.tick(ms(200));
        assert!(!engine.styles().is_empty());
        engine.tick(ms(400));
        assert!(engine.styles().is_empty());
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(
            events,
            vec![
                LayoutEvent::LayoutTransitionStarted {
                    from: LayoutKind::Columns,
                    to: LayoutKind::Left
                },
                LayoutEvent::LayoutChanged {
                    layout: LayoutKind::Left
                },
            ]
        );
    }

    #[test]
    fn invalid_min_size_rejected() {
        let config = LayoutConfig {
            min_panel_size: f64::NAN,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            PanelLayoutEngine::new(config),
            Err(LayoutError::InvalidMinPanelSize { .. })
        ));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"min_panel_size": 60, "reset_duration": 50}"#).unwrap();
        assert_eq!(config.min_panel_size, 60.0);
        assert_eq!(config.reset_duration, ms(50));
        assert_eq!(config.transition_duration, DEFAULT_TRANSITION_DURATION);
    }
}

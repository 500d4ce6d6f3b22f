#![forbid(unsafe_code)]

//! Pure geometry: resolving sizes into pixel rectangles and clamping drags.
//!
//! Nothing here holds state, so every function can be exercised without an
//! engine or a page.

use std::collections::BTreeMap;

use sandbug_core::{Axis, Rect};

use crate::panel::{LayoutNode, PanelId, PanelSize};
use crate::preset::LayoutKind;

/// Resolved pixel rectangles for one layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelRects {
    pub input_group: Rect,
    pub panels: BTreeMap<PanelId, Rect>,
}

impl PanelRects {
    /// Rectangle of a panel or the input group.
    #[must_use]
    pub fn get(&self, node: LayoutNode) -> Option<Rect> {
        match node {
            LayoutNode::Panel(id) => self.panels.get(&id).copied(),
            LayoutNode::InputGroup => Some(self.input_group),
            LayoutNode::MasterResizer => None,
        }
    }
}

/// Resolve `sizes` into rectangles inside `container`.
///
/// Missing sizes fall back to the layout preset.
#[must_use]
pub fn resolve_rects(
    container: Rect,
    layout: LayoutKind,
    sizes: &BTreeMap<LayoutNode, PanelSize>,
) -> PanelRects {
    let size_of = |node: LayoutNode| {
        sizes
            .get(&node)
            .copied()
            .or_else(|| layout.preset(node))
            .unwrap_or_default()
    };

    let master = layout.master_axis();
    let master_extent = container.extent(master);
    let group_extent = size_of(LayoutNode::InputGroup).resolve(master_extent);
    let output_extent = size_of(LayoutNode::Panel(PanelId::Output)).resolve(master_extent);
    let outer = container.split(master, &[group_extent, output_extent]);
    let (input_group, output) = (outer[0], outer[1]);

    let input_axis = layout.input_axis();
    let inner_extent = input_group.extent(input_axis);
    let extents: Vec<f64> = PanelId::INPUTS
        .iter()
        .map(|id| size_of(LayoutNode::Panel(*id)).resolve(inner_extent))
        .collect();
    let inputs = input_group.split(input_axis, &extents);

    let mut panels: BTreeMap<PanelId, Rect> =
        PanelId::INPUTS.iter().copied().zip(inputs).collect();
    panels.insert(PanelId::Output, output);
    PanelRects {
        input_group,
        panels,
    }
}

/// Clamp a pointer displacement so that neither neighbour shrinks below its
/// minimum.
///
/// `prev_extent`/`next_extent` are the neighbours' extents captured when the
/// drag started. A neighbour already below its minimum may not shrink further
/// but may grow.
#[must_use]
pub fn clamp_drag_delta(
    delta: f64,
    prev_extent: f64,
    next_extent: f64,
    prev_min: f64,
    next_min: f64,
) -> f64 {
    let lower = -(prev_extent - prev_min).max(0.0);
    let upper = (next_extent - next_min).max(0.0);
    delta.clamp(lower, upper)
}

/// Smallest input-group extent that keeps every input panel at `min_size`.
///
/// Only meaningful when the inputs split along the master axis (the `columns`
/// layout); otherwise the group's own minimum is just `min_size`.
#[must_use]
pub fn group_min_extent(
    layout: LayoutKind,
    sizes: &BTreeMap<LayoutNode, PanelSize>,
    min_size: f64,
) -> f64 {
    if layout.input_axis() != layout.master_axis() {
        return min_size;
    }
    PanelId::INPUTS
        .iter()
        .map(|id| {
            let node = LayoutNode::Panel(*id);
            let size = sizes
                .get(&node)
                .copied()
                .or_else(|| layout.preset(node))
                .unwrap_or_default();
            if size.percent <= 0.0 {
                min_size
            } else {
                (min_size - size.offset) * 100.0 / size.percent
            }
        })
        .fold(min_size, f64::max)
}

/// Extent of `node` along `axis`, or zero for nodes without a rectangle.
#[must_use]
pub fn extent_of(rects: &PanelRects, node: LayoutNode, axis: Axis) -> f64 {
    rects.get(node).map(|rect| rect.extent(axis)).unwrap_or(0.0)
}

#![forbid(unsafe_code)]

//! Resizers: the draggable separators between adjacent panels.
//!
//! Resizers are never stored independently; they are derived from the active
//! layout and the fixed panel order, the same way the page derives them from
//! DOM adjacency.

use std::fmt;

use sandbug_core::Axis;
use serde::{Deserialize, Serialize};

use crate::panel::{LayoutNode, PanelId};
use crate::preset::LayoutKind;

/// Stable resizer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizerId {
    /// Separator after the input panel at this index (0 or 1).
    Input(u8),
    /// Separator between the input group and the output panel.
    Master,
}

impl fmt::Display for ResizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(index) => write!(f, "resizer-input-{index}"),
            Self::Master => f.write_str("resizer-master"),
        }
    }
}

/// Whether the resizer sits between two inputs or between the group and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizerKind {
    Input,
    Master,
}

/// A separator with its neighbours and drag axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resizer {
    pub id: ResizerId,
    pub kind: ResizerKind,
    /// Axis the pointer moves along while dragging.
    pub axis: Axis,
    pub prev: LayoutNode,
    pub next: LayoutNode,
}

impl Resizer {
    /// Derive a resizer for `layout`, or `None` for an out-of-range input index.
    #[must_use]
    pub fn derive(id: ResizerId, layout: LayoutKind) -> Option<Self> {
        match id {
            ResizerId::Input(index) => {
                let index = usize::from(index);
                let prev = *PanelId::INPUTS.get(index)?;
                let next = *PanelId::INPUTS.get(index + 1)?;
                Some(Self {
                    id,
                    kind: ResizerKind::Input,
                    axis: layout.input_axis(),
                    prev: LayoutNode::Panel(prev),
                    next: LayoutNode::Panel(next),
                })
            }
            ResizerId::Master => Some(Self {
                id,
                kind: ResizerKind::Master,
                axis: layout.master_axis(),
                prev: LayoutNode::InputGroup,
                next: LayoutNode::Panel(PanelId::Output),
            }),
        }
    }

    /// All resizers of `layout`, in document order.
    #[must_use]
    pub fn derive_all(layout: LayoutKind) -> Vec<Self> {
        [ResizerId::Input(0), ResizerId::Input(1), ResizerId::Master]
            .into_iter()
            .filter_map(|id| Self::derive(id, layout))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resizer_has_one_prev_and_one_next() {
        for layout in LayoutKind::CYCLE {
            let resizers = Resizer::derive_all(layout);
            assert_eq!(resizers.len(), 3);
            for resizer in resizers {
                assert_ne!(resizer.prev, resizer.next);
            }
        }
    }

    #[test]
    fn axes_follow_layout() {
        let left = Resizer::derive(ResizerId::Input(1), LayoutKind::Left).unwrap();
        assert_eq!(left.axis, Axis::Vertical);
        assert_eq!(left.prev, LayoutNode::Panel(PanelId::Style));
        assert_eq!(left.next, LayoutNode::Panel(PanelId::Script));

        let top = Resizer::derive(ResizerId::Master, LayoutKind::Top).unwrap();
        assert_eq!(top.axis, Axis::Vertical);
        assert_eq!(top.kind, ResizerKind::Master);
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        assert!(Resizer::derive(ResizerId::Input(2), LayoutKind::Columns).is_none());
    }
}

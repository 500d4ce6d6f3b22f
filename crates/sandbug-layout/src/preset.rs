#![forbid(unsafe_code)]

//! Named layout arrangements and their default proportions.
//!
//! | Layout | input group vs output | input panels |
//! |--------|-----------------------|--------------|
//! | `columns` | side by side, 75% / 25% | side by side |
//! | `top` | stacked, 50% / 50% | side by side |
//! | `left` | side by side, 50% / 50% | stacked |

use std::fmt;
use std::str::FromStr;

use sandbug_core::Axis;
use serde::{Deserialize, Serialize};

use crate::panel::{LayoutNode, PanelId, PanelSize};

const THIRD: f64 = 100.0 / 3.0;

/// One of the three enumerated panel arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Columns,
    Top,
    Left,
}

impl LayoutKind {
    /// Cycle order used by [`LayoutKind::next`].
    pub const CYCLE: [Self; 3] = [Self::Columns, Self::Top, Self::Left];

    /// The following layout in cycle order.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Columns => Self::Top,
            Self::Top => Self::Left,
            Self::Left => Self::Columns,
        }
    }

    /// Axis along which the input group and the output split the container.
    #[must_use]
    pub const fn master_axis(self) -> Axis {
        match self {
            Self::Columns | Self::Left => Axis::Horizontal,
            Self::Top => Axis::Vertical,
        }
    }

    /// Axis along which the input panels split the input group.
    #[must_use]
    pub const fn input_axis(self) -> Axis {
        match self {
            Self::Columns | Self::Top => Axis::Horizontal,
            Self::Left => Axis::Vertical,
        }
    }

    /// Whether the master resizer is positioned explicitly and must track the
    /// input group's extent.
    #[must_use]
    pub const fn positions_master_resizer(self) -> bool {
        matches!(self, Self::Left)
    }

    /// Default size of `node` in this layout, or `None` if the layout does not
    /// size it.
    #[must_use]
    pub fn preset(self, node: LayoutNode) -> Option<PanelSize> {
        let group = match self {
            Self::Columns => 75.0,
            Self::Top | Self::Left => 50.0,
        };
        match node {
            LayoutNode::Panel(PanelId::Output) => Some(PanelSize::percent(100.0 - group)),
            LayoutNode::Panel(_) => Some(PanelSize::percent(THIRD)),
            LayoutNode::InputGroup => Some(PanelSize::percent(group)),
            LayoutNode::MasterResizer => {
                self.positions_master_resizer()
                    .then_some(PanelSize::percent(group))
            }
        }
    }

    /// Nodes this layout sizes, in a stable order.
    pub fn sized_nodes(self) -> impl Iterator<Item = LayoutNode> {
        PanelId::ALL
            .into_iter()
            .map(LayoutNode::Panel)
            .chain([LayoutNode::InputGroup, LayoutNode::MasterResizer])
            .filter(move |node| self.preset(*node).is_some())
    }

    /// CSS property written for `node`.
    #[must_use]
    pub const fn css_property(self, node: LayoutNode) -> &'static str {
        match node {
            LayoutNode::Panel(PanelId::Output) | LayoutNode::InputGroup => {
                self.master_axis().css_property()
            }
            LayoutNode::Panel(_) => self.input_axis().css_property(),
            LayoutNode::MasterResizer => "left",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Columns => "columns",
            Self::Top => "top",
            Self::Left => "left",
        }
    }

    /// Class set on the container element for this layout.
    #[must_use]
    pub fn class_name(self) -> String {
        format!("layout-{}", self.as_str())
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized layout name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayout(pub String);

impl fmt::Display for UnknownLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layout {:?}", self.0)
    }
}

impl std::error::Error for UnknownLayout {}

impl FromStr for LayoutKind {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("layout-").unwrap_or(s);
        Self::CYCLE
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| UnknownLayout(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_three_times_returns_home() {
        for start in LayoutKind::CYCLE {
            let mut kind = start;
            for _ in 0..LayoutKind::CYCLE.len() {
                kind = kind.next();
            }
            assert_eq!(kind, start);
        }
    }

    #[test]
    fn presets_fill_the_container() {
        for kind in LayoutKind::CYCLE {
            let group = kind.preset(LayoutNode::InputGroup).map(|s| s.percent);
            let output = kind
                .preset(LayoutNode::Panel(PanelId::Output))
                .map(|s| s.percent);
            assert_eq!(group.zip(output).map(|(g, o)| g + o), Some(100.0));
            let inputs: f64 = PanelId::INPUTS
                .iter()
                .filter_map(|id| kind.preset(LayoutNode::Panel(*id)))
                .map(|s| s.percent)
                .sum();
            assert!((inputs - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn only_left_positions_master_resizer() {
        assert!(LayoutKind::Left.preset(LayoutNode::MasterResizer).is_some());
        assert!(LayoutKind::Top.preset(LayoutNode::MasterResizer).is_none());
        assert_eq!(LayoutKind::Left.sized_nodes().count(), 6);
        assert_eq!(LayoutKind::Columns.sized_nodes().count(), 5);
    }

    #[test]
    fn parses_bare_and_class_names() {
        assert_eq!("top".parse::<LayoutKind>(), Ok(LayoutKind::Top));
        assert_eq!("layout-left".parse::<LayoutKind>(), Ok(LayoutKind::Left));
        assert!("grid".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn css_property_follows_axes() {
        assert_eq!(
            LayoutKind::Top.css_property(LayoutNode::Panel(PanelId::Output)),
            "height"
        );
        assert_eq!(
            LayoutKind::Left.css_property(LayoutNode::Panel(PanelId::Style)),
            "height"
        );
        assert_eq!(
            LayoutKind::Columns.css_property(LayoutNode::Panel(PanelId::Style)),
            "width"
        );
    }
}

#![forbid(unsafe_code)]

//! Panel identities and percentage-plus-offset sizes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the fixed panels of the sandbox page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    Markup,
    Style,
    Script,
    Output,
}

impl PanelId {
    /// Every panel, in document order.
    pub const ALL: [Self; 4] = [Self::Markup, Self::Style, Self::Script, Self::Output];

    /// Input panels, in document order.
    pub const INPUTS: [Self; 3] = [Self::Markup, Self::Style, Self::Script];

    #[must_use]
    pub const fn is_input(self) -> bool {
        !matches!(self, Self::Output)
    }

    /// Position within [`PanelId::INPUTS`], if this is an input panel.
    #[must_use]
    pub const fn input_index(self) -> Option<usize> {
        match self {
            Self::Markup => Some(0),
            Self::Style => Some(1),
            Self::Script => Some(2),
            Self::Output => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Style => "style",
            Self::Script => "script",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the engine sizes: a panel, the input group wrapper, or the
/// absolutely positioned master resizer (only in the `left` layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "node", content = "panel", rename_all = "snake_case")]
pub enum LayoutNode {
    Panel(PanelId),
    InputGroup,
    MasterResizer,
}

impl fmt::Display for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panel(id) => write!(f, "{id}"),
            Self::InputGroup => f.write_str("input"),
            Self::MasterResizer => f.write_str("resizer-master"),
        }
    }
}

/// Size along one axis, expressed as `percent% + offset px`.
///
/// The percentage is the layout default; the offset accumulates drag
/// displacement since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelSize {
    pub percent: f64,
    pub offset: f64,
}

impl PanelSize {
    #[must_use]
    pub const fn percent(percent: f64) -> Self {
        Self {
            percent,
            offset: 0.0,
        }
    }

    #[must_use]
    pub const fn with_offset(self, offset: f64) -> Self {
        Self {
            percent: self.percent,
            offset,
        }
    }

    /// Resolve against the parent's extent in pixels.
    #[must_use]
    pub fn resolve(self, parent_extent: f64) -> f64 {
        parent_extent * self.percent / 100.0 + self.offset
    }

    /// Linear interpolation between two sizes.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            percent: self.percent + (to.percent - self.percent) * t,
            offset: self.offset + (to.offset - self.offset) * t,
        }
    }

    /// CSS value: a plain percentage, or a `calc()` expression when an offset
    /// is present.
    #[must_use]
    pub fn to_css(self) -> String {
        let percent = format_number(self.percent);
        if self.offset.abs() < f64::EPSILON {
            return format!("{percent}%");
        }
        let sign = if self.offset < 0.0 { '-' } else { '+' };
        format!(
            "calc({percent}% {sign} {}px)",
            format_number(self.offset.abs())
        )
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let mut text = format!("{rounded:.3}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_owned();
    }
    text
}

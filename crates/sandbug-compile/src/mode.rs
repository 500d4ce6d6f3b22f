#![forbid(unsafe_code)]

//! Panel kinds and their selectable content modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three editable input panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    Markup,
    Style,
    Script,
}

impl PanelKind {
    pub const ALL: [Self; 3] = [Self::Markup, Self::Style, Self::Script];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Style => "style",
            Self::Script => "script",
        }
    }

    /// Mode a fresh panel starts in.
    #[must_use]
    pub const fn default_mode(self) -> Mode {
        match self {
            Self::Markup => Mode::Html,
            Self::Style => Mode::Css,
            Self::Script => Mode::JavaScript,
        }
    }

    /// Modes selectable for this panel, plain mode first.
    pub fn modes(self) -> impl Iterator<Item = Mode> {
        Mode::ALL.into_iter().filter(move |mode| mode.panel() == self)
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized panel name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPanel(pub String);

impl fmt::Display for UnknownPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown panel {:?}", self.0)
    }
}

impl std::error::Error for UnknownPanel {}

impl FromStr for PanelKind {
    type Err = UnknownPanel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|panel| panel.as_str() == s)
            .ok_or_else(|| UnknownPanel(s.to_owned()))
    }
}

/// A content mode: the language a panel's source is written in.
///
/// Serialized by its editor mode name (`"htmlmixed"`, `"gfm"`, `"less"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "htmlmixed", alias = "html")]
    Html,
    #[serde(rename = "gfm")]
    Gfm,
    #[serde(rename = "markdown", alias = "md")]
    Markdown,
    #[serde(rename = "jade")]
    Jade,
    #[serde(rename = "haml")]
    Haml,
    #[serde(rename = "css")]
    Css,
    #[serde(rename = "less")]
    Less,
    #[serde(rename = "scss")]
    Scss,
    #[serde(rename = "stylus")]
    Stylus,
    #[serde(rename = "javascript", alias = "js")]
    JavaScript,
    #[serde(rename = "coffeescript")]
    CoffeeScript,
    #[serde(rename = "typescript")]
    TypeScript,
    #[serde(rename = "gorillascript")]
    GorillaScript,
    #[serde(rename = "livescript")]
    LiveScript,
}

impl Mode {
    pub const ALL: [Self; 14] = [
        Self::Html,
        Self::Gfm,
        Self::Markdown,
        Self::Jade,
        Self::Haml,
        Self::Css,
        Self::Less,
        Self::Scss,
        Self::Stylus,
        Self::JavaScript,
        Self::CoffeeScript,
        Self::TypeScript,
        Self::GorillaScript,
        Self::LiveScript,
    ];

    /// Panel this mode belongs to.
    #[must_use]
    pub const fn panel(self) -> PanelKind {
        match self {
            Self::Html | Self::Gfm | Self::Markdown | Self::Jade | Self::Haml => PanelKind::Markup,
            Self::Css | Self::Less | Self::Scss | Self::Stylus => PanelKind::Style,
            Self::JavaScript
            | Self::CoffeeScript
            | Self::TypeScript
            | Self::GorillaScript
            | Self::LiveScript => PanelKind::Script,
        }
    }

    /// Editor mode name used on the wire.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Html => "htmlmixed",
            Self::Gfm => "gfm",
            Self::Markdown => "markdown",
            Self::Jade => "jade",
            Self::Haml => "haml",
            Self::Css => "css",
            Self::Less => "less",
            Self::Scss => "scss",
            Self::Stylus => "stylus",
            Self::JavaScript => "javascript",
            Self::CoffeeScript => "coffeescript",
            Self::TypeScript => "typescript",
            Self::GorillaScript => "gorillascript",
            Self::LiveScript => "livescript",
        }
    }

    /// Parse a wire name (or a short alias). `None` for unknown names, which
    /// callers treat as identity.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "html" => Some(Self::Html),
            "md" => Some(Self::Markdown),
            "js" => Some(Self::JavaScript),
            _ => Self::ALL.into_iter().find(|mode| mode.wire_name() == name),
        }
    }

    /// Whether the source is already in the browser's language and needs no
    /// compilation.
    #[must_use]
    pub const fn is_passthrough(self) -> bool {
        matches!(self, Self::Html | Self::Css | Self::JavaScript)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_wire(mode.wire_name()), Some(mode));
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.wire_name()));
        }
    }

    #[test]
    fn aliases_and_unknown_names() {
        assert_eq!(Mode::from_wire("html"), Some(Mode::Html));
        assert_eq!(Mode::from_wire("js"), Some(Mode::JavaScript));
        assert_eq!(Mode::from_wire("brainfuck"), None);
        let parsed: Mode = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(parsed, Mode::Html);
    }

    #[test]
    fn every_panel_has_one_passthrough_default() {
        for panel in PanelKind::ALL {
            let default = panel.default_mode();
            assert_eq!(default.panel(), panel);
            assert!(default.is_passthrough());
            assert_eq!(panel.modes().filter(|m| m.is_passthrough()).count(), 1);
            assert_eq!(panel.modes().next(), Some(default));
        }
    }

    #[test]
    fn panel_names_parse() {
        assert_eq!("style".parse::<PanelKind>(), Ok(PanelKind::Style));
        assert!("output".parse::<PanelKind>().is_err());
    }
}

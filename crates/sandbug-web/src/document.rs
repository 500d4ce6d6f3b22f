#![forbid(unsafe_code)]

//! Preview document assembly.
//!
//! A full rebuild writes one complete HTML document into the iframe: the
//! compiled style in a `<style>` node the runtime can later replace in place,
//! the console bridge, the compiled markup, and the script last so it runs
//! against a parsed body. Markup that already is a full document keeps its
//! own `<head>`/`<body>`; the pieces are spliced into it.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// `id` of the `<style>` node that style-only updates rewrite.
pub const STYLE_ELEMENT_ID: &str = "sandbug-style";

/// Wraps the console methods inside the preview and relays each call to the
/// parent as a `console` message. Error arguments become strings and turn the
/// message into an `error`; values that fail a JSON round trip are sent as
/// their string form.
pub const CONSOLE_BRIDGE: &str = r#"(function () {
  var start = Date.now();
  var methods = ['log', 'warn', 'error', 'info', 'debug', 'clear'];
  function safe(arg, state) {
    if (arg instanceof Error) { state.type = 'error'; return String(arg); }
    try { return JSON.parse(JSON.stringify(arg)); } catch (e) { return String(arg); }
  }
  methods.forEach(function (method) {
    var original = console[method];
    console[method] = function () {
      var args = Array.prototype.slice.call(arguments);
      var state = { type: method };
      var clean = args.map(function (arg) { return safe(arg, state); });
      try {
        window.parent.postMessage(JSON.stringify({
          action: 'console', timestamp: new Date().toISOString(),
          time: (Date.now() - start) / 1000, type: state.type, args: clean
        }), '*');
      } catch (e) {}
      if (original) { return original.apply(console, args); }
    };
  });
})();"#;

/// Compiled panel contents for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentParts<'a> {
    pub markup: &'a str,
    pub style: &'a str,
    /// `None` builds the document without scripts.
    pub script: Option<&'a str>,
}

/// Document template settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTemplate {
    /// `<title>` of wrapped fragments.
    pub title: String,
    /// Include [`CONSOLE_BRIDGE`].
    pub console_bridge: bool,
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            title: "sandbug".to_owned(),
            console_bridge: true,
        }
    }
}

impl DocumentTemplate {
    /// Assemble the full preview document.
    #[must_use]
    pub fn assemble(&self, parts: DocumentParts<'_>) -> String {
        let head = self.head_extras(parts.style);
        let tail = parts.script.map(script_element).unwrap_or_default();

        if find_ci(parts.markup, "<body").is_some() {
            let with_head = insert_before_ci(parts.markup, "</head>", &head)
                .unwrap_or_else(|| insert_after_open_ci(parts.markup, "<body", &head));
            return insert_before_ci(&with_head, "</body>", &tail)
                .unwrap_or_else(|| format!("{with_head}{tail}"));
        }

        let mut html = String::with_capacity(
            parts.markup.len() + head.len() + tail.len() + self.title.len() + 128,
        );
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{head}</head>\n<body>\n{}\n{tail}</body>\n</html>\n",
            escape_text(&self.title),
            parts.markup,
        );
        html
    }

    fn head_extras(&self, style: &str) -> String {
        let mut head = style_element(style);
        if self.console_bridge {
            head.push_str(&script_element(CONSOLE_BRIDGE));
        }
        head
    }
}

/// `<style>` node carrying the compiled style.
#[must_use]
pub fn style_element(css: &str) -> String {
    format!(
        "<style id=\"{STYLE_ELEMENT_ID}\">\n{}\n</style>\n",
        escape_raw_text(css, "style")
    )
}

fn script_element(js: &str) -> String {
    format!("<script>\n{}\n</script>\n", escape_raw_text(js, "script"))
}

/// Break up closing tags inside raw text so the content cannot end its own
/// element early.
#[must_use]
pub fn escape_raw_text(text: &str, tag: &str) -> String {
    let needle = format!("</{tag}");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = find_ci(rest, &needle) {
        out.push_str(&rest[..at]);
        out.push_str("<\\/");
        out.push_str(&rest[at + 2..at + needle.len()]);
        rest = &rest[at + needle.len()..];
    }
    out.push_str(rest);
    out
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .find(|&start| hay[start..start + needle.len()].eq_ignore_ascii_case(needle))
}

fn insert_before_ci(html: &str, marker: &str, insert: &str) -> Option<String> {
    let at = find_ci(html, marker)?;
    Some(format!("{}{insert}{}", &html[..at], &html[at..]))
}

fn insert_after_open_ci(html: &str, open: &str, insert: &str) -> String {
    let Some(start) = find_ci(html, open) else {
        return format!("{insert}{html}");
    };
    let end = html[start..]
        .find('>')
        .map_or(html.len(), |close| start + close + 1);
    format!("{}{insert}{}", &html[..end], &html[end..])
}

#![forbid(unsafe_code)]

//! Minimal DOM model for incremental preview updates.
//!
//! A markup-only edit does not reload the preview: the new markup is parsed
//! into a [`Node`] forest, [`diff`]ed against the live body, and the host
//! applies the resulting [`DomPatch`] list to the real DOM. Script state and
//! scroll position survive.
//!
//! The parser is deliberately forgiving. It handles elements, text,
//! comments, void elements and raw-text elements (`script`, `style`,
//! `textarea`, `title`); unclosed tags are closed at the end of input and
//! stray closing tags are dropped. The browser's implied end tags are
//! applied (`<p>a<p>b` is two paragraphs, `<li>`, `<dt>`/`<dd>`, `<option>`
//! and table cells close their open siblings) and table rows get their
//! implied `<tbody>`, so patch paths address the tree the browser builds.
//! Text and attribute values are kept as written (entities are not
//! decoded), so [`render`] reproduces them.
//!
//! # Invariants
//!
//! 1. `apply(&mut old, &diff(&old, &new))` leaves `old == new`.
//! 2. Patches address nodes by child-index path from the fragment root and
//!    are ordered so that each path is valid when its patch is applied.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Start tags that close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section",
    "summary", "table", "ul",
];

/// Elements an implied end tag never reaches past.
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const TABLE_SECTIONS: &[&str] = &["tbody", "thead", "tfoot"];

/// An element with sorted attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

/// A DOM node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text { text: String },
    Comment { text: String },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment { text: text.into() }
    }

    fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Self::Element(element) => Some(&element.children),
            Self::Text { .. } | Self::Comment { .. } => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Element(element) => Some(&mut element.children),
            Self::Text { .. } | Self::Comment { .. } => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// One minimal mutation of the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomPatch {
    /// Replace the node at `path`.
    Replace { path: Vec<usize>, node: Node },
    /// Set the text of the text node at `path`.
    SetText { path: Vec<usize>, text: String },
    SetAttribute {
        path: Vec<usize>,
        name: String,
        value: String,
    },
    RemoveAttribute { path: Vec<usize>, name: String },
    /// Append `node` to the children of `parent` (empty path: the root).
    Append { parent: Vec<usize>, node: Node },
    /// Remove child `index` of `parent`.
    RemoveChild { parent: Vec<usize>, index: usize },
}

/// A patch whose path does not resolve in the target tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchError {
    pub path: Vec<usize>,
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patch path {:?} does not resolve", self.path)
    }
}

impl std::error::Error for PatchError {}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse an HTML fragment.
#[must_use]
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let mut parser = Parser {
        src: html,
        pos: 0,
        stack: Vec::new(),
        root: Vec::new(),
    };
    parser.run();
    parser.finish()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    stack: Vec<Element>,
    root: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn run(&mut self) {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if let Some(after) = rest.strip_prefix("<!--") {
                let (body, consumed) = match after.find("-->") {
                    Some(end) => (&after[..end], 4 + end + 3),
                    None => (after, rest.len()),
                };
                self.push(Node::comment(body));
                self.pos += consumed;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);
            } else if rest.starts_with("</") && starts_name(&rest[2..]) {
                self.close_tag();
            } else if rest.starts_with('<') && starts_name(&rest[1..]) {
                self.open_tag();
            } else {
                let first = rest.chars().next().map_or(1, char::len_utf8);
                let end = rest[first..]
                    .find('<')
                    .map_or(rest.len(), |offset| offset + first);
                self.push_text(&rest[..end]);
                self.pos += end;
            }
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1;
        let tag = self.take_name().to_ascii_lowercase();
        self.close_implied(&tag);
        self.open_implied_parents(&tag);
        let mut element = Element::new(tag);
        let self_closing = self.take_attributes(&mut element);

        if element.is_void() || self_closing {
            self.push(Node::Element(element));
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&element.tag.as_str()) {
            let rest = self.rest();
            let end = find_ascii_ci(rest, &format!("</{}", element.tag)).unwrap_or(rest.len());
            if end > 0 {
                element.children.push(Node::text(&rest[..end]));
            }
            self.pos += end;
            if self.pos < self.src.len() {
                let rest = self.rest();
                self.pos += rest.find('>').map_or(rest.len(), |close| close + 1);
            }
            self.push(Node::Element(element));
            return;
        }
        self.stack.push(element);
    }

    fn close_tag(&mut self) {
        self.pos += 2;
        let tag = self.take_name().to_ascii_lowercase();
        let rest = self.rest();
        self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);

        if tag == "p" {
            // A stray `</p>` yields an empty paragraph.
            if !self.close_in_scope(&["p"], SCOPE_BOUNDARIES) {
                self.push(Node::Element(Element::new("p")));
            }
            return;
        }
        let Some(depth) = self.stack.iter().rposition(|open| open.tag == tag) else {
            return;
        };
        while self.stack.len() > depth {
            self.pop();
        }
    }

    /// Close whatever the start tag `tag` implicitly ends.
    fn close_implied(&mut self, tag: &str) {
        if CLOSES_P.contains(&tag) {
            self.close_in_scope(&["p"], SCOPE_BOUNDARIES);
        }
        match tag {
            "li" => {
                self.close_in_scope(&["li"], &["ol", "ul", "menu", "table", "td", "th"]);
            }
            "dt" | "dd" => {
                self.close_in_scope(&["dt", "dd"], &["dl", "table", "td", "th"]);
            }
            "option" => self.close_current(&["option"]),
            "optgroup" => {
                self.close_current(&["option"]);
                self.close_current(&["optgroup"]);
            }
            "tr" => {
                self.close_in_scope(&["tr"], &["table", "tbody", "thead", "tfoot"]);
            }
            "td" | "th" => {
                self.close_in_scope(&["td", "th"], &["tr", "table"]);
            }
            "tbody" | "thead" | "tfoot" => {
                self.close_in_scope(TABLE_SECTIONS, &["table"]);
            }
            _ if HEADINGS.contains(&tag) => self.close_current(HEADINGS),
            _ => {}
        }
    }

    /// Open the `<tbody>`/`<tr>` the browser inserts around bare rows and
    /// cells.
    fn open_implied_parents(&mut self, tag: &str) {
        let current = self.stack.last().map(|open| open.tag.clone());
        let current = current.as_deref();
        match tag {
            "tr" if current == Some("table") => self.stack.push(Element::new("tbody")),
            "td" | "th" => {
                if current == Some("table") {
                    self.stack.push(Element::new("tbody"));
                    self.stack.push(Element::new("tr"));
                } else if current.is_some_and(|open| TABLE_SECTIONS.contains(&open)) {
                    self.stack.push(Element::new("tr"));
                }
            }
            _ => {}
        }
    }

    /// Close the innermost open element named in `targets`, unless a
    /// boundary element is open inside it. Returns whether one was closed.
    fn close_in_scope(&mut self, targets: &[&str], boundaries: &[&str]) -> bool {
        for depth in (0..self.stack.len()).rev() {
            let tag = self.stack[depth].tag.as_str();
            if targets.contains(&tag) {
                while self.stack.len() > depth {
                    self.pop();
                }
                return true;
            }
            if boundaries.contains(&tag) {
                return false;
            }
        }
        false
    }

    fn close_current(&mut self, targets: &[&str]) {
        if self
            .stack
            .last()
            .is_some_and(|open| targets.contains(&open.tag.as_str()))
        {
            self.pop();
        }
    }

    fn take_name(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Parse attributes up to and including `>`. Returns whether the tag
    /// ended with `/>`.
    fn take_attributes(&mut self, element: &mut Element) -> bool {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.is_empty() {
                return false;
            }
            if let Some(after) = trimmed.strip_prefix("/>") {
                self.pos += trimmed.len() - after.len();
                return true;
            }
            if trimmed.starts_with('>') {
                self.pos += 1;
                return false;
            }
            if trimmed.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let name_end = trimmed
                .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
                .unwrap_or(trimmed.len());
            let name = trimmed[..name_end].to_ascii_lowercase();
            self.pos += name_end;

            let rest = self.rest();
            let after_ws = rest.trim_start();
            let value = if let Some(value_src) = after_ws.strip_prefix('=') {
                let value_src = value_src.trim_start();
                self.pos += rest.len() - value_src.len();
                self.take_attribute_value()
            } else {
                String::new()
            };
            if !name.is_empty() {
                element.attrs.entry(name).or_insert(value);
            }
        }
    }

    fn take_attribute_value(&mut self) -> String {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                self.pos += 1 + end + usize::from(end < body.len());
                body[..end].to_owned()
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += end;
                rest[..end].to_owned()
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        let siblings = match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.root,
        };
        if let Some(Node::Text { text: previous }) = siblings.last_mut() {
            previous.push_str(text);
        } else {
            siblings.push(Node::text(text));
        }
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(open) => open.children.push(node),
            None => self.root.push(node),
        }
    }

    fn pop(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.push(Node::Element(element));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.pop();
        }
        self.root
    }
}

fn starts_name(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .find(|&start| hay[start..start + needle.len()].eq_ignore_ascii_case(needle))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Serialize nodes back to HTML.
#[must_use]
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(text),
        Node::Comment { text } => {
            let _ = write!(out, "<!--{text}-->");
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                let _ = write!(out, " {name}=\"{}\"", value.replace('"', "&quot;"));
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            for child in &element.children {
                render_node(child, out);
            }
            let _ = write!(out, "</{}>", element.tag);
        }
    }
}

// ---------------------------------------------------------------------------
// Diff / apply
// ---------------------------------------------------------------------------

/// Minimal patch list turning `old` into `new`.
///
/// Children are matched by position: common prefixes are diffed in place,
/// surplus new children are appended and surplus old children removed from
/// the end.
#[must_use]
pub fn diff(old: &[Node], new: &[Node]) -> Vec<DomPatch> {
    let mut patches = Vec::new();
    diff_children(old, new, &mut Vec::new(), &mut patches);
    patches
}

fn diff_children(old: &[Node], new: &[Node], parent: &mut Vec<usize>, out: &mut Vec<DomPatch>) {
    for (index, (a, b)) in old.iter().zip(new).enumerate() {
        parent.push(index);
        diff_node(a, b, parent, out);
        parent.pop();
    }
    for node in new.iter().skip(old.len()) {
        out.push(DomPatch::Append {
            parent: parent.clone(),
            node: node.clone(),
        });
    }
    for index in (new.len()..old.len()).rev() {
        out.push(DomPatch::RemoveChild {
            parent: parent.clone(),
            index,
        });
    }
}

fn diff_node(old: &Node, new: &Node, path: &mut Vec<usize>, out: &mut Vec<DomPatch>) {
    match (old, new) {
        (Node::Text { text: a }, Node::Text { text: b }) => {
            if a != b {
                out.push(DomPatch::SetText {
                    path: path.clone(),
                    text: b.clone(),
                });
            }
        }
        (Node::Element(a), Node::Element(b)) if a.tag == b.tag => {
            for name in a.attrs.keys().filter(|name| !b.attrs.contains_key(*name)) {
                out.push(DomPatch::RemoveAttribute {
                    path: path.clone(),
                    name: name.clone(),
                });
            }
            for (name, value) in &b.attrs {
                if a.attrs.get(name) != Some(value) {
                    out.push(DomPatch::SetAttribute {
                        path: path.clone(),
                        name: name.clone(),
                        value: value.clone(),
                    });
                }
            }
            diff_children(&a.children, &b.children, path, out);
        }
        _ => {
            if old != new {
                out.push(DomPatch::Replace {
                    path: path.clone(),
                    node: new.clone(),
                });
            }
        }
    }
}

/// Apply `patches` in order.
pub fn apply(nodes: &mut Vec<Node>, patches: &[DomPatch]) -> Result<(), PatchError> {
    for patch in patches {
        apply_one(nodes, patch)?;
    }
    Ok(())
}

fn apply_one(nodes: &mut Vec<Node>, patch: &DomPatch) -> Result<(), PatchError> {
    match patch {
        DomPatch::Replace { path, node } => {
            *node_at(nodes, path)? = node.clone();
        }
        DomPatch::SetText { path, text } => match node_at(nodes, path)? {
            Node::Text { text: current } => current.clone_from(text),
            _ => return Err(PatchError { path: path.clone() }),
        },
        DomPatch::SetAttribute { path, name, value } => {
            element_at(nodes, path)?
                .attrs
                .insert(name.clone(), value.clone());
        }
        DomPatch::RemoveAttribute { path, name } => {
            element_at(nodes, path)?.attrs.remove(name);
        }
        DomPatch::Append { parent, node } => {
            children_at(nodes, parent)?.push(node.clone());
        }
        DomPatch::RemoveChild { parent, index } => {
            let children = children_at(nodes, parent)?;
            if *index >= children.len() {
                let mut path = parent.clone();
                path.push(*index);
                return Err(PatchError { path });
            }
            children.remove(*index);
        }
    }
    Ok(())
}

fn node_at<'a>(nodes: &'a mut [Node], path: &[usize]) -> Result<&'a mut Node, PatchError> {
    let err = || PatchError {
        path: path.to_vec(),
    };
    let (&first, rest) = path.split_first().ok_or_else(err)?;
    let mut node = nodes.get_mut(first).ok_or_else(err)?;
    for &index in rest {
        node = node
            .children_mut()
            .and_then(|children| children.get_mut(index))
            .ok_or_else(err)?;
    }
    Ok(node)
}

fn element_at<'a>(nodes: &'a mut [Node], path: &[usize]) -> Result<&'a mut Element, PatchError> {
    match node_at(nodes, path)? {
        Node::Element(element) => Ok(element),
        _ => Err(PatchError {
            path: path.to_vec(),
        }),
    }
}

fn children_at<'a>(
    nodes: &'a mut Vec<Node>,
    path: &[usize],
) -> Result<&'a mut Vec<Node>, PatchError> {
    if path.is_empty() {
        return Ok(nodes);
    }
    node_at(nodes, path)?
        .children_mut()
        .ok_or_else(|| PatchError {
            path: path.to_vec(),
        })
}

/// Number of nodes in the forest, recursively.
#[must_use]
pub fn node_count(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + node.children().map_or(0, |children| node_count(children)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let nodes = parse_fragment(r#"<div id="a" class='b c' hidden><p>Hi <b>there</b></p></div>"#);
        let expected = vec![Node::from(
            Element::new("div")
                .attr("id", "a")
                .attr("class", "b c")
                .attr("hidden", "")
                .child(
                    Element::new("p")
                        .child(Node::text("Hi "))
                        .child(Element::new("b").child(Node::text("there")).into())
                        .into(),
                ),
        )];
        assert_eq!(nodes, expected);
    }

    #[test]
    fn void_and_self_closing_elements_have_no_children() {
        let nodes = parse_fragment("<p>a<br>b<img src=x.png/>c</p>");
        let Node::Element(p) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(p.children.len(), 5);
        assert_eq!(render(&nodes), r#"<p>a<br>b<img src="x.png/">c</p>"#);
    }

    #[test]
    fn raw_text_is_not_parsed() {
        let nodes = parse_fragment("<script>if (a < b) { x('<p>'); }</SCRIPT><p>after</p>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes[0],
            Node::from(Element::new("script").child(Node::text("if (a < b) { x('<p>'); }")))
        );
    }

    #[test]
    fn unclosed_and_stray_tags_are_tolerated() {
        let nodes = parse_fragment("<ul><li>one<li>two</span></ul>tail");
        assert_eq!(render(&nodes), "<ul><li>one</li><li>two</li></ul>tail");
        assert_eq!(node_count(&nodes), 6);
    }

    #[test]
    fn open_paragraphs_are_siblings() {
        let nodes = parse_fragment("<p>a<p>b");
        assert_eq!(
            nodes,
            vec![
                Node::from(Element::new("p").child(Node::text("a"))),
                Node::from(Element::new("p").child(Node::text("b"))),
            ]
        );
        assert_eq!(render(&parse_fragment("<p>one<div>two</div>")), "<p>one</p><div>two</div>");
        assert_eq!(render(&parse_fragment("<div>x</p>y</div>")), "<div>x<p></p>y</div>");
    }

    #[test]
    fn list_items_close_their_open_sibling() {
        let nodes = parse_fragment("<li>a<li>b");
        assert_eq!(nodes.len(), 2);
        assert_eq!(render(&nodes), "<li>a</li><li>b</li>");
        assert_eq!(
            render(&parse_fragment("<ul><li>a<ul><li>b</ul><li>c</ul>")),
            "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"
        );
        assert_eq!(
            render(&parse_fragment("<dl><dt>t<dd>d<dt>u</dl>")),
            "<dl><dt>t</dt><dd>d</dd><dt>u</dt></dl>"
        );
        assert_eq!(
            render(&parse_fragment("<select><option>a<option>b</select>")),
            "<select><option>a</option><option>b</option></select>"
        );
    }

    #[test]
    fn table_rows_get_implied_sections() {
        assert_eq!(
            render(&parse_fragment("<table><tr><td>a<td>b<tr><th>c</table>")),
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><th>c</th></tr></tbody></table>"
        );
        assert_eq!(
            render(&parse_fragment("<table><td>x</table>")),
            "<table><tbody><tr><td>x</td></tr></tbody></table>"
        );
    }

    #[test]
    fn sibling_paragraph_edit_targets_the_second_paragraph() {
        let old = parse_fragment("<p>one<p>two");
        let new = parse_fragment("<p>one<p>three");
        assert_eq!(
            diff(&old, &new),
            vec![DomPatch::SetText {
                path: vec![1, 0],
                text: "three".into()
            }]
        );
    }

    #[test]
    fn comments_and_doctype() {
        let nodes = parse_fragment("<!DOCTYPE html><!-- note --><p>x</p>");
        assert_eq!(nodes[0], Node::comment(" note "));
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn lone_angle_brackets_are_text() {
        let nodes = parse_fragment("1 < 2 and 3 > 2");
        assert_eq!(nodes, vec![Node::text("1 < 2 and 3 > 2")]);
    }

    #[test]
    fn text_change_is_a_single_set_text() {
        let old = parse_fragment("<h1>Hello</h1><p>x</p>");
        let new = parse_fragment("<h1>Hello world</h1><p>x</p>");
        assert_eq!(
            diff(&old, &new),
            vec![DomPatch::SetText {
                path: vec![0, 0],
                text: "Hello world".into(),
            }]
        );
    }

    #[test]
    fn attribute_changes_and_list_growth() {
        let mut old = parse_fragment(r#"<ul class="a" id="x"><li>1</li><li>2</li></ul>"#);
        let new = parse_fragment(r#"<ul class="b"><li>1</li><li>2</li><li>3</li></ul>"#);
        let patches = diff(&old, &new);
        assert_eq!(
            patches,
            vec![
                DomPatch::RemoveAttribute {
                    path: vec![0],
                    name: "id".into(),
                },
                DomPatch::SetAttribute {
                    path: vec![0],
                    name: "class".into(),
                    value: "b".into(),
                },
                DomPatch::Append {
                    parent: vec![0],
                    node: Element::new("li").child(Node::text("3")).into(),
                },
            ]
        );
        apply(&mut old, &patches).unwrap();
        assert_eq!(old, new);
    }

    #[test]
    fn shrinking_removes_from_the_end() {
        let mut old = parse_fragment("<i>1</i><i>2</i><i>3</i>");
        let new = parse_fragment("<i>1</i>");
        let patches = diff(&old, &new);
        assert_eq!(
            patches,
            vec![
                DomPatch::RemoveChild {
                    parent: vec![],
                    index: 2,
                },
                DomPatch::RemoveChild {
                    parent: vec![],
                    index: 1,
                },
            ]
        );
        apply(&mut old, &patches).unwrap();
        assert_eq!(old, new);
    }

    #[test]
    fn tag_change_replaces_node() {
        let old = parse_fragment("<p>x</p>");
        let new = parse_fragment("<div>x</div>");
        assert!(matches!(diff(&old, &new).as_slice(), [DomPatch::Replace { path, .. }] if path == &[0]));
    }

    #[test]
    fn bad_paths_are_reported() {
        let mut nodes = parse_fragment("<p>x</p>");
        let err = apply(
            &mut nodes,
            &[DomPatch::SetText {
                path: vec![3],
                text: "y".into(),
            }],
        )
        .unwrap_err();
        assert_eq!(err.path, vec![3]);
    }
}

//! Builds a [`Document`] from a declarative node tree and lays it out.
//!
//! The layout is deliberately simple and deterministic: block boxes stack
//! vertically (margins are not collapsed), inline content is set with a
//! monospace greedy line breaker, and rows (table rows, flex rows, grids)
//! place their children side by side in equal columns. Floated and
//! out-of-flow boxes are placed where they start but take no vertical space.

use crate::DocumentError;
use crate::defaults::is_replaced_tag;
use crate::document::{Document, WordBox};
use indextree::NodeId;
use log::debug;
use pagecut_style::{ComputedStyle, Display, Position, parse_declarations};
use pagecut_traits::{DomMutator, GeometryOracle};
use pagecut_types::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A node of the declarative input tree. Bare strings are text nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementSpec {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations, e.g. `"height: 120px; margin-top: 10px"`.
    pub style: String,
    /// Column count for grid containers. Rows use one column per child.
    pub columns: Option<usize>,
    pub children: Vec<NodeSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, declarations: &str) -> Self {
        if !self.style.is_empty() && !self.style.trim_end().ends_with(';') {
            self.style.push(';');
        }
        self.style.push_str(declarations);
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn child(mut self, child: impl Into<NodeSpec>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<NodeSpec>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(NodeSpec::Text(text.to_string()))
    }
}

impl From<ElementSpec> for NodeSpec {
    fn from(spec: ElementSpec) -> Self {
        NodeSpec::Element(spec)
    }
}

impl From<&str> for NodeSpec {
    fn from(text: &str) -> Self {
        NodeSpec::Text(text.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Width of the root box.
    pub width: f32,
    /// Advance of every character, including spaces.
    pub char_width: f32,
    /// Line height used when no element sets one.
    pub line_height: f32,
    /// Size of a replaced element without explicit dimensions.
    pub replaced_size: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 700.0,
            char_width: 8.0,
            line_height: 20.0,
            replaced_size: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    options: LayoutOptions,
}

impl DocumentBuilder {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Creates the tree for `root` and computes every box.
    pub fn build(&self, root: &ElementSpec) -> Result<Document, DocumentError> {
        let mut doc = Document::new(&root.tag).with_default_line_height(self.options.line_height);
        let mut columns = HashMap::new();
        let root_id = doc.root();
        apply_element(&mut doc, root_id, root, &mut columns)?;
        for child in &root.children {
            build_node(&mut doc, root_id, child, &mut columns)?;
        }

        let mut layout = Layout {
            doc: &mut doc,
            options: self.options,
            columns,
        };
        let height = layout.layout_box(root_id, 0.0, 0.0, self.options.width);
        debug!("Laid out document: {:.1}px tall", height);
        Ok(doc)
    }
}

fn build_node(
    doc: &mut Document,
    parent: NodeId,
    spec: &NodeSpec,
    columns: &mut HashMap<NodeId, usize>,
) -> Result<(), DocumentError> {
    match spec {
        NodeSpec::Text(text) => {
            doc.append_text(parent, text);
        }
        NodeSpec::Element(element) => {
            let node = doc.append_element(parent, &element.tag);
            apply_element(doc, node, element, columns)?;
            for child in &element.children {
                build_node(doc, node, child, columns)?;
            }
        }
    }
    Ok(())
}

fn apply_element(
    doc: &mut Document,
    node: NodeId,
    spec: &ElementSpec,
    columns: &mut HashMap<NodeId, usize>,
) -> Result<(), DocumentError> {
    for (name, value) in &spec.attributes {
        doc.set_attribute(node, name, value);
    }
    let declarations = parse_declarations(&spec.style).map_err(|source| DocumentError::Style {
        tag: spec.tag.clone(),
        source,
    })?;
    // Validate eagerly so a bad fixture fails at build time, not as a warning later.
    let mut probe = ComputedStyle::default();
    for (property, value) in declarations {
        probe
            .apply_declaration(&property, &value)
            .map_err(|source| DocumentError::Style {
                tag: spec.tag.clone(),
                source,
            })?;
        doc.set_style(node, &property, &value);
    }
    if let Some(n) = spec.columns {
        if n == 0 {
            return Err(DocumentError::Invalid(format!(
                "<{}> declares zero columns",
                spec.tag
            )));
        }
        columns.insert(node, n);
    }
    Ok(())
}

struct Layout<'a> {
    doc: &'a mut Document,
    options: LayoutOptions,
    columns: HashMap<NodeId, usize>,
}

/// State of the line currently being filled.
struct LineCursor {
    left: f32,
    width: f32,
    top: f32,
    x: f32,
    line_height: f32,
    current_height: f32,
    has_content: bool,
}

impl LineCursor {
    fn new(top: f32, left: f32, width: f32, line_height: f32) -> Self {
        Self {
            left,
            width,
            top,
            x: 0.0,
            line_height,
            current_height: line_height,
            has_content: false,
        }
    }

    fn new_line(&mut self) {
        self.top += self.current_height;
        self.x = 0.0;
        self.current_height = self.line_height;
    }

    fn wrap_if_needed(&mut self, width: f32) {
        if self.x > 0.0 && self.x + width > self.width {
            self.new_line();
        }
    }

    /// Reserves `width` on the current line, wrapping first if it does not fit.
    fn place(&mut self, width: f32, height: f32) -> Rect {
        self.wrap_if_needed(width);
        let rect = Rect::new(self.top, self.left + self.x, width, height);
        self.x += width;
        self.current_height = self.current_height.max(height);
        self.has_content = true;
        rect
    }

    fn bottom(&self) -> f32 {
        self.top + self.current_height
    }
}

impl Layout<'_> {
    fn style(&self, node: NodeId) -> ComputedStyle {
        self.doc.computed_style(node).unwrap_or_default()
    }

    /// Lays out a block-level box at the given position. Returns its height.
    fn layout_box(&mut self, node: NodeId, top: f32, left: f32, width: f32) -> f32 {
        let style = self.style(node);
        let width = style.width.unwrap_or(width);
        let content_height = match self.column_count(node, &style) {
            Some(columns) => self.layout_columns(node, top, left, width, columns),
            None => self.layout_flow(node, top, left, width),
        };
        let height = style.height.unwrap_or(content_height);
        self.doc.set_rect(node, Rect::new(top, left, width, height));
        height
    }

    fn column_count(&self, node: NodeId, style: &ComputedStyle) -> Option<usize> {
        if style.display == Display::TableRow || style.is_flex_row() {
            let n = self.flow_items(node).iter().filter(|&&c| self.doc.is_element(c)).count();
            return Some(n.max(1));
        }
        if matches!(style.display, Display::Grid | Display::InlineGrid) {
            return Some(self.columns.get(&node).copied().unwrap_or(1));
        }
        self.columns.get(&node).copied()
    }

    /// Children taking part in the layout of `node`, with `display: contents`
    /// children replaced by their own items.
    fn flow_items(&self, node: NodeId) -> Vec<NodeId> {
        let mut items = Vec::new();
        for child in self.doc.child_nodes(node) {
            if !self.doc.is_element(child) {
                if self.doc.text_content(child).is_some() {
                    items.push(child);
                }
                continue;
            }
            match self.style(child).display {
                Display::None => {}
                Display::Contents => items.extend(self.flow_items(child)),
                _ => items.push(child),
            }
        }
        items
    }

    fn is_inline_level(&self, node: NodeId) -> bool {
        !self.doc.is_element(node) || self.style(node).display.is_inline()
    }

    fn layout_flow(&mut self, container: NodeId, top: f32, left: f32, width: f32) -> f32 {
        let line_height = self.doc.line_height(container);
        let preformatted = self.style(container).white_space.is_preformatted();
        let mut y = top;
        let mut run = Vec::new();

        for item in self.flow_items(container) {
            if self.is_inline_level(item) {
                run.push(item);
                continue;
            }
            if !run.is_empty() {
                y += self.layout_inline_run(&run, y, left, width, line_height, preformatted);
                run.clear();
            }
            let style = self.style(item);
            if matches!(style.position, Position::Absolute | Position::Fixed) || style.is_floated() {
                self.layout_box(item, y, left, width);
                continue;
            }
            y += style.margin_top;
            y += self.layout_box(item, y, left, width);
            y += style.margin_bottom;
        }
        if !run.is_empty() {
            y += self.layout_inline_run(&run, y, left, width, line_height, preformatted);
        }
        y - top
    }

    fn layout_columns(&mut self, node: NodeId, top: f32, left: f32, width: f32, columns: usize) -> f32 {
        let children: Vec<NodeId> = self
            .flow_items(node)
            .into_iter()
            .filter(|&c| self.doc.is_element(c))
            .collect();
        let column_width = width / columns as f32;
        let mut row_top = top;
        let mut row_height: f32 = 0.0;

        for (i, child) in children.into_iter().enumerate() {
            let column = i % columns;
            if column == 0 && i > 0 {
                row_top += row_height;
                row_height = 0.0;
            }
            let style = self.style(child);
            let height = self.layout_box(
                child,
                row_top + style.margin_top,
                left + column as f32 * column_width,
                column_width,
            );
            row_height = row_height.max(style.margin_top + height + style.margin_bottom);
        }
        row_top + row_height - top
    }

    fn layout_inline_run(
        &mut self,
        run: &[NodeId],
        top: f32,
        left: f32,
        width: f32,
        line_height: f32,
        preformatted: bool,
    ) -> f32 {
        let mut cursor = LineCursor::new(top, left, width, line_height);
        for &item in run {
            self.layout_inline(item, &mut cursor, preformatted);
        }
        if cursor.has_content {
            cursor.bottom() - top
        } else {
            0.0
        }
    }

    fn layout_inline(&mut self, node: NodeId, cursor: &mut LineCursor, preformatted: bool) {
        if !self.doc.is_element(node) {
            self.layout_text(node, cursor, preformatted);
            return;
        }
        let style = self.style(node);
        let tag = self.doc.tag_name(node).unwrap_or_default().to_ascii_lowercase();

        if tag == "br" {
            let rect = cursor.place(0.0, cursor.line_height);
            self.doc.set_rect(node, rect);
            cursor.new_line();
            return;
        }
        if is_replaced_tag(&tag) {
            let w = style.width.unwrap_or(self.options.replaced_size);
            let h = style.height.unwrap_or(self.options.replaced_size);
            let rect = cursor.place(w, h);
            self.doc.set_rect(node, rect);
            return;
        }
        match style.display {
            Display::None => {}
            Display::Inline | Display::Contents => {
                let preformatted = preformatted || style.white_space.is_preformatted();
                for child in self.flow_items(node) {
                    if self.is_inline_level(child) {
                        self.layout_inline(child, cursor, preformatted);
                    } else {
                        self.layout_block_in_line(child, cursor);
                    }
                }
            }
            _ => {
                // inline-block and friends: an atomic box on the line
                let w = style.width.unwrap_or(cursor.width - cursor.x).max(0.0);
                cursor.wrap_if_needed(w);
                let h = self.layout_box(node, cursor.top, cursor.left + cursor.x, w);
                cursor.place(w, h);
            }
        }
    }

    /// A block nested in an inline element: ends the line and stacks below it.
    fn layout_block_in_line(&mut self, node: NodeId, cursor: &mut LineCursor) {
        if cursor.has_content && cursor.x > 0.0 {
            cursor.new_line();
        }
        let style = self.style(node);
        let top = cursor.top + style.margin_top;
        let height = self.layout_box(node, top, cursor.left, cursor.width);
        cursor.top = top + height + style.margin_bottom;
        cursor.x = 0.0;
        cursor.current_height = 0.0;
        cursor.has_content = true;
    }

    fn layout_text(&mut self, node: NodeId, cursor: &mut LineCursor, preformatted: bool) {
        let Some(content) = self.doc.text_content(node).map(str::to_string) else {
            return;
        };
        let char_width = self.options.char_width;
        let mut words = Vec::new();

        if preformatted {
            for (i, line) in content.split('\n').enumerate() {
                if i > 0 {
                    cursor.has_content = true;
                    cursor.new_line();
                }
                for token in line.split(' ').filter(|t| !t.is_empty()) {
                    let text = format!("{token} ");
                    let rect = cursor.place(text.chars().count() as f32 * char_width, cursor.line_height);
                    words.push(WordBox { text, rect });
                }
            }
        } else {
            let tokens: Vec<&str> = content.split_whitespace().collect();
            let trailing_space = content.ends_with(char::is_whitespace);
            for (i, token) in tokens.iter().enumerate() {
                let mut text = token.to_string();
                if i + 1 < tokens.len() || trailing_space {
                    text.push(' ');
                }
                let rect = cursor.place(text.chars().count() as f32 * char_width, cursor.line_height);
                words.push(WordBox { text, rect });
            }
        }
        self.doc.set_words(node, words);
    }
}

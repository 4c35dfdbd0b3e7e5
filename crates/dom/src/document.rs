//! An in-memory document tree with static, pre-computed geometry.
//!
//! Boxes are stored in absolute coordinates. Elements without a box of their
//! own (inline wrappers, synthetic containers) measure as the union of their
//! children, and empty ones as a zero-height placeholder where they sit in
//! the flow. Mutations never trigger a relayout: the tree is a snapshot of an
//! already laid out, continuous flow.

use crate::defaults::style_for_tag;
use indextree::{Arena, NodeId};
use log::{trace, warn};
use pagecut_style::{ComputedStyle, DEFAULT_FONT_SIZE, Display, Position};
use pagecut_traits::{DomMutator, GeometryOracle, NodeType, SyntheticTag};
use pagecut_types::{Rect, union_all};

/// Line height used when no ancestor sets one.
pub const DEFAULT_LINE_HEIGHT: f32 = 20.0;

/// A laid out word of a text node.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub text: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text {
        content: String,
        words: Vec<WordBox>,
    },
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Style before inline declarations are applied.
    pub base_style: ComputedStyle,
    pub inline_style: Vec<(String, String)>,
    /// Explicit box. `None` means the box is derived from the children.
    pub rect: Option<Rect>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attributes: Vec::new(),
            },
            base_style: style_for_tag(tag),
            inline_style: Vec::new(),
            rect: None,
        }
    }

    fn text(content: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                content: content.to_string(),
                words: Vec::new(),
            },
            base_style: ComputedStyle::with_display(Display::Inline),
            inline_style: Vec::new(),
            rect: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<NodeData>,
    root: NodeId,
    default_line_height: f32,
}

impl Document {
    pub fn new(root_tag: &str) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::element(root_tag));
        Self {
            arena,
            root,
            default_line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    pub fn with_default_line_height(mut self, line_height: f32) -> Self {
        self.default_line_height = line_height;
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, node: NodeId) -> Option<&NodeData> {
        self.arena.get(node).map(|n| n.get())
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.arena.get_mut(node).map(|n| n.get_mut())
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.arena.new_node(NodeData::element(tag));
        attach(parent.checked_append(node, &mut self.arena), "append");
        node
    }

    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let node = self.arena.new_node(NodeData::text(content));
        attach(parent.checked_append(node, &mut self.arena), "append");
        node
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(data) = self.node_mut(node) {
            data.rect = Some(rect);
        }
    }

    pub fn set_words(&mut self, node: NodeId, laid_out: Vec<WordBox>) {
        if let Some(NodeData {
            kind: NodeKind::Text { words, .. },
            ..
        }) = self.node_mut(node)
        {
            *words = laid_out;
        }
    }

    /// First element (in document order) whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    /// The box of `node` in absolute coordinates.
    pub fn rect(&self, node: NodeId) -> Rect {
        self.own_rect(node)
            .unwrap_or_else(|| self.placeholder_rect(node))
    }

    /// Concatenated text of the subtree.
    pub fn text(&self, node: NodeId) -> String {
        node.descendants(&self.arena)
            .filter_map(|n| self.text_content(n))
            .collect()
    }

    /// Short human readable label: `tag#id.class` or a quoted text excerpt.
    pub fn describe(&self, node: NodeId) -> String {
        match self.node(node).map(|d| &d.kind) {
            Some(NodeKind::Element { tag, .. }) => {
                let mut label = tag.clone();
                if let Some(id) = self.attribute(node, "id") {
                    label.push('#');
                    label.push_str(id);
                }
                if let Some(class) = self.attribute(node, "class") {
                    for c in class.split_whitespace() {
                        label.push('.');
                        label.push_str(c);
                    }
                }
                label
            }
            Some(NodeKind::Text { content, .. }) => {
                let excerpt: String = content.trim().chars().take(24).collect();
                format!("\"{excerpt}\"")
            }
            Some(NodeKind::Comment(_)) => "#comment".to_string(),
            None => "#missing".to_string(),
        }
    }

    fn own_rect(&self, node: NodeId) -> Option<Rect> {
        let data = self.node(node)?;
        match &data.kind {
            NodeKind::Comment(_) => None,
            NodeKind::Text { words, .. } => union_all(words.iter().map(|w| &w.rect)),
            NodeKind::Element { .. } => {
                let style = self.computed_style(node)?;
                if style.display == Display::None {
                    return None;
                }
                let mut rect = match data.rect {
                    Some(r) => r,
                    None => {
                        let children: Vec<Rect> = node
                            .children(&self.arena)
                            .filter_map(|c| self.own_rect(c))
                            .collect();
                        union_all(children.iter())?
                    }
                };
                if let Some(height) = style.height {
                    rect.height = height;
                }
                if let Some(width) = style.width {
                    rect.width = width;
                }
                Some(rect)
            }
        }
    }

    /// Where an empty node sits: at the bottom of the nearest previous sibling
    /// with a box, or at the top of its parent.
    fn placeholder_rect(&self, node: NodeId) -> Rect {
        let mut sibling = self.previous_sibling(node);
        while let Some(s) = sibling {
            if let Some(r) = self.own_rect(s) {
                return Rect::zero_height(r.bottom(), r.left, r.width);
            }
            sibling = self.previous_sibling(s);
        }
        match self.parent(node) {
            Some(parent) => {
                let r = self.rect(parent);
                Rect::zero_height(r.top, r.left, r.width)
            }
            None => Rect::default(),
        }
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        node.ancestors(&self.arena).any(|n| {
            self.computed_style(n)
                .is_some_and(|s| s.display == Display::None)
        })
    }

    fn clone_subtree(&mut self, node: NodeId) -> Option<NodeId> {
        let data = self.node(node)?.clone();
        let copy = self.arena.new_node(data);
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children {
            if let Some(child_copy) = self.clone_subtree(child) {
                attach(copy.checked_append(child_copy, &mut self.arena), "clone");
            }
        }
        Some(copy)
    }
}

fn attach(result: Result<(), indextree::NodeError>, operation: &str) {
    if let Err(e) = result {
        warn!("Document {} failed: {}", operation, e);
    }
}

impl GeometryOracle for Document {
    type Node = NodeId;

    fn top(&self, node: NodeId, root: NodeId) -> f32 {
        self.rect(node).top - self.rect(root).top
    }

    fn bottom(&self, node: NodeId, root: NodeId) -> f32 {
        self.rect(node).bottom() - self.rect(root).top
    }

    fn left(&self, node: NodeId, root: NodeId) -> f32 {
        self.rect(node).left - self.rect(root).left
    }

    fn width(&self, node: NodeId) -> f32 {
        self.rect(node).width
    }

    fn height(&self, node: NodeId) -> f32 {
        self.rect(node).height
    }

    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
        let data = self.node(node)?;
        if !matches!(data.kind, NodeKind::Element { .. }) {
            return None;
        }
        let mut style = data.base_style.clone();
        for (property, value) in &data.inline_style {
            if let Err(e) = style.apply_declaration(property, value) {
                warn!("Ignoring inline style on {}: {}", self.describe(node), e);
            }
        }
        Some(style)
    }

    fn line_height(&self, node: NodeId) -> f32 {
        let mut line_height = None;
        let mut font_size = None;
        for ancestor in node.ancestors(&self.arena) {
            if let Some(style) = self.computed_style(ancestor) {
                line_height = line_height.or(style.line_height);
                font_size = font_size.or(style.font_size);
            }
            if line_height.is_some() && font_size.is_some() {
                break;
            }
        }
        match line_height {
            Some(lh) => lh.resolve(font_size.unwrap_or(DEFAULT_FONT_SIZE)),
            None => self.default_line_height,
        }
    }

    fn inline_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.node(node)?
            .inline_style
            .iter()
            .rev()
            .find(|(p, _)| p.eq_ignore_ascii_case(property))
            .map(|(_, v)| v.as_str())
    }

    fn offset_parent(&self, node: NodeId) -> Option<NodeId> {
        let style = self.computed_style(node)?;
        if style.display == Display::Contents || style.position == Position::Fixed {
            return None;
        }
        if self.is_hidden(node) {
            return None;
        }
        self.parent(node)
    }

    fn node_type(&self, node: NodeId) -> NodeType {
        match self.node(node).map(|d| &d.kind) {
            Some(NodeKind::Element { .. }) => NodeType::Element,
            Some(NodeKind::Text { .. }) => NodeType::Text,
            _ => NodeType::Comment,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn text_content(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text { content, .. } => Some(content.as_str()),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.first_child()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.last_child()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.next_sibling()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.previous_sibling()
    }
}

impl DomMutator for Document {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(NodeData::element(tag))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeData::text(text))
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        let result = reference.checked_insert_before(node, &mut self.arena);
        attach(result, "insert_before");
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let result = reference.checked_insert_after(node, &mut self.arena);
        attach(result, "insert_after");
    }

    fn insert_at_start(&mut self, parent: NodeId, node: NodeId) {
        let result = parent.checked_prepend(node, &mut self.arena);
        attach(result, "insert_at_start");
    }

    fn insert_at_end(&mut self, parent: NodeId, node: NodeId) {
        let result = parent.checked_append(node, &mut self.arena);
        attach(result, "insert_at_end");
    }

    fn remove_node(&mut self, node: NodeId) {
        // Detached nodes stay addressable, so marks keyed by them remain valid.
        node.detach(&mut self.arena);
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(data) = self.node_mut(node) else {
            return;
        };
        match data
            .inline_style
            .iter_mut()
            .find(|(p, _)| p.eq_ignore_ascii_case(property))
        {
            Some((_, v)) => *v = value.to_string(),
            None => data
                .inline_style
                .push((property.to_string(), value.to_string())),
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(data) = self.node_mut(node) {
            data.inline_style
                .retain(|(p, _)| !p.eq_ignore_ascii_case(property));
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.node_mut(node)
        {
            match attributes
                .iter_mut()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
            {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn deep_clone(&mut self, node: NodeId) -> NodeId {
        match self.clone_subtree(node) {
            Some(copy) => copy,
            None => {
                warn!("deep_clone of a missing node {:?}", node);
                self.arena.new_node(NodeData::text(""))
            }
        }
    }

    fn split_text_into_words(&mut self, text: NodeId) -> Vec<NodeId> {
        let words = match self.node(text).map(|d| &d.kind) {
            Some(NodeKind::Text { words, .. }) => words.clone(),
            _ => return Vec::new(),
        };
        if words.is_empty() {
            return Vec::new();
        }

        let mut word_nodes = Vec::with_capacity(words.len());
        for word in words {
            let element = self.create_synthetic(SyntheticTag::Word);
            let content = self.arena.new_node(NodeData {
                kind: NodeKind::Text {
                    content: word.text.clone(),
                    words: vec![word],
                },
                ..NodeData::text("")
            });
            attach(element.checked_append(content, &mut self.arena), "append");
            self.insert_before(text, element);
            word_nodes.push(element);
        }
        self.remove_node(text);
        trace!("Split text into {} words", word_nodes.len());
        word_nodes
    }
}

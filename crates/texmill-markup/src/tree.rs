//! Arena-backed markup tree
//!
//! Nodes live in a `Vec` owned by [`MarkupTree`] and refer to each other by
//! [`NodeId`]. The parent link is a plain id, so it never owns anything.
//! [`MarkupTree::parse`] runs html5ever's fragment parser and copies the
//! result into the arena.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::entities;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements that never have children
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Document scaffolding the parser adds; their children are lifted
const WRAPPER_ELEMENTS: &[&str] = &["html", "head", "body"];

/// Index of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root; there is exactly one per tree
    Document,
    /// An element with its lower-case tag name and attributes in source order
    Element {
        tag_name: String,
        attributes: Vec<(String, String)>,
    },
    /// Decoded text
    Text(String),
}

/// A node of the markup tree
#[derive(Debug, Clone)]
pub struct MarkupNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl MarkupNode {
    /// Tag name for elements
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    /// Attribute value for elements; `None` when absent
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

/// A parsed markup document
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<MarkupNode>,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![MarkupNode {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Access a node
    pub fn node(&self, id: NodeId) -> &MarkupNode {
        &self.nodes[id.0]
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str, attributes: Vec<(String, String)>) -> NodeId {
        self.push(NodeKind::Element {
            tag_name: tag_name.to_string(),
            attributes,
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(MarkupNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Put `new` where `old` is; `old` becomes detached.
    ///
    /// Does nothing if `old` has no parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.nodes[old.0].parent else {
            return;
        };
        self.detach(new);
        if let Some(slot) = self.nodes[parent.0].children.iter().position(|c| *c == old) {
            self.nodes[parent.0].children[slot] = new;
        }
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Element ids reachable from the root, in document order
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if matches!(self.nodes[id.0].kind, NodeKind::Element { .. }) {
                out.push(id);
            }
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Concatenated text of `id` and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            match &node.kind {
                NodeKind::Text(text) => out.push_str(text),
                _ => stack.extend(node.children.iter().rev().copied()),
            }
        }
        out
    }

    /// Serialize the tree back to markup
    pub fn to_markup(&self) -> String {
        enum Visit {
            Enter(NodeId),
            Leave(NodeId),
        }

        let mut out = String::new();
        let mut stack = vec![Visit::Enter(self.root())];
        while let Some(visit) = stack.pop() {
            let id = match visit {
                Visit::Enter(id) => id,
                Visit::Leave(id) => {
                    if let Some(tag_name) = self.nodes[id.0].tag_name() {
                        out.push_str(&format!("</{}>", tag_name));
                    }
                    continue;
                }
            };

            let node = &self.nodes[id.0];
            match &node.kind {
                NodeKind::Document => {}
                NodeKind::Text(text) => {
                    out.push_str(&entities::escape_node_text(text));
                    continue;
                }
                NodeKind::Element {
                    tag_name,
                    attributes,
                } => {
                    out.push('<');
                    out.push_str(tag_name);
                    for (name, value) in attributes {
                        out.push_str(&format!(
                            " {}=\"{}\"",
                            name,
                            entities::escape_attribute(value)
                        ));
                    }
                    out.push('>');
                    if is_void(tag_name) {
                        continue;
                    }
                    stack.push(Visit::Leave(id));
                }
            }
            stack.extend(node.children.iter().rev().map(|child| Visit::Enter(*child)));
        }
        out
    }

    /// Parse possibly malformed markup as an HTML fragment in `body`
    /// context. Never fails.
    ///
    /// Tag and attribute names come out lower-cased, entities in text and
    /// attribute values are decoded, and implied end tags are applied the
    /// way browsers do.
    pub fn parse(markup: &str) -> Self {
        let context = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from("body"),
        );
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
            .one(markup);

        let mut tree = Self::new();
        let root = tree.root();
        let mut pending: Vec<(Handle, NodeId)> = dom
            .document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), root))
            .collect();

        while let Some((handle, parent)) = pending.pop() {
            let target = match &handle.data {
                NodeData::Text { contents } => {
                    let text = tree.create_text(&contents.borrow());
                    tree.append_child(parent, text);
                    continue;
                }
                NodeData::Element { name, attrs, .. } => {
                    let tag_name = str::to_ascii_lowercase(&name.local);
                    if WRAPPER_ELEMENTS.contains(&tag_name.as_str()) {
                        parent
                    } else {
                        let attributes = attrs
                            .borrow()
                            .iter()
                            .map(|attr| {
                                (
                                    str::to_ascii_lowercase(&attr.name.local),
                                    attr.value.to_string(),
                                )
                            })
                            .collect();
                        let element = tree.create_element(&tag_name, attributes);
                        tree.append_child(parent, element);
                        element
                    }
                }
                // Comments, doctypes and processing instructions carry no text
                _ => continue,
            };
            let children = handle.children.borrow();
            pending.extend(children.iter().rev().map(|child| (child.clone(), target)));
        }

        tree
    }
}

fn is_void(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

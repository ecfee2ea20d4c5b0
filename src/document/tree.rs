//! Arena-backed document tree
//!
//! Nodes are either elements or text. Detaching a node only unlinks it from
//! its parent, so its `NodeId` stays valid. `remove` releases a detached
//! subtree; released slots are handed out again by later insertions, so an
//! id must not be used once its node has been removed.

use std::fmt;
use std::ops::Range;

use super::error::DocumentError;

/// Handle to a node inside a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An element with its attributes in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    /// Create an element without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Get an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether an attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Check the whitespace-separated `class` list
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    released: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            released: false,
        }
    }
}

/// A text-bearing document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
    declaration: bool,
}

impl Document {
    /// Create a document with the given root element
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Element(root))],
            free: Vec::new(),
            root: NodeId(0),
            declaration: false,
        }
    }

    /// The root element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether an XML declaration is written before the root
    pub fn has_declaration(&self) -> bool {
        self.declaration
    }

    pub fn set_declaration(&mut self, declaration: bool) {
        self.declaration = declaration;
    }

    /// The highlight container: `<body>` when present, the root otherwise
    pub fn container(&self) -> NodeId {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some("body"))
            .unwrap_or(self.root)
    }

    // ---- creation ----

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = Node::new(kind);
                id
            }
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(Node::new(kind));
                id
            }
        }
    }

    /// Number of live nodes, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Slots held by the store, live or released
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    // ---- inspection ----

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    /// Text of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute; ignored on text nodes
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(id) {
            element.set_attribute(name, value);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// All descendants in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Descendant elements matching a predicate, in document order
    pub fn find_elements<F>(&self, id: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.element(node).map(&predicate).unwrap_or(false))
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    // ---- mutation ----

    /// Unlink a node from its parent
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` into `reference`'s parent, right before `reference`
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<(), DocumentError> {
        let parent = self.parent(reference).ok_or(DocumentError::Detached(reference))?;
        self.detach(child);
        let position = self.index_in_parent(parent, reference);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(position, child);
        Ok(())
    }

    fn index_in_parent(&self, parent: NodeId, child: NodeId) -> usize {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .unwrap_or(self.children(parent).len())
    }

    /// Split a text node at a byte offset.
    ///
    /// The node keeps the text before `offset`; the returned node holds the
    /// rest and is inserted right after it.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DocumentError> {
        let text = self.text(id).ok_or(DocumentError::NotText(id))?;
        if offset > text.len() || !text.is_char_boundary(offset) {
            return Err(DocumentError::InvalidRange {
                start: offset,
                end: offset,
                len: text.len(),
            });
        }
        let parent = self.parent(id).ok_or(DocumentError::Detached(id))?;
        let tail = text[offset..].to_string();
        if let NodeKind::Text(text) = &mut self.nodes[id.0].kind {
            text.truncate(offset);
        }

        let tail_id = self.create_text(tail);
        let position = self.index_in_parent(parent, id) + 1;
        self.nodes[tail_id.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(position, tail_id);
        Ok(tail_id)
    }

    /// Wrap a byte range of a text node in a new element.
    ///
    /// Text outside the range stays in sibling text nodes; the wrapper's only
    /// child is the text covering `range`.
    pub fn surround(
        &mut self,
        id: NodeId,
        range: Range<usize>,
        wrapper: Element,
    ) -> Result<NodeId, DocumentError> {
        let len = self.text(id).ok_or(DocumentError::NotText(id))?.len();
        if range.start > range.end || range.end > len {
            return Err(DocumentError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        if range.end < len {
            self.split_text(id, range.end)?;
        }
        let target = if range.start > 0 {
            self.split_text(id, range.start)?
        } else {
            id
        };

        let wrapper = self.create_element(wrapper);
        self.insert_before(target, wrapper)?;
        self.append_child(wrapper, target);
        Ok(wrapper)
    }

    /// Detach a node and release it together with its whole subtree.
    ///
    /// The root is never removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || self.nodes[id.0].released {
            return;
        }
        self.detach(id);
        self.release(id);
    }

    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = &mut self.nodes[next.0];
            if node.released {
                continue;
            }
            stack.append(&mut node.children);
            node.kind = NodeKind::Text(String::new());
            node.parent = None;
            node.released = true;
            self.free.push(next);
        }
    }

    /// Replace a node with a plain text node holding `text`
    pub fn replace_with_text(
        &mut self,
        id: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, DocumentError> {
        let replacement = self.create_text(text);
        self.insert_before(id, replacement)?;
        self.detach(id);
        Ok(replacement)
    }

    /// Merge adjacent text nodes and drop empty ones below `id`
    pub fn normalize(&mut self, id: NodeId) {
        let children = self.nodes[id.0].children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            let text = self.text(child).map(str::to_string);
            match text {
                Some(text) if text.is_empty() => {
                    self.nodes[child.0].parent = None;
                    self.release(child);
                }
                Some(text) => {
                    let previous = kept.last().copied().filter(|&p| self.text(p).is_some());
                    match previous {
                        Some(previous) => {
                            if let NodeKind::Text(existing) = &mut self.nodes[previous.0].kind {
                                existing.push_str(&text);
                            }
                            self.nodes[child.0].parent = None;
                            self.release(child);
                        }
                        None => kept.push(child),
                    }
                }
                None => {
                    self.normalize(child);
                    kept.push(child);
                }
            }
        }

        self.nodes[id.0].children = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new(Element::new("body"));
        let p = doc.create_element(Element::new("p"));
        doc.append_child(doc.root(), p);
        let t = doc.create_text(text);
        doc.append_child(p, t);
        (doc, p, t)
    }

    #[test]
    fn test_split_text() {
        let (mut doc, p, t) = paragraph("Hello world");
        let tail = doc.split_text(t, 6).unwrap();

        assert_eq!(doc.text(t), Some("Hello "));
        assert_eq!(doc.text(tail), Some("world"));
        assert_eq!(doc.children(p), &[t, tail]);
    }

    #[test]
    fn test_split_text_rejects_char_boundary() {
        let (mut doc, _, t) = paragraph("héllo");
        assert!(matches!(
            doc.split_text(t, 2),
            Err(DocumentError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_surround_middle() {
        let (mut doc, p, t) = paragraph("Hello world, friend");
        let mark = doc.surround(t, 6..11, Element::new("mark")).unwrap();

        let children = doc.children(p).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(doc.text(children[0]), Some("Hello "));
        assert_eq!(children[1], mark);
        assert_eq!(doc.text_content(mark), "world");
        assert_eq!(doc.text(children[2]), Some(", friend"));
    }

    #[test]
    fn test_surround_whole_text() {
        let (mut doc, p, t) = paragraph("whole");
        let mark = doc.surround(t, 0..5, Element::new("mark")).unwrap();

        assert_eq!(doc.children(p), &[mark]);
        assert_eq!(doc.children(mark), &[t]);
    }

    #[test]
    fn test_surround_rejects_element() {
        let (mut doc, p, _) = paragraph("text");
        assert!(matches!(
            doc.surround(p, 0..1, Element::new("mark")),
            Err(DocumentError::NotText(_))
        ));
    }

    #[test]
    fn test_replace_and_normalize() {
        let (mut doc, p, t) = paragraph("Hello world");
        let mark = doc.surround(t, 6..11, Element::new("mark")).unwrap();
        doc.replace_with_text(mark, "world").unwrap();
        assert_eq!(doc.children(p).len(), 2);

        doc.normalize(doc.root());
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "Hello world");
        assert!(!doc.is_attached(mark));
    }

    #[test]
    fn test_normalize_releases_merged_text() {
        let (mut doc, p, t) = paragraph("Hello world");
        doc.split_text(t, 6).unwrap();
        assert_eq!(doc.node_count(), 4);

        doc.normalize(doc.root());
        assert_eq!(doc.children(p), &[t]);
        assert_eq!(doc.node_count(), 3);

        // The merged slot is reused
        let slots = doc.slot_count();
        doc.create_text("again");
        assert_eq!(doc.slot_count(), slots);
    }

    #[test]
    fn test_remove_releases_subtree() {
        let (mut doc, p, t) = paragraph("Hello world");
        let mark = doc.surround(t, 0..5, Element::new("mark")).unwrap();
        let icon = doc.create_element(Element::new("svg"));
        doc.append_child(mark, icon);
        assert_eq!(doc.node_count(), 6);

        doc.remove(mark);
        assert_eq!(doc.node_count(), 3);
        assert_eq!(doc.text_content(p), " world");

        // Removing twice is a no-op
        doc.remove(mark);
        assert_eq!(doc.node_count(), 3);

        doc.remove(doc.root());
        assert!(doc.is_attached(p));
    }

    #[test]
    fn test_container_prefers_body() {
        let mut doc = Document::new(Element::new("html"));
        let body = doc.create_element(Element::new("body"));
        doc.append_child(doc.root(), body);
        assert_eq!(doc.container(), body);

        let bare = Document::new(Element::new("section"));
        assert_eq!(bare.container(), bare.root());
    }

    #[test]
    fn test_has_class() {
        let element = Element::new("a").with_attribute("class", "rdhnav extra");
        assert!(element.has_class("rdhnav"));
        assert!(!element.has_class("rdh"));
    }
}

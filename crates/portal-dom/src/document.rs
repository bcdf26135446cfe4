//! The node arena and its traversal and mutation API.
//!
//! Nodes are never freed: a detached node stays in the arena and keeps its
//! [`NodeId`], it is simply no longer reachable from the root. Every method
//! tolerates ids that do not name a suitable node (reads return empty values,
//! writes do nothing), so a behavior running against an unexpected page
//! variant degrades to a no-op instead of failing.

use portal_core::error::{PortalError, PortalResult};

use crate::builder::{ElementBuilder, Fragment};
use crate::selector::Selector;

/// Identifies a node within one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this node.
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An in-memory HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document whose root is a `<body>` element.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("body");
        doc
    }

    /// Returns the root element.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the document holds only its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Returns `id` if it names a node of this document.
    pub fn check(&self, id: NodeId) -> PortalResult<NodeId> {
        if id.0 < self.nodes.len() {
            Ok(id)
        } else {
            Err(PortalError::NodeNotFound(id.0))
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn attrs(&self, id: NodeId) -> Option<&Vec<(String, String)>> {
        match &self.node(id)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Creates the nodes described by `builder` and returns the detached root.
    pub fn build(&mut self, builder: ElementBuilder) -> NodeId {
        let id = self.create_element(&builder.tag);
        if let Some(attrs) = self.attrs_mut(id) {
            *attrs = builder.attrs;
        }
        for fragment in builder.children {
            let child = match fragment {
                Fragment::Element(child) => self.build(child),
                Fragment::Text(text) => self.create_text(&text),
            };
            self.append_child(id, child);
        }
        id
    }

    /// Builds `builder` and appends it as the last child of `parent`.
    pub fn append_built(&mut self, parent: NodeId, builder: ElementBuilder) -> NodeId {
        let id = self.build(builder);
        self.append_child(parent, id);
        id
    }

    /// Builds `builder` and inserts it as the first child of `parent`.
    pub fn prepend_built(&mut self, parent: NodeId, builder: ElementBuilder) -> NodeId {
        let id = self.build(builder);
        self.prepend_child(parent, id);
        id
    }

    /// Builds `builder` and inserts it as the previous sibling of `reference`.
    pub fn insert_built_before(&mut self, reference: NodeId, builder: ElementBuilder) -> NodeId {
        let id = self.build(builder);
        self.insert_before(reference, id);
        id
    }

    /// Builds `builder` and inserts it as the next sibling of `reference`.
    pub fn insert_built_after(&mut self, reference: NodeId, builder: ElementBuilder) -> NodeId {
        let id = self.build(builder);
        self.insert_after(reference, id);
        id
    }

    // ── Tree mutation ────────────────────────────────────────────────

    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        self.is_element(parent) && self.node(child).is_some() && !self.contains(child, parent)
    }

    /// Appends `child` to `parent`, detaching it from its current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Inserts `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(0, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Inserts `new` immediately before `reference` under the same parent.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        self.insert_sibling(reference, new, 0);
    }

    /// Inserts `new` immediately after `reference` under the same parent.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        self.insert_sibling(reference, new, 1);
    }

    fn insert_sibling(&mut self, reference: NodeId, new: NodeId, offset: usize) {
        if reference == new {
            return;
        }
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if !self.can_adopt(parent, new) {
            return;
        }
        self.detach(new);
        let Some(position) = self.position_in_parent(reference) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(position + offset, new);
        }
        if let Some(node) = self.node_mut(new) {
            node.parent = Some(parent);
        }
    }

    fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.node(parent)?.children.iter().position(|&c| c == id)
    }

    /// Removes `id` from its parent. The node and its subtree stay intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Detaches every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.children.clear();
        }
    }

    /// Replaces the content of `id` with a single text node.
    ///
    /// On a text node this replaces its text.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(Node {
            kind: NodeKind::Text(existing),
            ..
        }) = self.node_mut(id)
        {
            *existing = text.to_string();
            return;
        }
        if !self.is_element(id) {
            return;
        }
        self.clear_children(id);
        let text_node = self.create_text(text);
        self.append_child(id, text_node);
    }

    // ── Attributes ───────────────────────────────────────────────────

    /// Returns the lowercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns `true` if `id` names an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some()
    }

    /// Returns the value of an attribute.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the element carries the attribute.
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(attrs) = self.attrs_mut(id) else {
            return;
        };
        if let Some(entry) = attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Removes an attribute.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(attrs) = self.attrs_mut(id) {
            attrs.retain(|(k, _)| k != name);
        }
    }

    /// Returns the attributes of an element in document order.
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.attrs(id)
            .map(|attrs| attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
            .unwrap_or_default()
    }

    /// Returns a `data-*` attribute.
    ///
    /// ```
    /// use portal_dom::{el, Document};
    ///
    /// let mut doc = Document::new();
    /// let div = doc.build(el("div").data("has-pending", "true"));
    /// assert_eq!(doc.data(div, "has-pending"), Some("true"));
    /// ```
    pub fn data(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attr(id, &format!("data-{key}"))
    }

    /// Returns the element's classes.
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the element carries `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).contains(&class)
    }

    /// Adds `class` unless already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.is_element(id) || self.has_class(id, class) {
            return;
        }
        let mut classes: Vec<String> = self.classes(id).into_iter().map(String::from).collect();
        classes.push(class.to_string());
        self.set_attr(id, "class", &classes.join(" "));
    }

    /// Removes `class` if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let classes: Vec<String> = self
            .classes(id)
            .into_iter()
            .filter(|c| *c != class)
            .map(String::from)
            .collect();
        if classes.is_empty() {
            self.remove_attr(id, "class");
        } else {
            self.set_attr(id, "class", &classes.join(" "));
        }
    }

    /// Adds `class` when `on` is true, removes it otherwise.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    // ── Display state ────────────────────────────────────────────────

    /// Returns `false` if the element's inline style hides it.
    pub fn is_displayed(&self, id: NodeId) -> bool {
        !self.attr(id, "style").is_some_and(|style| {
            style_declarations(style)
                .any(|(prop, value)| prop == "display" && value == "none")
        })
    }

    /// Shows or hides an element through its inline `display` style.
    pub fn set_displayed(&mut self, id: NodeId, displayed: bool) {
        if !self.is_element(id) {
            return;
        }
        let mut declarations: Vec<String> = self
            .attr(id, "style")
            .map(|style| {
                style_declarations(style)
                    .filter(|(prop, _)| *prop != "display")
                    .map(|(prop, value)| format!("{prop}: {value}"))
                    .collect()
            })
            .unwrap_or_default();
        if !displayed {
            declarations.push("display: none".to_string());
        }
        if declarations.is_empty() {
            self.remove_attr(id, "style");
        } else {
            self.set_attr(id, "style", &format!("{};", declarations.join("; ")));
        }
    }

    // ── Form controls ────────────────────────────────────────────────

    /// Returns the current value of a form control.
    ///
    /// A `<textarea>` holds its value as text content; other controls use the
    /// `value` attribute.
    pub fn value(&self, id: NodeId) -> String {
        if self.tag(id) == Some("textarea") {
            self.text_content(id)
        } else {
            self.attr(id, "value").unwrap_or_default().to_string()
        }
    }

    /// Sets the current value of a form control.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if self.tag(id) == Some("textarea") {
            self.set_text(id, value);
        } else {
            self.set_attr(id, "value", value);
        }
    }

    /// Returns `true` if the control carries the `disabled` attribute.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attr(id, "disabled")
    }

    /// Sets or clears the `disabled` attribute.
    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if disabled {
            self.set_attr(id, "disabled", "disabled");
        } else {
            self.remove_attr(id, "disabled");
        }
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// Returns the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Returns the children of a node, text nodes included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Returns the element children of a node.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Returns the next sibling that is an element.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .skip_while(|&&c| c != id)
            .skip(1)
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Returns the element siblings before a node, nearest first.
    pub fn previous_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let children = self.children(parent);
        let position = children.iter().position(|&c| c == id).unwrap_or(0);
        children[..position]
            .iter()
            .rev()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Returns the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Returns `true` if `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).contains(&ancestor)
    }

    /// Returns `true` if the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Returns all descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    /// Returns the concatenated text of a node and its descendants.
    ///
    /// A `<br>` element contributes a line break, so multi-line cells keep
    /// their line structure.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { tag, .. } if tag == "br" => out.push('\n'),
            NodeKind::Element { .. } => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Returns the raw text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Returns `true` if the element matches the selector.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// Returns the descendants of `scope` matching `selector`, in document order.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// Returns the first descendant of `scope` matching `selector`.
    pub fn select_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| selector.matches(self, id))
    }

    /// Parses `selector` and returns the matching descendants of `scope`.
    ///
    /// A selector that does not parse is logged and matches nothing.
    pub fn query_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        parse_or_warn(selector).map_or_else(Vec::new, |s| self.select(scope, &s))
    }

    /// Parses `selector` and returns the first matching descendant of `scope`.
    pub fn query(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        parse_or_warn(selector).and_then(|s| self.select_first(scope, &s))
    }

    /// Parses `selector` and tests a single element against it.
    pub fn is(&self, id: NodeId, selector: &str) -> bool {
        parse_or_warn(selector).is_some_and(|s| s.matches(self, id))
    }

    /// Returns the nearest of `id` and its ancestors matching `selector`,
    /// stopping before `boundary`.
    pub fn closest_within(&self, id: NodeId, selector: &Selector, boundary: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .take_while(|&node| node != boundary)
            .find(|&node| selector.matches(self, node))
    }
}

fn parse_or_warn(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(selector, error = %err, "ignoring unparseable selector");
            None
        }
    }
}

fn style_declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        Some((prop.trim(), value.trim()))
    })
}

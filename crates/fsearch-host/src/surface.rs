//! Element tree for the host's view chrome.
//!
//! A small id-arena of nodes with class lists, standing in for the DOM the
//! host renders its panes into. The overlay only needs structure: parent
//! chains for click ascent, class membership, reparenting, and subtree
//! removal. Removed nodes keep their slot so stale ids stay safe to probe.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    text: String,
    detached: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Surface {
    nodes: Vec<Node>,
}

impl Surface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with no parent (a window or modal root).
    pub fn create_root(&mut self, class: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            classes: vec![class.to_string()],
            ..Node::default()
        });
        id
    }

    /// Create a child node under `parent`.
    pub fn create_div(&mut self, parent: NodeId, class: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            classes: vec![class.to_string()],
            ..Node::default()
        });
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    /// Move `node` under a new parent, detaching it from the old one.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        let Some(old_parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            if let Some(n) = self.nodes.get_mut(node.0) {
                n.parent = Some(new_parent);
            }
            if let Some(p) = self.nodes.get_mut(new_parent.0) {
                p.children.push(node);
            }
            return;
        };
        if let Some(p) = self.nodes.get_mut(old_parent.0) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.parent = Some(new_parent);
        }
        if let Some(p) = self.nodes.get_mut(new_parent.0) {
            p.children.push(node);
        }
    }

    /// Detach `node` (and transitively its subtree) from the tree.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent)
            && let Some(p) = self.nodes.get_mut(parent.0)
        {
            p.children.retain(|c| *c != node);
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(n) = self.nodes.get_mut(current.0) {
                n.detached = true;
                n.parent = None;
                stack.extend(std::mem::take(&mut n.children));
            }
        }
    }

    /// Remove all children of `node`, keeping the node itself.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = self
            .nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove(child);
        }
    }

    #[must_use]
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|n| !n.detached)
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.text = text.into();
        }
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |n| n.text.as_str())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node.0)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.classes.retain(|c| c != class);
        }
    }

    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Whether `node` is `ancestor` or lives somewhere below it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The node itself followed by its parent chain up to the root.
    #[must_use]
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.parent(id);
        }
        chain
    }

    /// Closest ancestor (including `node`) carrying `class`.
    #[must_use]
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.ancestors(node)
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// First descendant of `node` (depth first) carrying `class`.
    #[must_use]
    pub fn find_descendant(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        while let Some(current) = stack.pop() {
            if self.has_class(current, class) {
                return Some(current);
            }
            stack.extend_from_slice(self.children(current));
        }
        None
    }
}

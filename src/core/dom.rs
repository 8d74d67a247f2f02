// src/core/dom.rs
//
// Arena-backed element tree standing in for the browser DOM the original
// overlay script lived in. Nodes are indices into one Vec, which keeps
// ancestor walks and subtree scans cheap and borrow-friendly.
//
// Change detection is an explicit subscribe/unsubscribe interface instead of
// a MutationObserver: mutating calls enqueue `DomEvent`s, the controller
// drains them once per tick. Disconnecting an observer also drops any of its
// queued events, so a torn-down subscription can never fire late.

use std::collections::VecDeque;

use crate::core::parse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    /// An input's live value changed (user edit).
    Input(NodeId),
    /// An input received focus or was clicked.
    Focus(NodeId),
    /// Something changed inside an observed subtree.
    Mutated(ObserverId),
}

#[derive(Debug, Default)]
struct NodeData {
    /// Empty for text nodes.
    tag: String,
    text: String,
    attrs: Vec<(String, String)>,
    /// Live value for inputs; falls back to the `value` attribute.
    value: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct Observer {
    id: ObserverId,
    root: NodeId,
}

pub struct Document {
    nodes: Vec<NodeData>,
    observers: Vec<Observer>,
    next_observer: u64,
    events: VecDeque<DomEvent>,
}

impl Document {
    pub fn new() -> Self {
        let root = NodeData {
            tag: "#document".to_string(),
            ..Default::default()
        };
        Self {
            nodes: vec![root],
            observers: Vec::new(),
            next_observer: 0,
            events: VecDeque::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // ----- construction (used by the parser and by host re-render simulation)

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        id
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            text: text.to_string(),
            ..Default::default()
        });
        id
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let data = &mut self.nodes[id.0];
        if let Some(slot) = data.attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value.to_string();
        } else {
            data.attrs.push((name, value.to_string()));
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.notify_subtree_change(parent);
    }

    // ----- reads

    pub fn tag(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.nodes[id.0].tag.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn attr<'a>(&'a self, id: NodeId, name: &str) -> Option<&'a str> {
        self.nodes[id.0]
            .attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.split_ascii_whitespace().any(|p| p == class))
            .unwrap_or(false)
    }

    /// Live input value: the last `set_value`, else the `value` attribute.
    pub fn value<'a>(&'a self, id: NodeId) -> &'a str {
        match &self.nodes[id.0].value {
            Some(v) => v.as_str(),
            None => self.attr(id, "value").unwrap_or(""),
        }
    }

    pub fn is_input_named(&self, id: NodeId, name: &str) -> bool {
        self.tag(id) == "input" && self.attr(id, "name") == Some(name)
    }

    /// Pre-order subtree walk, `id` itself included.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            // push in reverse so pop yields document order
            for &c in self.nodes[n.0].children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    pub fn find_descendant<F>(&self, root: NodeId, mut pred: F) -> Option<NodeId>
    where
        F: FnMut(&Document, NodeId) -> bool,
    {
        self.subtree(root).into_iter().find(|&n| pred(self, n))
    }

    /// Concatenated text of the subtree, like `Node.textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.subtree(id) {
            if self.is_text(n) {
                out.push_str(&self.nodes[n.0].text);
            }
        }
        out
    }

    /// Nearest self-or-ancestor inline `color:`, the computed-style stand-in
    /// behind the red-loss sign heuristic.
    pub fn effective_color(&self, id: NodeId) -> Option<(u8, u8, u8)> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let Some(style) = self.attr(n, "style") {
                if let Some(rgb) = parse::css_color(style) {
                    return Some(rgb);
                }
            }
            cur = self.parent(n);
        }
        None
    }

    // ----- mutation (everything here enqueues events)

    /// User edit of an input's live value.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        self.nodes[id.0].value = Some(value.to_string());
        self.events.push_back(DomEvent::Input(id));
    }

    pub fn focus(&mut self, id: NodeId) {
        self.events.push_back(DomEvent::Focus(id));
    }

    /// Replace a node's text (host pages rewrite label text out-of-band).
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id.0].text = text.to_string();
        self.notify_subtree_change(id);
    }

    /// Drop all children of `id` (subtree replacement by the host page).
    pub fn remove_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for c in children {
            self.nodes[c.0].parent = None;
        }
        self.notify_subtree_change(id);
    }

    fn notify_subtree_change(&mut self, at: NodeId) {
        if self.observers.is_empty() {
            return;
        }
        let mut hits = Vec::new();
        for obs in &self.observers {
            if self.is_same_or_ancestor(obs.root, at) {
                hits.push(obs.id);
            }
        }
        for id in hits {
            self.events.push_back(DomEvent::Mutated(id));
        }
    }

    fn is_same_or_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cur = Some(of);
        while let Some(n) = cur {
            if n == candidate {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    // ----- change subscription

    pub fn observe(&mut self, root: NodeId) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer { id, root });
        id
    }

    /// Tear down a subscription. Pending events for it are dropped too, so a
    /// disconnected observer can never fire after the fact.
    pub fn disconnect(&mut self, id: ObserverId) {
        self.observers.retain(|o| o.id != id);
        self.events.retain(|e| !matches!(e, DomEvent::Mutated(i) if *i == id));
    }

    pub fn take_events(&mut self) -> Vec<DomEvent> {
        self.events.drain(..).collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let row = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, row);
        let input = doc.create_element("input");
        doc.set_attr(input, "name", "price");
        doc.append_child(row, input);
        doc.take_events();
        (doc, row, input)
    }

    #[test]
    fn value_falls_back_to_attribute() {
        let (mut doc, _, input) = tiny();
        assert_eq!(doc.value(input), "");
        doc.set_attr(input, "value", "5");
        assert_eq!(doc.value(input), "5");
        doc.set_value(input, "7");
        assert_eq!(doc.value(input), "7");
    }

    #[test]
    fn observer_sees_subtree_changes_only() {
        let (mut doc, row, _) = tiny();
        let outside = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, outside);
        doc.take_events();

        let obs = doc.observe(row);
        let t = doc.create_text("x");
        doc.append_child(row, t);
        let t2 = doc.create_text("y");
        doc.append_child(outside, t2);

        let evs = doc.take_events();
        assert_eq!(evs, vec![DomEvent::Mutated(obs)]);
    }

    #[test]
    fn disconnect_drops_pending_events() {
        let (mut doc, row, _) = tiny();
        let obs = doc.observe(row);
        let t = doc.create_text("x");
        doc.append_child(row, t);
        doc.disconnect(obs);
        assert!(doc.take_events().is_empty());
    }

    #[test]
    fn effective_color_inherits() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        doc.set_attr(outer, "style", "color: rgb(200, 40, 40)");
        let root = doc.root();
        doc.append_child(root, outer);
        let inner = doc.create_element("span");
        doc.append_child(outer, inner);
        assert_eq!(doc.effective_color(inner), Some((200, 40, 40)));
    }
}

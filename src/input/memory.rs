//! An in-memory `Document`, used by the CLI and by tests.
//!
//! Documents are usually described as RON, for example:
//!
//! ```text
//! (
//!     url: Some("https://example.com/"),
//!     root: (
//!         tag: "body",
//!         rect: Some((x: 0.0, y: 0.0, width: 800.0, height: 600.0)),
//!         children: [
//!             Element((tag: "p", children: [Text("hello")])),
//!         ],
//!     ),
//! )
//! ```

use std::collections::BTreeMap;

use crate::common::validation::Issue;
use crate::input::document::{Document, Mutation, NodeId};
use crate::input::geometry::Rect;

/// A serializable description of a node and its subtree.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum NodeSpec {
    Element(ElementSpec),
    Text(String),
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// A whole document as stored on disk: the page it came from and its tree.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct DocumentSpec {
    #[serde(default)]
    pub url: Option<String>,
    pub root: ElementSpec,
}

#[derive(Clone, Debug)]
enum NodeKind {
    Element(String),
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    rect: Option<Rect>,
}

/// Arena-backed document tree. Nodes are never freed; removing a node only
/// detaches it.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    observing: bool,
    records: Vec<Mutation>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> ElementSpec {
        ElementSpec {
            tag: String::from(tag),
            classes: vec![],
            rect: None,
            children: vec![],
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> ElementSpec {
        self.rect = Some(rect);
        self
    }

    pub fn with_class(mut self, class: &str) -> ElementSpec {
        self.classes.push(String::from(class));
        self
    }

    pub fn child(mut self, child: NodeSpec) -> ElementSpec {
        self.children.push(child);
        self
    }

    pub fn text(self, text: &str) -> ElementSpec {
        self.child(NodeSpec::Text(String::from(text)))
    }
}

impl From<ElementSpec> for NodeSpec {
    fn from(spec: ElementSpec) -> NodeSpec {
        NodeSpec::Element(spec)
    }
}

impl MemoryDocument {
    /// Builds a document whose root is described by `root`.
    pub fn from_spec(root: &ElementSpec) -> MemoryDocument {
        let mut document = MemoryDocument {
            nodes: Vec::new(),
            root: NodeId(0),
            observing: false,
            records: Vec::new(),
        };
        document.root = document.build(&NodeSpec::Element(root.clone()));
        document
    }

    fn allocate(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: kind,
            parent: None,
            children: vec![],
            classes: vec![],
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            rect: None,
        });
        id
    }

    /// Creates the nodes for `spec` without attaching or recording them.
    fn build(&mut self, spec: &NodeSpec) -> NodeId {
        match spec {
            NodeSpec::Text(text) => self.allocate(NodeKind::Text(text.clone())),
            NodeSpec::Element(element) => {
                let id = self.allocate(NodeKind::Element(element.tag.to_lowercase()));
                let mut children = Vec::new();
                for child in &element.children {
                    let child_id = self.build(child);
                    self.nodes[child_id.0].parent = Some(id);
                    children.push(child_id);
                }
                let data = &mut self.nodes[id.0];
                data.children = children;
                data.rect = element.rect;
                for class in &element.classes {
                    if !data.classes.contains(class) {
                        data.classes.push(class.clone());
                    }
                }
                id
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0)
    }

    fn record(&mut self, mutation: Mutation) {
        if self.observing {
            self.records.push(mutation);
        }
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node)?.parent?;
        if let Some(data) = self.node_mut(parent) {
            data.children.retain(|child| *child != node);
        }
        if let Some(data) = self.node_mut(node) {
            data.parent = None;
        }
        Some(parent)
    }

    /// Builds `spec` and appends it to `parent`, as a page script would.
    pub fn append(&mut self, parent: NodeId, spec: &NodeSpec) -> Result<NodeId, Issue> {
        let id = self.build(spec);
        self.insert_before(parent, id, None)?;
        Ok(id)
    }

    /// Replaces the content of a text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), Issue> {
        match self.node_mut(node) {
            Some(NodeData {
                kind: NodeKind::Text(content),
                ..
            }) => {
                *content = String::from(text);
            }
            _ => {
                return Err(Issue::Error(format!(
                    "node {} is not a text node",
                    node.0
                )))
            }
        }
        self.record(Mutation::CharacterData { target: node });
        Ok(())
    }

    /// Changes the layout box of a node. Layout is not a mutation and is
    /// never recorded.
    pub fn set_rect(&mut self, node: NodeId, rect: Option<Rect>) {
        if let Some(data) = self.node_mut(node) {
            data.rect = rect;
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node)?.style.get(property).cloned()
    }

    /// Every class of `node`, in insertion order.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        match self.node(node) {
            Some(data) => data.classes.clone(),
            None => vec![],
        }
    }

    /// Attributes of `node`, sorted by name.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match self.node(node) {
            Some(data) => data
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            None => vec![],
        }
    }

    /// Inline style of `node` as a `style` attribute value.
    pub fn style_text(&self, node: NodeId) -> Option<String> {
        let data = self.node(node)?;
        if data.style.is_empty() {
            return None;
        }
        let declarations: Vec<String> = data
            .style
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect();
        Some(declarations.join("; "))
    }

    /// Every attached text node, in document order.
    pub fn text_nodes(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if self.text(node).is_some() {
                found.push(node);
            }
            for child in self.children(node).into_iter().rev() {
                stack.push(child);
            }
        }
        found
    }

    /// The first attached text node whose content contains `needle`.
    pub fn find_text(&self, needle: &str) -> Option<NodeId> {
        self.text_nodes().into_iter().find(|node| match self.text(*node) {
            Some(text) => text.contains(needle),
            None => false,
        })
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        match self.node(node) {
            Some(data) => data.children.clone(),
            None => vec![],
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.node(node)?.kind {
            NodeKind::Element(tag) => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match &self.node(node)?.kind {
            NodeKind::Text(text) => Some(text.clone()),
            NodeKind::Element(_) => None,
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.node(node)?.rect
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        match self.node(node) {
            Some(data) => data.classes.iter().any(|existing| existing == class),
            None => false,
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        if let Some(data) = self.node_mut(node) {
            data.classes.push(String::from(class));
            self.record(Mutation::Attributes { target: node });
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        if let Some(data) = self.node_mut(node) {
            data.classes.retain(|existing| existing != class);
            self.record(Mutation::Attributes { target: node });
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)?.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if self.attribute(node, name).as_ref().map(String::as_str) == Some(value) {
            return;
        }
        if let Some(data) = self.node_mut(node) {
            data.attributes
                .insert(String::from(name), String::from(value));
            self.record(Mutation::Attributes { target: node });
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.node_mut(node) {
            data.style.insert(String::from(property), String::from(value));
            self.record(Mutation::Attributes { target: node });
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(NodeKind::Element(tag.to_lowercase()))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.allocate(NodeKind::Text(String::from(text)))
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), Issue> {
        if !self.is_element(parent) {
            return Err(Issue::Error(format!(
                "cannot insert into node {}, which is not an element",
                parent.0
            )));
        }
        if self.node(child).is_none() {
            return Err(Issue::Error(format!("node {} does not exist", child.0)));
        }
        if self.ancestry(parent).contains(&child) {
            return Err(Issue::Error(format!(
                "cannot insert node {} into its own subtree",
                child.0
            )));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) || reference == child {
                return Err(Issue::Error(format!(
                    "node {} is not a child of node {}",
                    reference.0, parent.0
                )));
            }
        }

        if let Some(previous_parent) = self.detach(child) {
            self.record(Mutation::ChildList {
                target: previous_parent,
                added: vec![],
                removed: vec![child],
            });
        }

        let data = &mut self.nodes[parent.0];
        let index = match reference {
            Some(reference) => data
                .children
                .iter()
                .position(|existing| *existing == reference)
                .unwrap_or(data.children.len()),
            None => data.children.len(),
        };
        data.children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.record(Mutation::ChildList {
            target: parent,
            added: vec![child],
            removed: vec![],
        });
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), Issue> {
        match self.detach(node) {
            Some(parent) => {
                self.record(Mutation::ChildList {
                    target: parent,
                    added: vec![],
                    removed: vec![node],
                });
                Ok(())
            }
            None => Err(Issue::Warning(format!("node {} is not attached", node.0))),
        }
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            if self.has_class(node, class) {
                found.push(node);
            }
            for child in self.children(node).into_iter().rev() {
                stack.push(child);
            }
        }
        found
    }

    fn observe(&mut self) {
        self.observing = true;
    }

    fn disconnect(&mut self) {
        self.observing = false;
        self.records.clear();
    }

    fn is_observed(&self) -> bool {
        self.observing
    }

    fn take_records(&mut self) -> Vec<Mutation> {
        std::mem::replace(&mut self.records, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryDocument {
        MemoryDocument::from_spec(
            &ElementSpec::new("body")
                .child(ElementSpec::new("p").text("first").into())
                .child(ElementSpec::new("p").text("second").into()),
        )
    }

    #[test]
    fn test_deserialization() {
        let spec: DocumentSpec = ron::de::from_str(
            "(url:Some(\"https://example.com/\"),root:(tag:\"BODY\",rect:Some((x:0.0,y:0.0,width:800.0,height:600.0)),children:[Element((tag:\"p\",classes:[\"lead\"],children:[Text(\"hello\")]))]))",
        )
        .unwrap();
        assert_eq!(spec.url, Some(String::from("https://example.com/")));
        let document = MemoryDocument::from_spec(&spec.root);
        let root = document.root();
        assert_eq!(document.tag_name(root), Some(String::from("body")));
        assert_eq!(document.bounding_rect(root).unwrap().width, 800.0);
        let paragraph = document.first_child(root).unwrap();
        assert!(document.has_class(paragraph, "lead"));
        let text = document.first_child(paragraph).unwrap();
        assert_eq!(document.text(text), Some(String::from("hello")));
        assert_eq!(document.parent_element(text), Some(paragraph));
    }

    #[test]
    fn test_navigation() {
        let document = sample();
        let root = document.root();
        let children = document.children(root);
        assert_eq!(children.len(), 2);
        assert_eq!(document.previous_sibling(children[1]), Some(children[0]));
        assert_eq!(document.next_sibling(children[0]), Some(children[1]));
        assert_eq!(document.previous_sibling(children[0]), None);
        assert_eq!(document.previous_sibling(root), None);
        let text = document.find_text("second").unwrap();
        assert_eq!(document.ancestry(text), vec![text, children[1], root]);
        assert!(document.is_attached(text));
    }

    #[test]
    fn test_records_only_while_observing() {
        let mut document = sample();
        let root = document.root();
        document.add_class(root, "quiet");
        assert!(document.take_records().is_empty());

        document.observe();
        document.add_class(root, "loud");
        document.add_class(root, "loud");
        let text = document.find_text("first").unwrap();
        document.set_text(text, "changed").unwrap();
        assert_eq!(
            document.take_records(),
            vec![
                Mutation::Attributes { target: root },
                Mutation::CharacterData { target: text },
            ]
        );
        assert!(document.take_records().is_empty());

        document.add_class(root, "dropped");
        document.disconnect();
        assert!(document.take_records().is_empty());
    }

    #[test]
    fn test_insert_and_move() {
        let mut document = sample();
        let root = document.root();
        let paragraphs = document.children(root);
        document.observe();
        let appended = document
            .append(root, &NodeSpec::Element(ElementSpec::new("div").text("new")))
            .unwrap();
        assert_eq!(document.children(root).last(), Some(&appended));
        assert_eq!(
            document.take_records(),
            vec![Mutation::ChildList {
                target: root,
                added: vec![appended],
                removed: vec![],
            }]
        );

        document
            .insert_before(root, appended, Some(paragraphs[0]))
            .unwrap();
        assert_eq!(document.children(root)[0], appended);
        assert_eq!(document.take_records().len(), 2);
    }

    #[test]
    fn test_invalid_insertions() {
        let mut document = sample();
        let root = document.root();
        let paragraph = document.first_child(root).unwrap();
        let text = document.first_child(paragraph).unwrap();
        let orphan = document.create_element("span");
        assert!(document.insert_before(text, orphan, None).is_err());
        assert!(document.insert_before(paragraph, root, None).is_err());
        assert!(document.insert_before(root, orphan, Some(text)).is_err());
        assert!(document.remove(orphan).is_err());
        assert!(!document.is_attached(orphan));
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut document = sample();
        let root = document.root();
        let paragraph = document.first_child(root).unwrap();
        document.add_class(paragraph, "marked");
        document.remove(paragraph).unwrap();
        assert_eq!(document.children(root).len(), 1);
        assert!(document.elements_with_class("marked").is_empty());
        assert!(document.find_text("first").is_none());
    }
}

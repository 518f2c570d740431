//! This document provides the capability through which the scanner sees and
//! edits a live document tree.
//!
//! The scanner never talks to a concrete DOM. Everything it needs (walking
//! the tree, reading geometry, toggling classes, inserting notices, and
//! listening for changes) goes through the `Document` trait, so the whole
//! pipeline runs just as well against `MemoryDocument` as against a
//! browser binding.

use crate::common::validation::Issue;
use crate::input::geometry::Rect;

/// Identifies a node within one `Document`. Ids are never reused while the
/// document lives, so a detached node keeps its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A single change observed in the document. Records arrive in batches, in
/// the order the changes happened.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// A class, attribute or style of `target` changed.
    Attributes { target: NodeId },
    /// Children were inserted into or removed from `target`.
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// The text content of the text node `target` changed.
    CharacterData { target: NodeId },
}

/// A live, mutable document tree.
///
/// Only the required methods touch storage; the provided ones are derived
/// from them.
pub trait Document {
    /// The outermost node of the document.
    fn root(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in document order. Empty for text nodes.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// The lowercase tag name of an element, `None` for a text node.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// The content of a text node, `None` for an element.
    fn text(&self, node: NodeId) -> Option<String>;

    /// The rendered box of a node, `None` when it has no layout.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Sets one inline style property, e.g. `max-width`.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;
    /// Creates a detached text node.
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Inserts `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A child that is already attached elsewhere is
    /// moved.
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), Issue>;

    /// Detaches `node` (and its subtree) from its parent.
    fn remove(&mut self, node: NodeId) -> Result<(), Issue>;

    /// All attached elements carrying `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<NodeId>;

    /// Starts recording mutations for `take_records`.
    fn observe(&mut self);
    /// Stops recording mutations and drops any records not yet taken.
    fn disconnect(&mut self);
    fn is_observed(&self) -> bool;
    /// Drains the records accumulated since the last call.
    fn take_records(&mut self) -> Vec<Mutation>;

    fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    /// The nearest ancestor that is an element.
    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(candidate) = current {
            if self.is_element(candidate) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().cloned()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|sibling| *sibling == node)?;
        if index == 0 {
            None
        } else {
            siblings.get(index - 1).cloned()
        }
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|sibling| *sibling == node)?;
        siblings.get(index + 1).cloned()
    }

    /// `node` followed by every ancestor up to the root, innermost first.
    fn ancestry(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.parent(ancestor);
        }
        chain
    }

    /// Whether `node` is reachable from the root.
    fn is_attached(&self, node: NodeId) -> bool {
        match self.ancestry(node).last() {
            Some(top) => *top == self.root(),
            None => false,
        }
    }
}

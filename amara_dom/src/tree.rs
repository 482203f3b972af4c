// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage: generational slots, parent/child links, tags and attributes.

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::types::NodeId;

#[derive(Clone, Debug)]
pub(crate) struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tag: String,
    attributes: SmallVec<[(String, String); 4]>,
}

impl Node {
    fn new(generation: u32, tag: String) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            tag,
            attributes: SmallVec::new(),
        }
    }
}

/// Arena of element nodes.
///
/// Owned by a [`Document`](crate::Document); exposed read-only to
/// [`SelectorMatch`](crate::SelectorMatch) implementations.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, tag: &str) -> NodeId {
        let tag = tag.trim().to_ascii_lowercase();
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, tag));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, tag)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Detach `child` from its current parent (if any) and append it to `parent`.
    ///
    /// Returns `false` if either id is stale or if the move would create a cycle.
    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_alive(parent) || !self.is_alive(child) || parent == child {
            return false;
        }
        if self.ancestors(parent).any(|a| a == child) {
            return false;
        }
        if let Some(old) = self.node(child).parent {
            self.node_mut(old).children.retain(|c| *c != child);
        }
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        true
    }

    /// Unlink `id` from its parent, keeping it (and its subtree) alive.
    pub(crate) fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent_of(id) else {
            return false;
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
        true
    }

    /// Remove a node and its subtree, returning every removed id (pre-order).
    pub(crate) fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut removed = Vec::new();
        if !self.is_alive(id) {
            return removed;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
        self.remove_subtree(id, &mut removed);
        removed
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        removed.push(id);
        for child in children {
            self.remove_subtree(child, removed);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| &n.children[..]).unwrap_or(&[])
    }

    /// Lower-cased tag name of a live node.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|n| n.tag.as_str())
    }

    /// Attribute value of a live node. Names compare ASCII case-insensitively.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node_opt(id)?
            .attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate the strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cur = self.parent_of(id);
        core::iter::from_fn(move || {
            let next = cur?;
            cur = self.parent_of(next);
            Some(next)
        })
    }

    pub(crate) fn write_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(node) = self.node_opt_mut(id) else {
            return false;
        };
        let name = name.to_ascii_lowercase();
        if let Some(slot) = node.attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = String::from(value);
        } else {
            node.attributes.push((name, String::from(value)));
        }
        true
    }

    pub(crate) fn erase_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(node) = self.node_opt_mut(id) else {
            return false;
        };
        let before = node.attributes.len();
        node.attributes.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        node.attributes.len() != before
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()]
            .as_ref()
            .expect("dangling NodeId passed to Tree::node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()]
            .as_mut()
            .expect("dangling NodeId passed to Tree::node_mut")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}

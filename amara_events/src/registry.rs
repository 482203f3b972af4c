// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-target binding registry.
//!
//! One entry per registered target: event type → native listener ids in
//! attachment order. The listeners own their bindings; the registry only
//! tracks which ones to detach when a target is re-applied or removed.

use alloc::string::String;
use alloc::vec::Vec;

use amara_dom::{ListenerId, NodeId};
use hashbrown::HashMap;

type ByType = HashMap<String, Vec<ListenerId>>;

#[derive(Debug, Default)]
pub(crate) struct TargetRegistry {
    targets: HashMap<NodeId, ByType>,
}

impl TargetRegistry {
    pub(crate) fn contains(&self, target: NodeId) -> bool {
        self.targets.contains_key(&target)
    }

    /// Start a fresh binding set for `target`.
    ///
    /// Returns whether the entry was created by this call, and the listeners
    /// of the bindings it replaces.
    pub(crate) fn open(&mut self, target: NodeId) -> (bool, Vec<ListenerId>) {
        match self.targets.get_mut(&target) {
            Some(by_type) => (false, drain_listeners(by_type)),
            None => {
                self.targets.insert(target, HashMap::new());
                (true, Vec::new())
            }
        }
    }

    /// Record the listener of a binding attached to `target`.
    pub(crate) fn push(&mut self, target: NodeId, event_type: &str, listener: ListenerId) {
        self.targets
            .entry(target)
            .or_default()
            .entry(String::from(event_type))
            .or_default()
            .push(listener);
    }

    /// Delete `target`'s entry, returning its listeners, or `None` if it had none.
    pub(crate) fn close(&mut self, target: NodeId) -> Option<Vec<ListenerId>> {
        self.targets
            .remove(&target)
            .map(|mut by_type| drain_listeners(&mut by_type))
    }

    pub(crate) fn listeners(&self, target: NodeId, event_type: &str) -> &[ListenerId] {
        self.targets
            .get(&target)
            .and_then(|by_type| by_type.get(event_type))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, target: NodeId, event_type: &str) -> usize {
        self.listeners(target, event_type).len()
    }

    /// Event types bound on `target`, sorted.
    pub(crate) fn event_types(&self, target: NodeId) -> Vec<String> {
        let mut types: Vec<String> = self
            .targets
            .get(&target)
            .map(|by_type| {
                by_type
                    .iter()
                    .filter(|(_, list)| !list.is_empty())
                    .map(|(kind, _)| kind.clone())
                    .collect()
            })
            .unwrap_or_default();
        types.sort_unstable();
        types
    }

    /// Registered targets, in arena order.
    pub(crate) fn targets(&self) -> Vec<NodeId> {
        let mut targets: Vec<NodeId> = self.targets.keys().copied().collect();
        targets.sort_unstable();
        targets
    }

    pub(crate) fn len(&self) -> usize {
        self.targets.len()
    }
}

fn drain_listeners(by_type: &mut ByType) -> Vec<ListenerId> {
    let mut listeners: Vec<ListenerId> = by_type.drain().flat_map(|(_, list)| list).collect();
    // hash order is arbitrary; detach in attachment order
    listeners.sort_unstable();
    listeners
}

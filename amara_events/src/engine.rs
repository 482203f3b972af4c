// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target orchestrator: turns host actions into bindings and lifecycle events.
//!
//! | Host action | Effect |
//! |---|---|
//! | `core:bootstrap` | Records the root used to proxy bubbled actions. Last write wins. |
//! | `core:apply-target-results` | Per target: validate every key, detach the old bindings, attach the new ones in map then key order, fire `amara:add` for new targets, then `amara:apply`. |
//! | `engine:targets-removed` | Per registered target: fire `amara:remove`, then drop the entry and detach its listeners. Unknown targets are ignored. |
//!
//! The engine never holds an interior borrow while handlers run, so handlers
//! and the host callback may call back into it.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use amara_dom::{ListenerId, NodeId};
use tracing::{debug, trace, warn};

use crate::action::{Action, ActionDocument, HostAction, TargetEvents};
use crate::binding::HandlerBinding;
use crate::bridge::BridgeShared;
use crate::error::EventsError;
use crate::event_spec::EventSpec;
use crate::lifecycle::{self, Lifecycle};
use crate::map::EventMap;
use crate::registry::TargetRegistry;

/// Binds event maps to document nodes on behalf of a host.
pub struct Engine<P> {
    bridge: Rc<BridgeShared<P>>,
    registry: RefCell<TargetRegistry>,
}

impl<P> core::fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.bridge.root.get())
            .field("targets", &self.registry.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<P: 'static> Engine<P> {
    /// Create an engine over `document`. `host` receives actions that bubble to the root.
    pub fn new(document: ActionDocument<P>, host: impl Fn(Rc<Action<P>>) + 'static) -> Self {
        Self {
            bridge: Rc::new(BridgeShared::new(document, Rc::new(host))),
            registry: RefCell::new(TargetRegistry::default()),
        }
    }

    /// The document bindings are attached to.
    pub fn document(&self) -> &ActionDocument<P> {
        &self.bridge.document
    }

    /// Route a host action.
    pub fn handle(&self, action: &HostAction<P>) -> Result<(), EventsError> {
        match action {
            HostAction::Bootstrap { target } => self.bootstrap(*target),
            HostAction::ApplyTargetResults { events } => self.apply_target_results(events)?,
            HostAction::TargetsRemoved(targets) => self.targets_removed(targets),
            HostAction::Other(kind) => trace!(kind = %kind, "passing over host action"),
        }
        Ok(())
    }

    /// Record the root node at which bubbled actions are handed to the host.
    pub fn bootstrap(&self, root: NodeId) {
        if let Some(previous) = self.bridge.root.replace(Some(root)) {
            debug!(node = %root, previous = %previous, "replaced root");
        } else {
            debug!(node = %root, "bootstrapped root");
        }
    }

    /// Apply every `(target, maps)` pair in order, stopping at the first error.
    pub fn apply_target_results(&self, events: &[TargetEvents<P>]) -> Result<(), EventsError> {
        for entry in events {
            self.apply_events_to_target(entry.target, &entry.maps)?;
        }
        debug!(targets = events.len(), "applied target results");
        Ok(())
    }

    /// Replace every binding on `target` with the entries of `maps`.
    ///
    /// All keys are validated first; on error nothing about the target
    /// changes and no lifecycle event fires.
    pub fn apply_events_to_target(
        &self,
        target: NodeId,
        maps: &[Rc<EventMap<P>>],
    ) -> Result<(), EventsError> {
        let mut pending = Vec::new();
        for map in maps {
            for (key, handler) in map.entries() {
                let spec = EventSpec::parse(key);
                if let Err(err) = spec.validate() {
                    warn!(node = %target, error = %err, "rejected event maps");
                    return Err(err);
                }
                pending.push(HandlerBinding::new(target, spec, handler.clone(), map.clone()));
            }
        }

        let (created, stale) = self.registry.borrow_mut().open(target);
        for listener in stale {
            self.bridge.document.remove_event_listener(listener);
        }

        let count = pending.len();
        for binding in pending {
            let binding = Rc::new(binding);
            let listener = self.attach(target, &binding);
            trace!(node = %target, key = binding.key(), "attached binding");
            self.registry
                .borrow_mut()
                .push(target, binding.event_type(), listener);
        }
        debug!(node = %target, created, bindings = count, "applied event maps");

        if created {
            lifecycle::fire(&self.bridge, target, Lifecycle::Add);
        }
        lifecycle::fire(&self.bridge, target, Lifecycle::Apply);
        Ok(())
    }

    /// Tear down each registered target in `targets`, firing `amara:remove` first.
    ///
    /// The host must report a node before it removes it from the document:
    /// events are not delivered to removed nodes.
    pub fn targets_removed(&self, targets: &[NodeId]) {
        for &target in targets {
            if !self.registry.borrow().contains(target) {
                trace!(node = %target, "removed node was never bound");
                continue;
            }
            lifecycle::fire(&self.bridge, target, Lifecycle::Remove);

            let listeners = self.registry.borrow_mut().close(target);
            let Some(listeners) = listeners else {
                continue;
            };
            let count = listeners.len();
            for listener in listeners {
                self.bridge.document.remove_event_listener(listener);
            }
            debug!(node = %target, listeners = count, "tore down target");
        }
    }

    fn attach(&self, target: NodeId, binding: &Rc<HandlerBinding<P>>) -> ListenerId {
        let bridge = Rc::downgrade(&self.bridge);
        let run = binding.clone();
        self.bridge
            .document
            .add_event_listener(target, binding.event_type(), move |event| {
                if let Some(bridge) = bridge.upgrade() {
                    run.invoke(&bridge, event);
                }
            })
    }

    // --- introspection ---

    /// The bootstrapped root, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.bridge.root.get()
    }

    /// Returns true if `target` has a registry entry.
    pub fn is_registered(&self, target: NodeId) -> bool {
        self.registry.borrow().contains(target)
    }

    /// Number of bindings for `event_type` (lower-case) on `target`.
    pub fn binding_count(&self, target: NodeId, event_type: &str) -> usize {
        self.registry.borrow().count(target, event_type)
    }

    /// Event types with at least one binding on `target`, sorted.
    pub fn event_types(&self, target: NodeId) -> Vec<String> {
        self.registry.borrow().event_types(target)
    }

    /// Every registered target.
    pub fn registered_targets(&self) -> Vec<NodeId> {
        self.registry.borrow().targets()
    }
}

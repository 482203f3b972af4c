// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch bridge: fire actions as events, proxy them to the host at the root.
//!
//! ## Synchronous dispatch
//!
//! Every handler invocation opens a [`SyncScope`]. The [`Dispatcher`] handed
//! to the handler shares the scope's liveness cell, so a dispatcher that
//! escapes the handler (stored and called later) fails with
//! [`EventsError::SynchronousDispatchRequired`] instead of re-entering the
//! document out of order.
//!
//! ## Disabled targets
//!
//! Some engines refuse to deliver events to nodes carrying `disabled`. For the
//! duration of a dispatch the attribute is lifted and the node's attribute
//! hook is replaced with one that records `disabled` changes instead of
//! applying them. When the scope ends the previous hook is restored and the
//! recorded state (or the original value, if nothing was recorded) is
//! applied once.
//!
//! ## Root proxy
//!
//! Once a root is bootstrapped, each non-lifecycle dispatch temporarily
//! listens on the root for its own action. If the action reaches the root
//! uncanceled it is handed to the host.

use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};

use amara_dom::{
    AttributeHook, AttributeMutation, EventFlags, Interception, ListenerId, NodeId,
};
use tracing::trace;

use crate::action::{Action, ActionDocument, ActionEvent};
use crate::error::EventsError;

/// Host-facing action sink.
pub(crate) type HostDispatch<P> = Rc<dyn Fn(Rc<Action<P>>)>;

/// Flags for an action dispatched as an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Bubble to ancestors after the target.
    pub bubbles: bool,
    /// Allow handlers to cancel the event.
    pub cancelable: bool,
    /// Cross shadow boundaries. Recorded on the event; the document has no shadow trees.
    pub composed: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            composed: true,
        }
    }
}

impl DispatchOptions {
    /// Bubbling, cancelable, composed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used for `amara:*` lifecycle events: delivered to the target only.
    pub fn lifecycle() -> Self {
        Self {
            bubbles: false,
            cancelable: true,
            composed: false,
        }
    }

    /// Set [`DispatchOptions::bubbles`].
    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Set [`DispatchOptions::cancelable`].
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Set [`DispatchOptions::composed`].
    pub fn with_composed(mut self, composed: bool) -> Self {
        self.composed = composed;
        self
    }

    /// Event flags for these options.
    pub fn flags(&self) -> EventFlags {
        let mut flags = EventFlags::empty();
        flags.set(EventFlags::BUBBLES, self.bubbles);
        flags.set(EventFlags::CANCELABLE, self.cancelable);
        flags.set(EventFlags::COMPOSED, self.composed);
        flags
    }
}

/// State shared by the engine and every dispatcher it hands out.
pub(crate) struct BridgeShared<P> {
    pub(crate) document: ActionDocument<P>,
    pub(crate) root: Cell<Option<NodeId>>,
    host: HostDispatch<P>,
}

impl<P: 'static> BridgeShared<P> {
    pub(crate) fn new(document: ActionDocument<P>, host: HostDispatch<P>) -> Self {
        Self {
            document,
            root: Cell::new(None),
            host,
        }
    }

    /// Fire `kind` at `target`, carrying `action` as detail. Returns "not canceled".
    pub(crate) fn fire(
        &self,
        target: NodeId,
        kind: &str,
        action: Option<Rc<Action<P>>>,
        options: DispatchOptions,
    ) -> bool {
        let mut event = ActionEvent::new(kind).with_flags(options.flags());
        let proxied = match action {
            Some(action) => {
                event = event.with_detail(action.clone());
                Some(action).filter(|a| !a.is_lifecycle())
            }
            None => None,
        };

        // Declaration order matters: the disabled scope must unwind before the proxy.
        let _proxy = proxied.and_then(|action| RootProxy::install(self, action));
        let _disabled = DisabledScope::acquire(&self.document, target);
        self.document.dispatch_event(target, &mut event)
    }
}

/// Liveness of one handler invocation.
#[derive(Debug)]
pub(crate) struct SyncScope {
    live: Rc<Cell<bool>>,
}

impl SyncScope {
    pub(crate) fn enter() -> Self {
        Self {
            live: Rc::new(Cell::new(true)),
        }
    }

    pub(crate) fn token(&self) -> Rc<Cell<bool>> {
        self.live.clone()
    }
}

impl Drop for SyncScope {
    fn drop(&mut self) {
        self.live.set(false);
    }
}

/// Re-dispatches actions as events at one target, from inside a handler.
///
/// Obtained from [`EventCx::dispatcher`](crate::EventCx::dispatcher). Valid
/// only while the handler that received it is running.
///
/// The gate is per invocation, not process-wide: a dispatcher kept from one
/// handler is rejected even when called synchronously from a later handler.
/// That handler should use its own [`EventCx::dispatch`](crate::EventCx::dispatch).
pub struct Dispatcher<P> {
    bridge: Weak<BridgeShared<P>>,
    target: NodeId,
    live: Rc<Cell<bool>>,
}

impl<P> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            bridge: self.bridge.clone(),
            target: self.target,
            live: self.live.clone(),
        }
    }
}

impl<P> core::fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("target", &self.target)
            .field("live", &self.live.get())
            .finish_non_exhaustive()
    }
}

impl<P: 'static> Dispatcher<P> {
    pub(crate) fn new(bridge: Weak<BridgeShared<P>>, target: NodeId, live: Rc<Cell<bool>>) -> Self {
        Self {
            bridge,
            target,
            live,
        }
    }

    /// Node actions are dispatched at: the node the handler is bound to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Returns true while the originating handler is still running.
    pub fn is_live(&self) -> bool {
        self.live.get() && self.bridge.strong_count() > 0
    }

    /// Dispatch `action` with default options.
    pub fn dispatch(&self, action: Action<P>) -> Result<bool, EventsError> {
        self.dispatch_with(action, DispatchOptions::default())
    }

    /// Dispatch `action` as an event named `action.kind` at [`Dispatcher::target`].
    ///
    /// Returns whether the event was not canceled.
    pub fn dispatch_with(
        &self,
        action: Action<P>,
        options: DispatchOptions,
    ) -> Result<bool, EventsError> {
        if !self.live.get() {
            return Err(EventsError::SynchronousDispatchRequired);
        }
        let bridge = self
            .bridge
            .upgrade()
            .ok_or(EventsError::SynchronousDispatchRequired)?;
        let kind = action.kind.clone();
        trace!(node = %self.target, kind = %kind, "dispatching action");
        Ok(bridge.fire(self.target, &kind, Some(Rc::new(action)), options))
    }
}

/// Temporary root listener that forwards one action to the host.
struct RootProxy<'a, P: 'static> {
    document: &'a ActionDocument<P>,
    listener: ListenerId,
}

impl<'a, P: 'static> RootProxy<'a, P> {
    fn install(bridge: &'a BridgeShared<P>, action: Rc<Action<P>>) -> Option<Self> {
        let root = bridge.root.get()?;
        let host = bridge.host.clone();
        let kind = action.kind.clone();
        let listener = bridge.document.add_event_listener(root, &kind, move |event| {
            let ours = event.detail().is_some_and(|d| Rc::ptr_eq(d, &action));
            if !ours || event.default_prevented() {
                return;
            }
            trace!(kind = %action.kind, "proxying action to host");
            host(action.clone());
        });
        Some(Self {
            document: &bridge.document,
            listener,
        })
    }
}

impl<P: 'static> Drop for RootProxy<'_, P> {
    fn drop(&mut self) {
        self.document.remove_event_listener(self.listener);
    }
}

/// Recorded `disabled` changes: `None` until a handler touches the attribute.
type Recorded = Rc<RefCell<Option<Option<String>>>>;

/// Lifts `disabled` off a target for the duration of one dispatch.
struct DisabledScope<'a, P: 'static> {
    document: &'a ActionDocument<P>,
    target: NodeId,
    original: String,
    previous: Option<AttributeHook>,
    recorded: Recorded,
}

impl<'a, P: 'static> DisabledScope<'a, P> {
    fn acquire(document: &'a ActionDocument<P>, target: NodeId) -> Option<Self> {
        let original = document.attribute(target, "disabled")?;
        document.remove_attribute(target, "disabled");

        let previous = document.attribute_hook(target);
        let recorded: Recorded = Rc::default();
        let hook: AttributeHook = {
            let chained = previous.clone();
            let recorded = recorded.clone();
            Rc::new(move |node: NodeId, mutation: AttributeMutation<'_>| {
                if !mutation.name().eq_ignore_ascii_case("disabled") {
                    return chained
                        .as_ref()
                        .map_or(Interception::Apply, |hook| hook(node, mutation));
                }
                *recorded.borrow_mut() = match mutation {
                    AttributeMutation::Set { value, .. } => Some(Some(String::from(value))),
                    AttributeMutation::Remove { .. } => Some(None),
                };
                Interception::Intercepted
            })
        };
        document.set_attribute_hook(target, Some(hook));
        trace!(node = %target, "lifted disabled for dispatch");

        Some(Self {
            document,
            target,
            original,
            previous,
            recorded,
        })
    }
}

impl<P: 'static> Drop for DisabledScope<'_, P> {
    fn drop(&mut self) {
        self.document.set_attribute_hook(self.target, self.previous.take());
        let state = self.recorded.borrow_mut().take();
        match state {
            None => {
                self.document
                    .set_attribute(self.target, "disabled", &self.original);
            }
            Some(Some(value)) => {
                self.document.set_attribute(self.target, "disabled", &value);
            }
            Some(None) => {
                self.document.remove_attribute(self.target, "disabled");
            }
        }
        trace!(node = %self.target, "restored disabled after dispatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use amara_dom::Document;

    type Sent = Rc<RefCell<Vec<(String, u32)>>>;

    fn bridge() -> (Rc<BridgeShared<u32>>, Sent) {
        let sent: Sent = Rc::default();
        let s = sent.clone();
        let host: HostDispatch<u32> = Rc::new(move |a: Rc<Action<u32>>| {
            s.borrow_mut().push((a.kind.clone(), a.payload));
        });
        (Rc::new(BridgeShared::new(Document::new(), host)), sent)
    }

    #[test]
    fn options_map_to_flags() {
        assert_eq!(DispatchOptions::default().flags(), EventFlags::all());
        let lc = DispatchOptions::lifecycle().flags();
        assert!(!lc.contains(EventFlags::BUBBLES));
        assert!(lc.contains(EventFlags::CANCELABLE));
        assert_eq!(
            DispatchOptions::new().with_bubbles(false).with_composed(false).flags(),
            EventFlags::CANCELABLE
        );
        assert!(DispatchOptions::new().with_cancelable(false).flags().contains(EventFlags::BUBBLES));
    }

    #[test]
    fn disabled_target_still_receives_the_event() {
        let (bridge, _sent) = bridge();
        let doc = bridge.document.clone();
        let button = doc.create_element("button");
        doc.set_attribute(button, "disabled", "yes");
        let hits = Rc::new(Cell::new(0));
        {
            let hits = hits.clone();
            let doc2 = doc.clone();
            doc.add_event_listener(button, "press", move |_e| {
                assert!(!doc2.has_attribute(button, "disabled"));
                hits.set(hits.get() + 1);
            });
        }
        assert!(bridge.fire(button, "press", None, DispatchOptions::default()));
        assert_eq!(hits.get(), 1);
        assert_eq!(doc.attribute(button, "disabled").as_deref(), Some("yes"));
        assert!(doc.attribute_hook(button).is_none());
    }

    #[test]
    fn disabled_changes_mid_dispatch_apply_once_afterwards() {
        let (bridge, _sent) = bridge();
        let doc = bridge.document.clone();
        let button = doc.create_element("button");
        doc.set_attribute(button, "disabled", "");

        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        {
            let seen = seen.clone();
            let hook: AttributeHook = Rc::new(move |_n: NodeId, m: AttributeMutation<'_>| {
                seen.borrow_mut().push(String::from(m.name()));
                Interception::Apply
            });
            doc.set_attribute_hook(button, Some(hook));
        }
        seen.borrow_mut().clear();

        {
            let doc2 = doc.clone();
            doc.add_event_listener(button, "press", move |_e| {
                doc2.remove_attribute(button, "disabled");
                doc2.set_attribute(button, "disabled", "late");
                doc2.set_attribute(button, "title", "busy");
                assert!(!doc2.has_attribute(button, "disabled"));
            });
        }
        bridge.fire(button, "press", None, DispatchOptions::default());

        assert_eq!(doc.attribute(button, "disabled").as_deref(), Some("late"));
        assert_eq!(doc.attribute(button, "title").as_deref(), Some("busy"));
        // lifting, the pass-through, then the single recorded write
        assert_eq!(*seen.borrow(), vec!["disabled", "title", "disabled"]);
        assert!(doc.attribute_hook(button).is_some());
    }

    #[test]
    fn handler_may_enable_the_target_for_good() {
        let (bridge, _sent) = bridge();
        let doc = bridge.document.clone();
        let button = doc.create_element("button");
        doc.set_attribute(button, "disabled", "");
        {
            let doc2 = doc.clone();
            doc.add_event_listener(button, "press", move |_e| {
                doc2.remove_attribute(button, "disabled");
            });
        }
        bridge.fire(button, "press", None, DispatchOptions::default());
        assert!(!doc.has_attribute(button, "disabled"));
    }

    #[test]
    fn root_proxy_forwards_uncanceled_actions_once() {
        let (bridge, sent) = bridge();
        let doc = bridge.document.clone();
        let root = doc.create_element("main");
        let leaf = doc.create_element("button");
        doc.append_child(root, leaf);
        bridge.root.set(Some(root));

        let action = Rc::new(Action::new("todo:add", 1));
        assert!(bridge.fire(leaf, "todo:add", Some(action), DispatchOptions::default()));
        assert_eq!(*sent.borrow(), vec![(String::from("todo:add"), 1)]);
        assert_eq!(doc.listener_count(root, "todo:add"), 0);

        // canceled on the way up
        doc.add_event_listener(leaf, "todo:drop", |e| e.prevent_default());
        let action = Rc::new(Action::new("todo:drop", 2));
        assert!(!bridge.fire(leaf, "todo:drop", Some(action), DispatchOptions::default()));
        assert_eq!(sent.borrow().len(), 1);

        // does not bubble
        let action = Rc::new(Action::new("todo:local", 3));
        bridge.fire(leaf, "todo:local", Some(action), DispatchOptions::new().with_bubbles(false));
        assert_eq!(sent.borrow().len(), 1);
    }

    #[test]
    fn lifecycle_actions_and_missing_root_are_not_proxied() {
        let (bridge, sent) = bridge();
        let doc = bridge.document.clone();
        let root = doc.create_element("main");

        let action = Rc::new(Action::new("todo:add", 1));
        bridge.fire(root, "todo:add", Some(action), DispatchOptions::default());
        assert!(sent.borrow().is_empty());

        bridge.root.set(Some(root));
        let action = Rc::new(Action::new("amara:apply", 1));
        bridge.fire(root, "amara:apply", Some(action), DispatchOptions::default());
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn nested_dispatch_of_the_same_kind_proxies_each_action_once() {
        let (bridge, sent) = bridge();
        let doc = bridge.document.clone();
        let root = doc.create_element("main");
        let leaf = doc.create_element("button");
        doc.append_child(root, leaf);
        bridge.root.set(Some(root));
        {
            let weak = Rc::downgrade(&bridge);
            let nested = Cell::new(false);
            doc.add_event_listener(leaf, "save", move |_e| {
                if nested.replace(true) {
                    return;
                }
                if let Some(b) = weak.upgrade() {
                    let inner = Rc::new(Action::new("save", 1));
                    b.fire(leaf, "save", Some(inner), DispatchOptions::default());
                }
            });
        }
        let outer = Rc::new(Action::new("save", 2));
        bridge.fire(leaf, "save", Some(outer), DispatchOptions::default());
        assert_eq!(*sent.borrow(), vec![(String::from("save"), 1), (String::from("save"), 2)]);
        assert_eq!(doc.listener_count(root, "save"), 0);
    }

    #[test]
    fn panicking_handler_still_restores_disabled_and_root() {
        extern crate std;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let (bridge, sent) = bridge();
        let doc = bridge.document.clone();
        let root = doc.create_element("main");
        let button = doc.create_element("button");
        doc.append_child(root, button);
        doc.set_attribute(button, "disabled", "");
        bridge.root.set(Some(root));
        doc.add_event_listener(button, "boom", |_e| {
            panic!("handler failed");
        });

        let action = Rc::new(Action::new("boom", 7));
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            bridge.fire(button, "boom", Some(action), DispatchOptions::default())
        }));
        assert!(outcome.is_err(), "the handler panic should reach the caller");

        assert_eq!(doc.attribute(button, "disabled").as_deref(), Some(""));
        assert!(doc.attribute_hook(button).is_none());
        assert_eq!(doc.listener_count(root, "boom"), 0);
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn dispatcher_dies_with_its_scope() {
        let (bridge, sent) = bridge();
        let doc = bridge.document.clone();
        let root = doc.create_element("main");
        bridge.root.set(Some(root));

        let scope = SyncScope::enter();
        let dispatcher = Dispatcher::new(Rc::downgrade(&bridge), root, scope.token());
        assert!(dispatcher.is_live());
        assert_eq!(dispatcher.dispatch(Action::new("a:b", 0)), Ok(true));
        drop(scope);
        assert!(!dispatcher.is_live());
        assert_eq!(
            dispatcher.dispatch(Action::new("a:b", 0)),
            Err(EventsError::SynchronousDispatchRequired)
        );
        assert_eq!(sent.borrow().len(), 1);
    }
}

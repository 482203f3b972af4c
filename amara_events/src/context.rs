// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use amara_dom::NodeId;

use crate::action::{Action, ActionEvent};
use crate::bridge::{DispatchOptions, Dispatcher};
use crate::error::EventsError;
use crate::map::EventMap;

/// The event as seen by a handler.
///
/// Wraps the native event together with the map the handler came from and a
/// [`Dispatcher`] bound to the handler's target.
pub struct EventCx<'a, P> {
    event: &'a mut ActionEvent<P>,
    map: &'a EventMap<P>,
    dispatcher: Dispatcher<P>,
}

impl<P> core::fmt::Debug for EventCx<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventCx")
            .field("kind", &self.event.kind())
            .field("target", &self.event.target())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl<'a, P: 'static> EventCx<'a, P> {
    pub(crate) fn new(
        event: &'a mut ActionEvent<P>,
        map: &'a EventMap<P>,
        dispatcher: Dispatcher<P>,
    ) -> Self {
        Self {
            event,
            map,
            dispatcher,
        }
    }

    /// The native event.
    pub fn event(&self) -> &ActionEvent<P> {
        &*self.event
    }

    /// The native event, mutably.
    pub fn event_mut(&mut self) -> &mut ActionEvent<P> {
        &mut *self.event
    }

    /// The map this handler was declared in.
    pub fn map(&self) -> &EventMap<P> {
        self.map
    }

    /// Event type.
    pub fn kind(&self) -> &str {
        self.event.kind()
    }

    /// Node the event was dispatched at.
    pub fn target(&self) -> Option<NodeId> {
        self.event.target()
    }

    /// Node the handler is bound to.
    pub fn current_target(&self) -> NodeId {
        self.dispatcher.target()
    }

    /// The action carried by the event, for events fired through a dispatcher.
    pub fn action(&self) -> Option<&Action<P>> {
        self.event.detail().map(|a| &**a)
    }

    /// Cancel the event's default action, if it is cancelable.
    pub fn prevent_default(&mut self) {
        self.event.prevent_default();
    }

    /// Stop bubbling after the current node.
    pub fn stop_propagation(&mut self) {
        self.event.stop_propagation();
    }

    /// Stop bubbling and skip the remaining listeners on the current node.
    pub fn stop_immediate_propagation(&mut self) {
        self.event.stop_immediate_propagation();
    }

    /// Dispatch `action` at the current target; see [`Dispatcher::dispatch`].
    pub fn dispatch(&self, action: Action<P>) -> Result<bool, EventsError> {
        self.dispatcher.dispatch(action)
    }

    /// Dispatch `action` with explicit options; see [`Dispatcher::dispatch_with`].
    pub fn dispatch_with(
        &self,
        action: Action<P>,
        options: DispatchOptions,
    ) -> Result<bool, EventsError> {
        self.dispatcher.dispatch_with(action, options)
    }

    /// A handle that can dispatch for as long as this handler runs.
    pub fn dispatcher(&self) -> Dispatcher<P> {
        self.dispatcher.clone()
    }
}

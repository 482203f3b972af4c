// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use amara_dom::NodeId;
use tracing::trace;

use crate::action::ActionEvent;
use crate::bridge::{BridgeShared, Dispatcher, SyncScope};
use crate::context::EventCx;
use crate::delegate::Delegation;
use crate::event_spec::EventSpec;
use crate::map::{EventMap, Handler};
use crate::meta::MetaFilter;

/// One attached handler: its parsed key, filters and originating map.
pub(crate) struct HandlerBinding<P> {
    target: NodeId,
    spec: EventSpec,
    meta: MetaFilter,
    delegation: Delegation,
    handler: Handler<P>,
    map: Rc<EventMap<P>>,
}

impl<P> core::fmt::Debug for HandlerBinding<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("target", &self.target)
            .field("key", &self.spec.key())
            .finish_non_exhaustive()
    }
}

impl<P: 'static> HandlerBinding<P> {
    pub(crate) fn new(
        target: NodeId,
        spec: EventSpec,
        handler: Handler<P>,
        map: Rc<EventMap<P>>,
    ) -> Self {
        Self {
            target,
            meta: MetaFilter::new(spec.meta_tokens()),
            delegation: Delegation::new(spec.selectors().iter().cloned()),
            spec,
            handler,
            map,
        }
    }

    pub(crate) fn event_type(&self) -> &str {
        self.spec.event_type()
    }

    pub(crate) fn key(&self) -> &str {
        self.spec.key()
    }

    /// Run the handler if `event` passes the delegation and meta filters.
    pub(crate) fn invoke(&self, bridge: &Rc<BridgeShared<P>>, event: &mut ActionEvent<P>) {
        if !self.delegation.matches(&bridge.document, event) {
            trace!(node = %self.target, key = self.spec.key(), "delegation did not match");
            return;
        }
        if !self.meta.matches(event) {
            trace!(node = %self.target, key = self.spec.key(), "meta filter did not match");
            return;
        }

        let result = {
            let scope = SyncScope::enter();
            let dispatcher = Dispatcher::new(Rc::downgrade(bridge), self.target, scope.token());
            let mut cx = EventCx::new(event, &self.map, dispatcher);
            (self.handler)(&mut cx)
        };
        if result == Some(false) {
            event.prevent_default();
        }
    }
}

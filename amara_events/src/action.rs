// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actions: application actions that travel as events, and the host actions the engine consumes.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use amara_dom::{Document, Event, NodeId};

use crate::lifecycle::is_lifecycle;
use crate::map::EventMap;

/// A typed action. `kind` is the routing key and, when dispatched as an event, the event type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action<P> {
    /// Routing key.
    pub kind: String,
    /// Payload.
    pub payload: P,
    /// Optional metadata, carried alongside the payload.
    pub meta: Option<P>,
}

impl<P> Action<P> {
    /// Create an action without metadata.
    pub fn new(kind: impl Into<String>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload,
            meta: None,
        }
    }

    /// Attach metadata.
    pub fn with_meta(mut self, meta: P) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Returns true if `kind` carries the lifecycle prefix.
    pub fn is_lifecycle(&self) -> bool {
        is_lifecycle(&self.kind)
    }
}

/// Document whose event detail is the dispatched action.
pub type ActionDocument<P> = Document<Rc<Action<P>>>;

/// Event carrying an optional dispatched action.
pub type ActionEvent<P> = Event<Rc<Action<P>>>;

/// Routing key of [`HostAction::Bootstrap`].
pub const BOOTSTRAP: &str = "core:bootstrap";
/// Routing key of [`HostAction::ApplyTargetResults`].
pub const APPLY_TARGET_RESULTS: &str = "core:apply-target-results";
/// Routing key of [`HostAction::TargetsRemoved`].
pub const TARGETS_REMOVED: &str = "engine:targets-removed";

/// Event maps produced for one target by one apply pass.
#[derive(Clone, Debug)]
pub struct TargetEvents<P> {
    /// Target node.
    pub target: NodeId,
    /// Maps in application order.
    pub maps: Vec<Rc<EventMap<P>>>,
}

impl<P> TargetEvents<P> {
    /// Pair a target with its maps.
    pub fn new(target: NodeId, maps: impl IntoIterator<Item = Rc<EventMap<P>>>) -> Self {
        Self {
            target,
            maps: maps.into_iter().collect(),
        }
    }
}

/// Lifecycle actions the host sends to the engine.
#[derive(Clone, Debug)]
pub enum HostAction<P> {
    /// `core:bootstrap`: record the root used to proxy bubbled actions to the host.
    Bootstrap {
        /// Root node.
        target: NodeId,
    },
    /// `core:apply-target-results`: rebind every listed target.
    ApplyTargetResults {
        /// Per-target event maps; empty when the pass produced no events.
        events: Vec<TargetEvents<P>>,
    },
    /// `engine:targets-removed`: tear down the listed targets.
    TargetsRemoved(Vec<NodeId>),
    /// Any other host action; passed over untouched.
    Other(String),
}

impl<P> HostAction<P> {
    /// Routing key of this action.
    pub fn kind(&self) -> &str {
        match self {
            Self::Bootstrap { .. } => BOOTSTRAP,
            Self::ApplyTargetResults { .. } => APPLY_TARGET_RESULTS,
            Self::TargetsRemoved(_) => TARGETS_REMOVED,
            Self::Other(kind) => kind,
        }
    }
}

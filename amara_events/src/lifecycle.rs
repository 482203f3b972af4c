// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine-synthesized lifecycle events.
//!
//! | Event | Fires |
//! |---|---|
//! | `amara:add` | once, when a target first enters the registry |
//! | `amara:apply` | after every apply call for the target, including the first |
//! | `amara:remove` | once, when the host reports the target removed, before teardown |
//!
//! Lifecycle events never bubble, are never delegated, and are never proxied
//! to the host. They go through the same bridge as application actions, so
//! their handlers may dispatch.

use amara_dom::NodeId;
use tracing::debug;

use crate::bridge::{BridgeShared, DispatchOptions};

/// Prefix reserved for lifecycle event types.
pub const LIFECYCLE_PREFIX: &str = "amara:";

/// Returns true if `kind` carries the lifecycle prefix (ASCII case-insensitive).
pub fn is_lifecycle(kind: &str) -> bool {
    kind.get(..LIFECYCLE_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(LIFECYCLE_PREFIX))
}

/// The three lifecycle events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// `amara:add`.
    Add,
    /// `amara:apply`.
    Apply,
    /// `amara:remove`.
    Remove,
}

impl Lifecycle {
    /// Event type name.
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::Add => "amara:add",
            Self::Apply => "amara:apply",
            Self::Remove => "amara:remove",
        }
    }
}

impl core::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.event_type())
    }
}

pub(crate) fn fire<P: 'static>(
    bridge: &BridgeShared<P>,
    target: NodeId,
    lifecycle: Lifecycle,
) -> bool {
    debug!(node = %target, event = %lifecycle, "firing lifecycle event");
    bridge.fire(
        target,
        lifecycle.event_type(),
        None,
        DispatchOptions::lifecycle(),
    )
}

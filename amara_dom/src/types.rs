// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public handle and flag types: node identifiers, listener identifiers, event flags.

/// Identifier for a node in the document (generational).
///
/// A removed node's id becomes stale; stale ids never alias a newer node that
/// reuses the same slot because the generation is bumped on reuse.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

/// Handle of a native listener attached with
/// [`Document::add_event_listener`](crate::Document::add_event_listener).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

bitflags::bitflags! {
    /// Event initialization flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventFlags: u8 {
        /// Event continues to ancestors after the target.
        const BUBBLES    = 0b0000_0001;
        /// `prevent_default` has an effect.
        const CANCELABLE = 0b0000_0010;
        /// Event may cross shadow boundaries. Recorded only; this tree has no shadow roots.
        const COMPOSED   = 0b0000_0100;
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::BUBBLES | Self::CANCELABLE | Self::COMPOSED
    }
}

/// Dispatch phase of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Not currently being dispatched.
    #[default]
    None,
    /// Listeners on the original target are running.
    AtTarget,
    /// Listeners on an ancestor are running.
    Bubbling,
}

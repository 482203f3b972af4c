// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events delivered to native listeners.
//!
//! An [`Event`] carries its type name, initialization [`EventFlags`], the
//! category-specific [`EventData`] (key value for keyboard events, button
//! index for mouse events), and an optional typed `detail` payload.
//!
//! Targets, phase and propagation state are written by
//! [`Document::dispatch_event`](crate::Document::dispatch_event); listeners
//! only read them and call the propagation helpers.
//!
//! ```
//! use amara_dom::{Event, EventData, EventFlags};
//!
//! let ev: Event<()> = Event::keyboard("keydown", "Enter");
//! assert_eq!(ev.kind(), "keydown");
//! assert_eq!(ev.data(), &EventData::Keyboard { key: "Enter".into() });
//! assert!(ev.flags().contains(EventFlags::BUBBLES));
//! ```

use alloc::string::String;

use crate::types::{EventFlags, NodeId, Phase};

/// Category-specific event fields.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum EventData {
    /// Plain event with no key or button information.
    #[default]
    Basic,
    /// Keyboard event; `key` is the layout-aware key value (`"Enter"`, `" "`, `"a"`).
    Keyboard {
        /// Key value.
        key: String,
    },
    /// Mouse event; `button` is the index of the button that changed state.
    Mouse {
        /// Button index (`0` main, `1` auxiliary, `2` secondary).
        button: i16,
    },
}

/// An event in flight (or ready to be dispatched).
#[derive(Clone, Debug)]
pub struct Event<D> {
    kind: String,
    flags: EventFlags,
    data: EventData,
    detail: Option<D>,
    pub(crate) target: Option<NodeId>,
    pub(crate) current_target: Option<NodeId>,
    pub(crate) phase: Phase,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
}

impl<D> Event<D> {
    /// Create a basic event with default flags (bubbling, cancelable, composed).
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            flags: EventFlags::default(),
            data: EventData::Basic,
            detail: None,
            target: None,
            current_target: None,
            phase: Phase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Create a keyboard event carrying `key`.
    pub fn keyboard(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(kind).with_data(EventData::Keyboard { key: key.into() })
    }

    /// Create a mouse event carrying `button`.
    pub fn mouse(kind: impl Into<String>, button: i16) -> Self {
        Self::new(kind).with_data(EventData::Mouse { button })
    }

    /// Replace the initialization flags.
    pub fn with_flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the category data.
    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    /// Attach a detail payload.
    pub fn with_detail(mut self, detail: D) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Event type name.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Initialization flags.
    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Whether the event continues to ancestors.
    pub fn bubbles(&self) -> bool {
        self.flags.contains(EventFlags::BUBBLES)
    }

    /// Category data.
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Key value for keyboard events.
    pub fn key(&self) -> Option<&str> {
        match &self.data {
            EventData::Keyboard { key } => Some(key),
            _ => None,
        }
    }

    /// Button index for mouse events.
    pub fn button(&self) -> Option<i16> {
        match self.data {
            EventData::Mouse { button } => Some(button),
            _ => None,
        }
    }

    /// Detail payload, if any.
    pub fn detail(&self) -> Option<&D> {
        self.detail.as_ref()
    }

    /// Node the event was dispatched on.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Node whose listeners are currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Current dispatch phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether `prevent_default` took effect.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether propagation to further nodes was stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Cancel the default action. Has no effect unless the event is cancelable.
    pub fn prevent_default(&mut self) {
        if self.flags.contains(EventFlags::CANCELABLE) {
            self.default_prevented = true;
        }
    }

    /// Finish the listeners on the current node, then stop.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop immediately: no further listeners, no further nodes.
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

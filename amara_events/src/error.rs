// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Errors raised synchronously by the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EventsError {
    /// A lifecycle (`amara:*`) key declared delegation selectors.
    #[error("lifecycle event `{event_type}` cannot be delegated (key `{key}`)")]
    DelegationNotAllowed {
        /// The offending event map key, verbatim.
        key: String,
        /// Parsed event type.
        event_type: String,
    },
    /// `dispatch` was called after the triggering handler returned.
    #[error("actions can only be dispatched synchronously while the triggering event is handled")]
    SynchronousDispatchRequired,
}

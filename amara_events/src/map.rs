// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event maps: ordered `key → handler` lists supplied per target.
//!
//! ## Handler results
//!
//! Handlers may return `()`, `bool` or `Option<bool>`. A `false` return
//! cancels the event as if the handler had called `prevent_default`. This is
//! a convention of this crate: listeners added with `addEventListener` in a
//! browser ignore their return value.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::context::EventCx;

/// Type-erased event handler.
///
/// A return of `Some(false)` cancels the event; see [`IntoHandlerResult`].
pub type Handler<P> = Rc<dyn Fn(&mut EventCx<'_, P>) -> Option<bool>>;

/// Values a handler closure may return.
///
/// `false` (or `Some(false)`) calls `prevent_default` on the event.
/// Everything else is ignored.
pub trait IntoHandlerResult {
    /// Normalize to `Option<bool>`.
    fn into_handler_result(self) -> Option<bool>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Option<bool> {
        None
    }
}

impl IntoHandlerResult for bool {
    fn into_handler_result(self) -> Option<bool> {
        Some(self)
    }
}

impl IntoHandlerResult for Option<bool> {
    fn into_handler_result(self) -> Option<bool> {
        self
    }
}

/// Erase a handler closure so it can be shared between maps or repeated in one map.
///
/// ```
/// use amara_events::{EventMap, handler};
///
/// let log = handler::<(), _, _>(|_cx| {});
/// let map = EventMap::new()
///     .on_handler("click", log.clone())
///     .on_handler("click", log);
/// assert_eq!(map.len(), 2);
/// ```
pub fn handler<P, R, F>(f: F) -> Handler<P>
where
    P: 'static,
    F: Fn(&mut EventCx<'_, P>) -> R + 'static,
    R: IntoHandlerResult,
{
    Rc::new(move |cx: &mut EventCx<'_, P>| f(cx).into_handler_result())
}

/// An ordered list of `(key, handler)` entries.
///
/// Keys are parsed with [`EventSpec`](crate::EventSpec) when the map is
/// applied to a target. Entries keep insertion order, and a key may appear
/// more than once; every entry becomes its own binding.
pub struct EventMap<P> {
    entries: Vec<(String, Handler<P>)>,
}

impl<P> Default for EventMap<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P> core::fmt::Debug for EventMap<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventMap")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<P> EventMap<P> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a closure handler.
    pub fn on<R, F>(self, key: impl Into<String>, f: F) -> Self
    where
        P: 'static,
        F: Fn(&mut EventCx<'_, P>) -> R + 'static,
        R: IntoHandlerResult,
    {
        self.on_handler(key, handler(f))
    }

    /// Append an already-erased handler.
    pub fn on_handler(mut self, key: impl Into<String>, handler: Handler<P>) -> Self {
        self.insert(key, handler);
        self
    }

    /// Append an entry in place.
    pub fn insert(&mut self, key: impl Into<String>, handler: Handler<P>) {
        self.entries.push((key.into(), handler));
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Handler<P>)> + '_ {
        self.entries.iter().map(|(k, h)| (k.as_str(), h))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Amara Events: declarative event maps bound to document nodes.
//!
//! ## Overview
//!
//! A host hands the [`Engine`] a list of [`EventMap`]s per target node. Each
//! map key is an event type with optional qualifiers:
//!
//! - `click` binds directly.
//! - `keydown.enter.space` fires only for the Enter or Space key; `mousedown.right`
//!   only for the secondary button ([`MetaFilter`]).
//! - `click li.done, .toggle` delegates: the handler is bound on the target but
//!   fires only when the event originated on a node matching one of the
//!   selectors ([`Delegation`]).
//! - `amara:add`, `amara:apply` and `amara:remove` are lifecycle events fired by the
//!   engine itself ([`Lifecycle`]). They cannot be delegated.
//!
//! Handlers receive an [`EventCx`] through which they can re-dispatch
//! [`Action`]s as bubbling events. Actions that reach the bootstrapped root
//! uncanceled are handed back to the host.
//!
//! ## Example
//!
//! ```
//! use amara_dom::{Document, Event};
//! use amara_events::{Action, Engine, EventCx, EventMap, HostAction, TargetEvents};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let doc = Document::new();
//! let app = doc.create_element("main");
//! let input = doc.create_element("input");
//! doc.append_child(app, input);
//!
//! let sent = Rc::new(RefCell::new(Vec::new()));
//! let s = sent.clone();
//! let engine = Engine::new(doc.clone(), move |action: Rc<Action<&'static str>>| {
//!     s.borrow_mut().push(action.kind.clone());
//! });
//! engine.handle(&HostAction::Bootstrap { target: app }).unwrap();
//!
//! let map = EventMap::new().on("keydown.enter", |cx: &mut EventCx<'_, &'static str>| {
//!     cx.dispatch(Action::new("todo:submit", "milk")).unwrap();
//! });
//! engine
//!     .handle(&HostAction::ApplyTargetResults {
//!         events: vec![TargetEvents::new(input, [Rc::new(map)])],
//!     })
//!     .unwrap();
//!
//! doc.dispatch_event(input, &mut Event::keyboard("keydown", "a"));
//! doc.dispatch_event(input, &mut Event::keyboard("keydown", "Enter"));
//! assert_eq!(*sent.borrow(), ["todo:submit"]);
//! ```
//!
//! ## Errors
//!
//! [`EventsError::DelegationNotAllowed`] is returned when an apply call
//! contains a delegated lifecycle key; the target keeps its previous bindings.
//! [`EventsError::SynchronousDispatchRequired`] is returned by a
//! [`Dispatcher`] used after its handler returned.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `tracing` and `thiserror`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod action;
mod binding;
mod bridge;
mod context;
mod delegate;
mod engine;
mod error;
mod event_spec;
mod lifecycle;
mod map;
mod meta;
mod registry;

pub use action::{
    APPLY_TARGET_RESULTS, Action, ActionDocument, ActionEvent, BOOTSTRAP, HostAction,
    TARGETS_REMOVED, TargetEvents,
};
pub use bridge::{DispatchOptions, Dispatcher};
pub use context::EventCx;
pub use delegate::Delegation;
pub use engine::Engine;
pub use error::EventsError;
pub use event_spec::EventSpec;
pub use lifecycle::{LIFECYCLE_PREFIX, Lifecycle, is_lifecycle};
pub use map::{EventMap, Handler, IntoHandlerResult, handler};
pub use meta::{MetaCategory, MetaFilter, canonicalize, friendly_name, live_value};

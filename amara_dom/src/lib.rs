// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Amara DOM: a small, `no_std` DOM-like document for driving event bindings.
//!
//! ## Overview
//!
//! This crate provides the host-side primitives an event-binding layer needs and nothing more:
//!
//! - A node arena with generational [`NodeId`]s, tag names, and attributes ([`Tree`]).
//! - Native listeners keyed by event type, attached and detached by [`ListenerId`].
//! - Synchronous dispatch: at-target, then bubbling through ancestors, honoring
//!   `stop_propagation`, `stop_immediate_propagation`, and `prevent_default`.
//! - Per-node attribute hooks that can intercept `set_attribute`/`remove_attribute`.
//! - A selector-matching capability ([`SelectorMatch`]) with a built-in [`SimpleSelectors`].
//!
//! It does not render, lay out, or parse HTML.
//!
//! ## Example
//!
//! ```
//! use amara_dom::{Document, Event};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let doc: Document<()> = Document::new();
//! let list = doc.create_element("ul");
//! let item = doc.create_element("li");
//! doc.append_child(list, item);
//! doc.set_attribute(item, "class", "done");
//!
//! let clicks = Rc::new(Cell::new(0));
//! let c = clicks.clone();
//! doc.add_event_listener(list, "click", move |e| {
//!     assert_eq!(e.target(), Some(item));
//!     c.set(c.get() + 1);
//! });
//!
//! assert!(doc.dispatch_event(item, &mut Event::new("click")));
//! assert_eq!(clicks.get(), 1);
//! assert!(doc.matches(item, "ul > li.done"));
//! ```
//!
//! ## Disabled elements
//!
//! By default a document refuses to run listeners for events dispatched at a
//! node carrying a `disabled` attribute, mirroring engines that swallow events
//! on disabled form controls. Turn this off with
//! [`DocumentOptions::disabled_blocks_dispatch`].
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `tracing`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod document;
mod event;
mod selector;
mod tree;
mod types;

pub use document::{AttributeHook, AttributeMutation, Document, DocumentOptions, Interception};
pub use event::{Event, EventData};
pub use selector::{SelectorMatch, SimpleSelectors};
pub use tree::Tree;
pub use types::{EventFlags, ListenerId, NodeId, Phase};

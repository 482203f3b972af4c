// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delegation: fire only when the event originated on a matching node.
//!
//! Only the original target is tested. A selector that matches an element the
//! event merely bubbled through (between the original target and the bound
//! node) does not count.

use alloc::string::String;

use amara_dom::{Document, Event};
use smallvec::SmallVec;

/// Delegation selectors of one binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delegation {
    selectors: SmallVec<[String; 1]>,
}

impl Delegation {
    /// Build from selectors; an empty list means a direct binding.
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true for a direct (undelegated) binding.
    pub fn is_direct(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Selectors, any of which may match.
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Returns true if the handler should run for `event`.
    pub fn matches<D: 'static>(&self, document: &Document<D>, event: &Event<D>) -> bool {
        if self.is_direct() {
            return true;
        }
        let Some(origin) = event.target() else {
            return false;
        };
        self.selectors.iter().any(|s| document.matches(origin, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use alloc::rc::Rc;

    #[test]
    fn only_the_original_target_is_tested() {
        let doc: Document<()> = Document::new();
        let root = doc.create_element("div");
        let active = doc.create_element("div");
        doc.set_attribute(active, "class", "active");
        let leaf = doc.create_element("span");
        doc.append_child(root, active);
        doc.append_child(active, leaf);

        let delegation = Delegation::new(["div.active"]);
        let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
        {
            let doc2 = doc.clone();
            let seen = seen.clone();
            doc.add_event_listener(root, "click", move |e| {
                seen.borrow_mut().push(delegation.matches(&doc2, e));
            });
        }

        doc.dispatch_event(active, &mut Event::new("click"));
        doc.dispatch_event(leaf, &mut Event::new("click"));
        assert_eq!(*seen.borrow(), [true, false]);
    }

    #[test]
    fn any_selector_may_match() {
        let doc: Document<()> = Document::new();
        let n = doc.create_element("button");
        let mut ev = Event::new("click");
        let id = doc.add_event_listener(n, "click", |_e| {});
        doc.dispatch_event(n, &mut ev);
        doc.remove_event_listener(id);

        assert!(Delegation::new([".nope", "button"]).matches(&doc, &ev));
        assert!(!Delegation::new([".nope"]).matches(&doc, &ev));
        assert!(Delegation::new(Vec::<String>::new()).matches(&doc, &ev));
    }

    #[test]
    fn undispatched_event_never_matches_delegated_binding() {
        let doc: Document<()> = Document::new();
        assert!(!Delegation::new(["*"]).matches(&doc, &Event::new("click")));
    }
}

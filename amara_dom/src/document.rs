// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared document handle: tree mutation, native listeners, dispatch, attribute hooks.
//!
//! ## Re-entrancy
//!
//! [`Document`] is a cheap-to-clone handle over shared state. Every method
//! takes `&self`, and no interior borrow is held while user code runs:
//! listeners are snapshotted per node before they are invoked, and attribute
//! hooks are cloned out before they are called. A listener may therefore add
//! or remove listeners, mutate the tree, or dispatch further events.
//!
//! ## Dispatch
//!
//! [`Document::dispatch_event`] walks the target and then (for bubbling
//! events) its ancestors, nearest first. The propagation path is fixed when
//! dispatch starts. Within a node, listeners fire in registration order;
//! listeners removed mid-dispatch are skipped, listeners added mid-dispatch
//! wait for the next node visit.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::event::Event;
use crate::selector::{SelectorMatch, SimpleSelectors};
use crate::tree::Tree;
use crate::types::{ListenerId, NodeId, Phase};

/// A pending attribute change, as seen by an [`AttributeHook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeMutation<'a> {
    /// `set_attribute(name, value)`.
    Set {
        /// Attribute name.
        name: &'a str,
        /// New value.
        value: &'a str,
    },
    /// `remove_attribute(name)`.
    Remove {
        /// Attribute name.
        name: &'a str,
    },
}

impl AttributeMutation<'_> {
    /// Name of the attribute being changed.
    pub fn name(&self) -> &str {
        match self {
            Self::Set { name, .. } | Self::Remove { name } => name,
        }
    }
}

/// Verdict returned by an [`AttributeHook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interception {
    /// Let the mutation reach the tree.
    Apply,
    /// Drop the mutation; the hook has taken responsibility for it.
    Intercepted,
}

/// Per-node interceptor consulted before `set_attribute`/`remove_attribute` apply.
pub type AttributeHook = Rc<dyn Fn(NodeId, AttributeMutation<'_>) -> Interception>;

/// Document configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Refuse to run listeners for events dispatched at a node carrying a
    /// `disabled` attribute, as some browser engines do for form controls.
    pub disabled_blocks_dispatch: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            disabled_blocks_dispatch: true,
        }
    }
}

impl DocumentOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [`DocumentOptions::disabled_blocks_dispatch`].
    pub fn with_disabled_blocks_dispatch(mut self, blocks: bool) -> Self {
        self.disabled_blocks_dispatch = blocks;
        self
    }
}

type Callback<D> = Rc<dyn Fn(&mut Event<D>)>;

struct ListenerEntry<D> {
    id: ListenerId,
    kind: String,
    callback: Callback<D>,
    removed: Cell<bool>,
}

struct Listeners<D> {
    next_id: u64,
    by_node: HashMap<NodeId, Vec<Rc<ListenerEntry<D>>>>,
    owner: HashMap<ListenerId, NodeId>,
}

impl<D> Default for Listeners<D> {
    fn default() -> Self {
        Self {
            next_id: 0,
            by_node: HashMap::new(),
            owner: HashMap::new(),
        }
    }
}

impl<D> Listeners<D> {
    fn detach_node(&mut self, node: NodeId) {
        if let Some(list) = self.by_node.remove(&node) {
            for entry in list {
                entry.removed.set(true);
                self.owner.remove(&entry.id);
            }
        }
    }
}

struct Inner<D> {
    tree: RefCell<Tree>,
    listeners: RefCell<Listeners<D>>,
    hooks: RefCell<HashMap<NodeId, AttributeHook>>,
    matcher: Box<dyn SelectorMatch>,
    options: DocumentOptions,
}

/// Shared handle to a DOM-like document whose events carry `detail: D`.
pub struct Document<D> {
    inner: Rc<Inner<D>>,
}

impl<D> Clone for Document<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D> core::fmt::Debug for Document<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Document")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl<D: 'static> Default for Document<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static> Document<D> {
    /// Create an empty document with default options and [`SimpleSelectors`].
    pub fn new() -> Self {
        Self::with_matcher(DocumentOptions::default(), SimpleSelectors)
    }

    /// Create an empty document with explicit options.
    pub fn with_options(options: DocumentOptions) -> Self {
        Self::with_matcher(options, SimpleSelectors)
    }

    /// Create an empty document with explicit options and selector matcher.
    pub fn with_matcher(options: DocumentOptions, matcher: impl SelectorMatch + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                tree: RefCell::new(Tree::new()),
                listeners: RefCell::new(Listeners::default()),
                hooks: RefCell::new(HashMap::new()),
                matcher: Box::new(matcher),
                options,
            }),
        }
    }

    /// Document options.
    pub fn options(&self) -> DocumentOptions {
        self.inner.options
    }

    /// Returns true if both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read-only view of the tree. Do not hold it across calls that mutate the document.
    pub fn tree(&self) -> Ref<'_, Tree> {
        self.inner.tree.borrow()
    }

    // --- tree ---

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.tree.borrow_mut().insert(tag)
    }

    /// Append `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.inner.tree.borrow_mut().append(parent, child)
    }

    /// Unlink `node` from its parent. The subtree stays alive with its listeners,
    /// like a DOM node taken out of the document but still referenced.
    pub fn detach(&self, node: NodeId) -> bool {
        self.inner.tree.borrow_mut().detach(node)
    }

    /// Remove a node and its subtree. Their listeners and attribute hooks go with them.
    pub fn remove(&self, node: NodeId) {
        let removed = self.inner.tree.borrow_mut().remove(node);
        if removed.is_empty() {
            return;
        }
        let mut listeners = self.inner.listeners.borrow_mut();
        let mut hooks = self.inner.hooks.borrow_mut();
        for id in &removed {
            listeners.detach_node(*id);
            hooks.remove(id);
        }
        trace!(node = %node, count = removed.len(), "removed subtree");
    }

    /// Returns true if `node` refers to a live node.
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().is_alive(node)
    }

    /// Parent of a live node.
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().parent_of(node)
    }

    /// Children of a live node.
    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.tree.borrow().children_of(node).to_vec()
    }

    /// Lower-cased tag name of a live node.
    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        self.inner.tree.borrow().tag_name(node).map(String::from)
    }

    // --- attributes ---

    /// Attribute value of a live node.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .tree
            .borrow()
            .attribute(node, name)
            .map(String::from)
    }

    /// Returns true if the node carries the attribute.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.inner.tree.borrow().attribute(node, name).is_some()
    }

    /// Set an attribute, subject to the node's hook. Returns true if the tree changed.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> bool {
        if self.consult_hook(node, AttributeMutation::Set { name, value }) == Interception::Intercepted
        {
            return false;
        }
        self.inner
            .tree
            .borrow_mut()
            .write_attribute(node, name, value)
    }

    /// Remove an attribute, subject to the node's hook. Returns true if the tree changed.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> bool {
        if self.consult_hook(node, AttributeMutation::Remove { name }) == Interception::Intercepted {
            return false;
        }
        self.inner.tree.borrow_mut().erase_attribute(node, name)
    }

    /// Install (or clear, with `None`) the attribute hook of `node`, returning the previous hook.
    ///
    /// Hooks are ignored for stale nodes.
    pub fn set_attribute_hook(
        &self,
        node: NodeId,
        hook: Option<AttributeHook>,
    ) -> Option<AttributeHook> {
        let mut hooks = self.inner.hooks.borrow_mut();
        match hook {
            Some(h) if self.is_alive(node) => hooks.insert(node, h),
            Some(_) => None,
            None => hooks.remove(&node),
        }
    }

    /// Currently installed attribute hook of `node`.
    pub fn attribute_hook(&self, node: NodeId) -> Option<AttributeHook> {
        self.inner.hooks.borrow().get(&node).cloned()
    }

    fn consult_hook(&self, node: NodeId, mutation: AttributeMutation<'_>) -> Interception {
        match self.attribute_hook(node) {
            Some(h) => h(node, mutation),
            None => Interception::Apply,
        }
    }

    // --- selectors ---

    /// Test `node` against a single selector using the document's matcher.
    pub fn matches(&self, node: NodeId, selector: &str) -> bool {
        let tree = self.inner.tree.borrow();
        self.inner.matcher.matches(&tree, node, selector)
    }

    // --- listeners ---

    /// Attach a native listener for events of type `kind` on `node`.
    ///
    /// Listeners attached to a stale node are recorded but can never fire.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        kind: &str,
        listener: impl Fn(&mut Event<D>) + 'static,
    ) -> ListenerId {
        let mut listeners = self.inner.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners.by_node.entry(node).or_default().push(Rc::new(ListenerEntry {
            id,
            kind: String::from(kind),
            callback: Rc::new(listener),
            removed: Cell::new(false),
        }));
        listeners.owner.insert(id, node);
        id
    }

    /// Detach a listener. Returns false if it was already gone.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let Some(node) = listeners.owner.remove(&id) else {
            return false;
        };
        if let Some(list) = listeners.by_node.get_mut(&node) {
            if let Some(pos) = list.iter().position(|e| e.id == id) {
                list.remove(pos).removed.set(true);
            }
            if list.is_empty() {
                listeners.by_node.remove(&node);
            }
        }
        true
    }

    /// Number of live listeners of type `kind` on `node`.
    pub fn listener_count(&self, node: NodeId, kind: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .by_node
            .get(&node)
            .map(|list| list.iter().filter(|e| e.kind == kind).count())
            .unwrap_or(0)
    }

    fn snapshot(&self, node: NodeId, kind: &str) -> SmallVec<[Rc<ListenerEntry<D>>; 4]> {
        self.inner
            .listeners
            .borrow()
            .by_node
            .get(&node)
            .map(|list| list.iter().filter(|e| e.kind == kind).cloned().collect())
            .unwrap_or_default()
    }

    // --- dispatch ---

    /// Dispatch `event` at `target`; returns true if the default action was not prevented.
    pub fn dispatch_event(&self, target: NodeId, event: &mut Event<D>) -> bool {
        let path: SmallVec<[NodeId; 8]> = {
            let tree = self.inner.tree.borrow();
            if !tree.is_alive(target) {
                trace!(node = %target, kind = event.kind(), "dispatch at stale node ignored");
                return !event.default_prevented;
            }
            if self.inner.options.disabled_blocks_dispatch
                && tree.attribute(target, "disabled").is_some()
            {
                trace!(node = %target, kind = event.kind(), "dispatch at disabled node suppressed");
                return !event.default_prevented;
            }
            core::iter::once(target)
                .chain(tree.ancestors(target))
                .collect()
        };

        event.target = Some(target);
        event.propagation_stopped = false;
        event.immediate_propagation_stopped = false;

        for (depth, &node) in path.iter().enumerate() {
            if depth > 0 && !event.bubbles() {
                break;
            }
            event.phase = if depth == 0 {
                Phase::AtTarget
            } else {
                Phase::Bubbling
            };
            event.current_target = Some(node);
            for entry in self.snapshot(node, event.kind()) {
                if event.immediate_propagation_stopped {
                    break;
                }
                if entry.removed.get() {
                    continue;
                }
                (entry.callback)(event);
            }
            if event.propagation_stopped {
                break;
            }
        }

        event.phase = Phase::None;
        event.current_target = None;
        !event.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    type Log = Rc<RefCell<Vec<(&'static str, NodeId, Phase)>>>;

    fn setup() -> (Document<u32>, NodeId, NodeId, NodeId) {
        let doc = Document::new();
        let root = doc.create_element("div");
        let parent = doc.create_element("section");
        let child = doc.create_element("span");
        doc.append_child(root, parent);
        doc.append_child(parent, child);
        (doc, root, parent, child)
    }

    fn record(doc: &Document<u32>, log: &Log, node: NodeId, name: &'static str) -> ListenerId {
        let log = log.clone();
        doc.add_event_listener(node, "click", move |e| {
            log.borrow_mut()
                .push((name, e.current_target().unwrap(), e.phase()));
        })
    }

    #[test]
    fn target_then_bubble_in_registration_order() {
        let (doc, root, parent, child) = setup();
        let log: Log = Rc::default();
        record(&doc, &log, root, "root");
        record(&doc, &log, child, "child-a");
        record(&doc, &log, parent, "parent");
        record(&doc, &log, child, "child-b");

        let mut ev = Event::new("click");
        assert!(doc.dispatch_event(child, &mut ev));
        assert_eq!(
            *log.borrow(),
            vec![
                ("child-a", child, Phase::AtTarget),
                ("child-b", child, Phase::AtTarget),
                ("parent", parent, Phase::Bubbling),
                ("root", root, Phase::Bubbling),
            ]
        );
        assert_eq!(ev.phase(), Phase::None);
        assert_eq!(ev.target(), Some(child));
    }

    #[test]
    fn non_bubbling_events_stay_on_target() {
        let (doc, root, _parent, child) = setup();
        let log: Log = Rc::default();
        record(&doc, &log, root, "root");
        record(&doc, &log, child, "child");

        let mut ev = Event::new("click").with_flags(crate::EventFlags::CANCELABLE);
        doc.dispatch_event(child, &mut ev);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn stop_propagation_and_stop_immediate() {
        let (doc, root, _parent, child) = setup();
        let log: Log = Rc::default();
        doc.add_event_listener(child, "click", |e: &mut Event<u32>| e.stop_propagation());
        record(&doc, &log, child, "same-node");
        record(&doc, &log, root, "root");
        doc.dispatch_event(child, &mut Event::new("click"));
        assert_eq!(log.borrow().len(), 1, "same-node listeners still run");

        log.borrow_mut().clear();
        let (doc, _root, _parent, child) = setup();
        doc.add_event_listener(child, "click", |e: &mut Event<u32>| {
            e.stop_immediate_propagation();
        });
        record(&doc, &log, child, "skipped");
        doc.dispatch_event(child, &mut Event::new("click"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn prevent_default_reports_canceled() {
        let (doc, _root, _parent, child) = setup();
        doc.add_event_listener(child, "click", |e: &mut Event<u32>| e.prevent_default());
        assert!(!doc.dispatch_event(child, &mut Event::new("click")));
    }

    #[test]
    fn listener_removed_mid_dispatch_does_not_fire() {
        let (doc, _root, _parent, child) = setup();
        let log: Log = Rc::default();
        let victim: Rc<Cell<Option<ListenerId>>> = Rc::default();
        {
            let doc2 = doc.clone();
            let victim = victim.clone();
            doc.add_event_listener(child, "click", move |_e: &mut Event<u32>| {
                if let Some(id) = victim.get() {
                    doc2.remove_event_listener(id);
                }
            });
        }
        victim.set(Some(record(&doc, &log, child, "victim")));
        doc.dispatch_event(child, &mut Event::new("click"));
        assert!(log.borrow().is_empty());
        assert_eq!(doc.listener_count(child, "click"), 1);
    }

    #[test]
    fn nested_dispatch_from_listener() {
        let (doc, _root, parent, child) = setup();
        let log: Log = Rc::default();
        {
            let doc2 = doc.clone();
            doc.add_event_listener(child, "click", move |_e: &mut Event<u32>| {
                doc2.dispatch_event(parent, &mut Event::new("click"));
            });
        }
        record(&doc, &log, parent, "parent");
        doc.dispatch_event(child, &mut Event::new("click"));
        // once for the nested dispatch, once for the outer bubble
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn disabled_target_suppresses_listeners() {
        let (doc, _root, _parent, child) = setup();
        let log: Log = Rc::default();
        record(&doc, &log, child, "child");
        doc.set_attribute(child, "disabled", "");
        doc.dispatch_event(child, &mut Event::new("click"));
        assert!(log.borrow().is_empty());

        let relaxed: Document<u32> =
            Document::with_options(DocumentOptions::new().with_disabled_blocks_dispatch(false));
        let n = relaxed.create_element("button");
        relaxed.set_attribute(n, "disabled", "");
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        relaxed.add_event_listener(n, "click", move |_e| h.set(h.get() + 1));
        relaxed.dispatch_event(n, &mut Event::new("click"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn attribute_hook_intercepts_and_restores() {
        let doc: Document<u32> = Document::new();
        let n = doc.create_element("input");
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let s = seen.clone();
        let hook: AttributeHook = Rc::new(move |_node: NodeId, m: AttributeMutation<'_>| {
            s.borrow_mut().push(String::from(m.name()));
            if m.name() == "disabled" {
                Interception::Intercepted
            } else {
                Interception::Apply
            }
        });
        assert!(doc.set_attribute_hook(n, Some(hook)).is_none());
        assert!(!doc.set_attribute(n, "disabled", ""));
        assert!(doc.set_attribute(n, "value", "x"));
        assert!(!doc.has_attribute(n, "disabled"));
        assert_eq!(doc.attribute(n, "value").as_deref(), Some("x"));
        assert_eq!(*seen.borrow(), vec!["disabled", "value"]);

        assert!(doc.set_attribute_hook(n, None).is_some());
        assert!(doc.set_attribute(n, "disabled", ""));
        assert!(doc.has_attribute(n, "disabled"));
    }

    #[test]
    fn removing_a_subtree_drops_its_listeners() {
        let (doc, root, parent, child) = setup();
        let log: Log = Rc::default();
        record(&doc, &log, child, "child");
        record(&doc, &log, root, "root");
        doc.remove(parent);
        assert!(!doc.is_alive(child));
        assert_eq!(doc.listener_count(child, "click"), 0);
        assert_eq!(doc.children_of(root), Vec::<NodeId>::new());
        doc.dispatch_event(child, &mut Event::new("click"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn delegated_matching_uses_matcher() {
        let (doc, _root, parent, child) = setup();
        doc.set_attribute(child, "class", "hot");
        assert!(doc.matches(child, "section > span.hot"));
        assert!(!doc.matches(parent, ".hot"));
    }
}

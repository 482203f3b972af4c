// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A todo list driven by event maps.
//!
//! This example shows how a host:
//! - bootstraps the engine with a root node,
//! - applies event maps per target, including delegated and key-qualified keys,
//! - receives actions that handlers re-dispatch and that bubble to the root,
//! - reports removed nodes so `amara:remove` fires before teardown.
//!
//! Run:
//! - `RUST_LOG=amara_events=trace cargo run -p amara_demos --example todo_list`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use amara_dom::{Event, NodeId};
use amara_events::{
    Action, ActionDocument, Engine, EventCx, EventMap, HostAction, TargetEvents,
};

/// Payload carried by todo actions.
#[derive(Clone, Debug)]
enum Msg {
    Add(String),
    Toggle(usize),
    Remove(usize),
}

#[derive(Debug)]
struct Todo {
    title: String,
    done: bool,
    node: NodeId,
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}

/// Index of the row a delegated event came from, read from `data-index`.
fn row_index(doc: &ActionDocument<Msg>, cx: &EventCx<'_, Msg>) -> Option<usize> {
    let mut node = cx.target()?;
    loop {
        if let Some(index) = doc.attribute(node, "data-index") {
            return index.parse().ok();
        }
        node = doc.parent_of(node)?;
    }
}

fn list_map(doc: &ActionDocument<Msg>) -> EventMap<Msg> {
    let toggle_doc = doc.clone();
    let remove_doc = doc.clone();
    EventMap::new()
        .on("click li > input.toggle", move |cx: &mut EventCx<'_, Msg>| {
            if let Some(i) = row_index(&toggle_doc, cx) {
                if let Err(err) = cx.dispatch(Action::new("todo:toggle", Msg::Toggle(i))) {
                    tracing::warn!(error = %err, "todo:toggle dispatch failed");
                }
            }
        })
        .on("click button.remove", move |cx: &mut EventCx<'_, Msg>| {
            if let Some(i) = row_index(&remove_doc, cx) {
                if let Err(err) = cx.dispatch(Action::new("todo:remove", Msg::Remove(i))) {
                    tracing::warn!(error = %err, "todo:remove dispatch failed");
                }
            }
        })
}

fn input_map(doc: &ActionDocument<Msg>, input: NodeId) -> EventMap<Msg> {
    let doc = doc.clone();
    EventMap::new()
        .on("amara:add", |_cx: &mut EventCx<'_, Msg>| {
            println!("input mounted");
        })
        .on("keydown.enter", move |cx: &mut EventCx<'_, Msg>| {
            let title = doc.attribute(input, "value").unwrap_or_default();
            if title.is_empty() {
                return false;
            }
            doc.set_attribute(input, "value", "");
            cx.dispatch(Action::new("todo:add", Msg::Add(title))).is_ok()
        })
        .on("keydown.escape", move |cx: &mut EventCx<'_, Msg>| {
            cx.stop_propagation();
        })
}

fn row_map(title: &str) -> EventMap<Msg> {
    let added = title.to_owned();
    let removed = title.to_owned();
    EventMap::new()
        .on("amara:add", move |_cx: &mut EventCx<'_, Msg>| {
            println!("row added: {added}");
        })
        .on("amara:remove", move |_cx: &mut EventCx<'_, Msg>| {
            println!("row removed: {removed}");
        })
}

struct App {
    engine: Engine<Msg>,
    queue: Rc<RefCell<VecDeque<Rc<Action<Msg>>>>>,
    list: NodeId,
    input: NodeId,
    todos: Vec<Todo>,
}

impl App {
    fn new() -> Self {
        let doc = ActionDocument::<Msg>::new();
        let app = doc.create_element("main");
        let input = doc.create_element("input");
        let list = doc.create_element("ul");
        doc.append_child(app, input);
        doc.append_child(app, list);

        let queue: Rc<RefCell<VecDeque<Rc<Action<Msg>>>>> = Rc::default();
        let q = queue.clone();
        let engine = Engine::new(doc, move |action| q.borrow_mut().push_back(action));
        engine
            .handle(&HostAction::Bootstrap { target: app })
            .expect("bootstrap never fails");

        let mut this = Self {
            engine,
            queue,
            list,
            input,
            todos: Vec::new(),
        };
        this.render(Vec::new());
        this
    }

    fn doc(&self) -> &ActionDocument<Msg> {
        self.engine.document()
    }

    fn render(&mut self, removed: Vec<NodeId>) {
        let doc = self.doc().clone();
        if !removed.is_empty() {
            self.engine
                .handle(&HostAction::TargetsRemoved(removed.clone()))
                .expect("removal never fails");
            for node in removed {
                doc.remove(node);
            }
        }

        let mut events = vec![
            TargetEvents::new(self.input, [Rc::new(input_map(&doc, self.input))]),
            TargetEvents::new(self.list, [Rc::new(list_map(&doc))]),
        ];
        for (i, todo) in self.todos.iter().enumerate() {
            doc.set_attribute(todo.node, "data-index", &i.to_string());
            events.push(TargetEvents::new(todo.node, [Rc::new(row_map(&todo.title))]));
        }
        if let Err(err) = self
            .engine
            .handle(&HostAction::ApplyTargetResults { events })
        {
            tracing::warn!(error = %err, "render failed");
        }
    }

    fn create_row(&self, title: &str) -> NodeId {
        let doc = self.doc();
        let row = doc.create_element("li");
        let toggle = doc.create_element("input");
        doc.set_attribute(toggle, "class", "toggle");
        let remove = doc.create_element("button");
        doc.set_attribute(remove, "class", "remove");
        doc.set_attribute(row, "title", title);
        doc.append_child(row, toggle);
        doc.append_child(row, remove);
        doc.append_child(self.list, row);
        row
    }

    /// Drain actions the engine proxied to us, re-rendering after each.
    fn pump(&mut self) {
        loop {
            let Some(action) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            let mut removed = Vec::new();
            match &action.payload {
                Msg::Add(title) => {
                    let node = self.create_row(title);
                    self.todos.push(Todo {
                        title: title.clone(),
                        done: false,
                        node,
                    });
                }
                Msg::Toggle(i) => {
                    if let Some(todo) = self.todos.get_mut(*i) {
                        todo.done = !todo.done;
                    }
                }
                Msg::Remove(i) => {
                    if *i < self.todos.len() {
                        removed.push(self.todos.remove(*i).node);
                    }
                }
            }
            println!("{} -> {:?}", action.kind, self.summary());
            self.render(removed);
        }
    }

    fn summary(&self) -> Vec<String> {
        self.todos
            .iter()
            .map(|t| format!("[{}] {}", if t.done { "x" } else { " " }, t.title))
            .collect()
    }

    fn type_and_submit(&mut self, text: &str) {
        self.doc().set_attribute(self.input, "value", text);
        self.doc()
            .dispatch_event(self.input, &mut Event::keyboard("keydown", "Enter"));
        self.pump();
    }

    fn click_child(&mut self, row: usize, class: &str) {
        let Some(node) = self.todos.get(row).map(|t| t.node) else {
            return;
        };
        let doc = self.doc().clone();
        let selector = format!(".{class}");
        if let Some(child) = doc
            .children_of(node)
            .into_iter()
            .find(|c| doc.matches(*c, &selector))
        {
            doc.dispatch_event(child, &mut Event::new("click"));
        }
        self.pump();
    }
}

fn main() {
    setup_tracing();

    let mut app = App::new();
    app.type_and_submit("buy milk");
    app.type_and_submit("walk the dog");
    app.type_and_submit("");
    app.click_child(0, "toggle");
    app.click_child(1, "remove");

    println!("final: {:?}", app.summary());
    println!("bound targets: {}", app.engine.registered_targets().len());
}

// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selector matching capability.
//!
//! The document answers "does this node match this selector string?" through a
//! [`SelectorMatch`] implementation. [`SimpleSelectors`] is the default and
//! covers the subset that event delegation keys use in practice:
//!
//! - `*`, type selectors (`li`), `#id`, `.class`, `[attr]`, `[attr=value]`,
//!   `[attr="value"]`, combined into compounds (`input.big[type=text]`);
//! - descendant (`ul li`) and child (`ul > li`) combinators.
//!
//! Selector lists (`a, b`) are split by the caller. Anything the parser does
//! not understand (pseudo-classes, sibling combinators, unbalanced brackets)
//! never matches.

use smallvec::SmallVec;

use crate::tree::Tree;
use crate::types::NodeId;

/// Capability: test a node against a single selector.
pub trait SelectorMatch {
    /// Return true if `node` matches `selector`. Stale nodes never match.
    fn matches(&self, tree: &Tree, node: NodeId, selector: &str) -> bool;
}

/// Built-in matcher for simple compound selectors with descendant/child combinators.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleSelectors;

impl SelectorMatch for SimpleSelectors {
    fn matches(&self, tree: &Tree, node: NodeId, selector: &str) -> bool {
        if !tree.is_alive(node) {
            return false;
        }
        let Some(parts) = parse(selector) else {
            return false;
        };
        match_at(tree, node, &parts, parts.len() - 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Default)]
struct Compound<'a> {
    tag: Option<&'a str>,
    ids: SmallVec<[&'a str; 1]>,
    classes: SmallVec<[&'a str; 2]>,
    attrs: SmallVec<[(&'a str, Option<&'a str>); 1]>,
}

/// Compound selectors left to right; each carries the combinator linking it to
/// the previous compound (`None` for the first).
type Parts<'a> = SmallVec<[(Option<Combinator>, Compound<'a>); 2]>;

fn parse(selector: &str) -> Option<Parts<'_>> {
    let mut parts = Parts::new();
    let mut pending: Option<Combinator> = None;
    let bytes = selector.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\n' | b'\r' => {
                if !parts.is_empty() && pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
                i += 1;
            }
            b'>' => {
                if parts.is_empty() || pending == Some(Combinator::Child) {
                    return None;
                }
                pending = Some(Combinator::Child);
                i += 1;
            }
            _ => {
                let end = compound_end(bytes, i)?;
                let compound = parse_compound(&selector[i..end])?;
                if !parts.is_empty() && pending.is_none() {
                    return None;
                }
                parts.push((pending.take(), compound));
                i = end;
            }
        }
    }
    if parts.is_empty() || pending == Some(Combinator::Child) {
        return None;
    }
    Some(parts)
}

/// Byte index one past the end of the compound starting at `start`.
fn compound_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    let mut in_brackets = false;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match (quote, in_brackets, b) {
            (Some(q), _, _) if b == q => quote = None,
            (Some(_), _, _) => {}
            (None, true, b'"' | b'\'') => quote = Some(b),
            (None, false, b'[') => in_brackets = true,
            (None, true, b']') => in_brackets = false,
            (None, false, b' ' | b'\t' | b'\n' | b'\r' | b'>') => break,
            _ => {}
        }
        i += 1;
    }
    (!in_brackets && quote.is_none()).then_some(i)
}

fn parse_compound(src: &str) -> Option<Compound<'_>> {
    let mut out = Compound::default();
    let mut rest = src;

    let tag_len = rest
        .find(|c: char| matches!(c, '#' | '.' | '['))
        .unwrap_or(rest.len());
    if tag_len > 0 {
        let tag = &rest[..tag_len];
        if tag != "*" && !is_ident(tag) {
            return None;
        }
        out.tag = Some(tag);
        rest = &rest[tag_len..];
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '#' | '.' => {
                let body = &rest[1..];
                let len = body
                    .find(|c: char| matches!(c, '#' | '.' | '['))
                    .unwrap_or(body.len());
                let name = &body[..len];
                if !is_ident(name) {
                    return None;
                }
                if c == '#' {
                    out.ids.push(name);
                } else {
                    out.classes.push(name);
                }
                rest = &body[len..];
            }
            '[' => {
                let close = rest.find(']')?;
                let inner = rest[1..close].trim();
                let attr = match inner.split_once('=') {
                    Some((name, value)) => {
                        let name = name.trim();
                        let value = unquote(value.trim())?;
                        (name, Some(value))
                    }
                    None => (inner, None),
                };
                if !is_ident(attr.0) {
                    return None;
                }
                out.attrs.push(attr);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }
    Some(out)
}

fn unquote(value: &str) -> Option<&str> {
    let b = value.as_bytes();
    match b.first() {
        Some(q @ (b'"' | b'\'')) => {
            if b.len() >= 2 && b[b.len() - 1] == *q {
                Some(&value[1..value.len() - 1])
            } else {
                None
            }
        }
        _ if is_ident(value) => Some(value),
        _ => None,
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn match_at(tree: &Tree, node: NodeId, parts: &Parts<'_>, idx: usize) -> bool {
    let (combinator, compound) = &parts[idx];
    if !compound_matches(tree, node, compound) {
        return false;
    }
    match combinator {
        None => true,
        Some(Combinator::Child) => tree
            .parent_of(node)
            .is_some_and(|p| match_at(tree, p, parts, idx - 1)),
        Some(Combinator::Descendant) => tree
            .ancestors(node)
            .any(|a| match_at(tree, a, parts, idx - 1)),
    }
}

fn compound_matches(tree: &Tree, node: NodeId, c: &Compound<'_>) -> bool {
    if let Some(tag) = c.tag
        && tag != "*"
        && !tree
            .tag_name(node)
            .is_some_and(|t| t.eq_ignore_ascii_case(tag))
    {
        return false;
    }
    if !c.ids.iter().all(|id| tree.attribute(node, "id") == Some(*id)) {
        return false;
    }
    if !c.classes.is_empty() {
        let class_attr = tree.attribute(node, "class").unwrap_or("");
        if !c
            .classes
            .iter()
            .all(|want| class_attr.split_ascii_whitespace().any(|have| have == *want))
        {
            return false;
        }
    }
    c.attrs.iter().all(|(name, value)| match value {
        None => tree.attribute(node, name).is_some(),
        Some(v) => tree.attribute(node, name) == Some(*v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let ul = tree.insert("ul");
        tree.write_attribute(ul, "id", "list");
        let li = tree.insert("li");
        tree.write_attribute(li, "class", "item active");
        let input = tree.insert("input");
        tree.write_attribute(input, "type", "text");
        tree.append(ul, li);
        tree.append(li, input);
        (tree, ul, li, input)
    }

    #[test]
    fn compounds() {
        let (tree, ul, li, input) = sample();
        let m = SimpleSelectors;
        assert!(m.matches(&tree, ul, "ul"));
        assert!(m.matches(&tree, ul, "#list"));
        assert!(m.matches(&tree, ul, "ul#list"));
        assert!(m.matches(&tree, li, ".item.active"));
        assert!(m.matches(&tree, li, "LI.active"));
        assert!(!m.matches(&tree, li, ".item.missing"));
        assert!(m.matches(&tree, input, "input[type=text]"));
        assert!(m.matches(&tree, input, "input[type=\"text\"]"));
        assert!(m.matches(&tree, input, "[type]"));
        assert!(!m.matches(&tree, input, "input[type=checkbox]"));
        assert!(m.matches(&tree, input, "*"));
    }

    #[test]
    fn combinators() {
        let (tree, _ul, li, input) = sample();
        let m = SimpleSelectors;
        assert!(m.matches(&tree, input, "ul input"));
        assert!(m.matches(&tree, input, "#list .active > input"));
        assert!(m.matches(&tree, li, "ul>li"));
        assert!(!m.matches(&tree, input, "ul > input"));
        assert!(!m.matches(&tree, li, "input li"));
    }

    #[test]
    fn unsupported_or_malformed_never_matches() {
        let (tree, _ul, li, input) = sample();
        let m = SimpleSelectors;
        assert!(!m.matches(&tree, li, "li:hover"));
        assert!(!m.matches(&tree, li, "ul ~ li"));
        assert!(!m.matches(&tree, input, "input[type=text"));
        assert!(!m.matches(&tree, input, ""));
        assert!(!m.matches(&tree, input, "> input"));
        assert!(!m.matches(&tree, input, "li >"));
    }
}

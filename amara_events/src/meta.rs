// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key and button qualifiers.
//!
//! Bind time: raw meta tokens are lower-cased and mapped through one
//! friendly-name table shared by keyboard and mouse keys (`space` → `" "`,
//! `left` → `"0"`, `middle`/`wheel` → `"1"`, `right` → `"2"`); other tokens
//! pass through.
//!
//! Fire time: keyboard events compare their key value, mouse events their
//! button index. `Del` is rewritten to `Delete` before the value is lower-cased
//! and compared. A filter with no tokens accepts every event.
//!
//! ```
//! use amara_dom::Event;
//! use amara_events::MetaFilter;
//!
//! let filter = MetaFilter::new(["right"]);
//! assert!(filter.matches(&Event::<()>::mouse("mousedown", 2)));
//! assert!(!filter.matches(&Event::<()>::mouse("mousedown", 0)));
//! ```

use alloc::string::{String, ToString};

use amara_dom::{Event, EventData};
use smallvec::SmallVec;

/// Friendly token → canonical runtime value.
const FRIENDLY: &[(&str, &str)] = &[
    ("space", " "),
    ("left", "0"),
    ("middle", "1"),
    ("wheel", "1"),
    ("right", "2"),
];

/// Legacy key values rewritten before comparison.
const KEY_FIXUPS: &[(&str, &str)] = &[("del", "delete")];

/// Which live field a canonical value is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaCategory {
    /// Key value of keyboard events.
    Keyboard,
    /// Button index of mouse events.
    Mouse,
}

/// Lower-case a raw token and map it through the friendly-name table.
pub fn canonicalize(token: &str) -> String {
    let lowered = token.trim().to_lowercase();
    FRIENDLY
        .iter()
        .find(|(friendly, _)| *friendly == lowered)
        .map(|(_, canonical)| String::from(*canonical))
        .unwrap_or(lowered)
}

/// Render a canonical value back to its friendly token, if it has one in `category`.
pub fn friendly_name(canonical: &str, category: MetaCategory) -> Option<&'static str> {
    match (category, canonical) {
        (MetaCategory::Keyboard, " ") => Some("space"),
        (MetaCategory::Mouse, "0") => Some("left"),
        (MetaCategory::Mouse, "1") => Some("middle"),
        (MetaCategory::Mouse, "2") => Some("right"),
        _ => None,
    }
}

/// The comparison value of a live event: fixed-up, lower-cased key, or button index.
///
/// Events that are neither keyboard nor mouse events have no value.
pub fn live_value<D>(event: &Event<D>) -> Option<String> {
    match event.data() {
        EventData::Keyboard { key } => {
            let fixed = KEY_FIXUPS
                .iter()
                .find(|(legacy, _)| key.eq_ignore_ascii_case(legacy))
                .map(|(_, modern)| *modern)
                .unwrap_or(key.as_str());
            Some(fixed.to_lowercase())
        }
        EventData::Mouse { button } => Some(button.to_string()),
        EventData::Basic => None,
    }
}

/// Canonicalized meta tokens of one binding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaFilter {
    tokens: SmallVec<[String; 2]>,
}

impl MetaFilter {
    /// Build a filter from raw tokens.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: raw.into_iter().map(|t| canonicalize(t.as_ref())).collect(),
        }
    }

    /// Returns true if the filter accepts everything.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Canonical tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns true if `event` passes the filter.
    pub fn matches<D>(&self, event: &Event<D>) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        live_value(event).is_some_and(|value| self.tokens.iter().any(|t| *t == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> Event<()> {
        Event::keyboard("keydown", k)
    }

    fn button(b: i16) -> Event<()> {
        Event::mouse("mousedown", b)
    }

    #[test]
    fn canonical_table() {
        assert_eq!(canonicalize("Space"), " ");
        assert_eq!(canonicalize("left"), "0");
        assert_eq!(canonicalize("MIDDLE"), "1");
        assert_eq!(canonicalize("wheel"), "1");
        assert_eq!(canonicalize("right"), "2");
        assert_eq!(canonicalize("Enter"), "enter");
        assert_eq!(canonicalize("del"), "del");
    }

    #[test]
    fn friendly_round_trip_by_category() {
        assert_eq!(friendly_name(&canonicalize("space"), MetaCategory::Keyboard), Some("space"));
        assert_eq!(friendly_name(&canonicalize("wheel"), MetaCategory::Mouse), Some("middle"));
        assert_eq!(friendly_name("0", MetaCategory::Keyboard), None);
        assert_eq!(friendly_name(" ", MetaCategory::Mouse), None);
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let f = MetaFilter::default();
        assert!(f.matches(&key("x")));
        assert!(f.matches(&button(4)));
        assert!(f.matches(&Event::<()>::new("click")));
    }

    #[test]
    fn keyboard_values_compare_case_insensitively() {
        let enter = MetaFilter::new(["enter"]);
        assert!(enter.matches(&key("Enter")));
        assert!(!enter.matches(&key("Escape")));

        let space = MetaFilter::new(["space"]);
        assert!(space.matches(&key(" ")));
        assert!(!space.matches(&key("Spacebar")));
    }

    #[test]
    fn legacy_del_is_rewritten() {
        let delete = MetaFilter::new(["delete"]);
        assert!(delete.matches(&key("Del")));
        assert!(delete.matches(&key("Delete")));
        // the rewrite is one-way
        assert!(!MetaFilter::new(["del"]).matches(&key("Delete")));
    }

    #[test]
    fn mouse_buttons_use_shared_table() {
        let left = MetaFilter::new(["left"]);
        assert!(left.matches(&button(0)));
        assert!(!left.matches(&button(2)));
        // arrow keys do not collide with button names
        assert!(!left.matches(&key("ArrowLeft")));

        let either = MetaFilter::new(["left", "right"]);
        assert!(either.matches(&button(2)));
        assert!(!either.matches(&button(1)));
    }

    #[test]
    fn qualified_filter_rejects_events_without_a_value() {
        assert!(!MetaFilter::new(["enter"]).matches(&Event::<()>::new("keydown")));
    }
}

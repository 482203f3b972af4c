// Copyright 2025 the Amara Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event map keys.
//!
//! A key names the event type, optional meta qualifiers, and optional
//! delegation selectors:
//!
//! ```text
//! key           := event-token selector-list?
//! event-token   := event-type ("." meta-token)*
//! selector-list := selector ("," selector)*
//! ```
//!
//! The event token ends at the first whitespace; everything after it is the
//! selector list. Event type and meta tokens are trimmed and lower-cased;
//! selectors are trimmed and empty entries dropped.
//!
//! ```
//! use amara_events::EventSpec;
//!
//! let spec = EventSpec::parse("keydown.Enter.space input[type=text], .toggle");
//! assert_eq!(spec.event_type(), "keydown");
//! assert_eq!(spec.meta_tokens(), ["enter", "space"]);
//! assert_eq!(spec.selectors(), ["input[type=text]", ".toggle"]);
//! ```

use alloc::string::String;

use smallvec::SmallVec;

use crate::error::EventsError;
use crate::lifecycle::is_lifecycle;

/// A parsed event map key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventSpec {
    key: String,
    event_type: String,
    meta_tokens: SmallVec<[String; 2]>,
    selectors: SmallVec<[String; 1]>,
}

impl EventSpec {
    /// Parse a key. Parsing never fails; see [`EventSpec::validate`].
    pub fn parse(key: &str) -> Self {
        let trimmed = key.trim();
        let (token, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        let mut pieces = token.split('.');
        let event_type = pieces.next().unwrap_or("").trim().to_lowercase();
        let meta_tokens = pieces
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let selectors = rest
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            key: String::from(key),
            event_type,
            meta_tokens,
            selectors,
        }
    }

    /// Parse and validate in one step.
    pub fn parse_checked(key: &str) -> Result<Self, EventsError> {
        let spec = Self::parse(key);
        spec.validate()?;
        Ok(spec)
    }

    /// Reject lifecycle keys that declare delegation selectors.
    pub fn validate(&self) -> Result<(), EventsError> {
        if self.is_lifecycle() && !self.selectors.is_empty() {
            return Err(EventsError::DelegationNotAllowed {
                key: self.key.clone(),
                event_type: self.event_type.clone(),
            });
        }
        Ok(())
    }

    /// The key as written.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lower-cased event type.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Lower-cased raw meta tokens, before canonicalization.
    pub fn meta_tokens(&self) -> &[String] {
        &self.meta_tokens
    }

    /// Delegation selectors.
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// Returns true for `amara:*` event types.
    pub fn is_lifecycle(&self) -> bool {
        is_lifecycle(&self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_event_type() {
        let s = EventSpec::parse("click");
        assert_eq!(s.event_type(), "click");
        assert!(s.meta_tokens().is_empty());
        assert!(s.selectors().is_empty());
    }

    #[test]
    fn case_and_whitespace_are_normalized() {
        let s = EventSpec::parse("  KeyUp.ESCAPE   .a ,  , div > p  ");
        assert_eq!(s.event_type(), "keyup");
        assert_eq!(s.meta_tokens(), ["escape"]);
        assert_eq!(s.selectors(), [".a", "div > p"]);
        assert_eq!(s.key(), "  KeyUp.ESCAPE   .a ,  , div > p  ");
    }

    #[test]
    fn selectors_keep_their_case() {
        let s = EventSpec::parse("click #Main, .Item");
        assert_eq!(s.selectors(), ["#Main", ".Item"]);
    }

    #[test]
    fn empty_meta_tokens_are_dropped() {
        let s = EventSpec::parse("mousedown..right.");
        assert_eq!(s.meta_tokens(), ["right"]);
    }

    #[test]
    fn lifecycle_keys_cannot_delegate() {
        assert!(EventSpec::parse_checked("amara:add").is_ok());
        assert!(EventSpec::parse_checked("amara:apply   ").is_ok());
        assert_eq!(
            EventSpec::parse_checked("amara:add div"),
            Err(EventsError::DelegationNotAllowed {
                key: "amara:add div".into(),
                event_type: "amara:add".into(),
            })
        );
        assert!(EventSpec::parse_checked("AMARA:remove .x, .y").is_err());
        // a selector list that is only separators is empty
        assert!(EventSpec::parse_checked("amara:add ,").is_ok());
    }

    #[test]
    fn unknown_event_types_are_accepted() {
        let s = EventSpec::parse_checked("my-widget:changed .row").unwrap();
        assert_eq!(s.event_type(), "my-widget:changed");
        assert!(!s.is_lifecycle());
    }
}

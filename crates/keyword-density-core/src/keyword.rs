//! Keyword phrases and their matchers.
//!
//! A [`Keyword`] is a normalized phrase: trimmed, lowercased, with internal
//! whitespace collapsed to single spaces. Matching is case-insensitive and
//! treats every internal space as "one or more whitespace characters", so
//! `"usb  not\nrecognized"` still matches `usb not recognized`.
//!
//! Word boundaries are only enforced at phrase edges that are ASCII word
//! characters. An edge that is a CJK ideograph has no meaningful boundary
//! (CJK text is not space-delimited), so it is left unanchored.

use std::fmt;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::text::is_ascii_word_char;

/// A normalized keyword phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    /// Normalize a raw phrase into a keyword.
    pub fn new(raw: &str) -> Self {
        let normalized = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        Self(normalized)
    }

    /// The normalized phrase.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether normalization left nothing behind.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build the matcher for this keyword.
    pub fn matcher(&self) -> KeywordMatcher {
        KeywordMatcher::new(self)
    }
}

impl From<String> for Keyword {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Keyword {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compiled, boundary-aware matcher for one keyword.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
    anchor_start: bool,
    anchor_end: bool,
}

impl KeywordMatcher {
    fn new(keyword: &Keyword) -> Self {
        let phrase = keyword.as_str();
        if phrase.is_empty() {
            return Self {
                pattern: None,
                anchor_start: false,
                anchor_end: false,
            };
        }

        let source = phrase
            .split(' ')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");

        // Escaped literal parts joined by \s+ always compile.
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .ok();

        Self {
            pattern,
            anchor_start: phrase.chars().next().is_some_and(is_ascii_word_char),
            anchor_end: phrase.chars().last().is_some_and(is_ascii_word_char),
        }
    }

    /// Byte ranges of non-overlapping matches, in text order.
    pub fn find_all(&self, text: &str) -> Vec<Range<usize>> {
        let Some(ref pattern) = self.pattern else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut pos = 0;
        while pos <= text.len() {
            let Some(m) = pattern.find_at(text, pos) else {
                break;
            };
            if self.is_bounded(text, m.start(), m.end()) {
                found.push(m.range());
                pos = m.end().max(m.start() + 1);
            } else {
                // Retry one character later so a rejected candidate does not
                // swallow a valid match that starts inside it.
                let step = text[m.start()..].chars().next().map_or(1, char::len_utf8);
                pos = m.start() + step;
            }
            while pos < text.len() && !text.is_char_boundary(pos) {
                pos += 1;
            }
        }
        found
    }

    /// Count non-overlapping matches.
    pub fn count(&self, text: &str) -> usize {
        self.find_all(text).len()
    }

    fn is_bounded(&self, text: &str, start: usize, end: usize) -> bool {
        let before_ok = !self.anchor_start
            || text[..start]
                .chars()
                .next_back()
                .is_none_or(|c| !is_ascii_word_char(c));
        let after_ok = !self.anchor_end
            || text[end..]
                .chars()
                .next()
                .is_none_or(|c| !is_ascii_word_char(c));
        before_ok && after_ok
    }
}

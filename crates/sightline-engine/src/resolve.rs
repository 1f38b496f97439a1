//! Matches ordered anchor chains against the content-item sequence.
//!
//! The search window is strictly monotonic: each constraint matches at the
//! earliest position strictly after the previous match and earlier content
//! is never re-scanned, so anchor order must follow reading order.

use regex::Regex;
use sightline_common::content::{ContentItem, TextRun};
use sightline_common::error::AutomationError;
use std::borrow::Cow;
use std::fmt;

/// A text constraint used to locate a position in the content sequence:
/// plain substring containment, or a regular-expression match.
#[derive(Debug, Clone)]
pub enum Anchor {
    Text(String),
    Pattern(Regex),
}

impl Anchor {
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Anchor::Text(text) => haystack.contains(text.as_str()),
            Anchor::Pattern(re) => re.is_match(haystack),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Text(text) => f.write_str(text),
            Anchor::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for Anchor {
    fn from(text: &str) -> Self {
        Anchor::Text(text.into())
    }
}

impl From<String> for Anchor {
    fn from(text: String) -> Self {
        Anchor::Text(text)
    }
}

impl From<Regex> for Anchor {
    fn from(re: Regex) -> Self {
        Anchor::Pattern(re)
    }
}

impl From<&Regex> for Anchor {
    fn from(re: &Regex) -> Self {
        Anchor::Pattern(re.clone())
    }
}

/// One non-breaking space is normalized to a plain space before matching
/// run text.
fn normalize_nbsp(s: &str) -> Cow<'_, str> {
    if s.contains('\u{a0}') {
        Cow::Owned(s.replacen('\u{a0}', " ", 1))
    } else {
        Cow::Borrowed(s)
    }
}

/// Position of a resolved key within one content snapshot. Never valid
/// against a later snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub index: usize,
    /// Index into the run's substrings when the key matched inline; `None`
    /// when the match came from a widget's own field.
    pub substring: Option<usize>,
}

/// An anchor is satisfied at a position when the item's visible text
/// matches, or the *next* item's placeholder, title, or value does.
fn anchor_matches_at(content: &[ContentItem], index: usize, anchor: &Anchor) -> bool {
    if let Some(text) = content[index].text() {
        if anchor.matches(&normalize_nbsp(text)) {
            return true;
        }
    }
    if let Some(next) = content.get(index + 1) {
        for field in [next.placeholder(), next.title(), next.value()] {
            if field.is_some_and(|f| anchor.matches(f)) {
                return true;
            }
        }
    }
    false
}

fn substring_index(run: &TextRun, anchor: &Anchor) -> Option<usize> {
    run.substrings
        .iter()
        .position(|s| anchor.matches(&normalize_nbsp(&s.text)))
}

fn next_match(
    content: &[ContentItem],
    from: Option<usize>,
    anchor: &Anchor,
) -> Result<usize, AutomationError> {
    let begin = from.map_or(0, |i| i + 1);
    (begin..content.len())
        .find(|&i| anchor_matches_at(content, i, anchor))
        .ok_or_else(|| AutomationError::NotFound(anchor.to_string()))
}

/// Finds the position satisfying `[...precedings, key, ...followings]` left
/// to right, and the key's sub-run index when it matched inline.
pub fn resolve(
    content: &[ContentItem],
    precedings: &[Anchor],
    key: &Anchor,
    followings: &[Anchor],
) -> Result<Resolved, AutomationError> {
    let mut from = None;
    for anchor in precedings {
        from = Some(next_match(content, from, anchor)?);
    }
    let index = next_match(content, from, key)?;
    let substring = content[index]
        .as_text()
        .and_then(|run| substring_index(run, key));
    let mut from = Some(index);
    for anchor in followings {
        from = Some(next_match(content, from, anchor)?);
    }
    Ok(Resolved { index, substring })
}

/// The click path resolves by visible text only, with no widget-field
/// fallback and no non-breaking-space normalization.
pub fn resolve_plain(
    content: &[ContentItem],
    precedings: &[Anchor],
    key: &Anchor,
) -> Result<Resolved, AutomationError> {
    let mut from = None;
    for anchor in precedings {
        from = Some(next_text_match(content, from, anchor)?);
    }
    let index = next_text_match(content, from, key)?;
    let substring = content[index].as_text().and_then(|run| {
        run.substrings
            .iter()
            .position(|s| key.matches(&s.text))
    });
    Ok(Resolved { index, substring })
}

fn next_text_match(
    content: &[ContentItem],
    from: Option<usize>,
    anchor: &Anchor,
) -> Result<usize, AutomationError> {
    let begin = from.map_or(0, |i| i + 1);
    (begin..content.len())
        .find(|&i| content[i].text().is_some_and(|t| anchor.matches(t)))
        .ok_or_else(|| AutomationError::NotFound(anchor.to_string()))
}

/// Default failure description naming the full anchor chain.
pub fn describe_chain(precedings: &[Anchor], key: &Anchor) -> String {
    let mut parts: Vec<String> = precedings.iter().map(ToString::to_string).collect();
    parts.push(key.to_string());
    format!("could not find on page: {}", parts.join(", "))
}

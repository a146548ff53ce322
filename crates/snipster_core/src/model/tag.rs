//! Tag model and name normalization.
//!
//! # Invariants
//! - Stored tag names are trimmed and whitespace-collapsed; case is kept.
//! - Names are compared ASCII case-insensitively, matching SQLite `NOCASE`.
//! - One name maps to one tag per store, spelled the way it was first seen.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Store-assigned tag identifier.
pub type TagId = i64;

/// Named label shared across snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagRepr")]
pub struct Tag {
    pub id: Option<TagId>,
    pub name: String,
}

impl Tag {
    /// Creates an unsaved tag. The store assigns `id` on first use.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// Accepts either a bare name or a full `{id, name}` record.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Name(String),
    Record {
        #[serde(default)]
        id: Option<TagId>,
        name: String,
    },
}

impl From<TagRepr> for Tag {
    fn from(value: TagRepr) -> Self {
        match value {
            TagRepr::Name(name) => Tag::new(name),
            TagRepr::Record { id, name } => Tag { id, name },
        }
    }
}

/// Trims and collapses whitespace in one tag name; returns `None` for blank
/// input. Case is left alone.
pub fn normalize_tag(name: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(name.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Key two tag names share when they name the same tag.
pub fn tag_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Normalizes tag names, drops blanks and case variants, and orders the
/// result by [`tag_key`]. The first spelling of each name wins.
pub fn normalize_tags<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut by_key = BTreeMap::new();
    for name in names.into_iter().filter_map(normalize_tag) {
        by_key.entry(tag_key(&name)).or_insert(name);
    }
    by_key.into_values().collect()
}

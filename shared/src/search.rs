use serde::{Deserialize, Serialize};

use crate::model::{MenuItem, Store};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMatch {
    pub address: String,
    pub store_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuMatch<'a> {
    pub store: &'a Store,
    pub item: &'a MenuItem,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedResults<'a> {
    pub locations: Vec<LocationMatch>,
    pub stores: Vec<&'a Store>,
    pub menus: Vec<MenuMatch<'a>>,
}

impl GroupedResults<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.stores.is_empty() && self.menus.is_empty()
    }
}

/// Results for the search overlay, grouped by what matched. Addresses keep
/// first-seen order; menus stop at `menu_limit`.
#[must_use]
pub fn grouped_search<'a>(stores: &'a [Store], query: &str, menu_limit: usize) -> GroupedResults<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return GroupedResults::default();
    }

    let mut results = GroupedResults::default();

    for store in stores {
        if store.address.to_lowercase().contains(&needle) {
            match results
                .locations
                .iter_mut()
                .find(|loc| loc.address == store.address)
            {
                Some(loc) => loc.store_count += 1,
                None => results.locations.push(LocationMatch {
                    address: store.address.clone(),
                    store_count: 1,
                }),
            }
        }

        if store.name.to_lowercase().contains(&needle) {
            results.stores.push(store);
        }

        for item in &store.menu_items {
            if results.menus.len() >= menu_limit {
                break;
            }
            if item.name.to_lowercase().contains(&needle) {
                results.menus.push(MenuMatch { store, item });
            }
        }
    }

    results
}

/// Text in the search overlay. `submitted` is what the result groups are
/// computed from; typing alone does not search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchInput {
    value: String,
    submitted: Option<String>,
}

impl SearchInput {
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn submitted(&self) -> Option<&str> {
        self.submitted.as_deref()
    }

    /// Clearing the text also clears the submitted query.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if self.value.trim().is_empty() {
            self.submitted = None;
        }
    }

    /// Returns the trimmed query when there is one to search for.
    pub fn submit(&mut self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            return None;
        }
        let query = trimmed.to_string();
        self.submitted = Some(query.clone());
        Some(query)
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.submitted = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn new(text: String, highlighted: bool) -> Self {
        Self { text, highlighted }
    }
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Splits `text` into plain and highlighted runs for every case-insensitive
/// occurrence of `query`. The query is literal text, never a pattern.
#[must_use]
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    let needle: Vec<char> = query.trim().chars().collect();
    if text.is_empty() {
        return Vec::new();
    }
    if needle.is_empty() {
        return vec![Segment::new(text.to_string(), false)];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let hit = i + needle.len() <= chars.len()
            && needle
                .iter()
                .zip(&chars[i..])
                .all(|(&q, &c)| chars_match(c, q));

        if hit {
            if !plain.is_empty() {
                segments.push(Segment::new(std::mem::take(&mut plain), false));
            }
            segments.push(Segment::new(chars[i..i + needle.len()].iter().collect(), true));
            i += needle.len();
        } else {
            plain.push(chars[i]);
            i += 1;
        }
    }

    if !plain.is_empty() {
        segments.push(Segment::new(plain, false));
    }
    segments
}

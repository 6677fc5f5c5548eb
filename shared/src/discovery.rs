//! Store discovery: filter, stable sort, event interleaving and "load more"
//! pagination over the immutable catalog.
//!
//! Everything up to pagination is a pure function of (stores, query). The
//! pipeline works on positions into the store slice so results can be
//! memoized per catalog revision without cloning stores.

use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::filter::{FilterState, PickupDate, SortOption};
use crate::model::{PromoEvent, Store, StoreId};
use crate::prefs::favorites::Favorites;

// --- Query ---

/// Normalized snapshot of everything that decides which stores appear and
/// in what order. Text fields are trimmed and lowercased up front so two
/// queries that match the same stores compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DiscoveryQuery {
    pub pickup_date: PickupDate,
    pub quick_pickup: bool,
    pub parking_available: bool,
    pub sort_by: SortOption,
    pub search: Option<String>,
    pub category: Option<String>,
    pub favorites_only: Option<BTreeSet<StoreId>>,
}

impl DiscoveryQuery {
    #[must_use]
    pub fn from_filter(filter: &FilterState) -> Self {
        Self {
            pickup_date: filter.pickup_date(),
            quick_pickup: filter.quick_pickup(),
            parking_available: filter.parking_available(),
            sort_by: filter.sort_by(),
            search: normalize(filter.search_query()),
            category: filter.category().and_then(normalize),
            favorites_only: None,
        }
    }

    /// Restricts results to the given favorite set.
    #[must_use]
    pub fn with_favorites_only(mut self, favorites: &Favorites) -> Self {
        self.favorites_only = Some(favorites.iter().cloned().collect());
        self
    }

    /// True when the store passes every active predicate.
    #[must_use]
    pub fn matches(&self, store: &Store) -> bool {
        store.pickup_available.on(self.pickup_date)
            && (!self.quick_pickup || store.quick_pickup)
            && (!self.parking_available || store.parking_available)
            && self
                .favorites_only
                .as_ref()
                .map_or(true, |ids| ids.contains(&store.id))
            && self.search.as_deref().map_or(true, |q| store.mentions(q))
            && self.category.as_deref().map_or(true, |c| store.mentions(c))
    }
}

fn normalize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

// --- Filter + sort ---

#[must_use]
pub fn filter_positions(stores: &[Store], query: &DiscoveryQuery) -> Vec<usize> {
    stores
        .iter()
        .enumerate()
        .filter(|(_, store)| query.matches(store))
        .map(|(i, _)| i)
        .collect()
}

/// Stable: stores with equal keys keep their relative order.
pub fn sort_positions(stores: &[Store], positions: &mut [usize], sort: SortOption) {
    positions.sort_by(|&a, &b| compare(&stores[a], &stores[b], sort));
}

/// Ordering used by the list sorts. Price sorts place stores without menu
/// items after every priced store.
#[must_use]
pub fn compare(a: &Store, b: &Store, sort: SortOption) -> Ordering {
    match sort {
        SortOption::Distance => a.distance.cmp(&b.distance),
        SortOption::Reviews => Reverse(a.review_count).cmp(&Reverse(b.review_count)),
        SortOption::Favorites => Reverse(a.favorite_count).cmp(&Reverse(b.favorite_count)),
        SortOption::Notifications => {
            Reverse(a.notification_count).cmp(&Reverse(b.notification_count))
        }
        SortOption::PriceLow => price_key(a.min_sale_price()).cmp(&price_key(b.min_sale_price())),
        SortOption::PriceHigh => {
            let high = |p: Option<u32>| (p.is_none(), Reverse(p.unwrap_or_default()));
            high(a.max_sale_price()).cmp(&high(b.max_sale_price()))
        }
    }
}

fn price_key(price: Option<u32>) -> (bool, u32) {
    (price.is_none(), price.unwrap_or_default())
}

#[must_use]
pub fn discover_positions(stores: &[Store], query: &DiscoveryQuery) -> Vec<usize> {
    let mut positions = filter_positions(stores, query);
    sort_positions(stores, &mut positions, query.sort_by);
    positions
}

#[must_use]
pub fn discover<'a>(stores: &'a [Store], query: &DiscoveryQuery) -> Vec<&'a Store> {
    discover_positions(stores, query)
        .into_iter()
        .map(|i| &stores[i])
        .collect()
}

// --- Interleaving ---

/// How promotional events are mixed into the home list. The two policies
/// are alternatives; a list uses exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterleavePolicy {
    /// One event after every `interval` stores, in fixture order, until
    /// the events run out.
    Repeating { interval: usize },
    /// A single rotating banner after the `after`-th store, never repeated.
    SingleBanner { after: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListEntry<'a> {
    Store(&'a Store),
    Event(&'a PromoEvent),
    RotatingBanner,
}

#[must_use]
pub fn interleave<'a>(
    stores: &[&'a Store],
    events: &'a [PromoEvent],
    policy: InterleavePolicy,
) -> Vec<ListEntry<'a>> {
    let mut out = Vec::with_capacity(stores.len() + events.len());

    match policy {
        InterleavePolicy::Repeating { interval } => {
            let mut pending = events.iter();
            for (i, store) in stores.iter().enumerate() {
                out.push(ListEntry::Store(*store));
                if interval > 0 && (i + 1) % interval == 0 {
                    if let Some(event) = pending.next() {
                        out.push(ListEntry::Event(event));
                    }
                }
            }
        }
        InterleavePolicy::SingleBanner { after } => {
            let show = !events.is_empty() && stores.len() >= after;
            if show && after == 0 {
                out.push(ListEntry::RotatingBanner);
            }
            for (i, store) in stores.iter().enumerate() {
                out.push(ListEntry::Store(*store));
                if show && i + 1 == after {
                    out.push(ListEntry::RotatingBanner);
                }
            }
        }
    }

    out
}

// --- Pagination ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page_size: usize,
    pages: usize,
}

impl Pagination {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            pages: 1,
        }
    }

    #[must_use]
    pub const fn pages(&self) -> usize {
        self.pages
    }

    #[must_use]
    pub fn visible(&self, total: usize) -> usize {
        total.min(self.page_size.saturating_mul(self.pages))
    }

    #[must_use]
    pub fn has_more(&self, total: usize) -> bool {
        self.visible(total) < total
    }

    /// Adds a page when more items remain. Returns whether it did.
    pub fn load_more(&mut self, total: usize) -> bool {
        if self.has_more(total) {
            self.pages += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.pages = 1;
    }

    #[must_use]
    pub fn page<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible(items.len())]
    }
}

// --- Memoization ---

type CacheKey = (u64, DiscoveryQuery);

/// Filter+sort results keyed on catalog revision and query.
pub struct DiscoveryCache {
    entries: LruCache<CacheKey, Vec<usize>>,
    hits: u64,
    misses: u64,
}

impl DiscoveryCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_compute(&mut self, catalog: &Catalog, query: &DiscoveryQuery) -> Vec<usize> {
        let key = (catalog.revision(), query.clone());

        if let Some(positions) = self.entries.get(&key) {
            self.hits += 1;
            trace!(hits = self.hits, "Discovery cache hit");
            return positions.clone();
        }

        self.misses += 1;
        let positions = discover_positions(catalog.stores(), query);
        debug!(
            misses = self.misses,
            results = positions.len(),
            sort = %query.sort_by,
            "Discovery cache miss"
        );
        self.entries.put(key, positions.clone());
        positions
    }

    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DiscoveryCache {
    fn default() -> Self {
        Self::new(crate::DISCOVERY_CACHE_CAPACITY)
    }
}

impl fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

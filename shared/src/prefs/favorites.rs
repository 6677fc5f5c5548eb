use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Persisted, FAVORITES_KEY};
use crate::model::StoreId;

/// Bookmarked stores. A set in memory; a sorted list on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: HashSet<StoreId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesSnapshot {
    pub favorites: Vec<StoreId>,
}

impl Favorites {
    #[must_use]
    pub fn is_favorite(&self, id: &StoreId) -> bool {
        self.ids.contains(id)
    }

    /// Returns whether the store is a favorite afterwards.
    pub fn toggle(&mut self, id: &StoreId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreId> {
        self.ids.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Persisted for Favorites {
    const KEY: &'static str = FAVORITES_KEY;
    type Snapshot = FavoritesSnapshot;

    fn snapshot(&self) -> FavoritesSnapshot {
        let mut favorites: Vec<StoreId> = self.ids.iter().cloned().collect();
        favorites.sort();
        FavoritesSnapshot { favorites }
    }

    fn restore(&mut self, snapshot: FavoritesSnapshot) {
        self.ids = snapshot.favorites.into_iter().collect();
    }
}

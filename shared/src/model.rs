use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::bottom_sheet::{BottomSheet, SheetPosition};
use crate::carousel::Carousel;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::discovery::{DiscoveryCache, DiscoveryQuery, Pagination};
use crate::filter::{FilterState, PickupDate};
use crate::location_picker::LocationPicker;
use crate::map::MapState;
use crate::prefs::favorites::Favorites;
use crate::prefs::saved_locations::SavedLocations;
use crate::prefs::search_history::SearchHistory;
use crate::route::Route;
use crate::search::SearchInput;
use crate::AppError;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(StoreId);
typed_id!(MenuItemId);
typed_id!(EventId);
typed_id!(CurationId);

// --- Coordinates: validated, NaN-safe ---

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        let coords = Self { lat, lng };
        coords.validate()?;
        Ok(coords)
    }

    pub fn validate(self) -> Result<(), CoordinateError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordinateError::LongitudeOutOfRange(self.lng));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

// --- Catalog entities (immutable once loaded) ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub original_price: u32,
    pub sale_price: u32,
}

impl MenuItem {
    #[must_use]
    pub fn discount_rate(&self) -> u32 {
        crate::discount_rate(self.original_price, self.sale_price)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupAvailability {
    pub today: bool,
    pub tomorrow: bool,
}

impl PickupAvailability {
    #[must_use]
    pub const fn on(self, date: PickupDate) -> bool {
        match date {
            PickupDate::Today => self.today,
            PickupDate::Tomorrow => self.tomorrow,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub menu_items: Vec<MenuItem>,
    /// Metres from the current location.
    pub distance: u32,
    #[serde(default)]
    pub is_new: bool,
    pub review_count: u32,
    pub favorite_count: u32,
    pub notification_count: u32,
    pub pickup_available: PickupAvailability,
    pub quick_pickup: bool,
    pub parking_available: bool,
    pub coordinates: Coordinates,
}

impl Store {
    /// `None` for a store without menu items; price sorts rely on that
    /// instead of inventing a price.
    #[must_use]
    pub fn min_sale_price(&self) -> Option<u32> {
        self.menu_items.iter().map(|m| m.sale_price).min()
    }

    #[must_use]
    pub fn max_sale_price(&self) -> Option<u32> {
        self.menu_items.iter().map(|m| m.sale_price).max()
    }

    #[must_use]
    pub fn cheapest_item(&self) -> Option<&MenuItem> {
        self.menu_items.iter().min_by_key(|m| m.sale_price)
    }

    /// Case-insensitive substring match on the store name or any menu item
    /// name. `needle` must already be lowercase.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .menu_items
                .iter()
                .any(|item| item.name.to_lowercase().contains(needle))
    }
}

/// Promotional banner. Called `PromoEvent` so it never collides with the
/// app's `Event` message type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub link: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curation {
    pub id: CurationId,
    pub title: String,
    pub subtitle: String,
    pub emoji: String,
    pub bg_color: String,
}

// --- App model ---

#[derive(Debug)]
pub struct Model {
    pub config: AppConfig,
    pub catalog: Catalog,
    pub route: Route,

    // Query state
    pub filter: FilterState,
    pub favorites_only: bool,
    pub search_input: Option<SearchInput>,

    // Persisted collaborators
    pub favorites: Favorites,
    pub search_history: SearchHistory,
    pub saved_locations: SavedLocations,

    // Presentation state machines
    pub sheet: BottomSheet,
    pub home_page: Pagination,
    pub sheet_page: Pagination,
    pub banner: Carousel,
    pub curation: Carousel,
    pub map: MapState,
    pub location_picker: Option<LocationPicker>,

    pub alert: Option<AppError>,

    // Derived; recomputed by `refresh_discovery`
    home_results: Vec<usize>,
    sheet_results: Vec<usize>,
    home_query: Option<DiscoveryQuery>,
    sheet_query: Option<DiscoveryQuery>,
    discovery_cache: DiscoveryCache,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(AppConfig::default(), Catalog::bundled_or_empty())
    }
}

impl Model {
    /// An invalid config is replaced by the defaults.
    #[must_use]
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "Rejected config, using defaults");
                AppConfig::default()
            }
        };
        let event_count = catalog.events().len();
        let curation_count = catalog.curations().len();

        let mut model = Self {
            filter: FilterState::new(config.default_location.clone()),
            favorites_only: false,
            search_input: None,
            favorites: Favorites::default(),
            search_history: SearchHistory::new(config.search_history_limit),
            saved_locations: SavedLocations::default(),
            sheet: BottomSheet::new(SheetPosition::Half, config.sheet_drag_threshold_px),
            home_page: Pagination::new(config.page_size),
            sheet_page: Pagination::new(config.page_size),
            banner: Carousel::new(event_count),
            curation: Carousel::new(curation_count),
            map: MapState::new(config.default_map_center(), config.default_map_zoom),
            location_picker: None,
            alert: None,
            route: Route::Home,
            home_results: Vec::new(),
            sheet_results: Vec::new(),
            home_query: None,
            sheet_query: None,
            discovery_cache: DiscoveryCache::new(config.discovery_cache_capacity),
            catalog,
            config,
        };
        model.refresh_discovery();
        model
    }

    /// Swaps in a validated config. User state (filters, favorites, saved
    /// history, route, sheet position) survives; everything sized or timed
    /// by the config is rebuilt. Returns true when the history cap dropped
    /// entries and the history needs saving again.
    ///
    /// Carousel timers belong to the caller: stop them before, restart them
    /// after.
    pub fn reconfigure(&mut self, config: AppConfig) -> bool {
        if self.filter.location() == self.config.default_location {
            self.filter.set_location(config.default_location.clone());
        }
        self.sheet.set_threshold(config.sheet_drag_threshold_px);
        self.home_page = Pagination::new(config.page_size);
        self.sheet_page = Pagination::new(config.page_size);
        let history_trimmed = self.search_history.set_limit(config.search_history_limit);
        if config.discovery_cache_capacity != self.config.discovery_cache_capacity {
            self.discovery_cache = DiscoveryCache::new(config.discovery_cache_capacity);
        }
        info!(
            page_size = config.page_size,
            threshold = config.sheet_drag_threshold_px,
            "Config applied"
        );
        self.config = config;
        self.refresh_discovery();
        history_trimmed
    }

    pub fn set_alert(&mut self, error: AppError) {
        self.alert = Some(error);
    }

    pub fn clear_alert(&mut self) {
        self.alert = None;
    }

    /// Query behind the home list: every active filter, no favorites scope.
    #[must_use]
    pub fn home_query(&self) -> DiscoveryQuery {
        DiscoveryQuery::from_filter(&self.filter)
    }

    /// Query behind the map sheet; adds the favorites scope when enabled.
    #[must_use]
    pub fn sheet_query(&self) -> DiscoveryQuery {
        let query = DiscoveryQuery::from_filter(&self.filter);
        if self.favorites_only {
            query.with_favorites_only(&self.favorites)
        } else {
            query
        }
    }

    /// Recomputes both result lists. A changed query drops its list back to
    /// the first page.
    pub fn refresh_discovery(&mut self) {
        let home = self.home_query();
        if self.home_query.as_ref() != Some(&home) {
            self.home_page.reset();
        }
        self.home_results = self.discovery_cache.get_or_compute(&self.catalog, &home);
        self.home_query = Some(home);

        let sheet = self.sheet_query();
        if self.sheet_query.as_ref() != Some(&sheet) {
            self.sheet_page.reset();
        }
        self.sheet_results = self.discovery_cache.get_or_compute(&self.catalog, &sheet);
        self.sheet_query = Some(sheet);
    }

    #[must_use]
    pub fn home_stores(&self) -> Vec<&Store> {
        self.catalog.resolve(&self.home_results)
    }

    #[must_use]
    pub fn sheet_stores(&self) -> Vec<&Store> {
        self.catalog.resolve(&self.sheet_results)
    }

    #[must_use]
    pub fn discovery_cache(&self) -> &DiscoveryCache {
        &self.discovery_cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_prices(prices: &[u32]) -> Store {
        Store {
            id: StoreId::new("s"),
            name: "르뱅쿠키".into(),
            address: "서울 강남구 역삼동".into(),
            menu_items: prices
                .iter()
                .enumerate()
                .map(|(i, p)| MenuItem {
                    id: MenuItemId::new(format!("m{i}")),
                    name: format!("Cookie Box {i}"),
                    image: None,
                    original_price: p * 2,
                    sale_price: *p,
                })
                .collect(),
            distance: 100,
            is_new: false,
            review_count: 0,
            favorite_count: 0,
            notification_count: 0,
            pickup_available: PickupAvailability { today: true, tomorrow: false },
            quick_pickup: false,
            parking_available: false,
            coordinates: Coordinates { lat: 37.5, lng: 127.0 },
        }
    }

    #[test]
    fn test_price_bounds() {
        let store = store_with_prices(&[5_000, 1_000, 3_000]);
        assert_eq!(store.min_sale_price(), Some(1_000));
        assert_eq!(store.max_sale_price(), Some(5_000));
        assert_eq!(store.cheapest_item().map(|m| m.sale_price), Some(1_000));
    }

    #[test]
    fn test_empty_menu_has_no_price() {
        let store = store_with_prices(&[]);
        assert_eq!(store.min_sale_price(), None);
        assert_eq!(store.max_sale_price(), None);
        assert!(store.cheapest_item().is_none());
    }

    #[test]
    fn test_mentions_checks_name_and_menu() {
        let store = store_with_prices(&[1_000]);
        assert!(store.mentions("르뱅"));
        assert!(store.mentions("cookie box"));
        assert!(!store.mentions("bagel"));
    }

    #[test]
    fn test_pickup_availability_by_date() {
        let availability = PickupAvailability { today: true, tomorrow: false };
        assert!(availability.on(PickupDate::Today));
        assert!(!availability.on(PickupDate::Tomorrow));
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(37.5, 127.0).is_ok());
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinates::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(-181.0))
        );
        assert_eq!(Coordinates::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite));
    }

    #[test]
    fn test_store_parses_fixture_shape() {
        let json = r#"{
            "id": "store-x",
            "name": "테스트",
            "address": "서울",
            "menuItems": [{"id": "m", "name": "빵", "originalPrice": 2000, "salePrice": 1000}],
            "distance": 10,
            "reviewCount": 1,
            "favoriteCount": 2,
            "notificationCount": 3,
            "pickupAvailable": {"today": true, "tomorrow": true},
            "quickPickup": true,
            "parkingAvailable": false,
            "coordinates": {"lat": 37.5, "lng": 127.0}
        }"#;
        let store: Store = serde_json::from_str(json).unwrap();
        assert_eq!(store.id, StoreId::new("store-x"));
        assert!(!store.is_new);
        assert_eq!(store.menu_items[0].discount_rate(), 50);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = AppConfig {
            sheet_drag_threshold_px: f64::NAN,
            ..AppConfig::default()
        };
        let model = Model::new(config, Catalog::bundled_or_empty());
        assert_eq!(model.config, AppConfig::default());
        assert!((model.sheet.threshold() - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconfigure_keeps_user_state() {
        let mut model = Model::default();
        model.filter.set_parking_available(true);
        model.home_page.load_more(model.home_stores().len());
        for q in ["a", "b", "c"] {
            model.search_history.add(q);
        }

        let trimmed = model.reconfigure(AppConfig {
            page_size: 2,
            search_history_limit: 2,
            default_location: "서울 성동구".into(),
            ..AppConfig::default()
        });

        assert!(trimmed);
        assert!(model.filter.parking_available());
        assert_eq!(model.filter.location(), "서울 성동구");
        assert_eq!(model.home_page.pages(), 1);
        assert_eq!(model.home_page.visible(model.home_stores().len()), 2);
        assert_eq!(model.search_history.entries(), ["c", "b"]);
    }

    #[test]
    fn test_reconfigure_keeps_a_chosen_location() {
        let mut model = Model::default();
        model.filter.set_location("서울 중구");
        model.reconfigure(AppConfig {
            default_location: "서울 성동구".into(),
            ..AppConfig::default()
        });
        assert_eq!(model.filter.location(), "서울 중구");
    }

    #[test]
    fn test_default_model_starts_on_home_with_half_sheet() {
        let model = Model::default();
        assert_eq!(model.route, Route::Home);
        assert_eq!(model.sheet.position(), SheetPosition::Half);
        assert!(!model.home_stores().is_empty());
    }
}

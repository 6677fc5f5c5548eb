use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupDate {
    #[default]
    Today,
    Tomorrow,
}

impl PickupDate {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "오늘",
            Self::Tomorrow => "내일",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    #[default]
    Distance,
    Reviews,
    Favorites,
    Notifications,
    PriceLow,
    PriceHigh,
}

impl SortOption {
    pub const ALL: [Self; 6] = [
        Self::Distance,
        Self::Reviews,
        Self::Favorites,
        Self::Notifications,
        Self::PriceLow,
        Self::PriceHigh,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Distance => "가까운순",
            Self::Reviews => "리뷰많은순",
            Self::Favorites => "찜많은순",
            Self::Notifications => "알림많은순",
            Self::PriceLow => "낮은가격순",
            Self::PriceHigh => "높은가격순",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Reviews => "reviews",
            Self::Favorites => "favorites",
            Self::Notifications => "notifications",
            Self::PriceLow => "priceLow",
            Self::PriceHigh => "priceHigh",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or_else(|| UnknownSortOption(s.to_string()))
    }
}

/// The active query configuration. Lives for the session only; nothing here
/// is persisted.
///
/// Fields are private so the quick-pickup invariant cannot be bypassed:
/// while the pickup date is tomorrow, quick pickup is always off.
/// Deserializing goes through the same setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FilterFields")]
pub struct FilterState {
    pickup_date: PickupDate,
    quick_pickup: bool,
    parking_available: bool,
    sort_by: SortOption,
    category: Option<String>,
    search_query: String,
    location: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterFields {
    pickup_date: PickupDate,
    quick_pickup: bool,
    parking_available: bool,
    sort_by: SortOption,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    search_query: String,
    location: String,
}

impl From<FilterFields> for FilterState {
    fn from(fields: FilterFields) -> Self {
        let mut filter = Self::new(fields.location);
        filter.set_pickup_date(fields.pickup_date);
        filter.set_quick_pickup(fields.quick_pickup);
        filter.set_parking_available(fields.parking_available);
        filter.set_sort_by(fields.sort_by);
        filter.set_category(fields.category);
        filter.set_search_query(fields.search_query);
        filter
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(crate::DEFAULT_LOCATION)
    }
}

impl FilterState {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            pickup_date: PickupDate::Today,
            quick_pickup: false,
            parking_available: false,
            sort_by: SortOption::Distance,
            category: None,
            search_query: String::new(),
            location: location.into(),
        }
    }

    #[must_use]
    pub const fn pickup_date(&self) -> PickupDate {
        self.pickup_date
    }

    #[must_use]
    pub const fn quick_pickup(&self) -> bool {
        self.quick_pickup
    }

    #[must_use]
    pub const fn parking_available(&self) -> bool {
        self.parking_available
    }

    #[must_use]
    pub const fn sort_by(&self) -> SortOption {
        self.sort_by
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_pickup_date(&mut self, date: PickupDate) {
        self.pickup_date = date;
        if date == PickupDate::Tomorrow && self.quick_pickup {
            debug!("Quick pickup turned off for tomorrow pickup");
            self.quick_pickup = false;
        }
    }

    /// Ignored while the pickup date is tomorrow.
    pub fn set_quick_pickup(&mut self, enabled: bool) {
        if enabled && self.pickup_date == PickupDate::Tomorrow {
            debug!("Quick pickup unavailable for tomorrow, ignoring");
            return;
        }
        self.quick_pickup = enabled;
    }

    pub fn set_parking_available(&mut self, enabled: bool) {
        self.parking_available = enabled;
    }

    pub fn set_sort_by(&mut self, sort: SortOption) {
        self.sort_by = sort;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// An empty label clears the category.
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.trim().is_empty());
    }

    /// Selecting the active category again clears it.
    pub fn toggle_category(&mut self, category: &str) {
        if self.category.as_deref() == Some(category) {
            self.category = None;
        } else {
            self.set_category(Some(category.to_string()));
        }
    }

    /// Resets quick pickup, parking and sort. Date, query, category and
    /// location are left alone.
    pub fn reset(&mut self) {
        self.quick_pickup = false;
        self.parking_available = false;
        self.sort_by = SortOption::Distance;
    }

    /// Number of toggles that differ from the defaults, for the filter badge.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        [
            self.quick_pickup,
            self.parking_available,
            self.sort_by != SortOption::Distance,
        ]
        .into_iter()
        .filter(|on| *on)
        .count()
    }
}

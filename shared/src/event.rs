use serde::{Deserialize, Serialize};

use crate::capabilities::{GeolocationResult, StorageResult};
use crate::filter::{PickupDate, SortOption};
use crate::gesture::{PointerInput, TouchInput};
use crate::model::StoreId;
use crate::prefs::saved_locations::LocationSlot;

// --- Event enum: capability responses boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle & navigation
    AppStarted,
    /// Partial `AppConfig` JSON from the shell, applied over the defaults.
    Configure {
        json: String,
    },
    Navigate {
        path: String,
    },
    DismissAlert,

    // Filters
    SetPickupDate(PickupDate),
    SetQuickPickup(bool),
    SetParkingAvailable(bool),
    SetSortBy(SortOption),
    SetSearchQuery(String),
    /// Selecting the active category again clears it.
    SelectCategory(String),
    ResetFilters,

    // Favorites
    ToggleFavorite {
        store_id: StoreId,
    },
    ToggleFavoritesOnly,

    // Search overlay
    OpenSearchInput,
    CloseSearchInput,
    SearchInputChanged(String),
    SearchInputCleared,
    SearchSubmitted,
    SearchLocationSelected {
        address: String,
    },
    SearchHistorySelected {
        query: String,
    },
    SearchHistoryRemoved {
        query: String,
    },
    SearchHistoryCleared,
    SearchStoreSelected {
        store_id: StoreId,
    },

    // Lists
    LoadMore,
    LoadMoreSheet,

    // Bottom sheet
    SheetTouch(TouchInput),
    SheetPointer(PointerInput),
    SheetHandleTapped,

    // Banners
    BannerTick {
        generation: u64,
    },
    BannerSelected {
        index: usize,
    },
    CurationTick {
        generation: u64,
    },
    CurationSelected {
        index: usize,
    },
    CurationTouchStart,
    CurationTouchEnd,
    CurationResume {
        generation: u64,
    },

    // Map
    MapLoaded,
    MapLoadFailed {
        message: String,
    },
    MapLoadTimedOut {
        attempt: u64,
    },
    MapRetry,
    MarkerClicked {
        store_id: StoreId,
    },
    GoToMyLocation,

    // Location picker
    OpenLocationPicker,
    CloseLocationPicker,
    LocationPickerSearch,
    LocationPickerRegister(LocationSlot),
    LocationPickerQueryChanged(String),
    LocationPickerSubmitted,
    LocationPickerUseCurrentLocation,
    LocationPickerBack,
    LocationPickerConfirmed,
    ClearSavedLocation(LocationSlot),

    // Capability Responses
    FavoritesLoaded(Box<StorageResult>),
    SearchHistoryLoaded(Box<StorageResult>),
    SavedLocationsLoaded(Box<StorageResult>),
    PreferenceSaved {
        key: String,
        result: Box<StorageResult>,
    },
    MyLocationReceived(Box<GeolocationResult>),
    PickerPositionReceived(Box<GeolocationResult>),
}

impl Event {
    /// Stable name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure { .. } => "configure",
            Self::Navigate { .. } => "navigate",
            Self::DismissAlert => "dismiss_alert",
            Self::SetPickupDate(_) => "set_pickup_date",
            Self::SetQuickPickup(_) => "set_quick_pickup",
            Self::SetParkingAvailable(_) => "set_parking_available",
            Self::SetSortBy(_) => "set_sort_by",
            Self::SetSearchQuery(_) => "set_search_query",
            Self::SelectCategory(_) => "select_category",
            Self::ResetFilters => "reset_filters",
            Self::ToggleFavorite { .. } => "toggle_favorite",
            Self::ToggleFavoritesOnly => "toggle_favorites_only",
            Self::OpenSearchInput => "open_search_input",
            Self::CloseSearchInput => "close_search_input",
            Self::SearchInputChanged(_) => "search_input_changed",
            Self::SearchInputCleared => "search_input_cleared",
            Self::SearchSubmitted => "search_submitted",
            Self::SearchLocationSelected { .. } => "search_location_selected",
            Self::SearchHistorySelected { .. } => "search_history_selected",
            Self::SearchHistoryRemoved { .. } => "search_history_removed",
            Self::SearchHistoryCleared => "search_history_cleared",
            Self::SearchStoreSelected { .. } => "search_store_selected",
            Self::LoadMore => "load_more",
            Self::LoadMoreSheet => "load_more_sheet",
            Self::SheetTouch(_) => "sheet_touch",
            Self::SheetPointer(_) => "sheet_pointer",
            Self::SheetHandleTapped => "sheet_handle_tapped",
            Self::BannerTick { .. } => "banner_tick",
            Self::BannerSelected { .. } => "banner_selected",
            Self::CurationTick { .. } => "curation_tick",
            Self::CurationSelected { .. } => "curation_selected",
            Self::CurationTouchStart => "curation_touch_start",
            Self::CurationTouchEnd => "curation_touch_end",
            Self::CurationResume { .. } => "curation_resume",
            Self::MapLoaded => "map_loaded",
            Self::MapLoadFailed { .. } => "map_load_failed",
            Self::MapLoadTimedOut { .. } => "map_load_timed_out",
            Self::MapRetry => "map_retry",
            Self::MarkerClicked { .. } => "marker_clicked",
            Self::GoToMyLocation => "go_to_my_location",
            Self::OpenLocationPicker => "open_location_picker",
            Self::CloseLocationPicker => "close_location_picker",
            Self::LocationPickerSearch => "location_picker_search",
            Self::LocationPickerRegister(_) => "location_picker_register",
            Self::LocationPickerQueryChanged(_) => "location_picker_query_changed",
            Self::LocationPickerSubmitted => "location_picker_submitted",
            Self::LocationPickerUseCurrentLocation => "location_picker_use_current_location",
            Self::LocationPickerBack => "location_picker_back",
            Self::LocationPickerConfirmed => "location_picker_confirmed",
            Self::ClearSavedLocation(_) => "clear_saved_location",
            Self::FavoritesLoaded(_) => "favorites_loaded",
            Self::SearchHistoryLoaded(_) => "search_history_loaded",
            Self::SavedLocationsLoaded(_) => "saved_locations_loaded",
            Self::PreferenceSaved { .. } => "preference_saved",
            Self::MyLocationReceived(_) => "my_location_received",
            Self::PickerPositionReceived(_) => "picker_position_received",
        }
    }

    /// False for shell configuration, timer ticks and capability responses.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::Configure { .. }
                | Self::BannerTick { .. }
                | Self::CurationTick { .. }
                | Self::CurationResume { .. }
                | Self::MapLoaded
                | Self::MapLoadFailed { .. }
                | Self::MapLoadTimedOut { .. }
                | Self::FavoritesLoaded(_)
                | Self::SearchHistoryLoaded(_)
                | Self::SavedLocationsLoaded(_)
                | Self::PreferenceSaved { .. }
                | Self::MyLocationReceived(_)
                | Self::PickerPositionReceived(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(size <= 64, "Event enum is {size} bytes, box more variants");
    }

    #[test]
    fn ticks_are_not_user_initiated() {
        assert!(!Event::BannerTick { generation: 1 }.is_user_initiated());
        assert!(Event::SheetHandleTapped.is_user_initiated());
    }

    #[test]
    fn events_cross_the_bridge_as_json() {
        let event = Event::ToggleFavorite {
            store_id: StoreId::new("store-1"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"ToggleFavorite":{"store_id":"store-1"}}"#);
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
    }
}

//! Event handling. Every handler mutates the model through its state
//! containers and then asks the shell to render; side effects go out
//! through the capabilities.

use tracing::{debug, info, warn};

use crate::capabilities::timer::{
    BANNER_ROTATION, CURATION_RESUME, CURATION_ROTATION, MAP_LOAD_TIMEOUT,
};
use crate::capabilities::{Capabilities, GeolocationResult, StorageResult};
use crate::config::AppConfig;
use crate::discovery::InterleavePolicy;
use crate::event::Event;
use crate::gesture::GestureSource;
use crate::location_picker::LocationPicker;
use crate::map::MapStatus;
use crate::model::{Coordinates, Model};
use crate::prefs::Persisted;
use crate::route::Route;
use crate::search::SearchInput;
use crate::view::{self, ViewModel};
use crate::AppError;

#[derive(Default)]
pub struct App;

impl App {
    // --- Preferences ---

    fn persist<T: Persisted + 'static>(value: &T, caps: &Capabilities) {
        let key = T::KEY;
        match value.to_bytes() {
            Ok(bytes) => caps.storage.set(key, bytes, move |result| Event::PreferenceSaved {
                key: key.to_string(),
                result: Box::new(result),
            }),
            Err(e) => warn!(key, error = %e, "Failed to encode preferences"),
        }
    }

    /// Returns true when the stored snapshot replaced the in-memory state.
    /// Anything unreadable leaves the defaults in place.
    fn restore<T: Persisted>(target: &mut T, result: StorageResult) -> bool {
        match result {
            Ok(Some(bytes)) => match target.load_bytes(&bytes) {
                Ok(()) => {
                    debug!(key = T::KEY, bytes = bytes.len(), "Restored preferences");
                    true
                }
                Err(e) => {
                    warn!(key = T::KEY, error = %AppError::from(e), "Discarded stored preferences");
                    false
                }
            },
            Ok(None) => {
                debug!(key = T::KEY, "No stored preferences");
                false
            }
            Err(e) => {
                warn!(key = T::KEY, error = %AppError::from(e), "Failed to read preferences");
                false
            }
        }
    }

    fn remember_search(query: &str, model: &mut Model, caps: &Capabilities) {
        if model.search_history.add(query) {
            Self::persist(&model.search_history, caps);
        }
    }

    /// Applies a picked suggestion as the list query and closes the overlay.
    fn apply_search(text: &str, model: &mut Model, caps: &Capabilities) {
        Self::remember_search(text, model, caps);
        model.filter.set_search_query(text.trim());
        model.search_input = None;
        model.refresh_discovery();
    }

    // --- Routes ---

    fn banner_rotates_on(route: &Route, policy: InterleavePolicy) -> bool {
        route.shows_map()
            || (*route == Route::Home && matches!(policy, InterleavePolicy::SingleBanner { .. }))
    }

    fn navigate(route: Route, model: &mut Model, caps: &Capabilities) {
        model.search_input = None;
        model.location_picker = None;
        if route == model.route {
            return;
        }
        info!(from = %model.route, to = %route, "Navigating");
        Self::leave_route(model, caps);
        model.route = route;
        Self::enter_route(model, caps);
    }

    fn enter_route(model: &mut Model, caps: &Capabilities) {
        Self::start_carousels(model, caps);
        if model.route.shows_map() {
            model.map.clear_selection();
            model.sheet.set_position(crate::bottom_sheet::SheetPosition::Half);
            Self::start_map_load(model, caps);
        }
    }

    /// Page teardown: nothing armed by the old page may fire afterwards.
    fn leave_route(model: &mut Model, caps: &Capabilities) {
        Self::stop_carousels(model, caps);
        if model.route.shows_map() {
            model.map.cancel_loading();
            caps.timer.cancel(MAP_LOAD_TIMEOUT);
        }
    }

    // --- Timers ---

    fn start_carousels(model: &mut Model, caps: &Capabilities) {
        if Self::banner_rotates_on(&model.route, model.config.home_list_policy) {
            if let Some(generation) = model.banner.start() {
                Self::arm_banner(generation, model, caps);
            }
        }
        if model.route == Route::Home {
            if let Some(generation) = model.curation.start() {
                Self::arm_curation(generation, model, caps);
            }
        }
    }

    fn stop_carousels(model: &mut Model, caps: &Capabilities) {
        if Self::banner_rotates_on(&model.route, model.config.home_list_policy) {
            model.banner.stop();
            caps.timer.cancel(BANNER_ROTATION);
        }
        if model.route == Route::Home {
            model.curation.stop();
            caps.timer.cancel(CURATION_ROTATION);
            caps.timer.cancel(CURATION_RESUME);
        }
    }

    fn arm_banner(generation: u64, model: &Model, caps: &Capabilities) {
        caps.timer.start(
            BANNER_ROTATION,
            model.config.banner_rotation_ms,
            Event::BannerTick { generation },
        );
    }

    fn arm_curation(generation: u64, model: &Model, caps: &Capabilities) {
        caps.timer.start(
            CURATION_ROTATION,
            model.config.curation_rotation_ms,
            Event::CurationTick { generation },
        );
    }

    fn start_map_load(model: &mut Model, caps: &Capabilities) {
        let attempt = model.map.begin_loading();
        debug!(attempt, "Waiting for map");
        caps.timer.start(
            MAP_LOAD_TIMEOUT,
            model.config.map_load_timeout_ms,
            Event::MapLoadTimedOut { attempt },
        );
    }

    // --- Geolocation ---

    fn position_from(result: GeolocationResult, model: &mut Model) -> Option<Coordinates> {
        match result.and_then(|p| p.coordinates()) {
            Ok(coordinates) => Some(coordinates),
            Err(e) => {
                warn!(error = %e, "Geolocation failed");
                model.set_alert(AppError::from(e));
                None
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    #[allow(clippy::too_many_lines)]
    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user = event.is_user_initiated(),
            "Handling event"
        );

        match event {
            Event::AppStarted => {
                caps.storage.get(crate::prefs::FAVORITES_KEY, |r| {
                    Event::FavoritesLoaded(Box::new(r))
                });
                caps.storage.get(crate::prefs::SEARCH_HISTORY_KEY, |r| {
                    Event::SearchHistoryLoaded(Box::new(r))
                });
                caps.storage.get(crate::prefs::SAVED_LOCATIONS_KEY, |r| {
                    Event::SavedLocationsLoaded(Box::new(r))
                });
                info!(
                    stores = model.catalog.stores().len(),
                    events = model.catalog.events().len(),
                    "App started"
                );
                Self::enter_route(model, caps);
                caps.render.render();
            }

            Event::Configure { json } => match AppConfig::from_json(&json) {
                Ok(config) => {
                    // Intervals and the banner policy may change under a
                    // running rotation.
                    Self::stop_carousels(model, caps);
                    if model.reconfigure(config) {
                        Self::persist(&model.search_history, caps);
                    }
                    Self::start_carousels(model, caps);
                    caps.render.render();
                }
                Err(e) => {
                    let error = AppError::from(e);
                    warn!(error = %error, "Rejected config from shell");
                    model.set_alert(error);
                    caps.render.render();
                }
            },

            Event::Navigate { path } => {
                Self::navigate(Route::parse(&path), model, caps);
                caps.render.render();
            }

            Event::DismissAlert => {
                model.clear_alert();
                caps.render.render();
            }

            // --- Filters ---
            Event::SetPickupDate(date) => {
                model.filter.set_pickup_date(date);
                model.refresh_discovery();
                caps.render.render();
            }

            Event::SetQuickPickup(enabled) => {
                model.filter.set_quick_pickup(enabled);
                model.refresh_discovery();
                caps.render.render();
            }

            Event::SetParkingAvailable(enabled) => {
                model.filter.set_parking_available(enabled);
                model.refresh_discovery();
                caps.render.render();
            }

            Event::SetSortBy(sort) => {
                model.filter.set_sort_by(sort);
                model.refresh_discovery();
                caps.render.render();
            }

            Event::SetSearchQuery(query) => {
                model.filter.set_search_query(query);
                model.refresh_discovery();
                caps.render.render();
            }

            Event::SelectCategory(category) => {
                model.filter.toggle_category(&category);
                model.search_input = None;
                model.refresh_discovery();
                caps.render.render();
            }

            Event::ResetFilters => {
                model.filter.reset();
                model.refresh_discovery();
                caps.render.render();
            }

            // --- Favorites ---
            Event::ToggleFavorite { store_id } => {
                if let Err(e) = model.catalog.store(&store_id) {
                    warn!(error = %e, "Ignored favorite toggle");
                    return;
                }
                let now_favorite = model.favorites.toggle(&store_id);
                info!(store = %store_id, now_favorite, "Favorite toggled");
                Self::persist(&model.favorites, caps);
                model.refresh_discovery();
                caps.render.render();
            }

            Event::ToggleFavoritesOnly => {
                model.favorites_only = !model.favorites_only;
                model.refresh_discovery();
                caps.render.render();
            }

            // --- Search overlay ---
            Event::OpenSearchInput => {
                let mut input = SearchInput::default();
                input.set_value(model.filter.search_query());
                model.search_input = Some(input);
                caps.render.render();
            }

            Event::CloseSearchInput => {
                model.search_input = None;
                caps.render.render();
            }

            Event::SearchInputChanged(value) => {
                if let Some(input) = model.search_input.as_mut() {
                    input.set_value(value);
                    caps.render.render();
                }
            }

            Event::SearchInputCleared => {
                if let Some(input) = model.search_input.as_mut() {
                    input.clear();
                    caps.render.render();
                }
            }

            Event::SearchSubmitted => {
                let submitted = model.search_input.as_mut().and_then(SearchInput::submit);
                if let Some(query) = submitted {
                    Self::remember_search(&query, model, caps);
                    caps.render.render();
                }
            }

            Event::SearchLocationSelected { address } => {
                Self::apply_search(&address, model, caps);
                caps.render.render();
            }

            Event::SearchHistorySelected { query } => {
                Self::apply_search(&query, model, caps);
                caps.render.render();
            }

            Event::SearchHistoryRemoved { query } => {
                if model.search_history.remove(&query) {
                    Self::persist(&model.search_history, caps);
                    caps.render.render();
                }
            }

            Event::SearchHistoryCleared => {
                model.search_history.clear();
                let key = crate::prefs::SEARCH_HISTORY_KEY;
                caps.storage.remove(key, move |result| Event::PreferenceSaved {
                    key: key.to_string(),
                    result: Box::new(result),
                });
                caps.render.render();
            }

            Event::SearchStoreSelected { store_id } => {
                let submitted = model
                    .search_input
                    .as_ref()
                    .and_then(SearchInput::submitted)
                    .map(str::to_string);
                if let Some(query) = submitted {
                    Self::remember_search(&query, model, caps);
                }
                Self::navigate(Route::StoreDetail(store_id), model, caps);
                caps.render.render();
            }

            // --- Lists ---
            Event::LoadMore => {
                let total = model.home_stores().len();
                if model.home_page.load_more(total) {
                    caps.render.render();
                }
            }

            Event::LoadMoreSheet => {
                let total = model.sheet_stores().len();
                if model.sheet_page.load_more(total) {
                    caps.render.render();
                }
            }

            // --- Bottom sheet ---
            Event::SheetTouch(input) => {
                if let Some(gesture) = input.gesture() {
                    model.sheet.apply(gesture);
                    caps.render.render();
                }
            }

            Event::SheetPointer(input) => {
                if let Some(gesture) = input.gesture() {
                    model.sheet.apply(gesture);
                    caps.render.render();
                }
            }

            Event::SheetHandleTapped => {
                model.sheet.tap_handle();
                caps.render.render();
            }

            // --- Banners ---
            Event::BannerTick { generation } => {
                if let Some(next) = model.banner.tick(generation) {
                    Self::arm_banner(next, model, caps);
                    caps.render.render();
                }
            }

            Event::BannerSelected { index } => {
                if let Some(next) = model.banner.select(index) {
                    caps.timer.cancel(BANNER_ROTATION);
                    Self::arm_banner(next, model, caps);
                }
                caps.render.render();
            }

            Event::CurationTick { generation } => {
                if let Some(next) = model.curation.tick(generation) {
                    Self::arm_curation(next, model, caps);
                    caps.render.render();
                }
            }

            Event::CurationSelected { index } => {
                if let Some(next) = model.curation.select(index) {
                    caps.timer.cancel(CURATION_ROTATION);
                    Self::arm_curation(next, model, caps);
                }
                caps.render.render();
            }

            Event::CurationTouchStart => {
                if model.curation.pause() {
                    caps.timer.cancel(CURATION_ROTATION);
                    caps.timer.cancel(CURATION_RESUME);
                }
            }

            Event::CurationTouchEnd => {
                if let Some(generation) = model.curation.schedule_resume() {
                    caps.timer.start(
                        CURATION_RESUME,
                        model.config.curation_resume_delay_ms,
                        Event::CurationResume { generation },
                    );
                }
            }

            Event::CurationResume { generation } => {
                if let Some(next) = model.curation.resume(generation) {
                    Self::arm_curation(next, model, caps);
                }
            }

            // --- Map ---
            Event::MapLoaded => {
                if model.route.shows_map() && model.map.mark_loaded() {
                    caps.timer.cancel(MAP_LOAD_TIMEOUT);
                    caps.render.render();
                }
            }

            Event::MapLoadFailed { message } => {
                if model.route.shows_map() && model.map.mark_failed(message) {
                    caps.timer.cancel(MAP_LOAD_TIMEOUT);
                    caps.render.render();
                }
            }

            Event::MapLoadTimedOut { attempt } => {
                if model
                    .map
                    .load_timed_out(attempt, model.config.map_load_timeout_ms)
                {
                    caps.render.render();
                }
            }

            Event::MapRetry => {
                if matches!(model.map.status(), MapStatus::Unavailable { .. }) {
                    Self::start_map_load(model, caps);
                    caps.render.render();
                }
            }

            Event::MarkerClicked { store_id } => match model.catalog.store(&store_id) {
                Ok(_) => {
                    model.map.select_store(store_id);
                    caps.render.render();
                }
                Err(e) => warn!(error = %e, "Ignored marker click"),
            },

            Event::GoToMyLocation => {
                if model.map.begin_locating() {
                    caps.geolocation
                        .current_position(|r| Event::MyLocationReceived(Box::new(r)));
                    caps.render.render();
                }
            }

            Event::MyLocationReceived(result) => {
                model.map.finish_locating();
                if let Some(position) = Self::position_from(*result, model) {
                    model
                        .map
                        .show_my_location(position, model.config.my_location_zoom);
                }
                caps.render.render();
            }

            // --- Location picker ---
            Event::OpenLocationPicker => {
                model.location_picker = Some(LocationPicker::new());
                caps.render.render();
            }

            Event::CloseLocationPicker => {
                model.location_picker = None;
                caps.render.render();
            }

            Event::LocationPickerSearch => {
                if let Some(picker) = model.location_picker.as_mut() {
                    picker.open_search();
                    caps.render.render();
                }
            }

            Event::LocationPickerRegister(slot) => {
                if let Some(picker) = model.location_picker.as_mut() {
                    picker.start_register(slot);
                    caps.render.render();
                }
            }

            Event::LocationPickerQueryChanged(query) => {
                if let Some(picker) = model.location_picker.as_mut() {
                    picker.set_query(query);
                    caps.render.render();
                }
            }

            Event::LocationPickerSubmitted => {
                if let Some(picker) = model.location_picker.as_mut() {
                    if picker.submit_search() {
                        caps.render.render();
                    }
                }
            }

            Event::LocationPickerUseCurrentLocation => {
                if model.location_picker.is_some() {
                    caps.geolocation
                        .current_position(|r| Event::PickerPositionReceived(Box::new(r)));
                }
            }

            Event::PickerPositionReceived(result) => {
                if let Some(position) = Self::position_from(*result, model) {
                    if let Some(picker) = model.location_picker.as_mut() {
                        picker.use_position(position);
                    }
                }
                caps.render.render();
            }

            Event::LocationPickerBack => {
                if let Some(picker) = model.location_picker.as_mut() {
                    if !picker.back() {
                        model.location_picker = None;
                    }
                    caps.render.render();
                }
            }

            Event::LocationPickerConfirmed => {
                let Some(confirmed) = model.location_picker.as_ref().and_then(LocationPicker::confirm)
                else {
                    return;
                };
                if let Some(slot) = confirmed.save_as {
                    model.saved_locations.set(slot, confirmed.address.clone());
                    Self::persist(&model.saved_locations, caps);
                }
                info!(address = %confirmed.address, "Browsing location changed");
                model.filter.set_location(confirmed.address);
                model.location_picker = None;
                model.refresh_discovery();
                caps.render.render();
            }

            Event::ClearSavedLocation(slot) => {
                model.saved_locations.clear(slot);
                Self::persist(&model.saved_locations, caps);
                caps.render.render();
            }

            // --- Capability responses ---
            Event::FavoritesLoaded(result) => {
                if Self::restore(&mut model.favorites, *result) {
                    model.refresh_discovery();
                    caps.render.render();
                }
            }

            Event::SearchHistoryLoaded(result) => {
                if Self::restore(&mut model.search_history, *result) {
                    caps.render.render();
                }
            }

            Event::SavedLocationsLoaded(result) => {
                if Self::restore(&mut model.saved_locations, *result) {
                    caps.render.render();
                }
            }

            Event::PreferenceSaved { key, result } => match *result {
                Ok(_) => debug!(%key, "Preferences saved"),
                Err(e) => warn!(%key, error = %AppError::from(e), "Failed to save preferences"),
            },
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        view::build(model)
    }
}

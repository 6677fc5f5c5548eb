//! Everything the shell renders, derived from the model on demand.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bottom_sheet::{SheetHeight, SheetPosition};
use crate::discovery::{interleave, ListEntry};
use crate::filter::{PickupDate, SortOption};
use crate::location_picker::{AddressCandidate, PickerView};
use crate::map::{markers, markers_feature_collection, Bounds, MapMarker, MapStatus};
use crate::model::{Coordinates, Curation, MenuItem, Model, PromoEvent, Store, StoreId};
use crate::route::Route;
use crate::search::{grouped_search, highlight, LocationMatch, Segment};
use crate::{discount_rate, format_distance, format_price, AppError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub path: String,
    pub page: PageView,
    pub filter: FilterView,
    pub search_overlay: Option<SearchOverlayView>,
    pub location_picker: Option<LocationPickerView>,
    pub alert: Option<AlertView>,
    /// Bottom navigation hides while a modal is up.
    pub modal_open: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "page", content = "data", rename_all = "camelCase")]
pub enum PageView {
    Home(HomeView),
    Search(MapPageView),
    Map(MapPageView),
    StoreDetail(StoreDetailView),
    EventDetail(EventView),
    Explore,
    Guide,
    MyPage(MyPageView),
    OrderStatus,
    NotFound(NotFoundView),
}

// --- Cards ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoreCardView {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub distance: String,
    pub is_new: bool,
    pub review_count: u32,
    pub favorite_count: u32,
    pub notification_count: u32,
    pub quick_pickup: bool,
    pub parking_available: bool,
    pub is_favorite: bool,
    /// Cheapest item's sale price, `None` for an empty menu.
    pub lowest_price: Option<String>,
    pub original_price: Option<String>,
    pub discount_rate: Option<u32>,
    pub href: String,
}

impl StoreCardView {
    fn new(store: &Store, model: &Model) -> Self {
        let cheapest = store.cheapest_item();
        Self {
            id: store.id.clone(),
            name: store.name.clone(),
            address: store.address.clone(),
            distance: format_distance(store.distance),
            is_new: store.is_new,
            review_count: store.review_count,
            favorite_count: store.favorite_count,
            notification_count: store.notification_count,
            quick_pickup: store.quick_pickup,
            parking_available: store.parking_available,
            is_favorite: model.favorites.is_favorite(&store.id),
            lowest_price: cheapest.map(|m| format_price(m.sale_price)),
            original_price: cheapest.map(|m| format_price(m.original_price)),
            discount_rate: cheapest.map(MenuItem::discount_rate),
            href: Route::StoreDetail(store.id.clone()).to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub link: String,
}

impl From<&PromoEvent> for EventView {
    fn from(event: &PromoEvent) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            image: event.image.clone(),
            link: event.link.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BannerView {
    pub index: usize,
    pub total: usize,
    pub event: EventView,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CurationView {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub emoji: String,
    pub bg_color: String,
}

impl From<&Curation> for CurationView {
    fn from(c: &Curation) -> Self {
        Self {
            id: c.id.to_string(),
            title: c.title.clone(),
            subtitle: c.subtitle.clone(),
            emoji: c.emoji.clone(),
            bg_color: c.bg_color.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "item", rename_all = "camelCase")]
pub enum ListEntryView {
    Store(StoreCardView),
    Event(EventView),
    RotatingBanner(BannerView),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EmptyState {
    NoResults,
    NoFavorites,
}

impl EmptyState {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoResults => "조건에 맞는 가게가 없습니다",
            Self::NoFavorites => "찜한 가게가 없습니다",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmptyStateView {
    pub kind: EmptyState,
    pub message: String,
}

impl From<EmptyState> for EmptyStateView {
    fn from(kind: EmptyState) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }
}

// --- Pages ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HomeView {
    pub curations: Vec<CurationView>,
    pub curation_index: Option<usize>,
    pub entries: Vec<ListEntryView>,
    pub total: usize,
    pub has_more: bool,
    pub empty_state: Option<EmptyStateView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapPageView {
    pub map: MapView,
    pub sheet: SheetView,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapView {
    pub status: MapStatus,
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    pub bounds: Option<Bounds>,
    /// The markers as a GeoJSON `FeatureCollection`.
    pub markers_geojson: String,
    pub selected: Option<StoreCardView>,
    pub my_location: Option<Coordinates>,
    pub locating: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SheetView {
    pub position: SheetPosition,
    pub height: SheetHeight,
    pub dragging: bool,
    pub drag_offset: f64,
    pub favorites_only: bool,
    pub banner: Option<BannerView>,
    pub stores: Vec<StoreCardView>,
    pub total: usize,
    pub has_more: bool,
    pub empty_state: Option<EmptyStateView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub original_price: String,
    pub sale_price: String,
    pub discount_rate: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoreDetailView {
    pub store: StoreCardView,
    pub menu: Vec<MenuItemView>,
    pub pickup_today: bool,
    pub pickup_tomorrow: bool,
    pub coordinates: Coordinates,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MyPageView {
    pub favorites: Vec<StoreCardView>,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
    pub recent_searches: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NotFoundView {
    pub message: String,
    pub recovery_path: String,
    pub recovery_label: String,
}

impl NotFoundView {
    fn new(message: String) -> Self {
        Self {
            message,
            recovery_path: Route::Home.to_string(),
            recovery_label: "홈으로 돌아가기".to_string(),
        }
    }
}

// --- Chrome ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OptionView<T> {
    pub value: T,
    pub label: String,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilterView {
    pub location: String,
    pub pickup_date: PickupDate,
    pub quick_pickup: bool,
    /// Quick pickup only applies to same-day pickup.
    pub quick_pickup_enabled: bool,
    pub parking_available: bool,
    pub sort_by: SortOption,
    pub sort_label: String,
    pub sort_options: Vec<OptionView<SortOption>>,
    pub categories: Vec<OptionView<String>>,
    pub search_query: String,
    pub active_count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchStoreView {
    pub id: StoreId,
    pub name: Vec<Segment>,
    pub address: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchMenuView {
    pub store_id: StoreId,
    pub store_name: String,
    pub menu_name: Vec<Segment>,
    pub sale_price: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchOverlayView {
    pub value: String,
    pub submitted: Option<String>,
    pub history: Vec<String>,
    pub locations: Vec<LocationMatch>,
    pub stores: Vec<SearchStoreView>,
    pub menus: Vec<SearchMenuView>,
    pub no_results: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LocationPickerView {
    pub view: PickerView,
    pub title: String,
    pub confirm_label: String,
    pub query: String,
    pub selected: Option<AddressCandidate>,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AlertView {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for AlertView {
    fn from(e: &AppError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.user_facing_message(),
        }
    }
}

// --- Assembly ---

#[must_use]
pub fn build(model: &Model) -> ViewModel {
    let page = match &model.route {
        Route::Home => PageView::Home(home(model)),
        Route::Search => PageView::Search(map_page(model)),
        Route::Map => PageView::Map(map_page(model)),
        Route::StoreDetail(id) => store_detail(model, id),
        Route::EventDetail(id) => match model.catalog.event(id) {
            Ok(event) => PageView::EventDetail(event.into()),
            Err(e) => not_found(e.into()),
        },
        Route::Explore => PageView::Explore,
        Route::Guide => PageView::Guide,
        Route::MyPage => PageView::MyPage(my_page(model)),
        Route::OrderStatus => PageView::OrderStatus,
        Route::NotFound(path) => not_found(crate::route::RouteError { path: path.clone() }.into()),
    };

    ViewModel {
        path: model.route.to_string(),
        page,
        filter: filter(model),
        search_overlay: model.search_input.as_ref().map(|_| search_overlay(model)),
        location_picker: model.location_picker.as_ref().map(|p| LocationPickerView {
            view: p.view(),
            title: p.title().to_string(),
            confirm_label: p.confirm_label().to_string(),
            query: p.query().to_string(),
            selected: p.selected().cloned(),
            home_address: model.saved_locations.home.clone(),
            work_address: model.saved_locations.work.clone(),
        }),
        alert: model.alert.as_ref().map(AlertView::from),
        modal_open: model.location_picker.is_some() || model.search_input.is_some(),
    }
}

fn cards(stores: &[&Store], model: &Model) -> Vec<StoreCardView> {
    stores.iter().map(|s| StoreCardView::new(s, model)).collect()
}

fn banner(model: &Model) -> Option<BannerView> {
    let index = model.banner.current()?;
    let event = model.catalog.events().get(index)?;
    Some(BannerView {
        index,
        total: model.catalog.events().len(),
        event: event.into(),
    })
}

fn home(model: &Model) -> HomeView {
    let stores = model.home_stores();
    let visible = model.home_page.page(&stores);
    let policy = model.config.home_list_policy;

    let entries = interleave(visible, model.catalog.events(), policy)
        .into_iter()
        .filter_map(|entry| match entry {
            ListEntry::Store(store) => Some(ListEntryView::Store(StoreCardView::new(store, model))),
            ListEntry::Event(event) => Some(ListEntryView::Event(event.into())),
            ListEntry::RotatingBanner => banner(model).map(ListEntryView::RotatingBanner),
        })
        .collect();

    HomeView {
        curations: model.catalog.curations().iter().map(CurationView::from).collect(),
        curation_index: model.curation.current(),
        entries,
        total: stores.len(),
        has_more: model.home_page.has_more(stores.len()),
        empty_state: stores.is_empty().then(|| EmptyState::NoResults.into()),
    }
}

fn map_page(model: &Model) -> MapPageView {
    let stores = model.sheet_stores();
    let markers = markers(&stores);
    let selected_id = model.map.selected();

    let markers_geojson = serde_json::to_string(&markers_feature_collection(&markers, selected_id))
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to encode map markers");
            String::new()
        });

    let selected = selected_id
        .and_then(|id| model.catalog.store(id).ok())
        .map(|s| StoreCardView::new(s, model));

    let empty_state = if model.favorites_only && model.favorites.is_empty() {
        Some(EmptyState::NoFavorites.into())
    } else if stores.is_empty() {
        Some(EmptyState::NoResults.into())
    } else {
        None
    };

    let position = model.sheet.position();
    MapPageView {
        map: MapView {
            status: model.map.status().clone(),
            center: model.map.center(),
            zoom: model.map.zoom(),
            bounds: Bounds::around(&markers),
            markers_geojson,
            markers,
            selected,
            my_location: model.map.my_location(),
            locating: model.map.is_locating(),
        },
        sheet: SheetView {
            position,
            height: position.height(model.config.sheet_collapsed_height_px),
            dragging: model.sheet.is_dragging(),
            drag_offset: model.sheet.drag_delta(),
            favorites_only: model.favorites_only,
            banner: banner(model),
            stores: cards(model.sheet_page.page(&stores), model),
            total: stores.len(),
            has_more: model.sheet_page.has_more(stores.len()),
            empty_state,
        },
    }
}

fn store_detail(model: &Model, id: &StoreId) -> PageView {
    let store = match model.catalog.store(id) {
        Ok(store) => store,
        Err(e) => return not_found(e.into()),
    };
    PageView::StoreDetail(StoreDetailView {
        store: StoreCardView::new(store, model),
        menu: store
            .menu_items
            .iter()
            .map(|m| MenuItemView {
                id: m.id.to_string(),
                name: m.name.clone(),
                image: m.image.clone(),
                original_price: format_price(m.original_price),
                sale_price: format_price(m.sale_price),
                discount_rate: discount_rate(m.original_price, m.sale_price),
            })
            .collect(),
        pickup_today: store.pickup_available.today,
        pickup_tomorrow: store.pickup_available.tomorrow,
        coordinates: store.coordinates,
    })
}

fn my_page(model: &Model) -> MyPageView {
    let favorites: Vec<&Store> = model
        .catalog
        .stores()
        .iter()
        .filter(|s| model.favorites.is_favorite(&s.id))
        .collect();
    MyPageView {
        favorites: cards(&favorites, model),
        home_address: model.saved_locations.home.clone(),
        work_address: model.saved_locations.work.clone(),
        recent_searches: model.search_history.entries().to_vec(),
    }
}

fn not_found(error: AppError) -> PageView {
    PageView::NotFound(NotFoundView::new(error.user_facing_message()))
}

fn filter(model: &Model) -> FilterView {
    let f = &model.filter;
    FilterView {
        location: f.location().to_string(),
        pickup_date: f.pickup_date(),
        quick_pickup: f.quick_pickup(),
        quick_pickup_enabled: f.pickup_date() == PickupDate::Today,
        parking_available: f.parking_available(),
        sort_by: f.sort_by(),
        sort_label: f.sort_by().label().to_string(),
        sort_options: SortOption::ALL
            .into_iter()
            .map(|opt| OptionView {
                value: opt,
                label: opt.label().to_string(),
                selected: opt == f.sort_by(),
            })
            .collect(),
        categories: crate::CATEGORIES
            .iter()
            .map(|c| OptionView {
                value: (*c).to_string(),
                label: (*c).to_string(),
                selected: f.category() == Some(*c),
            })
            .collect(),
        search_query: f.search_query().to_string(),
        active_count: f.active_filter_count(),
    }
}

fn search_overlay(model: &Model) -> SearchOverlayView {
    let input = model.search_input.clone().unwrap_or_default();
    let submitted = input.submitted().map(str::to_string);

    let (locations, stores, menus) = match submitted.as_deref() {
        Some(query) => {
            let results = grouped_search(model.catalog.stores(), query, model.config.menu_result_limit);
            let stores = results
                .stores
                .iter()
                .map(|s| SearchStoreView {
                    id: s.id.clone(),
                    name: highlight(&s.name, query),
                    address: s.address.clone(),
                })
                .collect();
            let menus = results
                .menus
                .iter()
                .map(|m| SearchMenuView {
                    store_id: m.store.id.clone(),
                    store_name: m.store.name.clone(),
                    menu_name: highlight(&m.item.name, query),
                    sale_price: format_price(m.item.sale_price),
                })
                .collect();
            (results.locations, stores, menus)
        }
        None => (Vec::new(), Vec::new(), Vec::new()),
    };

    SearchOverlayView {
        no_results: submitted.is_some()
            && locations.is_empty()
            && stores.is_empty()
            && menus.is_empty(),
        value: input.value().to_string(),
        submitted,
        history: model.search_history.entries().to_vec(),
        locations,
        stores,
        menus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::InterleavePolicy;
    use crate::model::EventId;

    mod page_tests {
        use super::*;

        #[test]
        fn test_home_interleaves_events_every_third_store() {
            let model = Model::default();
            let view = build(&model);
            let PageView::Home(home) = view.page else {
                panic!("expected home page");
            };

            assert_eq!(home.total, 10);
            assert!(!home.has_more);
            assert!(matches!(home.entries[3], ListEntryView::Event(ref e) if e.id == "event-1"));
            assert!(matches!(home.entries[7], ListEntryView::Event(ref e) if e.id == "event-2"));
            assert!(matches!(home.entries[11], ListEntryView::Event(ref e) if e.id == "event-3"));
            assert_eq!(home.entries.len(), 13);
            assert_eq!(home.curations.len(), 3);
        }

        #[test]
        fn test_single_banner_policy_places_one_rotating_banner() {
            let mut model = Model::default();
            model.config.home_list_policy = InterleavePolicy::SingleBanner { after: 3 };
            let PageView::Home(home) = build(&model).page else {
                panic!("expected home page");
            };

            let banners = home
                .entries
                .iter()
                .filter(|e| matches!(e, ListEntryView::RotatingBanner(_)))
                .count();
            assert_eq!(banners, 1);
            assert!(matches!(home.entries[3], ListEntryView::RotatingBanner(_)));
        }

        #[test]
        fn test_unknown_store_renders_not_found_with_recovery_link() {
            let mut model = Model::default();
            model.route = Route::StoreDetail(StoreId::new("store-404"));
            let PageView::NotFound(nf) = build(&model).page else {
                panic!("expected not found");
            };
            assert_eq!(nf.recovery_path, "/");
        }

        #[test]
        fn test_event_detail() {
            let mut model = Model::default();
            model.route = Route::EventDetail(EventId::new("event-2"));
            assert!(matches!(build(&model).page, PageView::EventDetail(ref e) if e.id == "event-2"));
        }

        #[test]
        fn test_store_card_shows_cheapest_item() {
            let model = Model::default();
            let store = model.catalog.store(&StoreId::new("store-1")).unwrap();
            let card = StoreCardView::new(store, &model);
            assert_eq!(card.lowest_price.as_deref(), Some("2,700원"));
            assert_eq!(card.original_price.as_deref(), Some("4,500원"));
            assert_eq!(card.discount_rate, Some(40));
            assert_eq!(card.distance, "350m");
            assert_eq!(card.href, "/store/store-1");
        }
    }

    mod sheet_tests {
        use super::*;

        #[test]
        fn test_no_favorites_state() {
            let mut model = Model::default();
            model.route = Route::Search;
            model.favorites_only = true;
            model.refresh_discovery();

            let PageView::Search(page) = build(&model).page else {
                panic!("expected search page");
            };
            assert_eq!(
                page.sheet.empty_state.map(|e| e.kind),
                Some(EmptyState::NoFavorites)
            );
            assert!(page.map.markers.is_empty());
            assert_eq!(page.map.bounds, None);
        }

        #[test]
        fn test_half_sheet_height() {
            let mut model = Model::default();
            model.route = Route::Search;
            let PageView::Search(page) = build(&model).page else {
                panic!("expected search page");
            };
            assert_eq!(page.sheet.height, SheetHeight::Percent(50));
            assert_eq!(page.sheet.stores.len(), 10);
            assert_eq!(page.map.markers.len(), 10);
        }
    }

    #[test]
    fn test_search_overlay_highlights_submitted_query() {
        let mut model = Model::default();
        let mut input = crate::search::SearchInput::default();
        input.set_value("베이글");
        input.submit();
        model.search_input = Some(input);

        let overlay = build(&model).search_overlay.unwrap();
        assert!(!overlay.no_results);
        assert_eq!(overlay.stores.len(), 1);
        assert!(overlay.stores[0]
            .name
            .iter()
            .any(|s| s.highlighted && s.text == "베이글"));
    }

    #[test]
    fn test_view_serializes_for_the_shell() {
        let model = Model::default();
        let json = serde_json::to_value(build(&model)).unwrap();
        assert_eq!(json["page"]["page"], "home");
        assert_eq!(json["path"], "/");
    }
}

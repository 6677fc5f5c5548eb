//! Map screen state. The map SDK lives in the shell; the core owns the load
//! status, camera, selection and the numbered markers it should draw.

use geojson::{feature, Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{Coordinates, Store, StoreId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MapStatus {
    #[default]
    Loading,
    Ready,
    Unavailable {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    status: MapStatus,
    attempt: u64,
    center: Coordinates,
    zoom: u8,
    selected: Option<StoreId>,
    my_location: Option<Coordinates>,
    locating: bool,
}

impl MapState {
    #[must_use]
    pub const fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            status: MapStatus::Loading,
            attempt: 0,
            center,
            zoom,
            selected: None,
            my_location: None,
            locating: false,
        }
    }

    #[must_use]
    pub const fn status(&self) -> &MapStatus {
        &self.status
    }

    #[must_use]
    pub const fn center(&self) -> Coordinates {
        self.center
    }

    #[must_use]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&StoreId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn my_location(&self) -> Option<Coordinates> {
        self.my_location
    }

    #[must_use]
    pub const fn is_locating(&self) -> bool {
        self.locating
    }

    /// Starts a load attempt; the returned number tags its timeout.
    pub fn begin_loading(&mut self) -> u64 {
        self.attempt += 1;
        self.status = MapStatus::Loading;
        self.attempt
    }

    /// Returns false if the load already timed out or failed.
    pub fn mark_loaded(&mut self) -> bool {
        if self.status != MapStatus::Loading {
            warn!(status = ?self.status, "Map reported loaded outside a load attempt");
            return false;
        }
        self.status = MapStatus::Ready;
        info!(attempt = self.attempt, "Map ready");
        true
    }

    /// A failure only counts against a load in progress. Returns false for
    /// a late report after the map became ready or already gave up.
    pub fn mark_failed(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.status != MapStatus::Loading {
            warn!(status = ?self.status, %message, "Map reported a failure outside a load attempt");
            return false;
        }
        warn!(attempt = self.attempt, %message, "Map failed to load");
        self.status = MapStatus::Unavailable { message };
        true
    }

    /// Only the timeout of the current attempt counts, and only while the
    /// map is still loading.
    pub fn load_timed_out(&mut self, attempt: u64, timeout_ms: u64) -> bool {
        if attempt != self.attempt || self.status != MapStatus::Loading {
            return false;
        }
        #[allow(clippy::cast_precision_loss)]
        let seconds = timeout_ms as f64 / 1_000.0;
        self.mark_failed(format!("지도 로딩 시간이 초과되었습니다 ({seconds}초)"))
    }

    /// Invalidates the timeout of any attempt in flight.
    pub fn cancel_loading(&mut self) {
        self.attempt += 1;
    }

    pub fn select_store(&mut self, id: StoreId) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn begin_locating(&mut self) -> bool {
        if self.locating {
            return false;
        }
        self.locating = true;
        true
    }

    pub fn finish_locating(&mut self) {
        self.locating = false;
    }

    pub fn recenter(&mut self, center: Coordinates, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    pub fn show_my_location(&mut self, position: Coordinates, zoom: u8) {
        self.my_location = Some(position);
        self.recenter(position, zoom);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    /// 1-based, in list order.
    pub number: usize,
    pub store_id: StoreId,
    pub name: String,
    pub position: Coordinates,
}

#[must_use]
pub fn markers(stores: &[&Store]) -> Vec<MapMarker> {
    stores
        .iter()
        .enumerate()
        .map(|(i, store)| MapMarker {
            number: i + 1,
            store_id: store.id.clone(),
            name: store.name.clone(),
            position: store.coordinates,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every marker; `None` without markers.
    #[must_use]
    pub fn around(markers: &[MapMarker]) -> Option<Self> {
        let (first, rest) = markers.split_first()?;
        let start = Self {
            south: first.position.lat,
            west: first.position.lng,
            north: first.position.lat,
            east: first.position.lng,
        };
        Some(rest.iter().fold(start, |b, m| Self {
            south: b.south.min(m.position.lat),
            west: b.west.min(m.position.lng),
            north: b.north.max(m.position.lat),
            east: b.east.max(m.position.lng),
        }))
    }

    fn to_bbox(self) -> Vec<f64> {
        vec![self.west, self.south, self.east, self.north]
    }
}

/// Markers as a GeoJSON `FeatureCollection` of points, with the bounding
/// box when there is one.
#[must_use]
pub fn markers_feature_collection(markers: &[MapMarker], selected: Option<&StoreId>) -> FeatureCollection {
    let features = markers
        .iter()
        .map(|m| {
            let mut properties = JsonObject::new();
            properties.insert("number".into(), m.number.into());
            properties.insert("name".into(), m.name.clone().into());
            properties.insert("selected".into(), (selected == Some(&m.store_id)).into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    m.position.lng,
                    m.position.lat,
                ]))),
                id: Some(feature::Id::String(m.store_id.to_string())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: Bounds::around(markers).map(Bounds::to_bbox),
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::discovery::{discover, DiscoveryQuery};
    use assert_matches::assert_matches;

    fn center() -> Coordinates {
        Coordinates::from(crate::DEFAULT_MAP_CENTER)
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_load_then_ready() {
            let mut map = MapState::new(center(), 15);
            map.begin_loading();
            assert!(map.mark_loaded());
            assert_eq!(map.status(), &MapStatus::Ready);
        }

        #[test]
        fn test_timeout_makes_map_unavailable() {
            let mut map = MapState::new(center(), 15);
            let attempt = map.begin_loading();
            assert!(map.load_timed_out(attempt, 5_000));
            assert_matches!(map.status(), MapStatus::Unavailable { message } if message.contains("5초"));
            assert!(!map.mark_loaded());
        }

        #[test]
        fn test_stale_timeout_ignored() {
            let mut map = MapState::new(center(), 15);
            let first = map.begin_loading();
            let _second = map.begin_loading();
            assert!(!map.load_timed_out(first, 5_000));
            assert_eq!(map.status(), &MapStatus::Loading);
        }

        #[test]
        fn test_timeout_after_ready_ignored() {
            let mut map = MapState::new(center(), 15);
            let attempt = map.begin_loading();
            map.mark_loaded();
            assert!(!map.load_timed_out(attempt, 5_000));
            assert_eq!(map.status(), &MapStatus::Ready);
        }

        #[test]
        fn test_failure_only_counts_while_loading() {
            let mut map = MapState::new(center(), 15);
            map.begin_loading();
            assert!(map.mark_loaded());
            assert!(!map.mark_failed("script error"));
            assert_eq!(map.status(), &MapStatus::Ready);

            map.begin_loading();
            assert!(map.mark_failed("script error"));
            assert!(!map.mark_failed("second report"));
            assert_matches!(map.status(), MapStatus::Unavailable { message } if message == "script error");
        }

        #[test]
        fn test_only_one_location_lookup_at_a_time() {
            let mut map = MapState::new(center(), 15);
            assert!(map.begin_locating());
            assert!(!map.begin_locating());
            map.finish_locating();
            assert!(map.begin_locating());
        }
    }

    mod marker_tests {
        use super::*;

        #[test]
        fn test_markers_numbered_in_list_order() {
            let catalog = Catalog::bundled().unwrap();
            let stores = discover(catalog.stores(), &DiscoveryQuery::default());
            let markers = markers(&stores);

            assert_eq!(markers.len(), stores.len());
            assert_eq!(markers[0].number, 1);
            assert_eq!(markers[0].store_id, stores[0].id);
            assert_eq!(markers.last().map(|m| m.number), Some(stores.len()));
        }

        #[test]
        fn test_bounds_contain_every_marker() {
            let catalog = Catalog::bundled().unwrap();
            let stores: Vec<&Store> = catalog.stores().iter().collect();
            let markers = markers(&stores);
            let bounds = Bounds::around(&markers).unwrap();

            assert!(markers.iter().all(|m| {
                (bounds.south..=bounds.north).contains(&m.position.lat)
                    && (bounds.west..=bounds.east).contains(&m.position.lng)
            }));
            assert!(markers.iter().any(|m| (m.position.lat - bounds.north).abs() < f64::EPSILON));
        }

        #[test]
        fn test_no_markers_no_bounds() {
            assert_eq!(Bounds::around(&[]), None);
        }

        #[test]
        fn test_geojson_export() {
            let catalog = Catalog::bundled().unwrap();
            let store = catalog.store(&StoreId::new("store-1")).unwrap();
            let markers = markers(&[store]);

            let collection = markers_feature_collection(&markers, Some(&store.id));
            let json: serde_json::Value = serde_json::to_value(&collection).unwrap();

            assert_eq!(json["type"], "FeatureCollection");
            let feature = &json["features"][0];
            assert_eq!(feature["id"], "store-1");
            assert_eq!(feature["geometry"]["type"], "Point");
            assert_eq!(feature["geometry"]["coordinates"][0], 127.0276);
            assert_eq!(feature["properties"]["number"], 1);
            assert_eq!(feature["properties"]["selected"], true);
        }
    }
}

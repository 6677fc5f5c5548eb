// lib.rs - Lucky Meal app core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod bottom_sheet;
pub mod capabilities;
pub mod carousel;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod event;
pub mod filter;
pub mod gesture;
pub mod location_picker;
pub mod map;
pub mod model;
pub mod prefs;
pub mod route;
pub mod search;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

pub const DEFAULT_LOCATION: &str = "서울 강남구";
pub const SHEET_DRAG_THRESHOLD_PX: f64 = 80.0;
pub const SHEET_COLLAPSED_HEIGHT_PX: u32 = 80;
pub const MAX_SEARCH_HISTORY: usize = 10;
pub const EVENT_INSERT_INTERVAL: usize = 3;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const BANNER_ROTATION_MS: u64 = 3_000;
pub const CURATION_ROTATION_MS: u64 = 3_000;
pub const CURATION_RESUME_DELAY_MS: u64 = 2_000;
pub const MAP_LOAD_TIMEOUT_MS: u64 = 5_000;
pub const MENU_RESULT_LIMIT: usize = 10;
pub const DEFAULT_MAP_ZOOM: u8 = 15;
pub const MY_LOCATION_ZOOM: u8 = 16;
pub const DISCOVERY_CACHE_CAPACITY: usize = 32;

/// Gangnam station, where the map opens before any location is known.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (37.4979, 127.0276);

/// City hall; the demo address search pins every result here.
pub const DEMO_ADDRESS_CENTER: (f64, f64) = (37.5665, 126.9780);

pub const CATEGORIES: &[&str] = &["베이커리", "케이크", "도시락", "샐러드", "디저트", "커피"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    ExternalServiceUnavailable,
    GeolocationDenied,
    GeolocationUnavailable,
    Storage,
    Deserialization,
    InvalidConfig,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::ExternalServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GeolocationDenied => "LOCATION_PERMISSION_DENIED",
            Self::GeolocationUnavailable => "LOCATION_UNAVAILABLE",
            Self::Storage => "STORAGE_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

/// The one error shape the shell ever sees. None of these are fatal; each
/// maps onto a fallback view or an alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::NotFound => "요청하신 정보를 찾을 수 없습니다.".into(),
            ErrorKind::ExternalServiceUnavailable => {
                "지도를 불러올 수 없습니다. 잠시 후 다시 시도해 주세요.".into()
            }
            ErrorKind::GeolocationDenied => {
                "위치 정보를 가져올 수 없습니다. 위치 권한을 확인해주세요.".into()
            }
            ErrorKind::GeolocationUnavailable => {
                if self.context.get("reason").map(String::as_str) == Some("unsupported") {
                    "이 브라우저에서는 위치 서비스를 지원하지 않습니다.".into()
                } else {
                    "위치 정보를 가져올 수 없습니다.".into()
                }
            }
            ErrorKind::Storage => "설정을 저장하지 못했습니다.".into(),
            ErrorKind::Deserialization => "저장된 데이터를 읽지 못했습니다.".into(),
            ErrorKind::InvalidConfig => self.message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<catalog::CatalogError> for AppError {
    fn from(e: catalog::CatalogError) -> Self {
        let kind = match e {
            catalog::CatalogError::StoreNotFound(_) | catalog::CatalogError::EventNotFound(_) => {
                ErrorKind::NotFound
            }
            _ => ErrorKind::Deserialization,
        };
        AppError::new(kind, e.to_string())
    }
}

impl From<prefs::PersistenceError> for AppError {
    fn from(e: prefs::PersistenceError) -> Self {
        AppError::new(ErrorKind::Deserialization, e.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::new(ErrorKind::InvalidConfig, e.to_string())
    }
}

impl From<capabilities::StorageError> for AppError {
    fn from(e: capabilities::StorageError) -> Self {
        AppError::new(ErrorKind::Storage, e.to_string())
    }
}

impl From<capabilities::GeolocationError> for AppError {
    fn from(e: capabilities::GeolocationError) -> Self {
        use capabilities::GeolocationError;

        let (kind, reason) = match &e {
            GeolocationError::PermissionDenied => (ErrorKind::GeolocationDenied, "denied"),
            GeolocationError::Unsupported => (ErrorKind::GeolocationUnavailable, "unsupported"),
            GeolocationError::Timeout => (ErrorKind::GeolocationUnavailable, "timeout"),
            GeolocationError::Unavailable { .. } => {
                (ErrorKind::GeolocationUnavailable, "unavailable")
            }
        };
        AppError::new(kind, e.to_string()).with_context("reason", reason)
    }
}

impl From<route::RouteError> for AppError {
    fn from(e: route::RouteError) -> Self {
        AppError::new(ErrorKind::NotFound, e.to_string())
    }
}

/// `350m` under a kilometre, `1.2km` above.
#[must_use]
pub fn format_distance(meters: u32) -> String {
    if meters < 1_000 {
        format!("{meters}m")
    } else {
        format!("{:.1}km", f64::from(meters) / 1_000.0)
    }
}

/// Won amounts with thousands separators: `7200` → `7,200원`.
#[must_use]
pub fn format_price(won: u32) -> String {
    let digits = won.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('원');
    out
}

/// Rounded percentage off the original price; zero when there is no
/// original price to compare against.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn discount_rate(original: u32, sale: u32) -> u32 {
    if original == 0 || sale >= original {
        return 0;
    }
    let off = f64::from(original - sale) / f64::from(original) * 100.0;
    // 0..=100 by the guard above
    off.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_distance_meters() {
            assert_eq!(format_distance(0), "0m");
            assert_eq!(format_distance(350), "350m");
            assert_eq!(format_distance(999), "999m");
        }

        #[test]
        fn test_format_distance_kilometers() {
            assert_eq!(format_distance(1_000), "1.0km");
            assert_eq!(format_distance(1_240), "1.2km");
            assert_eq!(format_distance(1_260), "1.3km");
            assert_eq!(format_distance(15_000), "15.0km");
        }

        #[test]
        fn test_format_price() {
            assert_eq!(format_price(0), "0원");
            assert_eq!(format_price(900), "900원");
            assert_eq!(format_price(7_200), "7,200원");
            assert_eq!(format_price(1_234_567), "1,234,567원");
        }

        #[test]
        fn test_discount_rate() {
            assert_eq!(discount_rate(12_000, 7_200), 40);
            assert_eq!(discount_rate(3_000, 1_500), 50);
            assert_eq!(discount_rate(0, 0), 0);
            assert_eq!(discount_rate(1_000, 1_200), 0);
        }
    }

    mod error_tests {
        use super::*;
        use crate::capabilities::GeolocationError;

        #[test]
        fn test_error_codes_are_stable() {
            assert_eq!(ErrorKind::NotFound.code(), "NOT_FOUND");
            assert_eq!(ErrorKind::GeolocationDenied.code(), "LOCATION_PERMISSION_DENIED");
            assert_eq!(
                AppError::new(ErrorKind::ExternalServiceUnavailable, "x").code(),
                "SERVICE_UNAVAILABLE"
            );
        }

        #[test]
        fn test_geolocation_denied_maps_to_permission_kind() {
            let err = AppError::from(GeolocationError::PermissionDenied);
            assert_eq!(err.kind, ErrorKind::GeolocationDenied);
            assert_eq!(err.context.get("reason").map(String::as_str), Some("denied"));
        }

        #[test]
        fn test_unsupported_geolocation_has_its_own_message() {
            let unsupported = AppError::from(GeolocationError::Unsupported);
            let timeout = AppError::from(GeolocationError::Timeout);
            assert_eq!(unsupported.kind, ErrorKind::GeolocationUnavailable);
            assert_ne!(unsupported.user_facing_message(), timeout.user_facing_message());
        }

        #[test]
        fn test_display_includes_code() {
            let err = AppError::new(ErrorKind::NotFound, "store missing");
            assert_eq!(err.to_string(), "[NOT_FOUND] store missing");
        }
    }
}

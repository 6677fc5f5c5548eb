use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discovery::InterleavePolicy;
use crate::model::Coordinates;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables for the core. Every field has a default so the shell can send a
/// partial JSON object through `Event::Configure`, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sheet_drag_threshold_px: f64,
    pub sheet_collapsed_height_px: u32,
    pub search_history_limit: usize,
    pub home_list_policy: InterleavePolicy,
    pub page_size: usize,
    pub banner_rotation_ms: u64,
    pub curation_rotation_ms: u64,
    pub curation_resume_delay_ms: u64,
    pub map_load_timeout_ms: u64,
    pub menu_result_limit: usize,
    pub default_location: String,
    pub default_map_zoom: u8,
    pub my_location_zoom: u8,
    pub discovery_cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_drag_threshold_px: crate::SHEET_DRAG_THRESHOLD_PX,
            sheet_collapsed_height_px: crate::SHEET_COLLAPSED_HEIGHT_PX,
            search_history_limit: crate::MAX_SEARCH_HISTORY,
            home_list_policy: InterleavePolicy::Repeating {
                interval: crate::EVENT_INSERT_INTERVAL,
            },
            page_size: crate::DEFAULT_PAGE_SIZE,
            banner_rotation_ms: crate::BANNER_ROTATION_MS,
            curation_rotation_ms: crate::CURATION_ROTATION_MS,
            curation_resume_delay_ms: crate::CURATION_RESUME_DELAY_MS,
            map_load_timeout_ms: crate::MAP_LOAD_TIMEOUT_MS,
            menu_result_limit: crate::MENU_RESULT_LIMIT,
            default_location: crate::DEFAULT_LOCATION.to_string(),
            default_map_zoom: crate::DEFAULT_MAP_ZOOM,
            my_location_zoom: crate::MY_LOCATION_ZOOM,
            discovery_cache_capacity: crate::DISCOVERY_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Parses a (possibly partial) JSON object over the defaults and
    /// validates the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sheet_drag_threshold_px.is_finite() || self.sheet_drag_threshold_px <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sheet_drag_threshold_px",
                reason: format!("must be a positive number, got {}", self.sheet_drag_threshold_px),
            });
        }

        let positive = [
            ("search_history_limit", self.search_history_limit),
            ("page_size", self.page_size),
            ("menu_result_limit", self.menu_result_limit),
            ("discovery_cache_capacity", self.discovery_cache_capacity),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        let durations = [
            ("banner_rotation_ms", self.banner_rotation_ms),
            ("curation_rotation_ms", self.curation_rotation_ms),
            ("map_load_timeout_ms", self.map_load_timeout_ms),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "duration must be greater than zero".to_string(),
                });
            }
        }

        match self.home_list_policy {
            InterleavePolicy::Repeating { interval: 0 } => Err(ConfigError::Invalid {
                field: "home_list_policy",
                reason: "interval must be greater than zero".to_string(),
            }),
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn default_map_center(&self) -> Coordinates {
        Coordinates::from(crate::DEFAULT_MAP_CENTER)
    }
}

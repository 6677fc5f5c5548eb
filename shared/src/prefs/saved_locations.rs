use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Persisted, SAVED_LOCATIONS_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSlot {
    Home,
    Work,
}

impl LocationSlot {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "집",
            Self::Work => "회사",
        }
    }
}

impl fmt::Display for LocationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Home => "home",
            Self::Work => "work",
        })
    }
}

/// Home and work addresses. The snapshot has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLocations {
    pub home: Option<String>,
    pub work: Option<String>,
}

impl Default for SavedLocations {
    fn default() -> Self {
        Self {
            home: Some(crate::DEFAULT_LOCATION.to_string()),
            work: None,
        }
    }
}

impl SavedLocations {
    #[must_use]
    pub fn get(&self, slot: LocationSlot) -> Option<&str> {
        match slot {
            LocationSlot::Home => self.home.as_deref(),
            LocationSlot::Work => self.work.as_deref(),
        }
    }

    pub fn set(&mut self, slot: LocationSlot, address: impl Into<String>) {
        *self.slot_mut(slot) = Some(address.into());
    }

    pub fn clear(&mut self, slot: LocationSlot) {
        *self.slot_mut(slot) = None;
    }

    fn slot_mut(&mut self, slot: LocationSlot) -> &mut Option<String> {
        match slot {
            LocationSlot::Home => &mut self.home,
            LocationSlot::Work => &mut self.work,
        }
    }
}

impl Persisted for SavedLocations {
    const KEY: &'static str = SAVED_LOCATIONS_KEY;
    type Snapshot = Self;

    fn snapshot(&self) -> Self {
        self.clone()
    }

    fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let locations = SavedLocations::default();
        assert_eq!(locations.get(LocationSlot::Home), Some("서울 강남구"));
        assert_eq!(locations.get(LocationSlot::Work), None);
    }

    #[test]
    fn test_set_and_clear_slots() {
        let mut locations = SavedLocations::default();
        locations.set(LocationSlot::Work, "서울특별시 성수동");
        locations.clear(LocationSlot::Home);
        assert_eq!(locations.get(LocationSlot::Work), Some("서울특별시 성수동"));
        assert_eq!(locations.get(LocationSlot::Home), None);
    }

    #[test]
    fn test_persisted_shape() {
        let mut locations = SavedLocations::default();
        locations.set(LocationSlot::Work, "회사 주소");
        let json: serde_json::Value =
            serde_json::from_slice(&locations.to_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "state": {"home": "서울 강남구", "work": "회사 주소"},
                "version": 0
            })
        );
    }

    #[test]
    fn test_cleared_slot_survives_reload() {
        let mut original = SavedLocations::default();
        original.clear(LocationSlot::Home);
        let bytes = original.to_bytes().unwrap();

        let mut reloaded = SavedLocations::default();
        reloaded.load_bytes(&bytes).unwrap();
        assert_eq!(reloaded.get(LocationSlot::Home), None);
    }
}

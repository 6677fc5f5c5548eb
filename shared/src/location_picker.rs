//! Address management modal: pick the browsing location, optionally saving
//! it as the home or work address.
//!
//! Address search is a demo: any query resolves to a single candidate
//! pinned at the city centre.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Coordinates;
use crate::prefs::saved_locations::LocationSlot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerView {
    #[default]
    Main,
    Search,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCandidate {
    pub name: String,
    pub address: String,
    pub position: Coordinates,
}

impl AddressCandidate {
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self {
            name: query.to_string(),
            address: format!("서울특별시 {query}"),
            position: Coordinates::from(crate::DEMO_ADDRESS_CENTER),
        }
    }

    #[must_use]
    pub fn from_position(position: Coordinates) -> Self {
        Self {
            name: "현재 위치".to_string(),
            address: format!("위도: {:.4}, 경도: {:.4}", position.lat, position.lng),
            position,
        }
    }
}

/// What confirming the picker commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedAddress {
    pub address: String,
    pub save_as: Option<LocationSlot>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPicker {
    view: PickerView,
    query: String,
    register: Option<LocationSlot>,
    selected: Option<AddressCandidate>,
}

impl LocationPicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn view(&self) -> PickerView {
        self.view
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn register(&self) -> Option<LocationSlot> {
        self.register
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&AddressCandidate> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match (self.view, self.register) {
            (PickerView::Main, _) | (_, None) => "주소 관리",
            (_, Some(LocationSlot::Home)) => "집 주소 등록",
            (_, Some(LocationSlot::Work)) => "회사 주소 등록",
        }
    }

    #[must_use]
    pub const fn confirm_label(&self) -> &'static str {
        match self.register {
            Some(LocationSlot::Home) => "집으로 설정하기",
            Some(LocationSlot::Work) => "회사로 설정하기",
            None => "설정하기",
        }
    }

    pub fn open_search(&mut self) {
        self.register = None;
        self.view = PickerView::Search;
    }

    pub fn start_register(&mut self, slot: LocationSlot) {
        self.register = Some(slot);
        self.view = PickerView::Search;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Returns false for a blank query.
    pub fn submit_search(&mut self) -> bool {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.selected = Some(AddressCandidate::from_query(trimmed));
        self.view = PickerView::Confirm;
        true
    }

    pub fn use_position(&mut self, position: Coordinates) {
        self.selected = Some(AddressCandidate::from_position(position));
        self.view = PickerView::Confirm;
    }

    /// Confirm goes back to search; search goes back to main and forgets the
    /// registration slot. Returns false on the main view.
    pub fn back(&mut self) -> bool {
        match self.view {
            PickerView::Confirm => {
                self.view = PickerView::Search;
                true
            }
            PickerView::Search => {
                self.view = PickerView::Main;
                self.register = None;
                true
            }
            PickerView::Main => false,
        }
    }

    /// `None` until an address has been chosen.
    #[must_use]
    pub fn confirm(&self) -> Option<ConfirmedAddress> {
        let selected = self.selected.as_ref()?;
        debug!(address = %selected.address, slot = ?self.register, "Address confirmed");
        Some(ConfirmedAddress {
            address: selected.address.clone(),
            save_as: self.register,
        })
    }
}

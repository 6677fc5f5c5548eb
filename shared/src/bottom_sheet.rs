//! The draggable result sheet over the map.
//!
//! A drag only ever changes the position when it ends: the accumulated
//! vertical delta is compared against the threshold and the sheet moves at
//! most one step. Positive deltas are downward.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::gesture::Gesture;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetPosition {
    Collapsed,
    #[default]
    Half,
    Full,
}

impl SheetPosition {
    #[must_use]
    pub fn after_drag(self, delta: f64, threshold: f64) -> Self {
        match self {
            Self::Half if delta < -threshold => Self::Full,
            Self::Half if delta > threshold => Self::Collapsed,
            Self::Full if delta > threshold => Self::Half,
            Self::Collapsed if delta < -threshold => Self::Half,
            unchanged => unchanged,
        }
    }

    #[must_use]
    pub const fn height(self, collapsed_px: u32) -> SheetHeight {
        match self {
            Self::Collapsed => SheetHeight::Pixels(collapsed_px),
            Self::Half => SheetHeight::Percent(50),
            Self::Full => SheetHeight::Percent(100),
        }
    }
}

/// Presentation height; percentages are of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum SheetHeight {
    Pixels(u32),
    Percent(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTransition {
    pub from: SheetPosition,
    pub to: SheetPosition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start_y: f64,
    delta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BottomSheet {
    position: SheetPosition,
    threshold: f64,
    drag: Option<Drag>,
}

impl Default for BottomSheet {
    fn default() -> Self {
        Self::new(SheetPosition::Half, crate::SHEET_DRAG_THRESHOLD_PX)
    }
}

impl BottomSheet {
    #[must_use]
    pub const fn new(position: SheetPosition, threshold: f64) -> Self {
        Self {
            position,
            threshold,
            drag: None,
        }
    }

    /// Applies from the next drag end on.
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub const fn position(&self) -> SheetPosition {
        self.position
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Zero whenever no gesture is in progress.
    #[must_use]
    pub fn drag_delta(&self) -> f64 {
        self.drag.map_or(0.0, |d| d.delta)
    }

    /// Starting while a drag is already active restarts it from `y`.
    pub fn begin_drag(&mut self, y: f64) {
        if !y.is_finite() {
            return;
        }
        if self.drag.is_some() {
            debug!(y, "Drag restarted before the previous one ended");
        }
        self.drag = Some(Drag { start_y: y, delta: 0.0 });
    }

    pub fn drag_to(&mut self, y: f64) {
        if let Some(drag) = self.drag.as_mut() {
            if y.is_finite() {
                drag.delta = y - drag.start_y;
            }
        }
    }

    /// Applies the transition table to the accumulated delta and clears it.
    pub fn end_drag(&mut self) -> Option<SheetTransition> {
        let drag = self.drag.take()?;
        let next = self.position.after_drag(drag.delta, self.threshold);
        debug!(delta = drag.delta, from = ?self.position, to = ?next, "Drag ended");
        self.move_to(next)
    }

    /// Tapping the handle of a collapsed sheet opens it to half.
    pub fn tap_handle(&mut self) -> Option<SheetTransition> {
        if self.position == SheetPosition::Collapsed {
            self.move_to(SheetPosition::Half)
        } else {
            None
        }
    }

    pub fn apply(&mut self, gesture: Gesture) -> Option<SheetTransition> {
        match gesture {
            Gesture::Start { y } => {
                self.begin_drag(y);
                None
            }
            Gesture::Move { y } => {
                self.drag_to(y);
                None
            }
            Gesture::End => self.end_drag(),
        }
    }

    pub fn set_position(&mut self, position: SheetPosition) -> Option<SheetTransition> {
        self.drag = None;
        self.move_to(position)
    }

    fn move_to(&mut self, next: SheetPosition) -> Option<SheetTransition> {
        if next == self.position {
            return None;
        }
        let transition = SheetTransition {
            from: self.position,
            to: next,
        };
        info!(from = ?transition.from, to = ?transition.to, "Sheet moved");
        self.position = next;
        Some(transition)
    }
}

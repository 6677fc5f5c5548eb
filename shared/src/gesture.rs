//! Touch and pointer input reduced to one start/move/end gesture stream so
//! the bottom sheet has a single transition path.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    Start { y: f64 },
    Move { y: f64 },
    End,
}

pub trait GestureSource {
    /// `None` when the raw input carries nothing the sheet can use.
    fn gesture(&self) -> Option<Gesture>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub client_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchInput {
    pub phase: TouchPhase,
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
}

impl GestureSource for TouchInput {
    fn gesture(&self) -> Option<Gesture> {
        match self.phase {
            TouchPhase::Start => self.touches.first().map(|t| Gesture::Start { y: t.client_y }),
            TouchPhase::Move => self.touches.first().map(|t| Gesture::Move { y: t.client_y }),
            TouchPhase::End | TouchPhase::Cancel => Some(Gesture::End),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer left the tracking area mid-drag; treated as a release.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub client_y: f64,
}

impl GestureSource for PointerInput {
    fn gesture(&self) -> Option<Gesture> {
        Some(match self.phase {
            PointerPhase::Down => Gesture::Start { y: self.client_y },
            PointerPhase::Move => Gesture::Move { y: self.client_y },
            PointerPhase::Up | PointerPhase::Leave => Gesture::End,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_uses_first_touch_point() {
        let input = TouchInput {
            phase: TouchPhase::Move,
            touches: vec![TouchPoint { client_y: 120.0 }, TouchPoint { client_y: 400.0 }],
        };
        assert_eq!(input.gesture(), Some(Gesture::Move { y: 120.0 }));
    }

    #[test]
    fn test_touch_without_points_is_ignored() {
        let input = TouchInput {
            phase: TouchPhase::Start,
            touches: vec![],
        };
        assert_eq!(input.gesture(), None);
    }

    #[test]
    fn test_cancel_and_leave_end_the_gesture() {
        let cancel = TouchInput {
            phase: TouchPhase::Cancel,
            touches: vec![],
        };
        let leave = PointerInput {
            phase: PointerPhase::Leave,
            client_y: 0.0,
        };
        assert_eq!(cancel.gesture(), Some(Gesture::End));
        assert_eq!(leave.gesture(), Some(Gesture::End));
    }
}

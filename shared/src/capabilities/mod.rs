//! Side effects the core asks the shell to perform.
//!
//! Render comes from crux directly. Storage, timers and geolocation are
//! small custom capabilities; their operations are plain serde types so
//! every shell can implement them.

mod geolocation;
mod storage;
pub mod timer;

pub use self::geolocation::{
    Geolocation, GeolocationError, GeolocationOperation, GeolocationResult, Position,
};
pub use self::storage::{
    Storage, StorageError, StorageOperation, StorageResponse, StorageResult,
};
pub use self::timer::{Timer, TimerOperation, TimerOutput};
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub storage: Storage<Event>,
    pub timer: Timer<Event>,
    pub geolocation: Geolocation<Event>,
}

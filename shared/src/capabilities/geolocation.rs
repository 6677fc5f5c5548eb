use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Coordinates;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("position unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
}

impl Position {
    /// Shell-reported positions are validated before use.
    pub fn coordinates(&self) -> Result<Coordinates, GeolocationError> {
        Coordinates::new(self.lat, self.lng).map_err(|e| GeolocationError::Unavailable {
            message: e.to_string(),
        })
    }
}

pub type GeolocationResult = Result<Position, GeolocationError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeolocationOperation {
    CurrentPosition,
}

impl Operation for GeolocationOperation {
    type Output = GeolocationResult;
}

pub struct Geolocation<Ev> {
    context: CapabilityContext<GeolocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Geolocation<Ev> {
    type Operation = GeolocationOperation;
    type MappedSelf<MappedEv> = Geolocation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Geolocation::new(self.context.map_event(f))
    }
}

impl<Ev> Geolocation<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<GeolocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn current_position<F>(&self, make_event: F)
    where
        F: FnOnce(GeolocationResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(GeolocationOperation::CurrentPosition)
                .await;
            ctx.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wire_format() {
        let result: GeolocationResult =
            serde_json::from_str(r#"{"Ok": {"lat": 37.5, "lng": 127.0}}"#).unwrap();
        assert_eq!(
            result,
            Ok(Position {
                lat: 37.5,
                lng: 127.0,
                accuracy_m: None
            })
        );

        let denied: GeolocationResult =
            serde_json::from_str(r#"{"Err": "PermissionDenied"}"#).unwrap();
        assert_eq!(denied, Err(GeolocationError::PermissionDenied));
    }

    #[test]
    fn test_out_of_range_position_is_unavailable() {
        let position = Position {
            lat: 123.0,
            lng: 0.0,
            accuracy_m: None,
        };
        assert!(matches!(
            position.coordinates(),
            Err(GeolocationError::Unavailable { .. })
        ));
    }
}

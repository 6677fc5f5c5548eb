//! Client-side preferences that survive restarts: favorites, search history
//! and saved locations.
//!
//! Each collaborator keeps an in-memory shape that suits lookups and a
//! separate snapshot type for storage. The snapshot is wrapped in a
//! versioned envelope, `{"state": ..., "version": 0}`, under a fixed key.

pub mod favorites;
pub mod saved_locations;
pub mod search_history;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub const FAVORITES_KEY: &str = "favorite-storage";
pub const SEARCH_HISTORY_KEY: &str = "search-history";
pub const SAVED_LOCATIONS_KEY: &str = "saved-locations";

const CURRENT_VERSION: u32 = 0;
const MAX_SNAPSHOT_BYTES: usize = 256 * 1024;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored version {found} is newer than supported {max}")]
    FutureVersion { found: u32, max: u32 },

    #[error("snapshot too large: {size} bytes, max {max}")]
    TooLarge { size: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub state: T,
    #[serde(default)]
    pub version: u32,
}

pub fn encode<T: Serialize>(state: &T) -> Result<Vec<u8>, PersistenceError> {
    let bytes = serde_json::to_vec(&Envelope {
        state,
        version: CURRENT_VERSION,
    })?;
    if bytes.len() > MAX_SNAPSHOT_BYTES {
        return Err(PersistenceError::TooLarge {
            size: bytes.len(),
            max: MAX_SNAPSHOT_BYTES,
        });
    }
    Ok(bytes)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistenceError> {
    if bytes.len() > MAX_SNAPSHOT_BYTES {
        return Err(PersistenceError::TooLarge {
            size: bytes.len(),
            max: MAX_SNAPSHOT_BYTES,
        });
    }
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    if envelope.version > CURRENT_VERSION {
        return Err(PersistenceError::FutureVersion {
            found: envelope.version,
            max: CURRENT_VERSION,
        });
    }
    Ok(envelope.state)
}

/// A collaborator with a storage snapshot.
pub trait Persisted {
    const KEY: &'static str;
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Snapshot;
    fn restore(&mut self, snapshot: Self::Snapshot);

    fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        encode(&self.snapshot())
    }

    /// Leaves `self` untouched when the bytes don't decode.
    fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), PersistenceError> {
        let snapshot = decode(bytes)?;
        self.restore(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_envelope_shape() {
        let bytes = encode(&vec!["a", "b"]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"state": ["a", "b"], "version": 0}));
    }

    #[test]
    fn test_missing_version_reads_as_current() {
        let state: Vec<String> = decode(br#"{"state": ["x"]}"#).unwrap();
        assert_eq!(state, vec!["x"]);
    }

    #[test]
    fn test_future_version_rejected() {
        let result: Result<Vec<String>, _> = decode(br#"{"state": [], "version": 3}"#);
        assert_matches!(result, Err(PersistenceError::FutureVersion { found: 3, max: 0 }));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        let result: Result<Vec<String>, _> = decode(b"\xff\x00");
        assert_matches!(result, Err(PersistenceError::Serialization(_)));
    }

    #[test]
    fn test_oversized_snapshot_rejected() {
        let huge = vec![0u8; MAX_SNAPSHOT_BYTES + 1];
        let result: Result<Vec<String>, _> = decode(&huge);
        assert_matches!(result, Err(PersistenceError::TooLarge { .. }));
    }
}

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 128;
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

pub type StorageResult = Result<Option<Vec<u8>>, StorageError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOperation {
    Get { key: String },
    Set { key: String, value: Vec<u8> },
    Remove { key: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageResponse {
    Value(Option<Vec<u8>>),
    Done,
    Failed(StorageError),
}

impl Operation for StorageOperation {
    type Output = StorageResponse;
}

impl From<StorageResponse> for StorageResult {
    fn from(response: StorageResponse) -> Self {
        match response {
            StorageResponse::Value(value) => Ok(value),
            StorageResponse::Done => Ok(None),
            StorageResponse::Failed(e) => Err(e),
        }
    }
}

pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = |reason: &str| StorageError::InvalidKey {
        key: key.chars().take(50).collect(),
        reason: reason.to_string(),
    };

    if key.trim().is_empty() {
        return Err(invalid("key cannot be empty"));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(invalid("key is too long"));
    }
    if key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
        return Err(invalid("key cannot look like a path"));
    }
    if key.chars().any(char::is_control) {
        return Err(invalid("key contains control characters"));
    }
    Ok(())
}

fn validate_value(value: &[u8]) -> Result<(), StorageError> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(StorageError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}

/// Key/value persistence provided by the shell (local storage on the web,
/// preferences on mobile).
pub struct Storage<Ev> {
    context: CapabilityContext<StorageOperation, Ev>,
}

impl<Ev> Capability<Ev> for Storage<Ev> {
    type Operation = StorageOperation;
    type MappedSelf<MappedEv> = Storage<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Storage::new(self.context.map_event(f))
    }
}

impl<Ev> Storage<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<StorageOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: &str, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        let operation = validate_key(key).map(|()| StorageOperation::Get {
            key: key.to_string(),
        });
        self.dispatch(operation, make_event);
    }

    pub fn set<F>(&self, key: &str, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        let operation = validate_key(key)
            .and_then(|()| validate_value(&value))
            .map(|()| StorageOperation::Set {
                key: key.to_string(),
                value,
            });
        self.dispatch(operation, make_event);
    }

    pub fn remove<F>(&self, key: &str, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        let operation = validate_key(key).map(|()| StorageOperation::Remove {
            key: key.to_string(),
        });
        self.dispatch(operation, make_event);
    }

    /// Invalid requests never reach the shell; the caller hears about them
    /// through the same event.
    fn dispatch<F>(&self, operation: Result<StorageOperation, StorageError>, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result: StorageResult = match operation {
                Ok(op) => ctx.request_from_shell(op).await.into(),
                Err(e) => Err(e),
            };
            ctx.update_app(make_event(result));
        });
    }
}

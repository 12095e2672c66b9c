use std::io;

use crate::router::BackendName;

/// All error types that can occur when talking to Govee backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A UDP socket operation failed at the OS level.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: io::Error },

    /// No qualifying response arrived within the fixed window.
    #[error("{action} timed out")]
    Timeout { action: String },

    /// The device identifier is absent from the current discovery cache.
    #[error("device {0} not found; re-run discovery to refresh the device list")]
    DeviceNotFound(String),

    /// An abstract command name no translator recognizes.
    #[error("unknown command name: {0}")]
    UnknownCapability(String),

    /// A recognized command name carrying a malformed or out-of-range value.
    #[error("invalid value for {name}: {reason}")]
    InvalidCommandValue { name: String, reason: String },

    /// The operation is not implemented by the chosen backend.
    #[error("{operation} is unsupported for the {backend} backend")]
    Unsupported {
        backend: BackendName,
        operation: String,
    },

    /// The referenced backend is not part of the configured mapping.
    #[error("backend {0} is not enabled")]
    BackendDisabled(BackendName),

    /// The router configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An HTTP operation against a cloud dialect failed.
    #[error("http {action} error: {err}")]
    Http { action: String, err: reqwest::Error },

    /// A cloud dialect reported a non-success result.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new timeout error
    pub fn timeout(action: &str) -> Self {
        Error::Timeout {
            action: action.to_string(),
        }
    }

    /// Create a new HTTP error
    pub fn http(action: &str, err: reqwest::Error) -> Self {
        Error::Http {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid command value error
    pub fn invalid_value(name: &str, reason: &str) -> Self {
        Error::InvalidCommandValue {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new unsupported operation error
    pub fn unsupported(backend: BackendName, operation: &str) -> Self {
        Error::Unsupported {
            backend,
            operation: operation.to_string(),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

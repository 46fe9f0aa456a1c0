use serde::{Deserialize, Serialize};
use thiserror::Error;

use cashless_core::error::ClientError;

/// Which camera to open. The scanner only ever asks for the rear one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Environment,
}

/// Computed once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub camera: bool,
    pub nfc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcRead {
    pub serial_number: Option<String>,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device not supported")]
    NotSupported,
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Failed(String),
}

impl From<DeviceError> for ClientError {
    fn from(err: DeviceError) -> Self {
        ClientError::Device(err.to_string())
    }
}

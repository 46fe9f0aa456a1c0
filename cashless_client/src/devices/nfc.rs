use async_trait::async_trait;

use super::dto::{DeviceError, NfcRead};

#[async_trait]
pub trait NfcDevice: Send + Sync {
    fn available(&self) -> bool;

    /// Writes a single text record. Returns the tag serial number when the
    /// platform reports one.
    async fn write_text(&self, text: &str) -> Result<Option<String>, DeviceError>;

    /// Waits for the next tag and returns its first text record.
    async fn scan(&self) -> Result<NfcRead, DeviceError>;
}

pub struct UnavailableNfc;

#[async_trait]
impl NfcDevice for UnavailableNfc {
    fn available(&self) -> bool {
        false
    }

    async fn write_text(&self, _text: &str) -> Result<Option<String>, DeviceError> {
        Err(DeviceError::NotSupported)
    }

    async fn scan(&self) -> Result<NfcRead, DeviceError> {
        Err(DeviceError::NotSupported)
    }
}

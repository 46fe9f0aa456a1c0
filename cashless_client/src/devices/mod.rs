//! Device capabilities behind traits. Real platform bindings implement
//! these; the CLI ships the `Unavailable*` variants.

pub mod camera;
pub mod dto;
pub mod nfc;

pub use camera::{Camera, CameraScanner, MediaStream, MediaTrack, UnavailableCamera};
pub use dto::{Capabilities, DeviceError, Facing, NfcRead};
pub use nfc::{NfcDevice, UnavailableNfc};

//! Driver error types

use thiserror::Error;

/// Errors that can occur while talking to a PlasmaTrim
#[derive(Error, Debug)]
pub enum Error {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Communication timeout")]
    Timeout,

    #[error("Session is not open")]
    NotConnected,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Malformed packet: expected {expected} bytes, got {got}")]
    MalformedPacket { expected: usize, got: usize },

    #[error("Reply mismatch: expected cmd 0x{expected:02X}, got 0x{actual:02X}")]
    ReplyMismatch { expected: u8, actual: u8 },

    // HID-specific errors
    #[error("HID error: {0}")]
    Hid(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl From<hidapi::HidError> for Error {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            Error::HidPermissionDenied(msg)
        } else {
            Error::Hid(msg)
        }
    }
}

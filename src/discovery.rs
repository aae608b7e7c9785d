//! Device discovery for PlasmaTrim units
//!
//! Enumeration is a stateless pass over the HID device list: every
//! entry matching the PlasmaTrim VID/PID becomes an unopened
//! [`DeviceSession`]. Nothing is claimed until [`DeviceSession::open`].

use std::ffi::CString;

use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::Error;
use crate::hid::HidTransport;
use crate::protocol::device;
use crate::session::DeviceSession;
use crate::{DeviceHandle, Transport};

/// Identification captured at enumeration time
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// USB vendor ID
    pub vendor_id: u16,
    /// USB product ID
    pub product_id: u16,
    /// Platform device path
    pub path: String,
    /// USB serial string if the OS exposes one (the device's own
    /// 4-byte serial is read over the protocol instead)
    pub serial_number: Option<String>,
    /// Product name string if available
    pub product_string: Option<String>,
}

/// Check whether a VID/PID pair identifies a PlasmaTrim
pub fn matches_identity(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == device::VENDOR_ID && product_id == device::PRODUCT_ID
}

struct HidHandle {
    info: DeviceInfo,
    path: CString,
}

impl DeviceHandle for HidHandle {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn open(&self) -> Result<Box<dyn Transport>, Error> {
        let api = HidApi::new()?;
        let device = api.open_path(&self.path)?;
        Ok(Box::new(HidTransport::new(device)))
    }
}

/// List connected PlasmaTrims as unopened sessions.
///
/// An empty list is not an error; use [`open_any`] when exactly one
/// device is expected.
pub fn discover() -> Result<Vec<DeviceSession>, Error> {
    let api = HidApi::new()?;
    let mut sessions = Vec::new();

    for device_info in api.device_list() {
        let vid = device_info.vendor_id();
        let pid = device_info.product_id();
        if !matches_identity(vid, pid) {
            continue;
        }

        let path = device_info.path().to_owned();
        let info = DeviceInfo {
            vendor_id: vid,
            product_id: pid,
            path: path.to_string_lossy().into_owned(),
            serial_number: device_info.serial_number().map(|s| s.to_string()),
            product_string: device_info.product_string().map(|s| s.to_string()),
        };

        debug!(
            "Found PlasmaTrim: VID={:04X} PID={:04X} path={}",
            vid, pid, info.path
        );
        sessions.push(DeviceSession::new(Box::new(HidHandle { info, path })));
    }

    info!("Found {} PlasmaTrim device(s)", sessions.len());
    Ok(sessions)
}

/// Open the first connected PlasmaTrim.
///
/// Fails with `DeviceNotFound` if enumeration yields no matching
/// device.
pub fn open_any() -> Result<DeviceSession, Error> {
    let mut sessions = discover()?;
    if sessions.is_empty() {
        return Err(Error::DeviceNotFound("no PlasmaTrim connected".into()));
    }
    let mut session = sessions.remove(0);
    session.open()?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_filter() {
        assert!(matches_identity(0x26F3, 0x1000));
        assert!(!matches_identity(0x26F3, 0x1001));
        assert!(!matches_identity(0x046D, 0x1000));
        assert!(!matches_identity(0x0000, 0x0000));
    }
}

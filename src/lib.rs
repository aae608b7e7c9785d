//! Host-side driver for the PhotonFactory PlasmaTrim RGB-8
//!
//! The PlasmaTrim is an addressable 8-LED USB lighting device driven by
//! fixed 32-byte HID packets. This crate provides:
//!
//! - the command catalog and fixed-packet codec ([`protocol`], [`packet`])
//! - the LED state and sequence-table binary layouts ([`state`])
//! - device discovery by VID/PID ([`discovery`])
//! - the [`DeviceSession`] lifecycle: open a discovered device, issue
//!   commands, dispose exactly once
//!
//! The protocol is strictly half-duplex: the device processes one
//! command at a time and echoes every packet back as the
//! acknowledgment. Each session operation performs one write and
//! consumes one echo before returning, so callers drive a session from
//! a single thread and never have two commands in flight.
//!
//! Several commands persist state in the device's flash memory, which
//! has a finite write endurance. Those commands are flagged in the
//! catalog ([`Command::is_volatile`]); never issue them in a loop.

pub mod discovery;
pub mod error;
pub mod hid;
pub mod packet;
pub mod protocol;
pub mod session;
pub mod state;

pub use discovery::{discover, open_any, DeviceInfo};
pub use error::Error;
pub use packet::{decode, encode, Packet};
pub use protocol::{Command, Direction};
pub use session::{DeviceSession, SessionState};
pub use state::{LedState, Rgb, Serial, TableEntry};

/// An open, exclusive connection to one device.
///
/// Implementations move whole 32-byte packets; framing, claiming and
/// endpoint details stay behind this trait. A single write is a single
/// attempt: no retry happens below this seam.
pub trait Transport: Send {
    /// Write one packet, bounded by `timeout_ms`
    fn write_packet(&self, packet: &Packet, timeout_ms: u32) -> Result<(), Error>;

    /// Read one packet (a device echo or reply), bounded by `timeout_ms`
    fn read_packet(&self, timeout_ms: u32) -> Result<Packet, Error>;

    /// Check if the device is still reachable
    fn is_connected(&self) -> bool;

    /// Release the connection. Safe to call once; the session guarantees
    /// it is not called again afterwards.
    fn close(&self) -> Result<(), Error>;
}

/// A discovered but not yet opened device.
///
/// Opening acquires the transport resources (interface claim, packet
/// channel); a failed open leaves nothing acquired.
pub trait DeviceHandle: Send {
    /// Identification captured at enumeration time
    fn info(&self) -> &DeviceInfo;

    /// Open an exclusive connection to this device
    fn open(&self) -> Result<Box<dyn Transport>, Error>;
}

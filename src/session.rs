//! Device session lifecycle and command operations
//!
//! A [`DeviceSession`] binds one discovered device to an exclusive
//! transport connection:
//!
//! ```text
//! Discovered --open()--> Open --close()--> Closed
//!      \                  |                  |
//!       `---dispose()-----+------------------+--> Disposed
//! ```
//!
//! `Closed` and `Disposed` are terminal. Teardown runs at most once no
//! matter how often `close`/`dispose` are called, and every command
//! issued outside `Open` fails with `NotConnected` before any
//! transport I/O is attempted.
//!
//! Each command is one write followed by one echo read. The device is
//! half-duplex and processes commands in order, so the next packet read
//! always answers the last packet written; a reply whose command byte
//! does not echo the request is an error, not something to skip past.

use tracing::{debug, info, warn};

use crate::discovery::DeviceInfo;
use crate::error::Error;
use crate::packet::{self, Packet};
use crate::protocol::{timing, Command, NAME_LEN, SERIAL_LEN};
use crate::state::{LedState, Serial, TableEntry, BRIGHTNESS_MAX, TABLE_ENTRY_LEN};
use crate::DeviceHandle;

/// Lifecycle state of a [`DeviceSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Enumerated but no transport resources held
    Discovered,
    /// Transport open, commands may be issued
    Open,
    /// Explicitly closed; terminal
    Closed,
    /// Disposed; terminal
    Disposed,
}

/// A stateful connection to one PlasmaTrim.
///
/// Operations take `&mut self`, so a session can only ever have one
/// command in flight. Callers needing to share a session across
/// threads put their own lock around it.
pub struct DeviceSession {
    handle: Box<dyn DeviceHandle>,
    transport: Option<Box<dyn crate::Transport>>,
    state: SessionState,
}

impl DeviceSession {
    /// Wrap a discovered device. No resources are acquired yet.
    pub fn new(handle: Box<dyn DeviceHandle>) -> Self {
        Self {
            handle,
            transport: None,
            state: SessionState::Discovered,
        }
    }

    /// Identification captured at enumeration time
    pub fn info(&self) -> &DeviceInfo {
        self.handle.info()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Acquire transport resources and move to `Open`.
    ///
    /// A failed open leaves the session in `Discovered` with nothing
    /// acquired; it may be retried or disposed. Opening an already-open
    /// session is a no-op; a closed or disposed session cannot be
    /// reopened.
    pub fn open(&mut self) -> Result<(), Error> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Discovered => {
                let transport = self.handle.open()?;
                self.transport = Some(transport);
                self.state = SessionState::Open;
                info!("Opened PlasmaTrim at {}", self.handle.info().path);
                Ok(())
            }
            SessionState::Closed | SessionState::Disposed => Err(Error::NotConnected),
        }
    }

    /// Start playing the on-board sequence
    pub fn start_sequence(&mut self) -> Result<(), Error> {
        self.command(Command::StartSequence, &[])?;
        Ok(())
    }

    /// Stop playing the on-board sequence
    pub fn stop_sequence(&mut self) -> Result<(), Error> {
        self.command(Command::StopSequence, &[])?;
        Ok(())
    }

    /// Write all 8 LEDs and the immediate brightness in one packet
    pub fn set_immediate_state(&mut self, state: &LedState) -> Result<(), Error> {
        self.command(Command::ImmediateWrite, &state.serialize())?;
        Ok(())
    }

    /// Read the LED colors currently being output.
    ///
    /// The device reports colors only; the returned brightness is
    /// always zero.
    pub fn read_immediate_state(&mut self) -> Result<LedState, Error> {
        let reply = self.command(Command::ImmediateRead, &[])?;
        LedState::deserialize(reply.payload())
    }

    /// Set how many table entries the sequence plays.
    ///
    /// Writes device flash; flash endurance is finite, so never issue
    /// this in a loop.
    pub fn write_table_length(&mut self, length: u8) -> Result<(), Error> {
        self.command(Command::WriteTableLength, &[length])?;
        Ok(())
    }

    /// Read the active sequence-table length
    pub fn read_table_length(&mut self) -> Result<u8, Error> {
        let reply = self.command(Command::ReadTableLength, &[])?;
        Ok(reply.payload()[0])
    }

    /// Store one sequence-table row at `entry.index`.
    ///
    /// Writes device flash; flash endurance is finite, so never issue
    /// this in a loop.
    pub fn write_table_entry(&mut self, entry: &TableEntry) -> Result<(), Error> {
        let packed = entry.pack()?;
        self.command(Command::WriteTableEntry, &packed)?;
        Ok(())
    }

    /// Read one sequence-table row
    pub fn read_table_entry(&mut self, index: u8) -> Result<TableEntry, Error> {
        let reply = self.command(Command::ReadTableEntry, &[index])?;
        TableEntry::unpack(&reply.payload()[..TABLE_ENTRY_LEN])
    }

    /// Store a plaintext name (up to 26 bytes) identifying this unit in
    /// multi-device setups. NUL-padded on the wire.
    ///
    /// Writes device flash; flash endurance is finite, so never issue
    /// this in a loop.
    pub fn write_device_name(&mut self, name: &str) -> Result<(), Error> {
        let bytes = name.as_bytes();
        if bytes.len() > NAME_LEN {
            return Err(Error::InvalidPayload(format!(
                "device name is {} bytes, limit is {NAME_LEN}",
                bytes.len()
            )));
        }
        let mut payload = [0u8; NAME_LEN];
        payload[..bytes.len()].copy_from_slice(bytes);
        self.command(Command::WriteDeviceName, &payload)?;
        Ok(())
    }

    /// Read the stored device name with its NUL padding stripped
    pub fn read_device_name(&mut self) -> Result<String, Error> {
        let reply = self.command(Command::ReadDeviceName, &[])?;
        let raw = &reply.payload()[..NAME_LEN];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    /// Read the serial number printed on the unit's label
    pub fn read_device_serial(&mut self) -> Result<Serial, Error> {
        let reply = self.command(Command::ReadDeviceSerial, &[])?;
        let mut serial = [0u8; SERIAL_LEN];
        serial.copy_from_slice(&reply.payload()[..SERIAL_LEN]);
        Ok(Serial(serial))
    }

    /// Store the brightness (0-100) used for stand-alone playback.
    ///
    /// Writes device flash; flash endurance is finite, so never issue
    /// this in a loop. Storing zero makes a playing device look dead,
    /// so the range is validated before any I/O.
    pub fn write_brightness(&mut self, brightness: u8) -> Result<(), Error> {
        if brightness > BRIGHTNESS_MAX {
            return Err(Error::InvalidPayload(format!(
                "brightness {brightness} exceeds limit {BRIGHTNESS_MAX}"
            )));
        }
        self.command(Command::WriteBrightness, &[brightness])?;
        Ok(())
    }

    /// Recall the stored stand-alone brightness
    pub fn read_brightness(&mut self) -> Result<u8, Error> {
        let reply = self.command(Command::ReadBrightness, &[])?;
        Ok(reply.payload()[0])
    }

    /// Release transport resources and move to `Closed`.
    ///
    /// Safe to call repeatedly; teardown runs at most once.
    pub fn close(&mut self) -> Result<(), Error> {
        let result = self.teardown();
        if self.state != SessionState::Disposed {
            self.state = SessionState::Closed;
        }
        result
    }

    /// Release transport resources and move to `Disposed`.
    ///
    /// Reachable from any state, idempotent, and never fails; a close
    /// error on this path is logged and swallowed.
    pub fn dispose(&mut self) {
        if let Err(e) = self.teardown() {
            warn!("Error closing transport during dispose: {e}");
        }
        self.state = SessionState::Disposed;
    }

    fn teardown(&mut self) -> Result<(), Error> {
        match self.transport.take() {
            Some(transport) => {
                info!("Closing PlasmaTrim at {}", self.handle.info().path);
                transport.close()
            }
            None => Ok(()),
        }
    }

    /// Issue one command: local validation, encode, single write,
    /// single echo read, echo check. No transport call happens unless
    /// the session is `Open` and the payload is in bounds.
    fn command(&mut self, cmd: Command, payload: &[u8]) -> Result<Packet, Error> {
        if self.state != SessionState::Open {
            return Err(Error::NotConnected);
        }
        let transport = self.transport.as_ref().ok_or(Error::NotConnected)?;

        if payload.len() > cmd.max_payload() {
            return Err(Error::InvalidPayload(format!(
                "{} payload is {} bytes, limit is {}",
                cmd.name(),
                payload.len(),
                cmd.max_payload()
            )));
        }

        let request = packet::encode(cmd, payload)?;
        debug!("Sending {}: {:02X?}", cmd.name(), &request.as_bytes()[..8]);
        transport.write_packet(&request, timing::IO_TIMEOUT_MS)?;

        let reply = transport.read_packet(timing::IO_TIMEOUT_MS)?;
        if reply.command_code() != cmd.code() {
            return Err(Error::ReplyMismatch {
                expected: cmd.code(),
                actual: reply.command_code(),
            });
        }
        Ok(reply)
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

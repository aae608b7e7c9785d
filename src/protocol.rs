//! Protocol constants and the PlasmaTrim command catalog
//!
//! The device speaks fixed 32-byte HID packets: one command byte followed
//! by up to 31 parameter bytes, zero-padded. Every command is echoed back
//! by the device in a 32-byte reply; read commands carry their result in
//! the reply payload.

/// Total packet size on the wire
pub const PACKET_SIZE: usize = 32;
/// Maximum payload bytes per packet (everything after the command byte)
pub const MAX_PAYLOAD: usize = 31;
/// Maximum device name length in bytes (NUL-padded on the wire)
pub const NAME_LEN: usize = 26;
/// Serial number length in bytes
pub const SERIAL_LEN: usize = 4;

/// Whether a command only acknowledges or carries data back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device echoes the request packet as the acknowledgment
    Write,
    /// Device reply carries the requested data in its payload
    Read,
}

/// The closed set of PlasmaTrim HID commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    ImmediateWrite = 0x00,
    ImmediateRead = 0x01,
    StartSequence = 0x02,
    StopSequence = 0x03,
    WriteTableLength = 0x04,
    ReadTableLength = 0x05,
    WriteTableEntry = 0x06,
    ReadTableEntry = 0x07,
    WriteDeviceName = 0x08,
    ReadDeviceName = 0x09,
    ReadDeviceSerial = 0x0A,
    WriteBrightness = 0x0B,
    ReadBrightness = 0x0C,
}

impl Command {
    /// All commands in code order
    pub const ALL: [Command; 13] = [
        Command::ImmediateWrite,
        Command::ImmediateRead,
        Command::StartSequence,
        Command::StopSequence,
        Command::WriteTableLength,
        Command::ReadTableLength,
        Command::WriteTableEntry,
        Command::ReadTableEntry,
        Command::WriteDeviceName,
        Command::ReadDeviceName,
        Command::ReadDeviceSerial,
        Command::WriteBrightness,
        Command::ReadBrightness,
    ];

    /// Wire command byte
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a command from its wire byte
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Whether this command returns data or just an echo
    pub fn direction(self) -> Direction {
        match self {
            Command::ImmediateRead
            | Command::ReadTableLength
            | Command::ReadTableEntry
            | Command::ReadDeviceName
            | Command::ReadDeviceSerial
            | Command::ReadBrightness => Direction::Read,
            _ => Direction::Write,
        }
    }

    /// Whether this command writes to the device's non-volatile flash.
    ///
    /// Flash endurance is finite (several hundred thousand writes), so
    /// volatile-marked commands must not be issued in tight loops. The
    /// catalog records the flag; rate limiting is the caller's job.
    pub fn is_volatile(self) -> bool {
        matches!(
            self,
            Command::WriteTableLength
                | Command::WriteTableEntry
                | Command::WriteDeviceName
                | Command::WriteBrightness
        )
    }

    /// Maximum request payload size for this command
    pub fn max_payload(self) -> usize {
        match self {
            Command::ImmediateWrite => MAX_PAYLOAD,
            Command::WriteTableLength | Command::WriteBrightness => 1,
            Command::WriteTableEntry => 14,
            Command::ReadTableEntry => 1,
            Command::WriteDeviceName => NAME_LEN,
            Command::ImmediateRead
            | Command::StartSequence
            | Command::StopSequence
            | Command::ReadTableLength
            | Command::ReadDeviceName
            | Command::ReadDeviceSerial
            | Command::ReadBrightness => 0,
        }
    }

    /// Human-readable command name
    pub fn name(self) -> &'static str {
        match self {
            Command::ImmediateWrite => "IMMEDIATE_WRITE",
            Command::ImmediateRead => "IMMEDIATE_READ",
            Command::StartSequence => "START_SEQUENCE",
            Command::StopSequence => "STOP_SEQUENCE",
            Command::WriteTableLength => "WRITE_TABLE_LENGTH",
            Command::ReadTableLength => "READ_TABLE_LENGTH",
            Command::WriteTableEntry => "WRITE_TABLE_ENTRY",
            Command::ReadTableEntry => "READ_TABLE_ENTRY",
            Command::WriteDeviceName => "WRITE_DEVICE_NAME",
            Command::ReadDeviceName => "READ_DEVICE_NAME",
            Command::ReadDeviceSerial => "READ_DEVICE_SERIAL",
            Command::WriteBrightness => "WRITE_BRIGHTNESS",
            Command::ReadBrightness => "READ_BRIGHTNESS",
        }
    }
}

/// Device identification constants
pub mod device {
    /// PhotonFactory vendor ID
    pub const VENDOR_ID: u16 = 0x26F3;
    /// PlasmaTrim RGB-8 product ID (may change with new product versions)
    pub const PRODUCT_ID: u16 = 0x1000;
}

/// HID communication timing constants
pub mod timing {
    /// Timeout bounding each write and each echo read (ms).
    /// The device acknowledges promptly; no retry is attempted on timeout.
    pub const IO_TIMEOUT_MS: u32 = 100;
}

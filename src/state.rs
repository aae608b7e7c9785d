//! LED state and sequence-table binary layouts
//!
//! Two payload formats live here:
//!
//! - The immediate-write state: 8 RGB triples, a global brightness byte
//!   and 6 reserved bytes, 31 bytes total. Reserved bytes are always
//!   zero on output and ignored on input, so serialization is
//!   canonicalizing.
//! - The sequence-table entry: an index byte, 24 LED channel values
//!   packed two-per-byte at 4 bits each, and one byte packing the hold
//!   and fade speed nibbles. 14 bytes total.

use std::fmt;

use crate::error::Error;
use crate::protocol::SERIAL_LEN;

/// Number of LEDs on the device
pub const LED_COUNT: usize = 8;
/// Serialized immediate-state payload size
pub const STATE_LEN: usize = 31;
/// Packed table-entry size (index + 12 channel bytes + speed byte)
pub const TABLE_ENTRY_LEN: usize = 14;
/// Channel values per table entry (8 LEDs x R,G,B)
pub const ENTRY_CHANNELS: usize = LED_COUNT * 3;
/// Largest value a 4-bit packed field can hold
pub const NIBBLE_MAX: u8 = 0x0F;
/// Largest meaningful brightness for the non-volatile store command
pub const BRIGHTNESS_MAX: u8 = 100;

/// RGB color at full 8-bit depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
}

/// Immediate-mode state of all 8 LEDs plus global brightness.
///
/// Brightness scales the output 0-100 without reducing dynamic range.
/// It only affects immediate operation; the non-volatile brightness
/// used for stand-alone playback is set with the store-brightness
/// command instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedState {
    pub leds: [Rgb; LED_COUNT],
    pub brightness: u8,
}

impl LedState {
    /// All LEDs set to the same color
    pub fn uniform(color: Rgb, brightness: u8) -> Self {
        Self {
            leds: [color; LED_COUNT],
            brightness,
        }
    }

    /// Serialize to the fixed 31-byte wire layout:
    /// `R0 G0 B0 .. R7 G7 B7, brightness, 6 reserved zeros`.
    pub fn serialize(&self) -> [u8; STATE_LEN] {
        let mut buf = [0u8; STATE_LEN];
        for (i, led) in self.leds.iter().enumerate() {
            buf[i * 3] = led.r;
            buf[i * 3 + 1] = led.g;
            buf[i * 3 + 2] = led.b;
        }
        buf[LED_COUNT * 3] = self.brightness;
        // bytes 25-30 stay reserved/zero
        buf
    }

    /// Parse a 31-byte state payload. Reserved byte content is ignored.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != STATE_LEN {
            return Err(Error::InvalidPayload(format!(
                "LED state is {} bytes, expected {STATE_LEN}",
                bytes.len()
            )));
        }
        let mut leds = [Rgb::default(); LED_COUNT];
        for (i, led) in leds.iter_mut().enumerate() {
            *led = Rgb::new(bytes[i * 3], bytes[i * 3 + 1], bytes[i * 3 + 2]);
        }
        Ok(Self {
            leds,
            brightness: bytes[LED_COUNT * 3],
        })
    }
}

/// One row of the on-board animation sequence table.
///
/// Channels are in `R1,G1,B1,R2,..,B8` order and each value is 0-15.
/// On the wire adjacent channels share a byte, first-named channel in
/// the high nibble: `R1G1 B1R2 G2B2 R3G3 B3R4 G4B4 R5G5 B5R6 G6B6
/// R7G7 B7R8 G8B8`, followed by `S1S2` with the hold speed in the high
/// nibble and the fade speed in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub index: u8,
    pub channels: [u8; ENTRY_CHANNELS],
    pub hold_speed: u8,
    pub fade_speed: u8,
}

impl TableEntry {
    /// Pack into the 14-byte wire layout.
    ///
    /// Fails with `InvalidPayload` if any channel or speed exceeds the
    /// 4-bit range.
    pub fn pack(&self) -> Result<[u8; TABLE_ENTRY_LEN], Error> {
        for (i, &value) in self.channels.iter().enumerate() {
            if value > NIBBLE_MAX {
                return Err(Error::InvalidPayload(format!(
                    "channel {i} value {value} exceeds 4-bit range"
                )));
            }
        }
        if self.hold_speed > NIBBLE_MAX || self.fade_speed > NIBBLE_MAX {
            return Err(Error::InvalidPayload(format!(
                "speeds {}/{} exceed 4-bit range",
                self.hold_speed, self.fade_speed
            )));
        }

        let mut buf = [0u8; TABLE_ENTRY_LEN];
        buf[0] = self.index;
        for pair in 0..ENTRY_CHANNELS / 2 {
            buf[1 + pair] = (self.channels[pair * 2] << 4) | self.channels[pair * 2 + 1];
        }
        buf[TABLE_ENTRY_LEN - 1] = (self.hold_speed << 4) | self.fade_speed;
        Ok(buf)
    }

    /// Unpack a 14-byte wire entry. Exact inverse of [`pack`](Self::pack).
    pub fn unpack(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != TABLE_ENTRY_LEN {
            return Err(Error::InvalidPayload(format!(
                "table entry is {} bytes, expected {TABLE_ENTRY_LEN}",
                bytes.len()
            )));
        }
        let mut channels = [0u8; ENTRY_CHANNELS];
        for pair in 0..ENTRY_CHANNELS / 2 {
            channels[pair * 2] = bytes[1 + pair] >> 4;
            channels[pair * 2 + 1] = bytes[1 + pair] & NIBBLE_MAX;
        }
        let speeds = bytes[TABLE_ENTRY_LEN - 1];
        Ok(Self {
            index: bytes[0],
            channels,
            hold_speed: speeds >> 4,
            fade_speed: speeds & NIBBLE_MAX,
        })
    }
}

/// Device serial number as printed on the unit's label.
///
/// Stable across re-enumeration, unlike the OS device order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serial(pub [u8; SERIAL_LEN]);

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::encode;
    use crate::protocol::Command;

    #[test]
    fn test_state_serialize_layout() {
        let mut state = LedState {
            brightness: 255,
            ..Default::default()
        };
        state.leds[4] = Rgb::new(10, 200, 0);

        let bytes = state.serialize();
        assert_eq!(bytes.len(), STATE_LEN);
        assert_eq!(bytes[12], 10); // R4
        assert_eq!(bytes[13], 200); // G4
        assert_eq!(bytes[14], 0); // B4
        assert_eq!(bytes[24], 255); // brightness
        assert!(bytes[25..].iter().all(|&b| b == 0)); // reserved
    }

    #[test]
    fn test_immediate_write_packet_layout() {
        let mut state = LedState {
            brightness: 255,
            ..Default::default()
        };
        state.leds[4] = Rgb::new(10, 200, 0);

        let packet = encode(Command::ImmediateWrite, &state.serialize()).unwrap();
        let bytes = packet.as_bytes();
        assert_eq!(bytes[0], 0x00);
        assert_eq!(bytes[1 + 4 * 3], 10);
        assert_eq!(bytes[2 + 4 * 3], 200);
        assert_eq!(bytes[3 + 4 * 3], 0);
        assert_eq!(bytes[25], 255); // brightness
        assert!(bytes[26..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_state_roundtrip() {
        let mut state = LedState {
            brightness: 73,
            ..Default::default()
        };
        for (i, led) in state.leds.iter_mut().enumerate() {
            *led = Rgb::new(i as u8 * 30, 255 - i as u8, i as u8);
        }
        assert_eq!(LedState::deserialize(&state.serialize()).unwrap(), state);
    }

    #[test]
    fn test_deserialize_ignores_reserved_bytes() {
        let state = LedState::uniform(Rgb::new(1, 2, 3), 50);
        let mut bytes = state.serialize();
        bytes[25..].fill(0xAB);
        let parsed = LedState::deserialize(&bytes).unwrap();
        assert_eq!(parsed, state);
        // re-serialization canonicalizes the reserved bytes back to zero
        assert!(parsed.serialize()[25..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_deserialize_rejects_wrong_length() {
        assert!(LedState::deserialize(&[0u8; 30]).is_err());
        assert!(LedState::deserialize(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_table_entry_pack_layout() {
        let mut channels = [0u8; ENTRY_CHANNELS];
        for (i, c) in channels.iter_mut().enumerate() {
            // alternate full/off so every pair byte is 0xF0
            if i % 2 == 0 {
                *c = 15;
            }
        }
        let entry = TableEntry {
            index: 3,
            channels,
            hold_speed: 1,
            fade_speed: 2,
        };

        let packed = entry.pack().unwrap();
        assert_eq!(packed[0], 0x03);
        assert!(packed[1..13].iter().all(|&b| b == 0xF0));
        assert_eq!(packed[13], 0x12); // S1 high nibble, S2 low nibble
        assert_eq!(TableEntry::unpack(&packed).unwrap(), entry);
    }

    #[test]
    fn test_table_entry_pair_order() {
        // R1=1 G1=2 B1=3 R2=4: pairs are (R1,G1)=0x12 and (B1,R2)=0x34
        let mut channels = [0u8; ENTRY_CHANNELS];
        channels[..4].copy_from_slice(&[1, 2, 3, 4]);
        let entry = TableEntry {
            index: 0,
            channels,
            hold_speed: 0,
            fade_speed: 0,
        };
        let packed = entry.pack().unwrap();
        assert_eq!(packed[1], 0x12);
        assert_eq!(packed[2], 0x34);
    }

    #[test]
    fn test_table_entry_roundtrip() {
        let mut channels = [0u8; ENTRY_CHANNELS];
        for (i, c) in channels.iter_mut().enumerate() {
            *c = (i % 16) as u8;
        }
        let entry = TableEntry {
            index: 42,
            channels,
            hold_speed: 15,
            fade_speed: 0,
        };
        assert_eq!(TableEntry::unpack(&entry.pack().unwrap()).unwrap(), entry);
    }

    #[test]
    fn test_table_entry_rejects_out_of_range() {
        let good = TableEntry {
            index: 0,
            channels: [0; ENTRY_CHANNELS],
            hold_speed: 0,
            fade_speed: 0,
        };
        let mut bad_channel = good;
        bad_channel.channels[7] = 16;
        assert!(matches!(
            bad_channel.pack(),
            Err(Error::InvalidPayload(_))
        ));

        let mut bad_speed = good;
        bad_speed.fade_speed = 16;
        assert!(bad_speed.pack().is_err());

        let mut boundary = good;
        boundary.channels[0] = 15;
        boundary.hold_speed = 15;
        assert!(boundary.pack().is_ok());
    }

    #[test]
    fn test_table_entry_unpack_rejects_wrong_length() {
        assert!(TableEntry::unpack(&[0u8; 13]).is_err());
        assert!(TableEntry::unpack(&[0u8; 15]).is_err());
    }

    #[test]
    fn test_serial_display() {
        let serial = Serial([0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(serial.to_string(), "DEADBEEF");
        assert_eq!(Serial([0, 1, 2, 3]).to_string(), "00010203");
    }
}

//! HID transport implementation for direct USB connection

use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::packet::Packet;
use crate::protocol::PACKET_SIZE;
use crate::Transport;

/// Transport over a claimed `hidapi` device.
///
/// The device uses unnumbered reports, so output packets are prefixed
/// with report ID 0 and input packets arrive as the bare 32 bytes.
pub struct HidTransport {
    device: Mutex<HidDevice>,
}

impl HidTransport {
    pub fn new(device: HidDevice) -> Self {
        Self {
            device: Mutex::new(device),
        }
    }
}

impl Transport for HidTransport {
    // hidapi output writes are blocking with no timeout parameter; the
    // timeout budget applies to the echo read on the input side.
    fn write_packet(&self, packet: &Packet, _timeout_ms: u32) -> Result<(), Error> {
        let mut buf = [0u8; PACKET_SIZE + 1];
        buf[0] = 0; // report ID
        buf[1..].copy_from_slice(packet.as_bytes());

        debug!(
            "Writing packet 0x{:02X}: {:02X?}",
            packet.command_code(),
            &packet.as_bytes()[..8]
        );

        let device = self.device.lock();
        let written = device.write(&buf)?;
        if written < PACKET_SIZE {
            return Err(Error::Hid(format!(
                "short write: {written} of {PACKET_SIZE} bytes"
            )));
        }
        Ok(())
    }

    fn read_packet(&self, timeout_ms: u32) -> Result<Packet, Error> {
        let mut buf = [0u8; PACKET_SIZE];
        let device = self.device.lock();
        let read = device.read_timeout(&mut buf, timeout_ms as i32)?;
        if read == 0 {
            return Err(Error::Timeout);
        }
        if read != PACKET_SIZE {
            return Err(Error::MalformedPacket {
                expected: PACKET_SIZE,
                got: read,
            });
        }
        debug!("Read packet 0x{:02X}: {:02X?}", buf[0], &buf[..8]);
        Ok(Packet::from_bytes(buf))
    }

    fn is_connected(&self) -> bool {
        self.device.lock().get_product_string().is_ok()
    }

    fn close(&self) -> Result<(), Error> {
        // interface release and handle teardown happen when the
        // HidDevice drops with the transport
        Ok(())
    }
}

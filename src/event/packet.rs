//! Packet construction and 12-bit sample packing
//!
//! Packet layout (78 bytes, multi-byte fields little-endian):
//! ```text
//! ┌──────┬───────┬──────────────────────────────┐
//! │ off  │ width │ field                        │
//! ├──────┼───────┼──────────────────────────────┤
//! │  0   │   2   │ header marker                │
//! │  2   │   1   │ channel                      │
//! │  3   │   4   │ trigger timestamp            │
//! │  7   │   2   │ logical position (always 0)  │
//! │  9   │   2   │ physical position (window)   │
//! │ 11   │  64   │ packed samples               │
//! │ 75   │   2   │ footer marker                │
//! │ 77   │   1   │ info                         │
//! └──────┴───────┴──────────────────────────────┘
//! ```
//!
//! Each sample occupies two payload bytes: the first holds the upper 4 bits
//! of the 12-bit value in its low nibble (high nibble zero), the second holds
//! the low 8 bits.

use crate::common::{WireError, WireResult, PACKED_SAMPLE_BYTES, SAMPLES_PER_WINDOW, SAMPLE_MASK};
use crate::config::PacketFraming;

/// Serialized packet size in bytes
pub const PACKET_WIRE_SIZE: usize = 2 + 1 + 4 + 2 + 2 + PACKED_SAMPLE_BYTES + 2 + 1;

const OFF_CHANNEL: usize = 2;
const OFF_TRIGGER_TIME: usize = 3;
const OFF_LOGICAL: usize = 7;
const OFF_PHYSICAL: usize = 9;
const OFF_SAMPLES: usize = 11;
const OFF_FOOTER: usize = OFF_SAMPLES + PACKED_SAMPLE_BYTES;
const OFF_INFO: usize = OFF_FOOTER + 2;

/// One channel/window slice of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: u16,
    pub channel: u8,
    /// Equal to the owning event's reference timestamp
    pub trigger_time: u32,
    /// Reserved, always 0
    pub logical_position: u16,
    /// Window index within the event
    pub physical_position: u16,
    pub samples: [u8; PACKED_SAMPLE_BYTES],
    pub footer: u16,
    pub info: u8,
}

/// Pack 32 samples into the 64-byte payload, masking each to 12 bits
pub fn pack_samples(samples: &[u16; SAMPLES_PER_WINDOW]) -> [u8; PACKED_SAMPLE_BYTES] {
    let mut packed = [0u8; PACKED_SAMPLE_BYTES];
    for (pair, &sample) in packed.chunks_exact_mut(2).zip(samples.iter()) {
        let adc = sample & SAMPLE_MASK;
        pair[0] = ((adc >> 8) & 0x0F) as u8;
        pair[1] = (adc & 0xFF) as u8;
    }
    packed
}

/// Recover the 12-bit samples from a packed payload
///
/// Stray bits in the high nibble of the first byte are ignored.
pub fn unpack_samples(packed: &[u8; PACKED_SAMPLE_BYTES]) -> [u16; SAMPLES_PER_WINDOW] {
    let mut samples = [0u16; SAMPLES_PER_WINDOW];
    for (sample, pair) in samples.iter_mut().zip(packed.chunks_exact(2)) {
        *sample = (((pair[0] & 0x0F) as u16) << 8) | pair[1] as u16;
    }
    samples
}

/// Build one packet from a window of samples
pub fn build_packet(
    framing: &PacketFraming,
    channel: u8,
    trigger_time: u32,
    window_index: u16,
    samples: &[u16; SAMPLES_PER_WINDOW],
) -> Packet {
    Packet {
        header: framing.header,
        channel,
        trigger_time,
        logical_position: 0,
        physical_position: window_index,
        samples: pack_samples(samples),
        footer: framing.footer,
        info: framing.info,
    }
}

impl Packet {
    /// Decoded 12-bit samples of this packet
    pub fn unpacked_samples(&self) -> [u16; SAMPLES_PER_WINDOW] {
        unpack_samples(&self.samples)
    }

    /// Serialized size in bytes
    pub const fn size(&self) -> usize {
        PACKET_WIRE_SIZE
    }

    /// Write the packet into the start of `buf`, returning bytes written
    pub fn serialize_into(&self, buf: &mut [u8]) -> WireResult<usize> {
        if buf.len() < PACKET_WIRE_SIZE {
            return Err(WireError::buffer_too_small(PACKET_WIRE_SIZE, buf.len()));
        }

        buf[0..OFF_CHANNEL].copy_from_slice(&self.header.to_le_bytes());
        buf[OFF_CHANNEL] = self.channel;
        buf[OFF_TRIGGER_TIME..OFF_LOGICAL].copy_from_slice(&self.trigger_time.to_le_bytes());
        buf[OFF_LOGICAL..OFF_PHYSICAL].copy_from_slice(&self.logical_position.to_le_bytes());
        buf[OFF_PHYSICAL..OFF_SAMPLES].copy_from_slice(&self.physical_position.to_le_bytes());
        buf[OFF_SAMPLES..OFF_FOOTER].copy_from_slice(&self.samples);
        buf[OFF_FOOTER..OFF_INFO].copy_from_slice(&self.footer.to_le_bytes());
        buf[OFF_INFO] = self.info;

        Ok(PACKET_WIRE_SIZE)
    }

    /// Serialize to a freshly allocated buffer
    pub fn to_bytes(&self) -> [u8; PACKET_WIRE_SIZE] {
        let mut buf = [0u8; PACKET_WIRE_SIZE];
        // Cannot fail: the buffer has exactly the packet size
        let _ = self.serialize_into(&mut buf);
        buf
    }

    /// Parse a packet from the start of `data`
    pub fn from_bytes(data: &[u8]) -> WireResult<Self> {
        if data.len() < PACKET_WIRE_SIZE {
            return Err(WireError::truncated(PACKET_WIRE_SIZE, data.len()));
        }

        let mut samples = [0u8; PACKED_SAMPLE_BYTES];
        samples.copy_from_slice(&data[OFF_SAMPLES..OFF_FOOTER]);

        Ok(Self {
            header: u16::from_le_bytes([data[0], data[1]]),
            channel: data[OFF_CHANNEL],
            trigger_time: u32::from_le_bytes([data[3], data[4], data[5], data[6]]),
            logical_position: u16::from_le_bytes([data[7], data[8]]),
            physical_position: u16::from_le_bytes([data[9], data[10]]),
            samples,
            footer: u16::from_le_bytes([data[OFF_FOOTER], data[OFF_FOOTER + 1]]),
            info: data[OFF_INFO],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> [u16; SAMPLES_PER_WINDOW] {
        let mut samples = [0u16; SAMPLES_PER_WINDOW];
        for (i, s) in samples.iter_mut().enumerate() {
            *s = (i as u16) * 0x81;
        }
        samples
    }

    #[test]
    fn test_wire_size() {
        assert_eq!(PACKET_WIRE_SIZE, 78);
    }

    #[test]
    fn test_pack_layout() {
        let mut samples = [0u16; SAMPLES_PER_WINDOW];
        samples[0] = 0x0ABC;
        samples[1] = 0x0F00;
        samples[31] = 0x0001;
        let packed = pack_samples(&samples);
        assert_eq!(&packed[0..4], &[0x0A, 0xBC, 0x0F, 0x00]);
        assert_eq!(&packed[62..64], &[0x00, 0x01]);
    }

    #[test]
    fn test_pack_masks_to_12_bits() {
        let samples = [0xFFFFu16; SAMPLES_PER_WINDOW];
        let packed = pack_samples(&samples);
        for pair in packed.chunks_exact(2) {
            assert_eq!(pair, &[0x0F, 0xFF]);
        }
        assert_eq!(unpack_samples(&packed), [0x0FFF; SAMPLES_PER_WINDOW]);
    }

    #[test]
    fn test_unpack_ignores_high_nibble() {
        let mut packed = [0u8; PACKED_SAMPLE_BYTES];
        packed[0] = 0xF3;
        packed[1] = 0x21;
        assert_eq!(unpack_samples(&packed)[0], 0x0321);
    }

    #[test]
    fn test_build_packet_fields() {
        let framing = PacketFraming {
            header: 0xAAAA,
            footer: 0xFFFF,
            info: 0x5,
        };
        let packet = build_packet(&framing, 7, 0x00AB_CDEF, 3, &ramp());
        assert_eq!(packet.header, 0xAAAA);
        assert_eq!(packet.footer, 0xFFFF);
        assert_eq!(packet.info, 0x5);
        assert_eq!(packet.channel, 7);
        assert_eq!(packet.trigger_time, 0x00AB_CDEF);
        assert_eq!(packet.logical_position, 0);
        assert_eq!(packet.physical_position, 3);
        assert_eq!(packet.unpacked_samples(), ramp().map(|s| s & SAMPLE_MASK));
    }

    #[test]
    fn test_serialized_layout() {
        let packet = build_packet(&PacketFraming::default(), 2, 0x0102_0304, 0x0506, &ramp());
        let bytes = packet.to_bytes();
        assert_eq!(&bytes[0..2], &[0xAA, 0xAA]);
        assert_eq!(bytes[2], 2);
        assert_eq!(&bytes[3..7], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[7..9], &[0x00, 0x00]);
        assert_eq!(&bytes[9..11], &[0x06, 0x05]);
        assert_eq!(&bytes[11..75], &packet.samples[..]);
        assert_eq!(&bytes[75..77], &[0xFF, 0xFF]);
        assert_eq!(bytes[77], 0);
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let packet = build_packet(&PacketFraming::default(), 9, 12345, 1, &ramp());
        let parsed = Packet::from_bytes(&packet.to_bytes()).unwrap();
        assert_eq!(parsed, packet);
    }

    #[test]
    fn test_serialize_into_short_buffer() {
        let packet = build_packet(&PacketFraming::default(), 0, 0, 0, &ramp());
        let mut buf = [0u8; 10];
        assert_eq!(
            packet.serialize_into(&mut buf),
            Err(WireError::buffer_too_small(78, 10))
        );
    }

    #[test]
    fn test_from_bytes_truncated() {
        assert_eq!(
            Packet::from_bytes(&[0u8; 77]),
            Err(WireError::truncated(78, 77))
        );
    }
}

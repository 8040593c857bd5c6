//! Synthetic acquisition events and their wire format
//!
//! Event structure (multi-byte fields little-endian):
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Event header (26 bytes)                │
//! │  - marker, info, index, timestamp       │
//! │  - packet_size, reserved, num_packets   │
//! │  - channel_mask, num_windows            │
//! ├─────────────────────────────────────────┤
//! │  Packet 0 (78 bytes)                    │
//! │  ...                                    │
//! │  Packet n-1                             │
//! ├─────────────────────────────────────────┤
//! │  Event footer marker (2 bytes)          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Packets appear channel-major, window-minor: all windows of the lowest
//! active channel first, in ascending window order.

pub mod packet;

pub use packet::{build_packet, pack_samples, unpack_samples, Packet, PACKET_WIRE_SIZE};

use crate::common::{WireError, WireResult};
use crate::config::GeneratorConfig;

/// Serialized event header size in bytes
pub const EVENT_HEADER_SIZE: usize = 2 + 1 + 4 + 4 + 2 + 2 + 2 + 8 + 1;

/// Serialized event footer size in bytes
pub const EVENT_FOOTER_SIZE: usize = 2;

/// Event header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHeader {
    pub header: u16,
    pub info: u8,
    pub index: u32,
    /// Reference timestamp shared by every packet of the event
    pub reference_time: u32,
    /// Advisory, copied from the config and never checked
    pub packet_size: u16,
    /// Always 0
    pub reserved: u16,
    /// Written after the last packet
    pub footer: u16,
    pub num_packets: u16,
    pub channel_mask: u64,
    pub num_windows: u8,
}

impl EventHeader {
    /// Header for a new, empty event
    pub fn new(config: &GeneratorConfig, index: u32, reference_time: u32) -> Self {
        Self {
            header: config.event_header,
            info: config.event_info,
            index,
            reference_time,
            packet_size: config.packet_size,
            reserved: 0,
            footer: config.event_footer,
            num_packets: 0,
            channel_mask: config.channel_mask,
            num_windows: config.num_windows,
        }
    }

    fn write(&self, buf: &mut [u8]) {
        buf[0..2].copy_from_slice(&self.header.to_le_bytes());
        buf[2] = self.info;
        buf[3..7].copy_from_slice(&self.index.to_le_bytes());
        buf[7..11].copy_from_slice(&self.reference_time.to_le_bytes());
        buf[11..13].copy_from_slice(&self.packet_size.to_le_bytes());
        buf[13..15].copy_from_slice(&self.reserved.to_le_bytes());
        buf[15..17].copy_from_slice(&self.num_packets.to_le_bytes());
        buf[17..25].copy_from_slice(&self.channel_mask.to_le_bytes());
        buf[25] = self.num_windows;
    }

    /// Parse header fields; the footer is filled in by the caller
    fn read(data: &[u8]) -> Self {
        let mut mask = [0u8; 8];
        mask.copy_from_slice(&data[17..25]);
        Self {
            header: u16::from_le_bytes([data[0], data[1]]),
            info: data[2],
            index: u32::from_le_bytes([data[3], data[4], data[5], data[6]]),
            reference_time: u32::from_le_bytes([data[7], data[8], data[9], data[10]]),
            packet_size: u16::from_le_bytes([data[11], data[12]]),
            reserved: u16::from_le_bytes([data[13], data[14]]),
            footer: 0,
            num_packets: u16::from_le_bytes([data[15], data[16]]),
            channel_mask: u64::from_le_bytes(mask),
            num_windows: data[25],
        }
    }
}

/// One synthetic acquisition event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub header: EventHeader,
    packets: Vec<Packet>,
}

impl Event {
    /// Create an empty event with room for `capacity` packets
    pub fn with_capacity(header: EventHeader, capacity: usize) -> Self {
        Self {
            header,
            packets: Vec::with_capacity(capacity),
        }
    }

    /// Append a packet, keeping `header.num_packets` in sync
    pub fn push_packet(&mut self, packet: Packet) {
        self.packets.push(packet);
        self.header.num_packets = self.header.num_packets.wrapping_add(1);
    }

    /// Packets in wire order
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Number of packets
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Check if the event carries no packets
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Packets of one channel, in window order
    pub fn channel_packets(&self, channel: u8) -> impl Iterator<Item = &Packet> {
        self.packets.iter().filter(move |p| p.channel == channel)
    }

    /// Serialized size in bytes
    pub fn size(&self) -> usize {
        EVENT_HEADER_SIZE + self.packets.len() * PACKET_WIRE_SIZE + EVENT_FOOTER_SIZE
    }

    /// Write the event into the start of `buf`, returning bytes written
    pub fn serialize_into(&self, buf: &mut [u8]) -> WireResult<usize> {
        let size = self.size();
        if buf.len() < size {
            return Err(WireError::buffer_too_small(size, buf.len()));
        }

        self.header.write(&mut buf[..EVENT_HEADER_SIZE]);

        let mut offset = EVENT_HEADER_SIZE;
        for packet in &self.packets {
            offset += packet.serialize_into(&mut buf[offset..])?;
        }

        buf[offset..offset + EVENT_FOOTER_SIZE].copy_from_slice(&self.header.footer.to_le_bytes());
        Ok(offset + EVENT_FOOTER_SIZE)
    }

    /// Serialize to a freshly allocated buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size()];
        // Cannot fail: the buffer has exactly the event size
        let _ = self.serialize_into(&mut buf);
        buf
    }

    /// Parse one complete event; `data` must contain nothing else
    pub fn from_bytes(data: &[u8]) -> WireResult<Self> {
        if data.len() < EVENT_HEADER_SIZE {
            return Err(WireError::truncated(EVENT_HEADER_SIZE, data.len()));
        }

        let mut header = EventHeader::read(data);
        let num_packets = header.num_packets as usize;
        let needed = EVENT_HEADER_SIZE + num_packets * PACKET_WIRE_SIZE + EVENT_FOOTER_SIZE;
        if data.len() < needed {
            return Err(WireError::truncated(needed, data.len()));
        }
        if data.len() > needed {
            return Err(WireError::TrailingBytes(data.len() - needed));
        }

        let packets = data[EVENT_HEADER_SIZE..needed - EVENT_FOOTER_SIZE]
            .chunks_exact(PACKET_WIRE_SIZE)
            .map(Packet::from_bytes)
            .collect::<WireResult<Vec<_>>>()?;

        header.footer = u16::from_le_bytes([data[needed - 2], data[needed - 1]]);

        Ok(Self { header, packets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SAMPLES_PER_WINDOW;

    fn sample_event(channels: &[u8], windows: u16) -> Event {
        let config = GeneratorConfig::default();
        let mut event = Event::with_capacity(EventHeader::new(&config, 5, 0x00FF_FFFF), 0);
        for &ch in channels {
            for w in 0..windows {
                let samples = [(ch as u16) << 4 | w; SAMPLES_PER_WINDOW];
                event.push_packet(build_packet(
                    &config.packet_framing(),
                    ch,
                    event.header.reference_time,
                    w,
                    &samples,
                ));
            }
        }
        event
    }

    #[test]
    fn test_header_size() {
        assert_eq!(EVENT_HEADER_SIZE, 26);
    }

    #[test]
    fn test_empty_event() {
        let event = sample_event(&[], 0);
        assert!(event.is_empty());
        assert_eq!(event.size(), 28);
        let bytes = event.to_bytes();
        assert_eq!(&bytes[0..2], &[0xBB, 0xBB]);
        assert_eq!(&bytes[26..28], &[0xEE, 0xEE]);
    }

    #[test]
    fn test_push_updates_num_packets() {
        let event = sample_event(&[0, 1], 3);
        assert_eq!(event.len(), 6);
        assert_eq!(event.header.num_packets, 6);
        assert_eq!(event.channel_packets(1).count(), 3);
    }

    #[test]
    fn test_header_layout() {
        let event = sample_event(&[0], 1);
        let bytes = event.to_bytes();
        assert_eq!(bytes[2], 0); // info
        assert_eq!(&bytes[3..7], &5u32.to_le_bytes());
        assert_eq!(&bytes[7..11], &0x00FF_FFFFu32.to_le_bytes());
        assert_eq!(&bytes[11..13], &80u16.to_le_bytes());
        assert_eq!(&bytes[13..15], &[0, 0]);
        assert_eq!(&bytes[15..17], &1u16.to_le_bytes());
        assert_eq!(&bytes[17..25], &1u64.to_le_bytes());
        assert_eq!(bytes[25], 1);
        // First packet starts right after the header
        assert_eq!(&bytes[26..28], &[0xAA, 0xAA]);
    }

    #[test]
    fn test_serialize_into_exact_and_short() {
        let event = sample_event(&[0, 3], 2);
        let mut buf = vec![0u8; event.size()];
        assert_eq!(event.serialize_into(&mut buf), Ok(event.size()));
        assert_eq!(buf, event.to_bytes());

        let mut short = vec![0u8; event.size() - 1];
        assert!(matches!(
            event.serialize_into(&mut short),
            Err(WireError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let event = sample_event(&[1, 2, 63], 2);
        let parsed = Event::from_bytes(&event.to_bytes()).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_from_bytes_errors() {
        let bytes = sample_event(&[0], 2).to_bytes();
        assert!(matches!(
            Event::from_bytes(&bytes[..10]),
            Err(WireError::Truncated { .. })
        ));
        assert!(matches!(
            Event::from_bytes(&bytes[..bytes.len() - 1]),
            Err(WireError::Truncated { .. })
        ));

        let mut extra = bytes.clone();
        extra.extend_from_slice(&[0, 0, 0]);
        assert_eq!(Event::from_bytes(&extra), Err(WireError::TrailingBytes(3)));
    }
}

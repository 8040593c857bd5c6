//! Generator configuration
//!
//! The configuration is a plain value: it is replaced as a whole through
//! [`Generator::update_config`](crate::generator::Generator::update_config)
//! and takes effect on the next generated event.
//!
//! # Example
//! ```
//! use nalu_fake_rs::config::GeneratorConfig;
//!
//! let config = GeneratorConfig {
//!     channel_mask: 0x3,
//!     num_windows: 4,
//!     ..Default::default()
//! };
//! assert_eq!(config.active_channels(), vec![0, 1]);
//! assert_eq!(config.samples_per_channel(), 128);
//! ```

pub mod channel_mask;

pub use channel_mask::{active_channels, mask_from_channels, MAX_CHANNELS};

use serde::{Deserialize, Serialize};

use crate::common::SAMPLES_PER_WINDOW;

/// Default event header marker
pub const DEFAULT_EVENT_HEADER: u16 = 0xBBBB;
/// Default event footer marker
pub const DEFAULT_EVENT_FOOTER: u16 = 0xEEEE;
/// Default packet header marker
pub const DEFAULT_PACKET_HEADER: u16 = 0xAAAA;
/// Default packet footer marker
pub const DEFAULT_PACKET_FOOTER: u16 = 0xFFFF;
/// Default advisory packet size in bytes
pub const DEFAULT_PACKET_SIZE: u16 = 80;

/// Fake data generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    // Event framing
    /// Event header marker
    pub event_header: u16,
    /// Event footer marker
    pub event_footer: u16,
    /// Event info/flags byte
    pub event_info: u8,
    /// Index of the first generated event
    pub start_index: u32,
    /// Advisory packet size, copied verbatim into the event header
    pub packet_size: u16,

    // Channels
    /// Bit i set => channel i active
    pub channel_mask: u64,
    /// 32-sample windows per channel per event
    pub num_windows: u8,

    // Packet framing
    /// Packet header marker
    pub packet_header: u16,
    /// Packet footer marker
    pub packet_footer: u16,
    /// Packet info/flags byte
    pub packet_info: u8,

    // Sample fill policy. Kept for compatibility with existing configs:
    // channels without a generator always get 12-bit noise.
    pub randomize_samples: bool,
    pub fixed_sample_value: u8,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            event_header: DEFAULT_EVENT_HEADER,
            event_footer: DEFAULT_EVENT_FOOTER,
            event_info: 0,
            start_index: 0,
            packet_size: DEFAULT_PACKET_SIZE,
            channel_mask: 0x1,
            num_windows: 1,
            packet_header: DEFAULT_PACKET_HEADER,
            packet_footer: DEFAULT_PACKET_FOOTER,
            packet_info: 0,
            randomize_samples: true,
            fixed_sample_value: 0x55,
        }
    }
}

impl GeneratorConfig {
    /// Active channels in ascending order
    pub fn active_channels(&self) -> Vec<u8> {
        active_channels(self.channel_mask)
    }

    /// Island length: samples requested from a waveform generator per channel
    pub fn samples_per_channel(&self) -> usize {
        self.num_windows as usize * SAMPLES_PER_WINDOW
    }

    /// Number of packets one event carries under this configuration
    pub fn packets_per_event(&self) -> usize {
        self.channel_mask.count_ones() as usize * self.num_windows as usize
    }

    /// Packet framing fields
    pub fn packet_framing(&self) -> PacketFraming {
        PacketFraming {
            header: self.packet_header,
            footer: self.packet_footer,
            info: self.packet_info,
        }
    }
}

/// Header/footer/info values stamped on every packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketFraming {
    pub header: u16,
    pub footer: u16,
    pub info: u8,
}

impl Default for PacketFraming {
    fn default() -> Self {
        GeneratorConfig::default().packet_framing()
    }
}

//! CLI argument parsing
//!
//! Generator settings are exposed as clap arguments with environment variable
//! fallbacks. Binaries embed [`GeneratorArgs`] via `#[command(flatten)]` and
//! convert it into a [`GeneratorConfig`].

use clap::Parser;

use crate::config::GeneratorConfig;

/// Parse an integer given in decimal or `0x`-prefixed hex
pub fn parse_int(s: &str) -> Result<u64, String> {
    let s = s.trim().replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid integer '{s}': {e}"))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let v = parse_int(s)?;
    u16::try_from(v).map_err(|_| format!("{v:#x} does not fit in 16 bits"))
}

fn parse_u8(s: &str) -> Result<u8, String> {
    let v = parse_int(s)?;
    u8::try_from(v).map_err(|_| format!("{v:#x} does not fit in 8 bits"))
}

/// Generator configuration arguments
#[derive(Parser, Debug, Clone)]
pub struct GeneratorArgs {
    /// Channel enable mask (bit i = channel i), decimal or 0x-hex
    #[arg(short = 'm', long, env = "NALU_CHANNEL_MASK", default_value = "0x1", value_parser = parse_int)]
    pub channel_mask: u64,

    /// 32-sample windows per channel per event
    #[arg(short = 'w', long, env = "NALU_NUM_WINDOWS", default_value = "1", value_parser = parse_u8)]
    pub num_windows: u8,

    /// Index of the first event
    #[arg(long, env = "NALU_START_INDEX", default_value = "0")]
    pub start_index: u32,

    /// Event header marker
    #[arg(long, default_value = "0xBBBB", value_parser = parse_u16)]
    pub event_header: u16,

    /// Event footer marker
    #[arg(long, default_value = "0xEEEE", value_parser = parse_u16)]
    pub event_footer: u16,

    /// Packet header marker
    #[arg(long, default_value = "0xAAAA", value_parser = parse_u16)]
    pub packet_header: u16,

    /// Packet footer marker
    #[arg(long, default_value = "0xFFFF", value_parser = parse_u16)]
    pub packet_footer: u16,

    /// Event info byte
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub event_info: u8,

    /// Packet info byte
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub packet_info: u8,

    /// Advisory packet size written into event headers
    #[arg(long, default_value = "80", value_parser = parse_u16)]
    pub packet_size: u16,

    /// Seed for the noise generator (random if omitted)
    #[arg(long, env = "NALU_SEED")]
    pub seed: Option<u64>,
}

impl GeneratorArgs {
    /// Build the generator configuration described by these arguments
    pub fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            event_header: self.event_header,
            event_footer: self.event_footer,
            event_info: self.event_info,
            start_index: self.start_index,
            packet_size: self.packet_size,
            channel_mask: self.channel_mask,
            num_windows: self.num_windows,
            packet_header: self.packet_header,
            packet_footer: self.packet_footer,
            packet_info: self.packet_info,
            ..Default::default()
        }
    }
}

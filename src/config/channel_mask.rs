//! Channel mask decoding
//!
//! A channel mask is a 64-bit bitset: bit `i` set means channel `i` takes
//! part in the event.

/// Number of channels addressable by a 64-bit mask
pub const MAX_CHANNELS: u8 = 64;

/// Decode a channel mask into ascending channel indices
///
/// ```
/// use nalu_fake_rs::config::active_channels;
///
/// assert_eq!(active_channels(0), Vec::<u8>::new());
/// assert_eq!(active_channels(0x3), vec![0, 1]);
/// assert_eq!(active_channels(0x8000_0000_0000_0001), vec![0, 63]);
/// ```
pub fn active_channels(mask: u64) -> Vec<u8> {
    (0..MAX_CHANNELS)
        .filter(|&ch| mask & (1u64 << ch) != 0)
        .collect()
}

/// Build a mask from a list of channels (inverse of [`active_channels`])
///
/// Channels outside 0..64 are ignored.
pub fn mask_from_channels(channels: &[u8]) -> u64 {
    channels
        .iter()
        .filter(|&&ch| ch < MAX_CHANNELS)
        .fold(0u64, |mask, &ch| mask | (1u64 << ch))
}

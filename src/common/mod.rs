//! Common definitions shared across the crate
//!
//! Wire-level constants, error types, timing metrics and CLI arguments.

pub mod cli;
pub use cli::GeneratorArgs;

pub mod error;
pub use error::{WireError, WireResult};

pub mod metrics;
pub use metrics::{Stage, TimingRecord, TimingTracker};

/// Samples carried by one packet (one window)
pub const SAMPLES_PER_WINDOW: usize = 32;

/// Packed payload bytes per packet (2 bytes per 12-bit sample)
pub const PACKED_SAMPLE_BYTES: usize = SAMPLES_PER_WINDOW * 2;

/// Valid bits of an ADC sample
pub const SAMPLE_MASK: u16 = 0x0FFF;

/// Simulated hardware clock period in nanoseconds
pub const CLOCK_PERIOD_NS: u64 = 32;

/// Width of the simulated hardware timestamp counter
pub const TIMESTAMP_BITS: u32 = 24;

/// Largest value of the simulated hardware timestamp counter
pub const TIMESTAMP_MAX: u32 = (1 << TIMESTAMP_BITS) - 1;

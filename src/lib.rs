//! NALU-FAKE-RS: fake event generator for NALU waveform digitizers
//!
//! This crate synthesizes acquisition events in the digitizer's wire format
//! for testing downstream software without hardware.
//!
//! # Example
//! ```
//! use nalu_fake_rs::config::GeneratorConfig;
//! use nalu_fake_rs::generator::{Generator, SquareWave};
//!
//! let config = GeneratorConfig {
//!     channel_mask: 0x3,
//!     num_windows: 4,
//!     ..Default::default()
//! };
//! let mut generator = Generator::with_seed(config, 42);
//! generator.set_generator(0, SquareWave::default());
//!
//! let event = generator.next_event();
//! assert_eq!(event.len(), 8);
//!
//! let mut buffer = vec![0u8; event.size()];
//! event.serialize_into(&mut buffer).unwrap();
//! ```

pub mod common;
pub mod config;
pub mod event;
pub mod generator;

pub use config::GeneratorConfig;
pub use event::{Event, EventHeader, Packet};
pub use generator::Generator;

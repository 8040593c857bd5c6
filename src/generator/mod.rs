//! Fake event generator
//!
//! Builds one [`Event`] per call to [`Generator::next_event`]:
//! 1. decode the active channels from the channel mask
//! 2. take one reference timestamp for the whole event
//! 3. stamp the event header and post-increment the event index
//! 4. per channel, request one island of `num_windows * 32` samples
//! 5. slice the island into windows and pack one packet per window
//!
//! Packets are appended channel-major, window-minor.
//!
//! The generator is single-threaded: it owns its configuration, waveform
//! registry, noise stream and event index. Wrap it in a mutex (or use one
//! instance per thread) for shared access.

pub mod timestamp;
pub mod waveform;

pub use timestamp::{
    ticks_from_ns, FixedClock, ManualClock, MonotonicClock, SteadyClock, TimestampSimulator,
};
pub use waveform::{
    ConstantWaveform, NoiseWaveform, PulseWaveform, SharedGenerator, SquareWave,
    WaveformGenerator, WaveformRegistry, ZeroWaveform,
};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::common::{Stage, TimingRecord, TimingTracker, SAMPLES_PER_WINDOW};
use crate::config::GeneratorConfig;
use crate::event::{build_packet, Event, EventHeader};

/// Fake NALU event generator
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    registry: WaveformRegistry,
    timestamps: TimestampSimulator,
    next_index: u32,
    timing: TimingTracker,
}

impl Generator {
    /// Create a generator whose noise stream is seeded from OS entropy
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_noise(config, NoiseWaveform::from_entropy())
    }

    /// Create a generator with a reproducible noise stream
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self::with_noise(config, NoiseWaveform::with_seed(seed))
    }

    fn with_noise(config: GeneratorConfig, noise: NoiseWaveform) -> Self {
        let mut registry = WaveformRegistry::new();
        registry.set_default_generator(Arc::new(noise));

        let mut generator = Self {
            next_index: config.start_index,
            config,
            registry,
            timestamps: TimestampSimulator::new(),
            timing: TimingTracker::new(),
        };
        generator.bind_active_channels();
        generator
    }

    /// Replace the timestamp clock
    pub fn with_clock(mut self, clock: impl MonotonicClock + 'static) -> Self {
        self.timestamps = TimestampSimulator::with_clock(clock);
        self
    }

    /// Current configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Index the next event will carry
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Waveform registry
    pub fn registry(&self) -> &WaveformRegistry {
        &self.registry
    }

    /// Replace the configuration
    ///
    /// Active channels without a generator are bound to the current default.
    /// The event index keeps running; `start_index` only seeds a new
    /// generator.
    pub fn update_config(&mut self, config: GeneratorConfig) {
        self.config = config;
        let bound = self.bind_active_channels();
        info!(
            channels = ?self.config.active_channels(),
            num_windows = self.config.num_windows,
            newly_bound = bound,
            "Generator configuration updated"
        );
    }

    /// Install or replace the waveform generator of one channel
    pub fn set_generator(&mut self, channel: u8, generator: impl WaveformGenerator + 'static) {
        self.registry.set_generator(channel, Arc::new(generator));
    }

    /// Install or replace the default waveform generator
    ///
    /// Only channels bound after this call (by a config update) pick it up.
    pub fn set_default_generator(&mut self, generator: impl WaveformGenerator + 'static) {
        self.registry.set_default_generator(Arc::new(generator));
    }

    /// Install a shared generator handle on one channel
    pub fn set_shared_generator(&mut self, channel: u8, generator: SharedGenerator) {
        self.registry.set_generator(channel, generator);
    }

    fn bind_active_channels(&mut self) -> usize {
        self.registry.bind_defaults(&self.config.active_channels())
    }

    /// Generate the next event
    pub fn next_event(&mut self) -> Event {
        let started = Instant::now();

        let channels = self.config.active_channels();
        let num_windows = self.config.num_windows as usize;
        let island_len = num_windows * SAMPLES_PER_WINDOW;

        let reference_time = self.timestamps.next_timestamp();
        let header = EventHeader::new(&self.config, self.next_index, reference_time);
        self.next_index = self.next_index.wrapping_add(1);

        let mut event = Event::with_capacity(header, channels.len() * num_windows);
        let framing = self.config.packet_framing();
        let mut waveform_time = std::time::Duration::ZERO;
        let mut pack_time = std::time::Duration::ZERO;

        for &channel in &channels {
            let t0 = Instant::now();
            let island = fetch_island(self.registry.resolve(channel).as_ref(), island_len);
            let t1 = Instant::now();
            waveform_time += t1 - t0;

            for (window, chunk) in island.chunks_exact(SAMPLES_PER_WINDOW).enumerate() {
                let mut samples = [0u16; SAMPLES_PER_WINDOW];
                samples.copy_from_slice(chunk);
                event.push_packet(build_packet(
                    &framing,
                    channel,
                    reference_time,
                    window as u16,
                    &samples,
                ));
            }
            pack_time += t1.elapsed();
        }

        let total = started.elapsed();
        self.timing.add(Stage::Waveform, waveform_time);
        self.timing.add(Stage::Pack, pack_time);
        self.timing
            .add(Stage::Event, total.saturating_sub(waveform_time + pack_time));
        self.timing.add_bytes(event.size() as u64);

        debug!(
            index = event.header.index,
            packets = event.len(),
            reference_time,
            "Generated event"
        );
        event
    }

    /// Close the current timing cycle and report it
    pub fn next_timing_snapshot(&mut self) -> TimingRecord {
        self.timing.snapshot()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

/// Fetch an island of exactly `len` samples
///
/// Short islands are zero padded, long ones truncated.
fn fetch_island(generator: &dyn WaveformGenerator, len: usize) -> Vec<u16> {
    let mut island = generator.generate(len);
    if island.len() != len {
        debug!(
            expected = len,
            actual = island.len(),
            "Waveform generator returned wrong island length"
        );
        island.resize(len, 0);
    }
    island
}

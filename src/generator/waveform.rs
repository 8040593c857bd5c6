//! Waveform sources
//!
//! A waveform generator turns a requested sample count into a waveform
//! island of 12-bit samples stored in `u16`. Generators are shared handles
//! (`Arc<dyn WaveformGenerator>`) so the same source can serve several
//! channels. Any `Fn(usize) -> Vec<u16> + Send + Sync` closure is a
//! generator.
//!
//! Resolution order for a channel in [`WaveformRegistry::resolve`]:
//! channel entry -> default generator -> zero fill.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::trace;

use crate::common::{SAMPLES_PER_WINDOW, SAMPLE_MASK};

/// Produces one waveform island per call
pub trait WaveformGenerator: Send + Sync {
    /// Generate `len` samples; values above 12 bits are masked when packed
    fn generate(&self, len: usize) -> Vec<u16>;
}

impl<F> WaveformGenerator for F
where
    F: Fn(usize) -> Vec<u16> + Send + Sync,
{
    fn generate(&self, len: usize) -> Vec<u16> {
        self(len)
    }
}

/// Shared generator handle
pub type SharedGenerator = Arc<dyn WaveformGenerator>;

/// All-zero waveform
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroWaveform;

impl WaveformGenerator for ZeroWaveform {
    fn generate(&self, len: usize) -> Vec<u16> {
        vec![0; len]
    }
}

/// Flat waveform at a fixed level
#[derive(Debug, Clone, Copy)]
pub struct ConstantWaveform(pub u16);

impl WaveformGenerator for ConstantWaveform {
    fn generate(&self, len: usize) -> Vec<u16> {
        vec![self.0; len]
    }
}

/// Uniform random 12-bit noise
///
/// Owns its RNG stream. Every channel bound to the same handle draws from
/// that one stream, in channel order.
#[derive(Debug)]
pub struct NoiseWaveform {
    rng: Mutex<StdRng>,
}

impl NoiseWaveform {
    /// Noise stream with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Noise stream seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl WaveformGenerator for NoiseWaveform {
    fn generate(&self, len: usize) -> Vec<u16> {
        let mut rng = self.rng.lock();
        (0..len).map(|_| rng.gen_range(0..=SAMPLE_MASK)).collect()
    }
}

/// Square wave alternating between two levels
///
/// The phase restarts with every island, so a wave whose period divides the
/// window size lines up with packet boundaries.
#[derive(Debug, Clone, Copy)]
pub struct SquareWave {
    /// Samples per half period
    pub half_period: usize,
    pub low: u16,
    pub high: u16,
}

impl Default for SquareWave {
    fn default() -> Self {
        Self {
            half_period: SAMPLES_PER_WINDOW / 2,
            low: 0x0100,
            high: 0x0F00,
        }
    }
}

impl WaveformGenerator for SquareWave {
    fn generate(&self, len: usize) -> Vec<u16> {
        let half = self.half_period.max(1);
        (0..len)
            .map(|i| if (i / half) % 2 == 0 { self.low } else { self.high })
            .collect()
    }
}

/// Detector pulse: baseline -> fast linear rise -> exponential decay
///
/// The trigger position is drawn per island from the first half of the
/// island, and Gaussian noise is added to every sample.
#[derive(Debug)]
pub struct PulseWaveform {
    pub baseline: u16,
    pub amplitude: u16,
    /// Rise time in samples
    pub rise_time: usize,
    /// Decay time constant in samples
    pub decay_tau: f64,
    noise: Option<Normal<f64>>,
    rng: Mutex<StdRng>,
}

impl PulseWaveform {
    /// Pulse shape with Gaussian baseline noise of `noise_sigma` ADC counts
    pub fn new(baseline: u16, amplitude: u16, noise_sigma: f64, seed: u64) -> Self {
        Self {
            baseline,
            amplitude,
            rise_time: 5,
            decay_tau: 50.0,
            noise: Normal::new(0.0, noise_sigma)
                .ok()
                .filter(|_| noise_sigma > 0.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn shape(&self, i: usize, start: usize) -> f64 {
        let baseline = self.baseline as f64;
        let amplitude = self.amplitude as f64;
        let rise = self.rise_time.max(1);
        if i < start {
            baseline
        } else if i < start + rise {
            let frac = (i - start) as f64 / rise as f64;
            baseline + amplitude * frac
        } else {
            let t = (i - start - rise) as f64;
            baseline + amplitude * (-t / self.decay_tau).exp()
        }
    }
}

impl WaveformGenerator for PulseWaveform {
    fn generate(&self, len: usize) -> Vec<u16> {
        if len == 0 {
            return Vec::new();
        }
        let mut rng = self.rng.lock();
        let start = rng.gen_range(0..len.div_ceil(2));
        (0..len)
            .map(|i| {
                let jitter = self.noise.map_or(0.0, |n| n.sample(&mut *rng));
                (self.shape(i, start) + jitter).clamp(0.0, SAMPLE_MASK as f64) as u16
            })
            .collect()
    }
}

/// Per-channel generator table with a default slot
#[derive(Clone, Default)]
pub struct WaveformRegistry {
    channels: BTreeMap<u8, SharedGenerator>,
    default: Option<SharedGenerator>,
}

impl WaveformRegistry {
    /// Empty registry: every channel resolves to zero fill
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the generator of one channel
    pub fn set_generator(&mut self, channel: u8, generator: SharedGenerator) {
        self.channels.insert(channel, generator);
    }

    /// Install or replace the default generator
    ///
    /// Channels already bound to the previous default keep it.
    pub fn set_default_generator(&mut self, generator: SharedGenerator) {
        self.default = Some(generator);
    }

    /// Current default generator
    pub fn default_generator(&self) -> Option<&SharedGenerator> {
        self.default.as_ref()
    }

    /// Check if a channel has its own entry
    pub fn has_generator(&self, channel: u8) -> bool {
        self.channels.contains_key(&channel)
    }

    /// Channels with an entry, ascending
    pub fn bound_channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.channels.keys().copied()
    }

    /// Generator for a channel: entry, else default, else zero fill
    pub fn resolve(&self, channel: u8) -> SharedGenerator {
        self.channels
            .get(&channel)
            .or(self.default.as_ref())
            .cloned()
            .unwrap_or_else(|| Arc::new(ZeroWaveform))
    }

    /// Bind every listed channel lacking an entry to the current default
    ///
    /// Returns the number of channels bound. Does nothing without a default.
    pub fn bind_defaults(&mut self, channels: &[u8]) -> usize {
        let Some(default) = &self.default else {
            return 0;
        };

        let mut bound = 0;
        for &channel in channels {
            if !self.channels.contains_key(&channel) {
                trace!(channel, "Binding default waveform generator");
                self.channels.insert(channel, Arc::clone(default));
                bound += 1;
            }
        }
        bound
    }
}

impl std::fmt::Debug for WaveformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveformRegistry")
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_generator() {
        let gen: SharedGenerator = Arc::new(|len: usize| vec![7u16; len]);
        assert_eq!(gen.generate(3), vec![7, 7, 7]);
    }

    #[test]
    fn test_noise_range_and_seed() {
        let a = NoiseWaveform::with_seed(42).generate(1024);
        let b = NoiseWaveform::with_seed(42).generate(1024);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1024);
        assert!(a.iter().all(|&s| s <= SAMPLE_MASK));
        assert_ne!(a, NoiseWaveform::with_seed(43).generate(1024));
    }

    #[test]
    fn test_noise_stream_advances() {
        let noise = NoiseWaveform::with_seed(1);
        assert_ne!(noise.generate(64), noise.generate(64));
    }

    #[test]
    fn test_square_wave() {
        let wave = SquareWave::default().generate(64);
        assert!(wave[..16].iter().all(|&s| s == 0x0100));
        assert!(wave[16..32].iter().all(|&s| s == 0x0F00));
        assert!(wave[32..48].iter().all(|&s| s == 0x0100));
    }

    #[test]
    fn test_square_wave_zero_half_period() {
        let wave = SquareWave {
            half_period: 0,
            low: 1,
            high: 2,
        }
        .generate(4);
        assert_eq!(wave, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_pulse_shape() {
        let pulse = PulseWaveform::new(0x100, 0x800, 0.0, 3);
        let wave = pulse.generate(128);
        assert_eq!(wave.len(), 128);
        assert!(wave.iter().all(|&s| s <= SAMPLE_MASK));
        assert_eq!(wave[0], 0x100);
        let peak = *wave.iter().max().unwrap();
        assert!(peak > 0x100 + 0x600);
        assert!(pulse.generate(0).is_empty());
    }

    #[test]
    fn test_pulse_clamps_to_12_bits() {
        let pulse = PulseWaveform::new(0xF00, 0xFFFF, 10.0, 9);
        assert!(pulse.generate(64).iter().all(|&s| s <= SAMPLE_MASK));
    }

    #[test]
    fn test_resolve_order() {
        let mut registry = WaveformRegistry::new();
        assert_eq!(registry.resolve(0).generate(2), vec![0, 0]);

        registry.set_default_generator(Arc::new(ConstantWaveform(5)));
        assert_eq!(registry.resolve(0).generate(2), vec![5, 5]);

        registry.set_generator(0, Arc::new(ConstantWaveform(9)));
        assert_eq!(registry.resolve(0).generate(2), vec![9, 9]);
        assert_eq!(registry.resolve(1).generate(2), vec![5, 5]);
    }

    #[test]
    fn test_bind_defaults_is_snapshot() {
        let mut registry = WaveformRegistry::new();
        assert_eq!(registry.bind_defaults(&[0, 1]), 0);

        registry.set_default_generator(Arc::new(ConstantWaveform(1)));
        registry.set_generator(1, Arc::new(ConstantWaveform(100)));
        assert_eq!(registry.bind_defaults(&[0, 1, 2]), 2);
        assert!(registry.has_generator(0));
        assert_eq!(registry.bound_channels().collect::<Vec<_>>(), vec![0, 1, 2]);

        registry.set_default_generator(Arc::new(ConstantWaveform(2)));
        assert_eq!(registry.resolve(0).generate(1), vec![1]);
        assert_eq!(registry.resolve(1).generate(1), vec![100]);
        assert_eq!(registry.resolve(3).generate(1), vec![2]);
    }
}

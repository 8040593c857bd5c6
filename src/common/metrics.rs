//! Generation timing metrics
//!
//! The generator accumulates stage durations and produced bytes between
//! snapshots. [`TimingTracker::snapshot`] turns the accumulated interval into
//! a [`TimingRecord`] and starts a new interval.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Timing of one collection cycle (the interval between two snapshots)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    /// Snapshot counter, starting at 0
    pub collection_cycle_index: u64,
    /// Nanoseconds since the tracker was created
    pub collection_cycle_timestamp_ns: i64,
    /// Seconds spent producing waveform islands
    pub waveform_time: f64,
    /// Seconds spent packing samples into packets
    pub pack_time: f64,
    /// Seconds spent in event assembly outside the two stages above
    pub event_time: f64,
    /// Wall-clock seconds covered by this cycle
    pub total_time: f64,
    /// Serialized bytes generated in this cycle
    pub data_processed: u64,
    /// MB/s over the cycle (0 when no time elapsed)
    pub data_rate: f64,
}

/// Processing stage timed by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Waveform,
    Pack,
    Event,
}

/// Accumulates per-stage durations between snapshots
#[derive(Debug)]
pub struct TimingTracker {
    created: Instant,
    cycle_start: Instant,
    cycle_index: u64,
    waveform: Duration,
    pack: Duration,
    event: Duration,
    bytes: u64,
}

impl TimingTracker {
    /// Create a tracker whose first cycle starts now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            created: now,
            cycle_start: now,
            cycle_index: 0,
            waveform: Duration::ZERO,
            pack: Duration::ZERO,
            event: Duration::ZERO,
            bytes: 0,
        }
    }

    /// Add time spent in a stage
    #[inline]
    pub fn add(&mut self, stage: Stage, elapsed: Duration) {
        match stage {
            Stage::Waveform => self.waveform += elapsed,
            Stage::Pack => self.pack += elapsed,
            Stage::Event => self.event += elapsed,
        }
    }

    /// Add produced bytes
    #[inline]
    pub fn add_bytes(&mut self, n: u64) {
        self.bytes += n;
    }

    /// Close the current cycle and return its record
    pub fn snapshot(&mut self) -> TimingRecord {
        let now = Instant::now();
        let total = now.duration_since(self.cycle_start).as_secs_f64();
        let data_rate = if total > 0.0 {
            self.bytes as f64 / total / 1_000_000.0
        } else {
            0.0
        };

        let record = TimingRecord {
            collection_cycle_index: self.cycle_index,
            collection_cycle_timestamp_ns: i64::try_from(
                now.duration_since(self.created).as_nanos(),
            )
            .unwrap_or(i64::MAX),
            waveform_time: self.waveform.as_secs_f64(),
            pack_time: self.pack.as_secs_f64(),
            event_time: self.event.as_secs_f64(),
            total_time: total,
            data_processed: self.bytes,
            data_rate,
        };

        self.cycle_index += 1;
        self.cycle_start = now;
        self.waveform = Duration::ZERO;
        self.pack = Duration::ZERO;
        self.event = Duration::ZERO;
        self.bytes = 0;

        record
    }
}

impl Default for TimingTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let mut tracker = TimingTracker::new();
        let record = tracker.snapshot();
        assert_eq!(record.collection_cycle_index, 0);
        assert_eq!(record.data_processed, 0);
        assert_eq!(record.waveform_time, 0.0);
        assert_eq!(record.pack_time, 0.0);
        assert_eq!(record.event_time, 0.0);
    }

    #[test]
    fn test_accumulate_and_reset() {
        let mut tracker = TimingTracker::new();
        tracker.add(Stage::Waveform, Duration::from_millis(2));
        tracker.add(Stage::Waveform, Duration::from_millis(3));
        tracker.add(Stage::Pack, Duration::from_millis(1));
        tracker.add(Stage::Event, Duration::from_micros(500));
        tracker.add_bytes(1_000);

        let first = tracker.snapshot();
        assert!((first.waveform_time - 0.005).abs() < 1e-9);
        assert!((first.pack_time - 0.001).abs() < 1e-9);
        assert!((first.event_time - 0.0005).abs() < 1e-9);
        assert_eq!(first.data_processed, 1_000);

        let second = tracker.snapshot();
        assert_eq!(second.collection_cycle_index, 1);
        assert_eq!(second.data_processed, 0);
        assert_eq!(second.waveform_time, 0.0);
        assert!(second.collection_cycle_timestamp_ns >= first.collection_cycle_timestamp_ns);
    }

    #[test]
    fn test_record_serializes() {
        let record = TimingRecord {
            collection_cycle_index: 3,
            data_processed: 42,
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"collection_cycle_index\":3"));
        assert!(json.contains("\"data_processed\":42"));
    }
}

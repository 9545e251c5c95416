//! Visualizer telemetry collector and helpers.
//!
//! The collector multiplexes poll outcomes, poll latency and mode transitions
//! into a bounded history plus an async broadcast stream.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{ErrorCode, FeatureError};
use crate::features::FeatureKind;
use crate::modes::ActiveMode;

pub mod events;

pub use events::MetricEvent;

/// Snapshot of collector state for CLI reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub recent: Vec<MetricEvent>,
    pub total_events: u64,
    pub dropped_events: u64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Broadcast-based collector retaining a bounded history of metrics.
pub struct TelemetryCollector {
    tx: broadcast::Sender<MetricEvent>,
    history: Mutex<VecDeque<MetricEvent>>,
    history_capacity: usize,
    total_events: AtomicU64,
    dropped_history: AtomicU64,
}

impl TelemetryCollector {
    pub fn new(buffer: usize, history_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(history_capacity)),
            history_capacity,
            total_events: AtomicU64::new(0),
            dropped_history: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: MetricEvent) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if self.history_capacity > 0 {
            let mut history = lock(&self.history);
            if history.len() == self.history_capacity {
                history.pop_front();
                self.dropped_history.fetch_add(1, Ordering::Relaxed);
            }
            history.push_back(event.clone());
        }

        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MetricEvent> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let history = lock(&self.history);
        TelemetrySnapshot {
            recent: history.iter().cloned().collect(),
            total_events: self.total_events.load(Ordering::Relaxed),
            dropped_events: self.dropped_history.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new(256, 64)
    }
}

/// Latency tracker maintains a rolling window to compute avg/max latency.
struct LatencyTracker {
    samples: VecDeque<f32>,
    max_samples: usize,
}

impl LatencyTracker {
    fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    fn observe(&mut self, value: f32) -> (f32, f32, usize) {
        if self.samples.len() == self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value.abs());

        let count = self.samples.len();
        let sum: f32 = self.samples.iter().copied().sum();
        let max = self
            .samples
            .iter()
            .copied()
            .fold(0.0_f32, |acc, next| acc.max(next));
        let avg = if count == 0 { 0.0 } else { sum / count as f32 };
        (avg, max, count)
    }
}

/// Per-stream counters reported alongside the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCounters {
    pub succeeded: u64,
    pub failed: u64,
    pub dropped: u64,
    pub skipped: u64,
}

/// Top-level hub wrapping collector state plus derived gauges.
pub struct TelemetryHub {
    collector: TelemetryCollector,
    latency_window: usize,
    latency: Mutex<HashMap<FeatureKind, LatencyTracker>>,
    counters: Mutex<HashMap<FeatureKind, StreamCounters>>,
}

impl TelemetryHub {
    pub fn new(channel_capacity: usize, history_capacity: usize, latency_window: usize) -> Self {
        Self {
            collector: TelemetryCollector::new(channel_capacity, history_capacity),
            latency_window,
            latency: Mutex::new(HashMap::new()),
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn collector(&self) -> &TelemetryCollector {
        &self.collector
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.collector.snapshot()
    }

    pub fn counters(&self, kind: FeatureKind) -> StreamCounters {
        lock(&self.counters).get(&kind).copied().unwrap_or_default()
    }

    fn bump(&self, kind: FeatureKind, update: impl FnOnce(&mut StreamCounters)) {
        update(lock(&self.counters).entry(kind).or_default());
    }

    pub fn record_poll_success(&self, kind: FeatureKind, index: u64, elapsed: Duration) {
        self.bump(kind, |c| c.succeeded += 1);
        self.collector
            .publish(MetricEvent::PollSucceeded { kind, index });

        let (avg, max, count) = {
            let mut trackers = lock(&self.latency);
            trackers
                .entry(kind)
                .or_insert_with(|| LatencyTracker::new(self.latency_window))
                .observe(elapsed.as_secs_f32() * 1000.0)
        };

        self.collector.publish(MetricEvent::PollLatency {
            kind,
            avg_ms: avg,
            max_ms: max,
            sample_count: count,
        });
    }

    pub fn record_poll_failure(&self, kind: FeatureKind, index: u64, err: &FeatureError) {
        self.bump(kind, |c| c.failed += 1);
        self.collector.publish(MetricEvent::PollFailed {
            kind,
            index,
            code: err.code(),
        });
    }

    pub fn record_dropped_sample(&self, kind: FeatureKind, index: u64) {
        self.bump(kind, |c| c.dropped += 1);
        self.collector
            .publish(MetricEvent::SampleDropped { kind, index });
    }

    pub fn record_stream_skip(&self, kind: FeatureKind, index: u64, failures: u32) {
        self.bump(kind, |c| c.skipped += 1);
        self.collector.publish(MetricEvent::StreamSkipped {
            kind,
            index,
            failures,
        });
    }

    pub fn record_mode_change(&self, frame: u64, from: ActiveMode, to: ActiveMode) {
        self.collector
            .publish(MetricEvent::ModeChanged { frame, from, to });
    }

    pub fn record_metallic_expiry(&self, frame: u64) {
        self.collector
            .publish(MetricEvent::MetallicExpired { frame });
    }
}

impl Default for TelemetryHub {
    fn default() -> Self {
        Self::new(256, 64, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_preserves_order_within_history() {
        let collector = TelemetryCollector::new(8, 3);
        collector.publish(MetricEvent::PollSucceeded {
            kind: FeatureKind::Zcr,
            index: 0,
        });
        collector.publish(MetricEvent::PollSucceeded {
            kind: FeatureKind::Zcr,
            index: 1,
        });
        collector.publish(MetricEvent::MetallicExpired { frame: 9 });

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.recent.len(), 3);
        assert!(matches!(
            snapshot.recent[0],
            MetricEvent::PollSucceeded { index: 0, .. }
        ));
        assert!(matches!(
            snapshot.recent[2],
            MetricEvent::MetallicExpired { frame: 9 }
        ));
    }

    #[test]
    fn collector_drops_history_when_full() {
        let collector = TelemetryCollector::new(8, 2);
        for frame in 0..3 {
            collector.publish(MetricEvent::MetallicExpired { frame });
        }

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.recent.len(), 2);
        assert_eq!(snapshot.total_events, 3);
        assert_eq!(snapshot.dropped_events, 1);
        assert!(matches!(
            snapshot.recent[0],
            MetricEvent::MetallicExpired { frame: 1 }
        ));
    }

    #[test]
    fn hub_tracks_latency_per_stream() {
        let hub = TelemetryHub::new(8, 16, 4);
        hub.record_poll_success(FeatureKind::Zcr, 0, Duration::from_millis(10));
        hub.record_poll_success(FeatureKind::Zcr, 1, Duration::from_millis(30));
        hub.record_poll_success(FeatureKind::Features, 0, Duration::from_millis(100));

        let snapshot = hub.snapshot();
        let zcr_latency = snapshot
            .recent
            .iter()
            .filter_map(|event| match event {
                MetricEvent::PollLatency {
                    kind: FeatureKind::Zcr,
                    avg_ms,
                    max_ms,
                    sample_count,
                } => Some((*avg_ms, *max_ms, *sample_count)),
                _ => None,
            })
            .last()
            .unwrap();
        assert!((zcr_latency.0 - 20.0).abs() < 0.01);
        assert!((zcr_latency.1 - 30.0).abs() < 0.01);
        assert_eq!(zcr_latency.2, 2);
        assert_eq!(hub.counters(FeatureKind::Zcr).succeeded, 2);
        assert_eq!(hub.counters(FeatureKind::Features).succeeded, 1);
    }

    #[test]
    fn hub_counts_failures_and_skips() {
        let hub = TelemetryHub::default();
        let err = FeatureError::RemoteFeature {
            message: "index not found".into(),
        };
        hub.record_poll_failure(FeatureKind::DominantFrequency, 7, &err);
        hub.record_stream_skip(FeatureKind::DominantFrequency, 7, 20);
        hub.record_dropped_sample(FeatureKind::DominantFrequency, 8);

        let counters = hub.counters(FeatureKind::DominantFrequency);
        assert_eq!(counters.failed, 1);
        assert_eq!(counters.skipped, 1);
        assert_eq!(counters.dropped, 1);
        assert_eq!(hub.counters(FeatureKind::Zcr), StreamCounters::default());

        let snapshot = hub.snapshot();
        assert!(snapshot
            .recent
            .iter()
            .any(|e| matches!(e, MetricEvent::PollFailed { code: 3003, .. })));
    }

    #[tokio::test]
    async fn subscribers_receive_mode_changes() {
        let hub = TelemetryHub::default();
        let mut rx = hub.collector().subscribe();
        hub.record_mode_change(4, ActiveMode::Organic, ActiveMode::Kick);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            MetricEvent::ModeChanged {
                frame: 4,
                from: ActiveMode::Organic,
                to: ActiveMode::Kick
            }
        );
    }
}

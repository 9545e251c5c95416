//! Telemetry event types describing poll health and mode transitions,
//! exposed to the CLI report and to broadcast subscribers.

use serde::{Deserialize, Serialize};

use crate::features::FeatureKind;
use crate::modes::ActiveMode;

/// Rich metric events covering poll outcomes, latency and mode changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    PollLatency {
        kind: FeatureKind,
        avg_ms: f32,
        max_ms: f32,
        sample_count: usize,
    },
    PollSucceeded {
        kind: FeatureKind,
        index: u64,
    },
    PollFailed {
        kind: FeatureKind,
        index: u64,
        code: i32,
    },
    SampleDropped {
        kind: FeatureKind,
        index: u64,
    },
    StreamSkipped {
        kind: FeatureKind,
        index: u64,
        failures: u32,
    },
    ModeChanged {
        frame: u64,
        from: ActiveMode,
        to: ActiveMode,
    },
    MetallicExpired {
        frame: u64,
    },
}

//! Visualizer state owned by the driver.
//!
//! Poll completions and animation frames are applied here one at a time,
//! strictly between awaits, so a frame never sees a half-applied sample.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AppConfig;
use crate::error::log_feature_error;
use crate::features::{FeatureHistory, FeatureKind, FetchResult};
use crate::field::ParticleField;
use crate::modes::{apply_sample, ActiveMode, ModeState, ModeThresholds, ModeTimer};
use crate::render::{metallic_blobs, FrameSnapshot};
use crate::telemetry::TelemetryHub;

/// Per-stream poll position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamCursor {
    pub next_index: u64,
    /// Index failures (server status or `error` body) in a row for `next_index`
    pub consecutive_failures: u32,
}

/// What a single poll completion did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Sample applied and the stream advanced.
    Applied,
    /// 2xx body without the expected fields; index unchanged.
    Dropped,
    /// Fetch failed; index unchanged.
    Failed,
    /// Fetch failed and the stall guard moved the stream past the index.
    Skipped,
}

pub struct VisualizerState {
    modes: ModeState,
    history: FeatureHistory,
    thresholds: ModeThresholds,
    timer: ModeTimer,
    field: ParticleField,
    cursors: BTreeMap<FeatureKind, StreamCursor>,
    skip_after_failures: Option<u32>,
    /// A zcr stream is polled, so it alone writes `shooting_star`
    zcr_polled: bool,
    frame: u64,
    last_mode: ActiveMode,
    rng: StdRng,
}

impl VisualizerState {
    /// Build state from config, seeding from `field.seed` or from entropy.
    pub fn new(config: &AppConfig) -> Self {
        let rng = match config.field.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &AppConfig, mut rng: StdRng) -> Self {
        let field = ParticleField::new(&config.field, &mut rng);
        let modes = ModeState::default();
        let cursors = config
            .polling
            .streams
            .iter()
            .map(|kind| (*kind, StreamCursor::default()))
            .collect();

        Self {
            modes,
            history: FeatureHistory::new(config.modes.history_capacity),
            thresholds: config.modes.thresholds.clone(),
            timer: ModeTimer::new(config.modes.metallic_frame_budget),
            field,
            cursors,
            skip_after_failures: config.polling.skip_after_failures,
            zcr_polled: config.polling.streams.contains(&FeatureKind::Zcr),
            frame: 0,
            last_mode: modes.active_mode(),
            rng,
        }
    }

    pub fn modes(&self) -> &ModeState {
        &self.modes
    }

    pub fn history(&self) -> &FeatureHistory {
        &self.history
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn cursor(&self, kind: FeatureKind) -> StreamCursor {
        self.cursors.get(&kind).copied().unwrap_or_default()
    }

    /// Index the next poll of `kind` should request.
    pub fn next_index(&self, kind: FeatureKind) -> u64 {
        self.cursor(kind).next_index
    }

    /// Apply one completed fetch.
    ///
    /// Late or duplicate responses are applied like any other; on success
    /// the cursor moves forward by one regardless of which index answered.
    pub fn apply_outcome(
        &mut self,
        kind: FeatureKind,
        index: u64,
        result: FetchResult,
        elapsed: Duration,
        telemetry: &TelemetryHub,
    ) -> PollOutcome {
        match result {
            Ok(Some(mut sample)) => {
                if sample.kind == FeatureKind::Features && self.zcr_polled {
                    sample.zcr = None;
                }
                apply_sample(&mut self.modes, &mut self.history, &self.thresholds, &sample);
                // every in-band zcr reading picks a new drift pattern
                if sample.zcr.is_some() && self.modes.shooting_star {
                    self.field.reroll_noise_scale(&mut self.rng);
                    log::debug!(
                        "[State] Shooting star zcr, noise scale now {:.4}",
                        self.field.noise_scale()
                    );
                }

                let cursor = self.cursors.entry(kind).or_default();
                cursor.next_index += 1;
                cursor.consecutive_failures = 0;
                telemetry.record_poll_success(kind, index, elapsed);
                PollOutcome::Applied
            }
            Ok(None) => {
                log::debug!(
                    "[State] {} index {} carried no usable fields, dropped",
                    kind,
                    index
                );
                telemetry.record_dropped_sample(kind, index);
                PollOutcome::Dropped
            }
            Err(err) => {
                log_feature_error(&err, kind, index);
                telemetry.record_poll_failure(kind, index, &err);

                let cursor = self.cursors.entry(kind).or_default();
                if !err.is_index_failure() || cursor.next_index != index {
                    return PollOutcome::Failed;
                }

                cursor.consecutive_failures += 1;
                match self.skip_after_failures {
                    Some(limit) if cursor.consecutive_failures >= limit => {
                        let failures = cursor.consecutive_failures;
                        cursor.next_index += 1;
                        cursor.consecutive_failures = 0;
                        log::warn!(
                            "[State] {} index {} failed {} times in a row, skipping ahead",
                            kind,
                            index,
                            failures
                        );
                        telemetry.record_stream_skip(kind, index, failures);
                        PollOutcome::Skipped
                    }
                    _ => PollOutcome::Failed,
                }
            }
        }
    }

    /// Run one animation frame and return what the sink should draw.
    pub fn advance_frame(&mut self, telemetry: &TelemetryHub) -> FrameSnapshot<'_> {
        let frame = self.frame;
        self.frame += 1;

        if self.timer.tick(&mut self.modes) {
            telemetry.record_metallic_expiry(frame);
        }

        let mode = self.modes.active_mode();
        if mode != self.last_mode {
            log::debug!("[State] frame {}: {} -> {}", frame, self.last_mode, mode);
            telemetry.record_mode_change(frame, self.last_mode, mode);
            self.last_mode = mode;
        }

        self.field.advance(mode, &mut self.rng);

        let bounds = self.field.bounds();
        let blobs = if mode == ActiveMode::Metallic {
            metallic_blobs(frame, &bounds, self.field.noise())
        } else {
            Vec::new()
        };

        FrameSnapshot {
            frame,
            mode,
            flags: self.modes,
            scheme: self.modes.color_scheme(),
            bounds,
            particles: self.field.particles(),
            blobs,
        }
    }
}

// Driver module - cooperative event loop tying sources, state and sinks
//
// One task owns everything. Each iteration either:
// - pops the next due event from the scheduler (Frame or Poll(kind)),
// - applies a completed poll from the in-flight set, or
// - stops on shutdown / frame limit.
//
// Polls are fire-and-forget: they are never deduplicated or cancelled, and a
// response that arrives late still gets applied. State is only touched
// between awaits.

pub mod scheduler;
pub mod state;

pub use scheduler::{DueEvent, EventKind, Scheduler};
pub use state::{PollOutcome, StreamCursor, VisualizerState};

use std::future::Future;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::features::{FeatureKind, FeatureSource, FetchResult};
use crate::render::RenderSink;
use crate::telemetry::TelemetryHub;

/// How the loop relates event deadlines to the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Sleep until each event is due; polls overlap freely.
    #[default]
    RealTime,
    /// Never sleep; every poll is awaited before the next event so replays
    /// are reproducible.
    AsFastAsPossible,
}

/// Totals reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: u64,
    pub polls_issued: u64,
    pub polls_completed: u64,
    /// Polls still in flight when the loop stopped
    pub abandoned: u64,
    pub interrupted: bool,
}

struct PollCompletion {
    kind: FeatureKind,
    index: u64,
    result: FetchResult,
    elapsed: Duration,
}

pub struct Driver<S, R> {
    source: S,
    sink: R,
    state: VisualizerState,
    scheduler: Scheduler,
    telemetry: TelemetryHub,
    pacing: Pacing,
    max_frames: Option<u64>,
}

impl<S: FeatureSource, R: RenderSink> Driver<S, R> {
    pub fn new(config: &AppConfig, source: S, sink: R) -> Self {
        Self::with_state(config, VisualizerState::new(config), source, sink)
    }

    pub fn with_state(config: &AppConfig, state: VisualizerState, source: S, sink: R) -> Self {
        let mut scheduler = Scheduler::new();
        let poll_period = config.polling.period();
        // polls first so a frame due at the same instant sees their results
        for kind in &config.polling.streams {
            scheduler.schedule(EventKind::Poll(*kind), Duration::ZERO, poll_period);
        }
        scheduler.schedule(
            EventKind::Frame,
            Duration::ZERO,
            config.render.frame_period(),
        );

        Self {
            source,
            sink,
            state,
            scheduler,
            telemetry: TelemetryHub::default(),
            pacing: Pacing::default(),
            max_frames: None,
        }
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stop after this many frames; `None` runs until shutdown.
    pub fn max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn state(&self) -> &VisualizerState {
        &self.state
    }

    pub fn telemetry(&self) -> &TelemetryHub {
        &self.telemetry
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn into_sink(self) -> R {
        self.sink
    }

    /// Run until the frame limit or until Ctrl-C.
    pub async fn run_until_ctrl_c(&mut self) -> RunSummary {
        self.run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "ctrl-c handler unavailable, running to frame limit");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until the frame limit or until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        tracing::info!(
            pacing = ?self.pacing,
            max_frames = ?self.max_frames,
            "driver started"
        );

        match self.pacing {
            Pacing::RealTime => self.run_real_time(&mut shutdown, &mut summary).await,
            Pacing::AsFastAsPossible => self.run_unpaced(&mut shutdown, &mut summary).await,
        }

        summary.frames = self.state.frame_count();
        tracing::info!(
            frames = summary.frames,
            polls_issued = summary.polls_issued,
            polls_completed = summary.polls_completed,
            abandoned = summary.abandoned,
            interrupted = summary.interrupted,
            "driver stopped"
        );
        summary
    }

    fn frame_limit_reached(&self) -> bool {
        self.max_frames
            .is_some_and(|limit| self.state.frame_count() >= limit)
    }

    async fn run_real_time<F>(
        &mut self,
        shutdown: &mut std::pin::Pin<&mut F>,
        summary: &mut RunSummary,
    ) where
        F: Future<Output = ()>,
    {
        let origin = Instant::now();
        let mut in_flight: FuturesUnordered<BoxFuture<'static, PollCompletion>> =
            FuturesUnordered::new();

        while !self.frame_limit_reached() {
            let Some(due) = self.scheduler.peek_due() else {
                break;
            };

            tokio::select! {
                biased;
                _ = shutdown.as_mut() => {
                    tracing::info!("shutdown requested");
                    summary.interrupted = true;
                    break;
                }
                Some(done) = in_flight.next(), if !in_flight.is_empty() => {
                    summary.polls_completed += 1;
                    self.complete(done);
                }
                _ = tokio::time::sleep_until(origin + due) => {
                    if let Some(event) = self.scheduler.pop() {
                        if let Some(poll) = self.dispatch(event) {
                            summary.polls_issued += 1;
                            in_flight.push(poll);
                        }
                    }
                }
            }
        }

        summary.abandoned = in_flight.len() as u64;
        if summary.abandoned > 0 {
            tracing::debug!(count = summary.abandoned, "dropping in-flight polls");
        }
    }

    async fn run_unpaced<F>(
        &mut self,
        shutdown: &mut std::pin::Pin<&mut F>,
        summary: &mut RunSummary,
    ) where
        F: Future<Output = ()>,
    {
        while !self.frame_limit_reached() {
            let Some(event) = self.scheduler.pop() else {
                break;
            };
            let Some(poll) = self.dispatch(event) else {
                continue;
            };
            summary.polls_issued += 1;

            tokio::select! {
                biased;
                _ = shutdown.as_mut() => {
                    tracing::info!("shutdown requested");
                    summary.interrupted = true;
                    summary.abandoned = 1;
                    break;
                }
                done = poll => {
                    summary.polls_completed += 1;
                    self.complete(done);
                }
            }
        }
    }

    /// Handle a due event. Frames render immediately; polls return the
    /// future to wait on.
    fn dispatch(&mut self, event: DueEvent) -> Option<BoxFuture<'static, PollCompletion>> {
        match event.kind {
            EventKind::Frame => {
                let snapshot = self.state.advance_frame(&self.telemetry);
                self.sink.render(&snapshot);
                None
            }
            EventKind::Poll(kind) => {
                let index = self.state.next_index(kind);
                tracing::trace!(%kind, index, due_ms = event.due.as_millis() as u64, "poll");
                let fetch = self.source.fetch(kind, index);
                Some(
                    async move {
                        let started = Instant::now();
                        let result = fetch.await;
                        PollCompletion {
                            kind,
                            index,
                            result,
                            elapsed: started.elapsed(),
                        }
                    }
                    .boxed(),
                )
            }
        }
    }

    fn complete(&mut self, done: PollCompletion) {
        let outcome = self.state.apply_outcome(
            done.kind,
            done.index,
            done.result,
            done.elapsed,
            &self.telemetry,
        );
        if outcome == PollOutcome::Skipped {
            tracing::warn!(kind = %done.kind, index = done.index, "stream skipped past index");
        }
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reactive_particles::driver::StreamCursor;
use reactive_particles::features::FeatureSource;
use reactive_particles::render::{JsonLinesSink, LogSink, RenderSink};
use reactive_particles::telemetry::{MetricEvent, StreamCounters, TelemetrySnapshot};
use reactive_particles::{
    ActiveMode, AppConfig, Driver, FeatureKind, FixtureSource, HttpFeatureClient, ModeState,
    Pacing, RunSummary,
};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "viz_cli",
    about = "Headless driver for the audio-reactive particle visualizer"
)]
struct Cli {
    /// JSON configuration file (missing or invalid files fall back to defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug plus live mode changes, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll a live feature server in real time
    Run {
        /// Feature server base URL (overrides config)
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Replay a recorded features.json dump
    Replay {
        #[arg(long)]
        fixture: PathBuf,
        /// Pace events against the wall clock instead of as fast as possible
        #[arg(long, default_value_t = false)]
        realtime: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print the default configuration as JSON
    Defaults,
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Stop after this many animation frames
    #[arg(long)]
    frames: Option<u64>,
    /// RNG seed for particles and noise (overrides config)
    #[arg(long)]
    seed: Option<u64>,
    /// Write one JSON frame summary per line to this file
    #[arg(long)]
    frames_out: Option<PathBuf>,
}

#[derive(Serialize)]
struct StreamReport {
    kind: FeatureKind,
    next_index: u64,
    consecutive_failures: u32,
    #[serde(flatten)]
    counters: StreamCounters,
}

#[derive(Serialize)]
struct RunReport {
    source: String,
    summary: RunSummary,
    final_mode: ActiveMode,
    flags: ModeState,
    streams: Vec<StreamReport>,
    telemetry: TelemetrySnapshot,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let watch_events = cli.verbose >= 2;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Run { url, common } => {
            if let Some(url) = url {
                config.server.base_url = url;
            }
            apply_common(&mut config, &common)?;
            let client = HttpFeatureClient::new(config.server.base_url.clone());
            let source = client.base_url().to_string();
            drive(
                &config,
                client,
                Pacing::RealTime,
                common.frames,
                common.frames_out.as_deref(),
                source,
                watch_events,
            )
        }
        Commands::Replay {
            fixture,
            realtime,
            common,
        } => {
            apply_common(&mut config, &common)?;
            let recording = FixtureSource::load(&fixture)?;
            let frames = common
                .frames
                .or_else(|| Some(frames_covering(&config, recording.len())));
            let pacing = if realtime {
                Pacing::RealTime
            } else {
                Pacing::AsFastAsPossible
            };
            drive(
                &config,
                recording,
                pacing,
                frames,
                common.frames_out.as_deref(),
                format!("fixture:{}", fixture.display()),
                watch_events,
            )
        }
        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&AppConfig::default())?);
            Ok(ExitCode::from(0))
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_common(config: &mut AppConfig, common: &CommonArgs) -> Result<()> {
    if let Some(seed) = common.seed {
        config.field.seed = Some(seed);
    }
    config.validate().context("invalid configuration")
}

/// Frames needed for every stream to walk through `records` indexes once.
fn frames_covering(config: &AppConfig, records: usize) -> u64 {
    let poll = config.polling.period().as_secs_f64();
    let frame = config.render.frame_period().as_secs_f64();
    (records as f64 * poll / frame).ceil() as u64
}

fn drive<S: FeatureSource>(
    config: &AppConfig,
    source: S,
    pacing: Pacing,
    frames: Option<u64>,
    frames_out: Option<&Path>,
    label: String,
    watch_events: bool,
) -> Result<ExitCode> {
    let mut sinks: Vec<Box<dyn RenderSink>> =
        vec![Box::new(LogSink::new(config.render.log_every_n_frames))];
    if let Some(path) = frames_out {
        let file = File::create(path)
            .with_context(|| format!("creating frame output {}", path.display()))?;
        sinks.push(Box::new(JsonLinesSink::new(BufWriter::new(file))));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let mut driver = Driver::new(config, source, sinks)
        .pacing(pacing)
        .max_frames(frames);
    let events = watch_events.then(|| driver.telemetry().collector().subscribe());
    let summary = runtime.block_on(run_watching(&mut driver, events));

    let state = driver.state();
    let streams = config
        .polling
        .streams
        .iter()
        .map(|kind| {
            let StreamCursor {
                next_index,
                consecutive_failures,
            } = state.cursor(*kind);
            StreamReport {
                kind: *kind,
                next_index,
                consecutive_failures,
                counters: driver.telemetry().counters(*kind),
            }
        })
        .collect();

    let report = RunReport {
        source: label,
        summary,
        final_mode: state.modes().active_mode(),
        flags: *state.modes(),
        streams,
        telemetry: driver.telemetry().snapshot(),
    };
    driver
        .into_sink()
        .finish()
        .context("flushing frame output")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(0))
}

/// Run the driver, logging mode transitions from the telemetry broadcast
/// as they happen when `events` is set.
async fn run_watching<S: FeatureSource, R: RenderSink>(
    driver: &mut Driver<S, R>,
    events: Option<broadcast::Receiver<MetricEvent>>,
) -> RunSummary {
    let Some(mut rx) = events else {
        return driver.run_until_ctrl_c().await;
    };

    let summary = {
        let run = driver.run_until_ctrl_c();
        tokio::pin!(run);
        loop {
            tokio::select! {
                summary = &mut run => break summary,
                received = rx.recv() => match received {
                    Ok(event) => log_event(&event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "event log fell behind");
                    }
                    Err(RecvError::Closed) => break (&mut run).await,
                },
            }
        }
    };

    loop {
        match rx.try_recv() {
            Ok(event) => log_event(&event),
            Err(TryRecvError::Lagged(missed)) => {
                tracing::debug!(missed, "event log fell behind");
            }
            Err(_) => break,
        }
    }
    summary
}

fn log_event(event: &MetricEvent) {
    match event {
        MetricEvent::ModeChanged { frame, from, to } => {
            tracing::info!(frame, %from, %to, "mode changed");
        }
        MetricEvent::MetallicExpired { frame } => {
            tracing::info!(frame, "metallic expired");
        }
        MetricEvent::StreamSkipped {
            kind,
            index,
            failures,
        } => {
            tracing::info!(%kind, index, failures, "stream skipped");
        }
        _ => {}
    }
}

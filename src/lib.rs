// Reactive Particles Core - audio-reactive particle visualizer
// Polls per-frame audio features and turns them into mode flags and particle motion

// Module declarations
pub mod config;
pub mod driver;
pub mod error;
pub mod features;
pub mod field;
pub mod modes;
pub mod render;
pub mod telemetry;

// Re-exports for convenience
pub use config::AppConfig;
pub use driver::{Driver, Pacing, RunSummary, VisualizerState};
pub use error::{ErrorCode, FeatureError};
pub use features::{FeatureKind, FeatureSample, FeatureSource, FixtureSource, HttpFeatureClient};
pub use modes::{ActiveMode, ColorScheme, ModeState};
pub use render::{FrameSnapshot, RenderSink};

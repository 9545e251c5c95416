//! Configuration management for the visualizer
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration on thresholds, timing, and field parameters
//! without recompilation. Every section has defaults matching the reference
//! sketches, so a partial file only overrides what it names.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::features::{FeatureKind, HISTORY_CAPACITY};
use crate::field::TRAIL_LENGTH;
use crate::modes::{ModeThresholds, METALLIC_FRAME_BUDGET};

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub modes: ModeConfig,
    pub field: FieldConfig,
    pub render: RenderConfig,
}

/// Feature server location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL, e.g. `http://127.0.0.1:5050`
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5050".to_string(),
        }
    }
}

/// Poll scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Sample rate of the analysed audio in Hz
    pub sample_rate: u32,
    /// Analysis frame length in samples
    pub frame_length: u32,
    /// Streams to poll; each keeps its own index counter
    pub streams: Vec<FeatureKind>,
    /// Consecutive index failures after which a stream skips ahead.
    /// `None` retries the same index forever.
    pub skip_after_failures: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            frame_length: 2048,
            streams: FeatureKind::ALL.to_vec(),
            skip_after_failures: Some(20),
        }
    }
}

impl PollingConfig {
    /// One analysis frame worth of wall time (2048 / 44100 s = 46.4 ms).
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.frame_length as f64 / self.sample_rate.max(1) as f64)
    }
}

/// Mode classification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub thresholds: ModeThresholds,
    /// RMS samples required before metallic/water-ink is evaluated
    pub history_capacity: usize,
    /// Frames metallic may stay active
    pub metallic_frame_budget: u32,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            thresholds: ModeThresholds::default(),
            history_capacity: HISTORY_CAPACITY,
            metallic_frame_budget: METALLIC_FRAME_BUDGET,
        }
    }
}

/// Particle field parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    /// Canvas width in pixels
    pub width: f32,
    /// Canvas height in pixels
    pub height: f32,
    /// Particle diameter range [min, max)
    pub size_range: [f32; 2],
    /// Particle speed range [min, max)
    pub speed_range: [f32; 2],
    pub trail_length: usize,
    /// Initial noise-space scale applied to canvas coordinates
    pub noise_scale: f32,
    /// Range the noise scale is re-rolled in when shooting stars start
    pub noise_scale_range: [f32; 2],
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 200,
            width: 1600.0,
            height: 1000.0,
            size_range: [5.0, 15.0],
            speed_range: [1.0, 3.0],
            trail_length: TRAIL_LENGTH,
            noise_scale: 0.01,
            noise_scale_range: [0.005, 0.02],
            seed: None,
        }
    }
}

/// Animation frame parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Animation frames per second
    pub frame_rate: f32,
    /// Log a frame summary every N frames (0 disables)
    pub log_every_n_frames: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            log_every_n_frames: 120,
        }
    }
}

impl RenderConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1.0) as f64)
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration, or defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Reject values the field and scheduler cannot work with.
    pub fn validate(&self) -> Result<()> {
        let field = &self.field;
        if !(field.width > 0.0 && field.height > 0.0) {
            bail!(
                "canvas must have positive size (got {}x{})",
                field.width,
                field.height
            );
        }
        if field.size_range[0] >= field.size_range[1] {
            bail!("field.size_range must be increasing: {:?}", field.size_range);
        }
        if field.speed_range[0] >= field.speed_range[1] {
            bail!(
                "field.speed_range must be increasing: {:?}",
                field.speed_range
            );
        }
        if self.polling.sample_rate == 0 || self.polling.frame_length == 0 {
            bail!("polling.sample_rate and polling.frame_length must be > 0");
        }
        if self.render.frame_rate <= 0.0 {
            bail!("render.frame_rate must be > 0");
        }
        if self.modes.history_capacity == 0 {
            bail!("modes.history_capacity must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:5050");
        assert_eq!(config.polling.sample_rate, 44_100);
        assert_eq!(config.polling.frame_length, 2048);
        assert_eq!(config.modes.history_capacity, 100);
        assert_eq!(config.modes.metallic_frame_budget, 120);
        assert_eq!(config.field.particle_count, 200);
        assert_eq!(config.field.trail_length, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_period_is_one_analysis_frame() {
        let period = PollingConfig::default().period();
        let millis = period.as_secs_f64() * 1000.0;
        assert!((millis - 46.44).abs() < 0.01, "period was {millis} ms");
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.polling.streams, config.polling.streams);
        assert_eq!(parsed.modes.thresholds, config.modes.thresholds);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let parsed: AppConfig = serde_json::from_str(
            r#"{ "field": { "particle_count": 12 }, "polling": { "streams": ["features"] } }"#,
        )
        .unwrap();

        assert_eq!(parsed.field.particle_count, 12);
        assert_eq!(parsed.field.width, 1600.0);
        assert_eq!(parsed.polling.streams, vec![FeatureKind::Features]);
        assert_eq!(parsed.polling.sample_rate, 44_100);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/definitely/not/here.json");
        assert_eq!(config.field.particle_count, 200);
    }

    #[test]
    fn test_validate_rejects_empty_canvas() {
        let mut config = AppConfig::default();
        config.field.width = 0.0;
        assert!(config.validate().is_err());
    }
}

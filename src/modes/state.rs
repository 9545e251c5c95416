//! Mode flags and the modes derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual behaviour chosen for the current frame, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMode {
    /// ZCR in the shooting-star band: fast horizontal streaks
    ShootingStar,
    /// Dominant frequency in the kick band: strong vertical motion
    Kick,
    /// Dominant frequency above the high threshold: pink organic drift
    FrequencyHigh,
    /// RMS window fluctuating: metallic liquid blobs (time-boxed)
    Metallic,
    /// RMS window stable: damped ink drift
    WaterInk,
    /// Nothing decided yet (RMS window never evaluated)
    Organic,
}

impl ActiveMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ActiveMode::ShootingStar => "shooting_star",
            ActiveMode::Kick => "kick",
            ActiveMode::FrequencyHigh => "frequency_high",
            ActiveMode::Metallic => "metallic",
            ActiveMode::WaterInk => "water_ink",
            ActiveMode::Organic => "organic",
        }
    }
}

impl fmt::Display for ActiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background/text pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Black background, white text
    Dark,
    /// White background, black text
    Light,
}

/// Mode flags shared between the poll streams and the animation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub shooting_star: bool,
    pub kick: bool,
    pub frequency_high: bool,
    pub metallic: bool,
    pub water_ink: bool,
    /// Frames elapsed since metallic was entered; 0 while inactive
    pub metallic_timer: u32,
}

impl ModeState {
    /// Highest-priority mode among the set flags.
    pub fn active_mode(&self) -> ActiveMode {
        if self.shooting_star {
            ActiveMode::ShootingStar
        } else if self.kick {
            ActiveMode::Kick
        } else if self.frequency_high {
            ActiveMode::FrequencyHigh
        } else if self.metallic {
            ActiveMode::Metallic
        } else if self.water_ink {
            ActiveMode::WaterInk
        } else {
            ActiveMode::Organic
        }
    }

    /// Coarse background flag, derived on every read so it always matches the
    /// fine-grained flags.
    pub fn color_scheme(&self) -> ColorScheme {
        if self.frequency_high || self.shooting_star || self.kick {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }
}

// Classifier - rule-based mapping from audio features to mode flags
//
// Rules:
// 1. shooting_star  <=> zcr in [0.02, 0.08]           (zcr stream)
// 2. kick           <=> dominant freq in [40, 100] Hz (frequency stream)
// 3. frequency_high <=> dominant freq > 250 Hz        (frequency stream)
// 4. with a full RMS window:
//      fluctuation > 0.02 -> metallic, not water-ink
//      otherwise          -> water-ink, not metallic
//    with a partial window the flags are left as they were
//
// Each apply_* function writes only the fields of its own rule. Which stream
// feeds which rule is decided by the driver (one writer per field).

use serde::{Deserialize, Serialize};

use crate::features::{FeatureHistory, FeatureSample};
use crate::modes::state::ModeState;

/// Outcome of evaluating a full RMS window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmsMode {
    Metallic,
    WaterInk,
}

/// Classification thresholds
///
/// All ranges are inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeThresholds {
    /// ZCR band that triggers shooting stars
    pub shooting_star_zcr: [f32; 2],
    /// Dominant-frequency band (Hz) treated as a kick
    pub kick_hz: [f32; 2],
    /// Dominant frequency (Hz) above which frequency mode is on
    pub frequency_high_hz: f32,
    /// RMS peak-to-trough spread above which the window reads as metallic
    pub metallic_fluctuation: f32,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            shooting_star_zcr: [0.02, 0.08],
            kick_hz: [40.0, 100.0],
            frequency_high_hz: 250.0,
            metallic_fluctuation: 0.02,
        }
    }
}

impl ModeThresholds {
    pub fn is_shooting_star(&self, zcr: f32) -> bool {
        zcr >= self.shooting_star_zcr[0] && zcr <= self.shooting_star_zcr[1]
    }

    pub fn is_kick(&self, freq: f32) -> bool {
        freq >= self.kick_hz[0] && freq <= self.kick_hz[1]
    }

    pub fn is_frequency_high(&self, freq: f32) -> bool {
        freq > self.frequency_high_hz
    }

    /// Classify the RMS window; `None` until the window is full.
    pub fn classify_window(&self, history: &FeatureHistory) -> Option<RmsMode> {
        if !history.is_full() {
            return None;
        }
        let fluctuation = history.fluctuation()?;
        if fluctuation > self.metallic_fluctuation {
            Some(RmsMode::Metallic)
        } else {
            Some(RmsMode::WaterInk)
        }
    }
}

/// Zcr stream update: writes `shooting_star` only.
pub fn apply_zcr_sample(state: &mut ModeState, thresholds: &ModeThresholds, zcr: f32) {
    state.shooting_star = thresholds.is_shooting_star(zcr);
}

/// Frequency stream update: writes `kick` and `frequency_high` only.
pub fn apply_freq_sample(state: &mut ModeState, thresholds: &ModeThresholds, freq: f32) {
    state.kick = thresholds.is_kick(freq);
    state.frequency_high = thresholds.is_frequency_high(freq);
}

/// RMS stream update: pushes into the window and, once it is full, writes
/// `metallic`, `water_ink` and (on entry into metallic) `metallic_timer`.
pub fn apply_rms_sample(
    state: &mut ModeState,
    history: &mut FeatureHistory,
    thresholds: &ModeThresholds,
    rms: f32,
) -> Option<RmsMode> {
    history.push(rms);
    let mode = thresholds.classify_window(history)?;

    match mode {
        RmsMode::Metallic => {
            if !state.metallic {
                state.metallic_timer = 0;
            }
            state.metallic = true;
            state.water_ink = false;
        }
        RmsMode::WaterInk => {
            state.metallic = false;
            state.water_ink = true;
            state.metallic_timer = 0;
        }
    }
    Some(mode)
}

/// Apply every field a sample carries.
///
/// A combined features sample feeds the RMS window before its zcr is read,
/// matching the order the server's features route is consumed in.
pub fn apply_sample(
    state: &mut ModeState,
    history: &mut FeatureHistory,
    thresholds: &ModeThresholds,
    sample: &FeatureSample,
) {
    if let Some(rms) = sample.rms {
        apply_rms_sample(state, history, thresholds, rms);
    }
    if let Some(zcr) = sample.zcr {
        apply_zcr_sample(state, thresholds, zcr);
    }
    if let Some(freq) = sample.dominant_frequency {
        apply_freq_sample(state, thresholds, freq);
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;

//! Mode Timer - frame budget for time-boxed modes
//!
//! Metallic is the only time-boxed mode: it lasts at most
//! [`METALLIC_FRAME_BUDGET`] animation frames (about two seconds at 60 fps)
//! before the timer forces it off and restores the water-ink default.

use crate::modes::state::ModeState;

/// Frames metallic may stay active before it is forced off.
pub const METALLIC_FRAME_BUDGET: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTimer {
    metallic_budget: u32,
}

impl ModeTimer {
    pub fn new(metallic_budget: u32) -> Self {
        Self { metallic_budget }
    }

    pub fn metallic_budget(&self) -> u32 {
        self.metallic_budget
    }

    /// Advance one animation frame.
    ///
    /// Returns `true` when this tick expired metallic mode.
    pub fn tick(&self, state: &mut ModeState) -> bool {
        if !state.metallic {
            return false;
        }

        state.metallic_timer = state.metallic_timer.saturating_add(1);
        if state.metallic_timer > self.metallic_budget {
            state.metallic = false;
            state.water_ink = true;
            state.metallic_timer = 0;
            log::debug!(
                "[ModeTimer] Metallic expired after {} frames",
                self.metallic_budget
            );
            return true;
        }
        false
    }
}

impl Default for ModeTimer {
    fn default() -> Self {
        Self::new(METALLIC_FRAME_BUDGET)
    }
}

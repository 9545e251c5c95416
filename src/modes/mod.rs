// Modes module - mode selection and temporal smoothing
//
// Pipeline per poll response: FeatureSample -> classifier (flags) ;
// per animation frame: ModeTimer (metallic budget) -> ModeState::active_mode.
//
// The zcr stream only writes `shooting_star`, the frequency stream only
// writes `kick`/`frequency_high`, and the RMS window only writes
// `metallic`/`water_ink`/`metallic_timer`. A combined features sample carries
// a zcr too; it only reaches `shooting_star` when no zcr stream is polled, so
// every flag keeps a single writer.

pub mod classifier;
pub mod state;
pub mod timer;

pub use classifier::{
    apply_freq_sample, apply_rms_sample, apply_sample, apply_zcr_sample, ModeThresholds, RmsMode,
};
pub use state::{ActiveMode, ColorScheme, ModeState};
pub use timer::{ModeTimer, METALLIC_FRAME_BUDGET};

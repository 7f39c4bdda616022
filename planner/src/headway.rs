//! Time headway policy.
//!
//! Gap setting 1 follows a speed dependent headway, settings 2 to 4 use the
//! driver's configured presets.

use crate::{interp, params::GapPresets};

const HEADWAY_SPEEDS_KPH: [f32; 5] = [0.0, 20.0, 40.0, 60.0, 110.0];
const HEADWAY_TIMES: [f32; 5] = [0.9, 1.2, 1.4, 1.65, 1.9];
const GAP_SETTINGS: [f32; 4] = [1.0, 2.0, 3.0, 4.0];

/// Clamps the raw cruise gap setting to 1..=4, truncating fractions.
pub fn cruise_gap(setting: f32) -> u8 {
    if setting.is_nan() {
        return 1;
    }
    setting.clamp(1.0, 4.0) as u8
}

/// Speed dependent headway (s) used by gap setting 1.
pub fn dynamic_headway(v_ego: f32) -> f32 {
    interp(v_ego * 3.6, &HEADWAY_SPEEDS_KPH, &HEADWAY_TIMES)
}

/// Target time headway (s) for the given ego speed and gap setting.
pub fn desired_headway(v_ego: f32, cruise_gap_set: f32, gaps: &GapPresets) -> f32 {
    let [gap2, gap3, gap4] = gaps.values();
    let headways = [dynamic_headway(v_ego), gap2, gap3, gap4];
    interp(f32::from(cruise_gap(cruise_gap_set)), &GAP_SETTINGS, &headways)
}

//! Planner configuration.
//!
//! Units:
//! - Time: seconds (s)
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)

use crate::PlannerError;

/// Number of samples in the output time grid.
pub const OUTPUT_GRID_LEN: usize = 33;

/// Number of output samples handed to the downstream controller.
pub const CONTROL_N: usize = 17;

/// Cost weights the solver is (re)initialized with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostWeights {
    pub ttc: f32,
    pub distance: f32,
    pub acceleration: f32,
    pub jerk: f32,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            ttc: 5.0,
            distance: 0.1,
            acceleration: 10.0,
            jerk: 20.0,
        }
    }
}

/// Immutable configuration shared by every lead controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub cost: CostWeights,
    /// Lead acceleration decay time constant used when no lead is tracked
    pub lead_accel_tau: f32,
    /// Non-uniform grid the solver samples its trajectory on
    pub solver_grid: Vec<f32>,
    /// Grid the plan is resampled onto
    pub output_grid: Vec<f32>,
    /// Number of leading `output_grid` samples that make up the plan
    pub control_n: usize,
    /// Floor applied to the solver's ego speed
    pub min_ego_speed: f32,
    /// Minimum model probability for the lead to count as trustworthy
    pub min_model_prob: f32,
    /// Lead speed below which the lead is treated as stopped
    pub stopped_lead_speed: f32,
    /// Lead distance jump between cycles that forces a reseed
    pub reseed_jump: f32,
    /// How far behind the ego the lead may fall in the solution before it counts as a crash
    pub crash_margin: f32,
    /// Solution speeds below this count as driving backwards
    pub backwards_speed: f32,
    /// Minimum time between divergence warnings
    pub warn_interval: f64,
    /// Synthetic lead used when nothing is tracked
    pub fake_lead_distance: f32,
    pub fake_lead_speed_offset: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cost: CostWeights::default(),
            lead_accel_tau: 1.5,
            solver_grid: solver_time_grid(),
            output_grid: output_time_grid(OUTPUT_GRID_LEN),
            control_n: CONTROL_N,
            min_ego_speed: 1e-3,
            min_model_prob: 0.5,
            stopped_lead_speed: 0.1,
            reseed_jump: 2.5,
            crash_margin: 50.0,
            backwards_speed: -0.01,
            warn_interval: 5.0,
            fake_lead_distance: 50.0,
            fake_lead_speed_offset: 10.0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.solver_grid.len() < 2 || !is_increasing(&self.solver_grid) {
            return Err(PlannerError::InvalidConfig(
                "solver grid must hold at least two increasing samples".into(),
            ));
        }
        if self.output_grid.is_empty() || !is_increasing(&self.output_grid) {
            return Err(PlannerError::InvalidConfig(
                "output grid must be non-empty and increasing".into(),
            ));
        }
        if self.control_n == 0 || self.control_n > self.output_grid.len() {
            return Err(PlannerError::InvalidConfig(format!(
                "control_n {} outside 1..={}",
                self.control_n,
                self.output_grid.len()
            )));
        }
        if !(self.lead_accel_tau.is_finite() && self.lead_accel_tau > 0.0) {
            return Err(PlannerError::InvalidConfig(format!(
                "lead_accel_tau must be positive, got {}",
                self.lead_accel_tau
            )));
        }
        if self.min_ego_speed.is_nan() || self.min_ego_speed <= 0.0 {
            return Err(PlannerError::InvalidConfig(
                "min_ego_speed must be strictly positive".into(),
            ));
        }
        Ok(())
    }

    /// The part of the output grid the plan is sampled on.
    pub fn control_grid(&self) -> &[f32] {
        &self.output_grid[..self.control_n]
    }
}

/// 0.2 s steps for the first second, 0.6 s steps after that, up to 10 s.
pub fn solver_time_grid() -> Vec<f32> {
    let fine = (0..5).map(|i| i as f32 * 0.2);
    let coarse = (0..16).map(|i| 1.0 + i as f32 * 0.6);
    fine.chain(coarse).collect()
}

/// Quadratically spaced grid over 10 s, dense near the present.
pub fn output_time_grid(len: usize) -> Vec<f32> {
    let last = len.saturating_sub(1).max(1) as f32;
    (0..len)
        .map(|i| 10.0 * (i as f32 / last).powi(2))
        .collect()
}

fn is_increasing(values: &[f32]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.solver_grid.len(), 21);
        assert_eq!(config.output_grid.len(), OUTPUT_GRID_LEN);
        assert_eq!(config.control_grid().len(), CONTROL_N);
    }

    #[test]
    fn solver_grid_is_fine_then_coarse() {
        let grid = solver_time_grid();
        assert_eq!(grid[0], 0.0);
        assert!((grid[1] - 0.2).abs() < 1e-6);
        assert!((grid[5] - 1.0).abs() < 1e-6);
        assert!((grid[6] - 1.6).abs() < 1e-5);
        assert!((grid[20] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn output_grid_spans_ten_seconds() {
        let grid = output_time_grid(OUTPUT_GRID_LEN);
        assert_eq!(grid[0], 0.0);
        assert!((grid[16] - 2.5).abs() < 1e-6);
        assert!((grid[32] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_control_horizon_longer_than_output_grid() {
        let config = PlannerConfig {
            control_n: OUTPUT_GRID_LEN + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlannerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_non_increasing_solver_grid() {
        let config = PlannerConfig {
            solver_grid: vec![0.0, 1.0, 1.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

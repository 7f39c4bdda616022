//! Per-lead longitudinal controller.
//!
//! Bridges one lead estimate to the trajectory solver every cycle: keeps the
//! solver's problem well posed, reseeds it when the lead changes
//! discontinuously, resamples the solution onto the output grid and resets the
//! solver when the solution diverges.
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)
//! - Time: seconds (s)

use std::{fmt, sync::Arc, time::Instant};

use bevy_log::{debug, info, warn};

use crate::{
    clock::{Clock, RateLimiter},
    config::PlannerConfig,
    headway::desired_headway,
    interp_many,
    lead::{CarState, LeadEstimate},
    params::{GapPresets, ParamStore},
    solver::{LongitudinalSolver, SolverState, Trajectory},
    PlannerError,
};

/// Which lead a controller instance is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LeadSlot(pub u8);

impl fmt::Display for LeadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ways a solution can be unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Divergence {
    /// Ego drives backwards somewhere along the solution
    pub backwards: bool,
    /// Ego ends up far past the lead
    pub crashing: bool,
    /// The solution contains NaN speeds
    pub nans: bool,
    /// The solution is not sampled on the configured solver grid
    pub malformed: bool,
}

impl Divergence {
    pub fn check(trajectory: &Trajectory, config: &PlannerConfig) -> Self {
        let crashing = trajectory
            .x_l
            .iter()
            .zip(&trajectory.x_ego)
            .any(|(x_l, x_ego)| x_l - x_ego < -config.crash_margin);
        let nans = trajectory.v_ego.iter().any(|v| v.is_nan());
        let len = config.solver_grid.len();
        let malformed = [
            &trajectory.x_ego,
            &trajectory.v_ego,
            &trajectory.a_ego,
            &trajectory.x_l,
        ]
        .iter()
        .any(|samples| samples.len() != len);
        let min_v = trajectory
            .v_ego
            .iter()
            .copied()
            .fold(f32::INFINITY, f32::min);

        Self {
            backwards: min_v < config.backwards_speed,
            crashing,
            nans,
            malformed,
        }
    }

    /// NaNs and malformed solutions always need a reset, implausible motion
    /// only while following a real lead.
    pub fn requires_reset(&self, tracking_lead: bool) -> bool {
        ((self.backwards || self.crashing) && tracking_lead) || self.nans || self.malformed
    }

    pub fn any(&self) -> bool {
        self.backwards || self.crashing || self.nans || self.malformed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    NoLead,
    TrackingLead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    Stable,
    JustReseeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub tracking: Tracking,
    pub seeding: Seeding,
}

pub struct LeadController<S> {
    slot: LeadSlot,
    config: Arc<PlannerConfig>,
    solver: S,
    state: SolverState,
    gaps: GapPresets,

    prev_lead_status: bool,
    prev_lead_x: f32,
    new_lead: bool,
    status: bool,
    a_lead_tau: f32,
    desired_tr: f32,

    n_its: u32,
    duration_ns: u64,
    warnings: RateLimiter,
    divergence: Divergence,
    reset: bool,

    v_solution: Vec<f32>,
    a_solution: Vec<f32>,
}

impl<S: LongitudinalSolver> LeadController<S> {
    pub fn new(
        slot: LeadSlot,
        mut solver: S,
        config: Arc<PlannerConfig>,
        params: &dyn ParamStore,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        let gaps = GapPresets::load(params)?;

        solver.initialize(config.cost);
        info!("Lead controller {slot} ready, gap presets {:?} s", gaps.values());

        Ok(Self {
            slot,
            solver,
            state: SolverState::default(),
            gaps,
            prev_lead_status: false,
            prev_lead_x: 0.0,
            new_lead: false,
            status: false,
            a_lead_tau: config.lead_accel_tau,
            desired_tr: 0.0,
            n_its: 0,
            duration_ns: 0,
            warnings: RateLimiter::new(config.warn_interval),
            divergence: Divergence::default(),
            reset: false,
            v_solution: vec![0.0; config.control_n],
            a_solution: vec![0.0; config.control_n],
            config,
        })
    }

    /// Sets the ego speed and acceleration the next solve starts from.
    pub fn set_ego_state(&mut self, v: f32, a: f32) {
        self.state.v_ego = v.max(self.config.min_ego_speed);
        self.state.a_ego = a;
    }

    /// Runs one control cycle. Never fails; a diverged solution resets the solver.
    pub fn update(&mut self, clock: &dyn Clock, car: &CarState, lead: &LeadEstimate) {
        let config = &*self.config;
        let v_ego = car.v_ego;

        self.status = lead.status && lead.model_prob > config.min_model_prob;
        self.new_lead = false;
        self.reset = false;

        // The solver works in ego-relative coordinates
        self.state.x_ego = 0.0;

        let a_lead = if lead.status {
            let x_lead = lead.d_rel;
            let (v_lead, a_lead) =
                effective_lead_motion(lead.v_lead, lead.a_lead_k, config.stopped_lead_speed);

            self.a_lead_tau = if lead.a_lead_tau.is_finite() && lead.a_lead_tau > 0.0 {
                lead.a_lead_tau
            } else {
                config.lead_accel_tau
            };

            if !self.prev_lead_status || (x_lead - self.prev_lead_x).abs() > config.reseed_jump {
                self.solver.initialize_with_simulated_history(
                    v_ego,
                    x_lead,
                    v_lead,
                    a_lead,
                    self.a_lead_tau,
                );
                self.new_lead = true;
                debug!(
                    "Lead {} reseeded at {x_lead:.1} m (previous {:.1} m, tracked {})",
                    self.slot, self.prev_lead_x, self.prev_lead_status
                );
            }

            self.prev_lead_status = true;
            self.prev_lead_x = x_lead;
            self.state.x_l = x_lead;
            self.state.v_l = v_lead;
            a_lead
        } else {
            self.prev_lead_status = false;
            // Fake a fast lead car so the solver keeps cruising
            self.state.x_l = config.fake_lead_distance;
            self.state.v_l = v_ego + config.fake_lead_speed_offset;
            self.a_lead_tau = config.lead_accel_tau;
            0.0
        };

        self.desired_tr = desired_headway(v_ego, car.cruise_gap_set, &self.gaps);
        self.state.v_ego = self.state.v_ego.max(config.min_ego_speed);

        let started = Instant::now();
        let (n_its, trajectory) =
            self.solver
                .solve(&self.state, self.a_lead_tau, a_lead, self.desired_tr);
        self.n_its = n_its;
        self.divergence = Divergence::check(trajectory, config);
        if self.divergence.malformed {
            // Hold the current speed until the solver recovers
            self.v_solution = vec![self.state.v_ego; config.control_n];
            self.a_solution = vec![0.0; config.control_n];
        } else {
            let t = config.control_grid();
            self.v_solution = interp_many(t, &config.solver_grid, &trajectory.v_ego);
            self.a_solution = interp_many(t, &config.solver_grid, &trajectory.a_ego);
        }
        self.duration_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

        debug!(
            "Lead {} solved in {} iterations, {} ns, TR {:.2} s",
            self.slot, self.n_its, self.duration_ns, self.desired_tr
        );

        if self.divergence.requires_reset(self.prev_lead_status) {
            if self.warnings.ready(clock.now()) {
                warn!(
                    "Longitudinal mpc {} reset - backwards: {} crashing: {} nan: {} malformed: {}",
                    self.slot,
                    self.divergence.backwards,
                    self.divergence.crashing,
                    self.divergence.nans,
                    self.divergence.malformed
                );
            }

            self.solver.initialize(config.cost);
            self.state.v_ego = v_ego.max(config.min_ego_speed);
            self.state.a_ego = 0.0;
            self.prev_lead_status = false;
            self.reset = true;
        }
    }

    pub fn slot(&self) -> LeadSlot {
        self.slot
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Whether this cycle's lead is present and trusted by the model.
    pub fn status(&self) -> bool {
        self.status
    }

    /// Whether the solver was reseeded this cycle.
    pub fn new_lead(&self) -> bool {
        self.new_lead
    }

    /// Whether a real lead will be treated as continuous next cycle.
    pub fn tracking_lead(&self) -> bool {
        self.prev_lead_status
    }

    pub fn phase(&self) -> Phase {
        Phase {
            tracking: if self.prev_lead_status {
                Tracking::TrackingLead
            } else {
                Tracking::NoLead
            },
            seeding: if self.new_lead {
                Seeding::JustReseeded
            } else {
                Seeding::Stable
            },
        }
    }

    /// Planned ego speeds on the control grid.
    pub fn v_solution(&self) -> &[f32] {
        &self.v_solution
    }

    /// Planned ego accelerations on the control grid.
    pub fn a_solution(&self) -> &[f32] {
        &self.a_solution
    }

    pub fn desired_tr(&self) -> f32 {
        self.desired_tr
    }

    pub fn a_lead_tau(&self) -> f32 {
        self.a_lead_tau
    }

    pub fn gaps(&self) -> &GapPresets {
        &self.gaps
    }

    pub fn state(&self) -> &SolverState {
        &self.state
    }

    pub fn n_its(&self) -> u32 {
        self.n_its
    }

    pub fn duration_ns(&self) -> u64 {
        self.duration_ns
    }

    /// Divergence flags of the latest solution, whether or not they forced a reset.
    pub fn divergence(&self) -> Divergence {
        self.divergence
    }

    /// Whether the solver was reset at the end of the latest cycle.
    pub fn was_reset(&self) -> bool {
        self.reset
    }

    pub fn last_warning_at(&self) -> Option<f64> {
        self.warnings.last()
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }
}

/// Lead speed and acceleration as fed to the solver.
///
/// A lead that is nearly stopped, or braking hard enough to stop within a
/// second, is treated as standing still.
pub fn effective_lead_motion(v_lead: f32, a_lead: f32, stopped_speed: f32) -> (f32, f32) {
    let v_lead = v_lead.max(0.0);
    if v_lead < stopped_speed || -a_lead / 2.0 > v_lead {
        (0.0, 0.0)
    } else {
        (v_lead, a_lead)
    }
}

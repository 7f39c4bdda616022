//! Intelligent Driver Model rollout, a reference [`LongitudinalSolver`].
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)
//! - Time: seconds (s)
//!
//! The rollout follows the lead with the requested time headway instead of
//! optimizing the cost weights, which are only recorded. Every solve starts
//! from the given state alone: the trajectory seeded by
//! `initialize_with_simulated_history` is only visible through
//! [`IdmSolver::trajectory`] until the next solve replaces it.

use crate::config::{CostWeights, PlannerConfig};

use super::{LongitudinalSolver, SolverState, Trajectory};

/// Intelligent Driver Model parameters.
///
/// Typical real-world values:
/// - Min spacing: 2.0-5.0 m (bumper-to-bumper distance at standstill)
/// - Max acceleration: 1.0-3.0 m/s² (comfortable acceleration)
/// - Comfortable deceleration: 1.5-3.0 m/s² (comfortable braking)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Idm {
    pub min_spacing: f32,
    pub max_acceleration: f32,
    pub comfortable_deceleration: f32,
    /// Largest change of acceleration per second along the rollout
    pub max_jerk: f32,
}

impl Default for Idm {
    fn default() -> Self {
        Self {
            min_spacing: 4.0,
            max_acceleration: 2.0,
            comfortable_deceleration: 3.0,
            max_jerk: 5.0,
        }
    }
}

impl Idm {
    pub fn acceleration(
        &self,
        desired_speed: f32,
        speed: f32,
        gap: f32,
        delta_speed: f32,
        time_headway: f32,
    ) -> f32 {
        let desired_speed = desired_speed.max(0.1);
        let gap = gap.max(0.01);

        let s_star = self.min_spacing
            + speed * time_headway
            + (speed * delta_speed)
                / (2.0 * (self.max_acceleration * self.comfortable_deceleration).sqrt());

        let raw = self.max_acceleration
            * (1.0 - (speed / desired_speed).powi(4) - (s_star.max(0.0) / gap).powi(2));

        // Can't brake harder than 2x comfortable_deceleration (emergency brake)
        raw.clamp(-self.comfortable_deceleration * 2.0, self.max_acceleration)
    }
}

pub struct IdmSolver {
    pub idm: Idm,
    /// Speed the rollout settles at on a free road
    pub cruise_speed: f32,
    grid: Vec<f32>,
    cost: CostWeights,
    trajectory: Trajectory,
    warm: bool,
}

impl IdmSolver {
    pub fn new(config: &PlannerConfig) -> Self {
        let mut solver = Self {
            idm: Idm::default(),
            cruise_speed: 30.0,
            grid: config.solver_grid.clone(),
            cost: config.cost,
            trajectory: Trajectory::default(),
            warm: false,
        };
        solver.initialize(config.cost);
        solver
    }

    pub fn with_cruise_speed(mut self, cruise_speed: f32) -> Self {
        self.cruise_speed = cruise_speed;
        self
    }

    pub fn cost(&self) -> CostWeights {
        self.cost
    }

    /// Whether anything (a seed or a solve) has filled the trajectory since the
    /// last `initialize`. The rollout itself does not depend on it.
    pub fn is_warm(&self) -> bool {
        self.warm
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }
}

impl LongitudinalSolver for IdmSolver {
    fn initialize(&mut self, cost: CostWeights) {
        self.cost = cost;
        self.trajectory = Trajectory::zeros(self.grid.len());
        self.warm = false;
    }

    fn initialize_with_simulated_history(
        &mut self,
        v_ego: f32,
        x_lead: f32,
        v_lead: f32,
        a_lead: f32,
        a_lead_tau: f32,
    ) {
        let tau = a_lead_tau.max(1e-3);
        let trajectory = &mut self.trajectory;
        trajectory.x_ego.clear();
        trajectory.v_ego.clear();
        trajectory.a_ego.clear();
        trajectory.x_l.clear();

        let (mut x_l, mut v_l) = (x_lead, v_lead);
        for (i, &t) in self.grid.iter().enumerate() {
            trajectory.x_ego.push(v_ego * t);
            trajectory.v_ego.push(v_ego);
            trajectory.a_ego.push(0.0);
            trajectory.x_l.push(x_l);

            if let Some(&next) = self.grid.get(i + 1) {
                let dt = next - t;
                let a_l = a_lead * (-t / tau).exp();
                (x_l, v_l) = advance(x_l, v_l, a_l, dt);
            }
        }
        self.warm = true;
    }

    fn solve(
        &mut self,
        state: &SolverState,
        a_lead_tau: f32,
        a_lead: f32,
        desired_tr: f32,
    ) -> (u32, &Trajectory) {
        let tau = a_lead_tau.max(1e-3);
        let mut trajectory = Trajectory::default();

        let (mut x, mut v, mut a) = (state.x_ego, state.v_ego, state.a_ego);
        let (mut x_l, mut v_l) = (state.x_l, state.v_l);

        for (i, &t) in self.grid.iter().enumerate() {
            trajectory.x_ego.push(x);
            trajectory.v_ego.push(v);
            trajectory.a_ego.push(a);
            trajectory.x_l.push(x_l);

            let Some(&next) = self.grid.get(i + 1) else {
                break;
            };
            let dt = next - t;

            let target = self
                .idm
                .acceleration(self.cruise_speed, v, x_l - x, v - v_l, desired_tr);
            let step = self.idm.max_jerk * dt;
            a = target.clamp(a - step, a + step);

            (x, v) = advance(x, v, a, dt);

            let a_l = a_lead * (-t / tau).exp();
            (x_l, v_l) = advance(x_l, v_l, a_l, dt);
        }

        self.trajectory = trajectory;
        self.warm = true;
        (1, &self.trajectory)
    }
}

/// Integrates one step at constant acceleration, stopping instead of reversing.
fn advance(x: f32, v: f32, a: f32, dt: f32) -> (f32, f32) {
    let v_next = v + a * dt;
    if v_next >= 0.0 {
        (x + v * dt + 0.5 * a * dt * dt, v_next)
    } else if a < 0.0 {
        (x + v * v / (-2.0 * a), 0.0)
    } else {
        (x, 0.0)
    }
}

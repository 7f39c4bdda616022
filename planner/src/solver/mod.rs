//! Contract of the trajectory solver driven by the lead controller.

use crate::config::CostWeights;

mod idm;
pub use idm::*;

#[cfg(test)]
pub(crate) mod testing;

/// Current state handed to the solver, in ego-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverState {
    pub x_ego: f32,
    pub v_ego: f32,
    pub a_ego: f32,
    pub x_l: f32,
    pub v_l: f32,
}

/// Parallel sequences sampled on the solver time grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    pub x_ego: Vec<f32>,
    pub v_ego: Vec<f32>,
    pub a_ego: Vec<f32>,
    pub x_l: Vec<f32>,
}

impl Trajectory {
    pub fn zeros(len: usize) -> Self {
        Self {
            x_ego: vec![0.0; len],
            v_ego: vec![0.0; len],
            a_ego: vec![0.0; len],
            x_l: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.v_ego.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v_ego.is_empty()
    }
}

/// A stateful trajectory optimizer owned by exactly one lead controller.
///
/// Dropping the solver releases whatever it holds.
pub trait LongitudinalSolver {
    /// Discards the warm start and sets the cost weights.
    fn initialize(&mut self, cost: CostWeights);

    /// Seeds a plausible warm start from a single snapshot of ego and lead.
    fn initialize_with_simulated_history(
        &mut self,
        v_ego: f32,
        x_lead: f32,
        v_lead: f32,
        a_lead: f32,
        a_lead_tau: f32,
    );

    /// Solves one cycle, returning the iteration count and the trajectory.
    fn solve(
        &mut self,
        state: &SolverState,
        a_lead_tau: f32,
        a_lead: f32,
        desired_tr: f32,
    ) -> (u32, &Trajectory);
}

impl<S: LongitudinalSolver + ?Sized> LongitudinalSolver for Box<S> {
    fn initialize(&mut self, cost: CostWeights) {
        (**self).initialize(cost)
    }

    fn initialize_with_simulated_history(
        &mut self,
        v_ego: f32,
        x_lead: f32,
        v_lead: f32,
        a_lead: f32,
        a_lead_tau: f32,
    ) {
        (**self).initialize_with_simulated_history(v_ego, x_lead, v_lead, a_lead, a_lead_tau)
    }

    fn solve(
        &mut self,
        state: &SolverState,
        a_lead_tau: f32,
        a_lead: f32,
        desired_tr: f32,
    ) -> (u32, &Trajectory) {
        (**self).solve(state, a_lead_tau, a_lead, desired_tr)
    }
}

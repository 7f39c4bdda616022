use crate::config::CostWeights;

use super::{LongitudinalSolver, SolverState, Trajectory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reseed {
    pub v_ego: f32,
    pub x_lead: f32,
    pub v_lead: f32,
    pub a_lead: f32,
    pub a_lead_tau: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveCall {
    pub state: SolverState,
    pub a_lead_tau: f32,
    pub a_lead: f32,
    pub desired_tr: f32,
}

/// Records every call and answers `solve` with a scripted trajectory.
pub struct ScriptedSolver {
    pub initialized: Vec<CostWeights>,
    pub reseeds: Vec<Reseed>,
    pub solves: Vec<SolveCall>,
    pub next: Trajectory,
}

impl ScriptedSolver {
    /// Ego cruising at 10 m/s with a lead 50 m ahead pulling away at 15 m/s.
    pub fn new(grid: &[f32]) -> Self {
        Self {
            initialized: vec![],
            reseeds: vec![],
            solves: vec![],
            next: Trajectory {
                x_ego: grid.iter().map(|t| 10.0 * t).collect(),
                v_ego: vec![10.0; grid.len()],
                a_ego: vec![0.0; grid.len()],
                x_l: grid.iter().map(|t| 50.0 + 15.0 * t).collect(),
            },
        }
    }

    pub fn last_solve(&self) -> &SolveCall {
        self.solves.last().expect("solver was never called")
    }
}

impl LongitudinalSolver for ScriptedSolver {
    fn initialize(&mut self, cost: CostWeights) {
        self.initialized.push(cost);
    }

    fn initialize_with_simulated_history(
        &mut self,
        v_ego: f32,
        x_lead: f32,
        v_lead: f32,
        a_lead: f32,
        a_lead_tau: f32,
    ) {
        self.reseeds.push(Reseed {
            v_ego,
            x_lead,
            v_lead,
            a_lead,
            a_lead_tau,
        });
    }

    fn solve(
        &mut self,
        state: &SolverState,
        a_lead_tau: f32,
        a_lead: f32,
        desired_tr: f32,
    ) -> (u32, &Trajectory) {
        self.solves.push(SolveCall {
            state: *state,
            a_lead_tau,
            a_lead,
            desired_tr,
        });
        (7, &self.next)
    }
}

pub use crate::{
    clock::{Clock, FixedClock},
    config::{CostWeights, PlannerConfig},
    controller::{Divergence, LeadController, LeadSlot, Phase, Seeding, Tracking},
    lead::{CarState, LeadEstimate, RadarState},
    params::{FileParams, GapPresets, MemoryParams, ParamStore},
    plan::{plan_leads, LeadPlanner},
    solver::{IdmSolver, LongitudinalSolver},
    PlannerError, PlannerPlugin,
};

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use bevy_ecs::prelude::*;
use bevy_time::Time;

use crate::{
    controller::{LeadController, LeadSlot},
    lead::{CarState, RadarState},
    params::ParamStore,
    solver::LongitudinalSolver,
    PlannerConfig, PlannerError,
};

pub type BoxedSolver = Box<dyn LongitudinalSolver + Send + Sync>;

/// One lead slot's controller, planned once per `Update`.
#[derive(Component)]
pub struct LeadPlanner(LeadController<BoxedSolver>);

impl LeadPlanner {
    pub fn new(
        slot: LeadSlot,
        solver: impl LongitudinalSolver + Send + Sync + 'static,
        config: Arc<PlannerConfig>,
        params: &dyn ParamStore,
    ) -> Result<Self, PlannerError> {
        let solver: BoxedSolver = Box::new(solver);
        Ok(Self(LeadController::new(slot, solver, config, params)?))
    }
}

impl Deref for LeadPlanner {
    type Target = LeadController<BoxedSolver>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for LeadPlanner {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub fn plan_leads(
    time: Res<Time>,
    car: Res<CarState>,
    radar: Res<RadarState>,
    mut planners: Query<&mut LeadPlanner>,
) {
    // Every slot follows the primary lead
    for mut planner in &mut planners {
        planner.set_ego_state(car.v_ego, car.a_ego);
        planner.update(&*time, &car, &radar.lead_one);
    }
}

#[cfg(test)]
mod tests {
    use bevy_app::prelude::*;

    use super::*;
    use crate::{
        lead::LeadEstimate,
        params::{MemoryParams, GAP_KEYS},
        solver::IdmSolver,
        PlannerPlugin,
    };

    fn app() -> (App, Vec<Entity>) {
        let mut app = App::new();
        app.add_plugins(PlannerPlugin);

        let config = Arc::new(PlannerConfig::default());
        let params = GAP_KEYS
            .iter()
            .fold(MemoryParams::new(), |params, key| params.with(*key, "15"));

        let entities = (0..2)
            .map(|slot| {
                let planner = LeadPlanner::new(
                    LeadSlot(slot),
                    IdmSolver::new(&config),
                    Arc::clone(&config),
                    &params,
                )
                .unwrap();
                app.world_mut().spawn(planner).id()
            })
            .collect();

        (app, entities)
    }

    #[test]
    fn plans_every_slot_without_lead() {
        let (mut app, entities) = app();
        app.world_mut().resource_mut::<CarState>().v_ego = 20.0;
        app.update();

        for entity in entities {
            let planner = app.world().get::<LeadPlanner>(entity).unwrap();
            assert_eq!(planner.state().x_l, 50.0);
            assert_eq!(planner.state().v_l, 30.0);
            assert_eq!(planner.state().v_ego, 20.0);
            assert_eq!(planner.v_solution().len(), 17);
            assert!(!planner.status());
        }
    }

    #[test]
    fn follows_primary_lead_across_updates() {
        let (mut app, entities) = app();
        app.world_mut().resource_mut::<CarState>().v_ego = 20.0;
        app.world_mut().resource_mut::<RadarState>().lead_one =
            LeadEstimate::tracked(35.0, 15.0, 0.0);
        app.update();

        let planner = app.world().get::<LeadPlanner>(entities[0]).unwrap();
        assert!(planner.new_lead());
        assert!(planner.status());
        assert!(planner.a_solution().iter().skip(1).any(|a| *a < 0.0));

        app.world_mut().resource_mut::<RadarState>().lead_one =
            LeadEstimate::tracked(34.5, 15.0, 0.0);
        app.update();

        for entity in entities {
            let planner = app.world().get::<LeadPlanner>(entity).unwrap();
            assert!(!planner.new_lead());
            assert!(planner.tracking_lead());
            assert_eq!(planner.state().x_l, 34.5);
        }
    }
}

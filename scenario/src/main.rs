//! Headless drive through a scripted lead scenario.
//!
//! The lead approaches, gets replaced by a closer cut-in, brakes to a stop,
//! pulls away and is finally lost. The ego follows the planned acceleration.
//!
//! Usage: `scenario [PARAM_DIR]`, where `PARAM_DIR` holds one file per gap
//! preset key (`CruiseGap2`..`CruiseGap4`).

use std::{sync::Arc, time::Duration};

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::{info, LogPlugin};
use bevy_time::{Time, TimePlugin, TimeUpdateStrategy};
use planner::{interp, params::GAP_KEYS, plan::plan_leads, prelude::*};
use rand::{rngs::StdRng, Rng, SeedableRng};

const DT: Duration = Duration::from_millis(50);
const DURATION_SECS: f32 = 60.0;
/// Plan time the ego's acceleration is taken from, covering actuator delay
const ACTUATOR_DELAY: f32 = 0.3;

#[derive(Resource)]
struct Scenario {
    ego_x: f32,
    ego_v: f32,
    ego_a: f32,
    lead_x: f32,
    lead_v: f32,
    lead_a: f32,
    cut_in: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ego_x: 0.0,
            ego_v: 25.0,
            ego_a: 0.0,
            lead_x: 80.0,
            lead_v: 20.0,
            lead_a: 0.0,
            cut_in: false,
        }
    }
}

#[derive(Resource)]
struct SensorNoise(StdRng);

fn main() -> Result<(), PlannerError> {
    let mut app = App::new();
    app.add_plugins((LogPlugin::default(), TimePlugin, PlannerPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(DT));
    app.insert_resource(SensorNoise(StdRng::seed_from_u64(7)));
    app.init_resource::<Scenario>();
    app.insert_resource(CarState {
        cruise_gap_set: 1.0,
        ..Default::default()
    });

    app.add_systems(
        Update,
        (
            drive.before(plan_leads),
            report.after(plan_leads),
        ),
    );

    let config = Arc::new(PlannerConfig::default());
    // Gap presets come from a parameter directory if one is given
    let params: Box<dyn ParamStore> = match std::env::args().nth(1) {
        Some(dir) => Box::new(FileParams::new(dir)),
        None => Box::new(
            GAP_KEYS
                .iter()
                .zip(["12", "16", "20"])
                .fold(MemoryParams::new(), |params, (key, value)| {
                    params.with(*key, value)
                }),
        ),
    };
    let solver = IdmSolver::new(&config).with_cruise_speed(27.0);
    let planner = LeadPlanner::new(LeadSlot(0), solver, config, params.as_ref())?;
    app.world_mut().spawn(planner);

    let steps = (DURATION_SECS / DT.as_secs_f32()) as usize;
    for _ in 0..steps {
        app.update();
    }

    Ok(())
}

/// Advances the world by one tick and publishes ego and lead measurements.
fn drive(
    time: Res<Time>,
    mut scenario: ResMut<Scenario>,
    mut noise: ResMut<SensorNoise>,
    mut car: ResMut<CarState>,
    mut radar: ResMut<RadarState>,
    planners: Query<&LeadPlanner>,
) {
    let t = time.elapsed_secs();
    let dt = time.delta_secs();

    if let Some(planner) = planners.iter().find(|p| p.slot() == LeadSlot(0)) {
        let grid = planner.config().control_grid();
        scenario.ego_a = interp(ACTUATOR_DELAY, grid, planner.a_solution());
    }

    if !scenario.cut_in && t > 15.0 {
        // A slower car merges in between
        scenario.cut_in = true;
        scenario.lead_x = scenario.ego_x + 30.0;
        scenario.lead_v = 18.0;
    }
    scenario.lead_a = match t {
        t if (25.0..32.0).contains(&t) => -3.0,
        t if (40.0..48.0).contains(&t) => 1.5,
        _ => 0.0,
    };

    scenario.ego_v = (scenario.ego_v + scenario.ego_a * dt).max(0.0);
    scenario.ego_x += scenario.ego_v * dt;
    scenario.lead_v = (scenario.lead_v + scenario.lead_a * dt).max(0.0);
    scenario.lead_x += scenario.lead_v * dt;

    car.v_ego = scenario.ego_v;
    car.a_ego = scenario.ego_a;

    let rng = &mut noise.0;
    radar.lead_one = if t < 52.0 {
        LeadEstimate::tracked(
            (scenario.lead_x - scenario.ego_x + rng.random_range(-0.3..0.3)).max(0.0),
            scenario.lead_v + rng.random_range(-0.1..0.1),
            scenario.lead_a,
        )
        .with_model_prob(rng.random_range(0.6..1.0))
    } else {
        LeadEstimate::default()
    };
}

fn report(time: Res<Time>, planners: Query<&LeadPlanner>, mut ticks: Local<u32>) {
    *ticks += 1;
    if *ticks % 20 != 0 {
        return;
    }

    for planner in &planners {
        let state = planner.state();
        info!(
            "t={:.1}s lead {} v_ego={:.1} x_l={:.1} v_l={:.1} TR={:.2} a_plan={:.2} phase={:?} reset={}",
            time.elapsed_secs(),
            planner.slot(),
            state.v_ego,
            state.x_l,
            state.v_l,
            planner.desired_tr(),
            planner.a_solution().get(1).copied().unwrap_or_default(),
            planner.phase(),
            planner.was_reset(),
        );
    }
}

use bevy_app::prelude::*;
use bevy_time::Time;

pub mod clock;
pub mod config;
pub mod controller;
mod error;
pub mod headway;
mod interpolate;
pub mod lead;
pub mod params;
pub mod plan;
pub mod prelude;
pub mod solver;

pub use config::PlannerConfig;
pub use error::*;
pub use interpolate::*;

use crate::{
    lead::{CarState, RadarState},
    plan::plan_leads,
};

pub struct PlannerPlugin;

impl Plugin for PlannerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Time>();
        app.init_resource::<CarState>();
        app.init_resource::<RadarState>();

        app.add_systems(Update, plan_leads);
    }
}

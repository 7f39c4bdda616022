//! Inputs read every control cycle.
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)

use bevy_ecs::prelude::*;

/// One tracked lead, as reported by the lead estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LeadEstimate {
    /// Whether a lead is being tracked at all
    pub status: bool,
    /// Confidence of the vision model in this lead
    pub model_prob: f32,
    /// Distance from ego to lead
    pub d_rel: f32,
    /// Absolute lead speed
    pub v_lead: f32,
    /// Filtered lead acceleration
    pub a_lead_k: f32,
    /// Time constant the lead acceleration is expected to decay with (s)
    pub a_lead_tau: f32,
}

impl LeadEstimate {
    /// A tracked lead with full model confidence and the nominal 1.5 s decay.
    pub fn tracked(d_rel: f32, v_lead: f32, a_lead: f32) -> Self {
        Self {
            status: true,
            model_prob: 1.0,
            d_rel,
            v_lead,
            a_lead_k: a_lead,
            a_lead_tau: 1.5,
        }
    }

    pub fn with_model_prob(mut self, model_prob: f32) -> Self {
        self.model_prob = model_prob;
        self
    }

    pub fn with_tau(mut self, a_lead_tau: f32) -> Self {
        self.a_lead_tau = a_lead_tau;
        self
    }
}

/// Ego kinematics and the driver's cruise gap setting.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CarState {
    pub v_ego: f32,
    pub a_ego: f32,
    /// Cruise gap setting, nominally 1 to 4
    pub cruise_gap_set: f32,
}

/// Latest output of the lead estimator.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RadarState {
    pub lead_one: LeadEstimate,
}

//! HTTP handlers for the scenario service.

pub mod health;
pub mod metrics;
pub mod scenarios;

pub use health::{health_check, readiness_check};
pub use scenarios::{generate_nomad_scenario, generate_survival_scenario, method_not_allowed};

pub mod generator;
pub mod metrics;
pub mod providers;

pub use generator::{GenerationError, ScenarioGenerator};

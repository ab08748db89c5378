//! scenario-service: generates game scenarios with a generative model and
//! normalizes the model output into a guaranteed shape.

pub mod config;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod services;
pub mod startup;

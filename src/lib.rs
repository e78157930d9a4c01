//! Fitgen: Structured Workout and Diet Plans
//!
//! Generates workout plans, diet plans and food-photo nutrition estimates by
//! asking a chain of language models in priority order. Model output is
//! repaired into typed records; when no model delivers, plans are synthesized
//! locally from the profile's energy math and an exercise pool.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod nutrition;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod provider;
pub mod repair;
pub mod store;
pub mod synthesis;
pub mod types;

//! Property-based tests for repair, energy math and synthesis

mod energy;
mod repair_recovery;
mod synthesis_shape;

//! CLI domain: parse, route, help, output, and presentation only.
//! Planning logic lives in the library; the route table only dispatches.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{
    Cli, Commands, ConfigCommands, GenerateCommands, PlanCommands, SynthesizeCommands,
    WorkoutShapeArgs,
};
pub use presentation::{chain_entries, format_energy_text, format_json, format_models_text, ChainEntry};
pub use route::RunContext;

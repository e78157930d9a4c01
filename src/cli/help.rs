//! Command names used in logs.

use crate::cli::parse::{
    Commands, ConfigCommands, GenerateCommands, PlanCommands, SynthesizeCommands,
};

/// Dotted command name (e.g. "synthesize.workout", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Energy { .. } => "energy".to_string(),
        Commands::Synthesize { command } => format!("synthesize.{}", synthesize_command_name(command)),
        Commands::Generate { command } => format!("generate.{}", generate_command_name(command)),
        Commands::AnalyzeFood { .. } => "analyze_food".to_string(),
        Commands::Repair { .. } => "repair".to_string(),
        Commands::Models { .. } => "models".to_string(),
        Commands::Plans { command } => format!("plans.{}", plan_command_name(command)),
        Commands::Points { .. } => "points".to_string(),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn synthesize_command_name(command: &SynthesizeCommands) -> &'static str {
    match command {
        SynthesizeCommands::Workout { .. } => "workout",
        SynthesizeCommands::Diet { .. } => "diet",
    }
}

pub fn generate_command_name(command: &GenerateCommands) -> &'static str {
    match command {
        GenerateCommands::Workout { .. } => "workout",
        GenerateCommands::Diet { .. } => "diet",
    }
}

pub fn plan_command_name(command: &PlanCommands) -> &'static str {
    match command {
        PlanCommands::Active { .. } => "active",
        PlanCommands::List { .. } => "list",
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
        ConfigCommands::Validate => "validate",
    }
}

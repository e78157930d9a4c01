//! CLI parse: clap types for fitgen. No behavior; definitions only.

use crate::store::PlanCategory;
use crate::synthesis::{ExperienceLevel, SplitPattern};
use crate::types::TrainingLocation;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fitgen - structured workout and diet plans with model fallback
#[derive(Parser)]
#[command(name = "fitgen")]
#[command(about = "Generate structured workout and diet plans, with deterministic fallbacks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace directory searched for fitgen.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (replaces global and workspace config files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show BMR, daily energy expenditure, calorie goal and macros for a profile
    Energy {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Build plans locally without calling any model
    Synthesize {
        #[command(subcommand)]
        command: SynthesizeCommands,
    },
    /// Generate plans through the provider fallback chain
    Generate {
        #[command(subcommand)]
        command: GenerateCommands,
    },
    /// Estimate nutrition for a food photo
    AnalyzeFood {
        /// Image file
        #[arg(long)]
        image: PathBuf,
        /// Media type (guessed from the file extension when omitted)
        #[arg(long)]
        media_type: Option<String>,
        /// Extra context for the model
        #[arg(long)]
        note: Option<String>,
    },
    /// Extract structured JSON from raw model output (stdin by default)
    Repair {
        /// Input file
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Show the configured fallback chain
    Models {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Read plans saved with --save-for
    Plans {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Show a user's points total, optionally recording an entry first
    Points {
        /// User identifier
        #[arg(long)]
        user: String,
        /// Points to record (may be negative)
        #[arg(long, allow_hyphen_values = true)]
        add: Option<i64>,
        /// Reason stored with the entry
        #[arg(long, default_value = "manual")]
        reason: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Print the user's active plan in a category (null when none)
    Active {
        /// User identifier
        #[arg(long)]
        user: String,
        /// Plan category (workout, diet)
        #[arg(long, default_value = "workout")]
        category: PlanCategory,
    },
    /// List every saved plan of a user, oldest first
    List {
        /// User identifier
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand)]
pub enum SynthesizeCommands {
    /// Build a 4-week workout plan from a split pattern and exercise pool
    Workout {
        #[command(flatten)]
        shape: WorkoutShapeArgs,
        /// Training location (home, gym, outdoor)
        #[arg(long, default_value = "gym")]
        location: TrainingLocation,
        /// Exercise pool JSON file (placeholder exercises when omitted)
        #[arg(long)]
        pool: Option<PathBuf>,
        /// Store the plan as the user's active workout plan
        #[arg(long)]
        save_for: Option<String>,
    },
    /// Build a diet plan from profile energy math
    Diet {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Store the plan as the user's active diet plan
        #[arg(long)]
        save_for: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GenerateCommands {
    /// Generate a workout plan; falls back to synthesis when --pool is given
    Workout {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Free-text additions to the prompt
        #[arg(long)]
        prompt_extra: Option<String>,
        /// Exercise pool JSON file for the synthesized fallback
        #[arg(long)]
        pool: Option<PathBuf>,
        #[command(flatten)]
        shape: WorkoutShapeArgs,
        /// Store the plan as the user's active workout plan
        #[arg(long)]
        save_for: Option<String>,
    },
    /// Generate a diet plan; falls back to synthesis
    Diet {
        /// Profile JSON file
        #[arg(long)]
        profile: PathBuf,
        /// Store the plan as the user's active diet plan
        #[arg(long)]
        save_for: Option<String>,
    },
}

/// Split, training days and level for synthesized workouts.
#[derive(clap::Args, Clone)]
pub struct WorkoutShapeArgs {
    /// Split pattern (full_body, ppl, upper_lower, bro_split)
    #[arg(long, default_value = "full_body")]
    pub split: SplitPattern,
    /// Comma-separated training days (e.g. mon,wed,fri)
    #[arg(long, value_delimiter = ',', default_value = "mon,wed,fri")]
    pub days: Vec<String>,
    /// Experience level (beginner, intermediate, advanced)
    #[arg(long, default_value = "intermediate")]
    pub level: ExperienceLevel,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (inline keys redacted)
    Show,
    /// Validate the effective configuration
    Validate,
}

//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{CliError, GenerationError};

/// Map an error to the line printed on stderr.
pub fn map_error(e: &CliError) -> String {
    match e {
        CliError::Generation(GenerationError::Config(message)) => {
            format!("Configuration problem: {}", message)
        }
        other => other.to_string(),
    }
}

//! Command dispatch.
//!
//! Routes parsed CLI arguments to their handlers.

pub mod completions;
pub mod countdown;
pub mod link;
pub mod points;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use crate::cli::args::{Cli, Commands, LinkSubcommand};
use crate::config::{ConfigLoader, ExperienceConfig};
use crate::error::KeepsakeError;

/// Dispatches a parsed invocation.
///
/// # Errors
///
/// Returns whatever the selected handler returns.
pub async fn dispatch(cli: Cli) -> Result<(), KeepsakeError> {
    match cli.command {
        Commands::Link(cmd) => match cmd.subcommand {
            LinkSubcommand::Encode(args) => link::encode(&args),
            LinkSubcommand::Decode(args) => link::decode(&args),
        },
        Commands::Countdown(args) => countdown::run(&args).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Points(args) => points::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads an experience file and logs its warnings.
fn load_experience(path: &Path) -> Result<Arc<ExperienceConfig>, KeepsakeError> {
    let loaded = ConfigLoader::with_defaults().load(path)?;
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(loaded.config)
}

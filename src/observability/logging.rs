//! Logging setup for the `keepsake` binary.
//!
//! Library code only emits `tracing` events; the binary decides where they
//! go. Output is human-readable or JSON on stderr.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable that overrides the verbosity flags.
pub const LOG_LEVEL_ENV: &str = "KEEPSAKE_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines with optional ANSI colors.
    #[default]
    Human,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Maps `-v` occurrences to a filter directive.
///
/// Dependencies always stay at `warn`; only this crate's own spans and
/// events get louder.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,keepsake=info",
        2 => "warn,keepsake=debug",
        _ => "warn,keepsake=trace",
    }
}

/// Installs the global subscriber, writing to stderr so stdout stays free
/// for tokens, snapshots and event streams.
///
/// `KEEPSAKE_LOG_LEVEL` replaces the verbosity-derived filter when it is
/// set and parses. A second call leaves the first subscriber in place.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Human => builder.with_ansi(ansi_enabled(color)).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::trace!("tracing subscriber already installed");
    }
}

fn ansi_enabled(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
    }
}

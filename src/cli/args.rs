//! CLI argument definitions.
//!
//! All Clap derive structs for `keepsake` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;
use crate::shape::ShapeKind;

// ============================================================================
// Root CLI
// ============================================================================

/// Personalized greeting links and phase countdowns.
#[derive(Parser, Debug)]
#[command(name = "keepsake", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "KEEPSAKE_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true, env = "KEEPSAKE_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode or decode personalization links.
    Link(LinkCommand),

    /// Show or follow a phase countdown.
    Countdown(CountdownArgs),

    /// Validate experience files.
    Validate(ValidateArgs),

    /// Print a particle point cloud as JSON.
    Points(PointsArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Link Command
// ============================================================================

/// Link subcommands wrapper.
#[derive(Args, Debug)]
pub struct LinkCommand {
    /// Link subcommand.
    #[command(subcommand)]
    pub subcommand: LinkSubcommand,
}

/// Link subcommands.
#[derive(Subcommand, Debug)]
pub enum LinkSubcommand {
    /// Encode a greeting or couple card into a token or share link.
    Encode(LinkEncodeArgs),

    /// Decode a token (or a URL carrying one).
    Decode(LinkDecodeArgs),
}

/// Arguments for `link encode`.
#[derive(Args, Debug)]
pub struct LinkEncodeArgs {
    /// Recipient name for a single-name greeting.
    #[arg(long, required_unless_present = "partner_a", conflicts_with = "partner_a")]
    pub name: Option<String>,

    /// First partner name for a couple card.
    #[arg(long, requires_all = ["partner_b", "date"])]
    pub partner_a: Option<String>,

    /// Second partner name for a couple card.
    #[arg(long, requires = "partner_a")]
    pub partner_b: Option<String>,

    /// Date string for a couple card.
    #[arg(long, requires = "partner_a")]
    pub date: Option<String>,

    /// Experience file whose `share` section supplies origin, path and
    /// message.
    #[arg(short, long, env = "KEEPSAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin to build a full share link (e.g. `https://example.com`).
    /// Overrides the experience file.
    #[arg(long, env = "KEEPSAKE_SHARE_ORIGIN")]
    pub origin: Option<String>,

    /// Page path for the share link [default: `/`].
    #[arg(long)]
    pub path: Option<String>,

    /// Print a WhatsApp share URL instead of the bare link.
    #[arg(long)]
    pub whatsapp: bool,

    /// Message placed before the link in chat shares.
    #[arg(long, requires = "whatsapp")]
    pub message: Option<String>,
}

/// Arguments for `link decode`.
#[derive(Args, Debug)]
pub struct LinkDecodeArgs {
    /// Token, query string, or full URL containing `?u=`.
    pub input: String,

    /// Payload kind to decode as.
    #[arg(short, long, default_value = "greeting")]
    pub kind: PayloadKind,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Experience file whose `defaults` section is shown when the input
    /// carries no usable token.
    #[arg(short, long, env = "KEEPSAKE_CONFIG")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Countdown Command
// ============================================================================

/// Arguments for `countdown`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(false))]
pub struct CountdownArgs {
    /// Experience file defining the schedule.
    #[arg(short, long, group = "source", env = "KEEPSAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in schedule.
    #[arg(long, group = "source")]
    pub preset: Option<Preset>,

    /// Year for the preset (defaults to the coming New Year).
    #[arg(long, requires = "preset")]
    pub year: Option<i32>,

    /// Evaluate at this instant instead of now; with `--watch`, a simulated
    /// clock starts here.
    #[arg(long)]
    pub at: Option<String>,

    /// Keep running and print every published change.
    #[arg(short, long)]
    pub watch: bool,

    /// Stop once the final phase is reached.
    #[arg(long, requires = "watch")]
    pub until_final: bool,

    /// Override the tick period (e.g. `500ms`).
    #[arg(long)]
    pub tick: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Expose Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "KEEPSAKE_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

// ============================================================================
// Validate / Points / Completions / Version
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Experience files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `points`.
#[derive(Args, Debug)]
pub struct PointsArgs {
    /// Shape to generate.
    pub shape: ShapeArg,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 1500)]
    pub count: usize,

    /// Radius, scale, or box edge depending on the shape.
    #[arg(short, long, default_value_t = 1.0)]
    pub size: f32,

    /// Seed for randomized shapes.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Print an interleaved `x, y, z, ...` array.
    #[arg(long)]
    pub flat: bool,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Payload kind carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PayloadKind {
    /// Single display name.
    #[default]
    Greeting,
    /// Two names and a date.
    Couple,
}

/// Built-in schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Countdown to midnight, celebration day, then focus.
    NewYear,
}

/// Point cloud shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    /// Points on a sphere surface.
    Sphere,
    /// Heart curve.
    Heart,
    /// Uniform scatter in a box.
    Scatter,
}

impl From<ShapeArg> for ShapeKind {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Sphere => Self::Sphere,
            ShapeArg::Heart => Self::Heart,
            ShapeArg::Scatter => Self::Scatter,
        }
    }
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

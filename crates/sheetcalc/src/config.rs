//! Application configuration from CLI flags and environment.

use clap::Parser;

/// SheetCalc-rs — character-sheet derived-attribute calculator.
#[derive(Parser, Debug)]
#[command(name = "sheetcalc", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Path to the raw character document (JSON object, or array for a
    /// batch run).
    #[arg(short, long, env = "SHEETCALC_INPUT")]
    pub input: Option<String>,

    /// Coordinators to run: "all" or a comma-separated list of stage names.
    #[arg(long, default_value = "all")]
    pub select: String,

    /// Output file path for the report JSON.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Quiet mode (only output the report JSON).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Show per-stage data payloads.
    #[arg(short, long)]
    pub details: bool,

    /// Enable coordinator debug diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// Skip coordinator input gates.
    #[arg(long)]
    pub no_validate: bool,

    /// Disable performance aggregation.
    #[arg(long)]
    pub no_perf: bool,

    /// Print aggregated performance statistics after the run.
    #[arg(long)]
    pub perf_stats: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

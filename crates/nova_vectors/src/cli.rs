//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Prints test vectors (JSON, binary and identifier) for Nova protocol objects.
#[derive(Parser, Debug, Clone)]
#[command(name = "nova-vectors")]
#[command(version)]
pub struct Cli {
    /// Object to generate, e.g. "Commitment" or "Output ID Proof".
    pub object: Option<String>,

    /// Seed for deterministic fixtures. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Protocol parameters as JSON. Defaults to the TestJungle set.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// List the supported objects and exit.
    #[arg(long)]
    pub list: bool,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

/// Young generation layout simulator
#[derive(Debug, Clone, Parser)]
#[command(name = "young-gen", version, about)]
pub struct Cli {
    /// JSON configuration file; defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Operation script to run; one operation per line
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Base address of the reservation
    #[arg(long, default_value = "0x10000000", value_parser = parse_address)]
    pub base: usize,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Log resize decisions (debug level); RUST_LOG takes precedence
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_address(text: &str) -> Result<usize, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

impl Cli {
    /// Log level selected by the flags.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }
}

//! Young generation layout simulator
//!
//! Entry point for the simulator. Parses CLI arguments, loads the
//! configuration and runs the script.

use std::process;

use clap::Parser;
use gen_cli::simulator::load_config;
use gen_cli::{Cli, CliError, Simulator};

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    if cli.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut simulator = Simulator::new(config, cli.base, stdout.lock())?;
    if let Some(script) = &cli.script {
        simulator.run_file(script)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

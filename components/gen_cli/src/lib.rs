//! Young Generation Layout Simulator
//!
//! Drives a young generation from a configuration file and a script of
//! operations, printing the layout as it changes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod script;
pub mod simulator;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use script::{parse_script, parse_size, Op, Target};
pub use simulator::Simulator;

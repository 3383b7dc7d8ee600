//! Operation scripts.
//!
//! One operation per line; `#` starts a comment. Sizes are bytes with an
//! optional `K`, `M` or `G` suffix.
//!
//! ```text
//! alloc eden 2M
//! scavenge 512K
//! resize 8M 2M
//! print
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{CliError, CliResult};

/// A space named in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Eden
    Eden,
    /// The current from-space
    From,
    /// The current to-space
    To,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eden" => Ok(Target::Eden),
            "from" => Ok(Target::From),
            "to" => Ok(Target::To),
            other => Err(format!("unknown space '{}'", other)),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Eden => "eden",
            Target::From => "from",
            Target::To => "to",
        })
    }
}

/// One script operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Resize the generation and its spaces
    Resize {
        /// Desired eden size
        eden: usize,
        /// Desired survivor size
        survivor: usize,
    },
    /// Allocate bytes in a space
    Alloc {
        /// Space to allocate in
        target: Target,
        /// Bytes to allocate
        bytes: usize,
    },
    /// Copy this many live bytes to to-space, empty eden and from-space,
    /// then swap the survivors
    Scavenge {
        /// Bytes surviving the scavenge
        live: usize,
    },
    /// Swap the survivors without copying
    Swap,
    /// Empty a space
    Clear(Target),
    /// Check every invariant
    Verify,
    /// Print the layout
    Print,
}

/// Parses a size such as `4096`, `512K`, `8M` or `1G`.
pub fn parse_size(text: &str) -> Result<usize, String> {
    let (digits, multiplier) = match text.char_indices().last() {
        Some((idx, 'K')) | Some((idx, 'k')) => (&text[..idx], 1usize << 10),
        Some((idx, 'M')) | Some((idx, 'm')) => (&text[..idx], 1usize << 20),
        Some((idx, 'G')) | Some((idx, 'g')) => (&text[..idx], 1usize << 30),
        _ => (text, 1),
    };
    let value: usize = digits
        .parse()
        .map_err(|_| format!("invalid size '{}'", text))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size '{}' overflows", text))
}

fn expect_args(op: &str, args: &[&str], count: usize) -> Result<(), String> {
    if args.len() != count {
        return Err(format!(
            "'{}' takes {} argument(s), got {}",
            op,
            count,
            args.len()
        ));
    }
    Ok(())
}

fn parse_line(line: &str) -> Result<Option<Op>, String> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(op) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let op = match op {
        "resize" => {
            expect_args(op, &args, 2)?;
            Op::Resize {
                eden: parse_size(args[0])?,
                survivor: parse_size(args[1])?,
            }
        }
        "alloc" => {
            expect_args(op, &args, 2)?;
            Op::Alloc {
                target: args[0].parse()?,
                bytes: parse_size(args[1])?,
            }
        }
        "scavenge" => {
            expect_args(op, &args, 1)?;
            Op::Scavenge {
                live: parse_size(args[0])?,
            }
        }
        "swap" => {
            expect_args(op, &args, 0)?;
            Op::Swap
        }
        "clear" => {
            expect_args(op, &args, 1)?;
            Op::Clear(args[0].parse()?)
        }
        "verify" => {
            expect_args(op, &args, 0)?;
            Op::Verify
        }
        "print" => {
            expect_args(op, &args, 0)?;
            Op::Print
        }
        other => return Err(format!("unknown operation '{}'", other)),
    };
    Ok(Some(op))
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns [`CliError::Script`] for the first line that does not parse.
pub fn parse_script(source: &str) -> CliResult<Vec<Op>> {
    let mut ops = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(op)) => ops.push(op),
            Ok(None) => {}
            Err(message) => {
                return Err(CliError::Script {
                    line: idx + 1,
                    message,
                })
            }
        }
    }
    Ok(ops)
}

//! Runs script operations against a young generation.

use std::io::Write;
use std::path::Path;

use young_gen::{MutableSpace, ResizeOutcome, YoungGen, YoungGenConfig, K};

use crate::error::{CliError, CliResult};
use crate::script::{Op, Target};

/// A young generation plus the output it reports to.
pub struct Simulator<W: Write> {
    young_gen: YoungGen,
    out: W,
}

impl<W: Write> Simulator<W> {
    /// Reserves a generation at `base` and prints its initial layout.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is rejected or the initial size cannot be
    /// committed.
    pub fn new(config: YoungGenConfig, base: usize, mut out: W) -> CliResult<Self> {
        let (young_gen, _card_table) = YoungGen::reserve(config, base)?;
        writeln!(out, "{}", young_gen)?;
        Ok(Simulator { young_gen, out })
    }

    /// The simulated generation.
    pub fn young_gen(&self) -> &YoungGen {
        &self.young_gen
    }

    /// Consumes the simulator, returning its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    fn space_mut(&mut self, target: Target) -> &mut MutableSpace {
        match target {
            Target::Eden => self.young_gen.eden_space_mut(),
            Target::From => self.young_gen.from_space_mut(),
            Target::To => self.young_gen.to_space_mut(),
        }
    }

    /// Executes one operation.
    pub fn execute(&mut self, op: &Op) -> CliResult<()> {
        log::debug!("executing {:?}", op);
        match *op {
            Op::Resize { eden, survivor } => {
                let outcome = self.young_gen.resize(eden, survivor)?;
                self.report_resize(eden, survivor, &outcome)?;
            }
            Op::Alloc { target, bytes } => {
                let addr = self
                    .space_mut(target)
                    .allocate(bytes)
                    .ok_or_else(|| CliError::OutOfSpace {
                        target: target.to_string(),
                        bytes,
                    })?;
                writeln!(self.out, "alloc {} {} -> {:#x}", target, bytes, addr)?;
            }
            Op::Scavenge { live } => self.scavenge(live)?,
            Op::Swap => {
                self.young_gen.swap_spaces();
                writeln!(self.out, "swap: order {}", self.young_gen.order())?;
            }
            Op::Clear(target) => {
                self.space_mut(target).clear();
                writeln!(self.out, "clear {}", target)?;
            }
            Op::Verify => {
                self.young_gen.verify()?;
                writeln!(self.out, "verify: ok")?;
            }
            Op::Print => writeln!(self.out, "{}", self.young_gen)?,
        }
        Ok(())
    }

    /// Executes operations in order, stopping at the first failure.
    pub fn run(&mut self, ops: &[Op]) -> CliResult<()> {
        for op in ops {
            self.execute(op)?;
        }
        Ok(())
    }

    /// Executes a script file.
    pub fn run_file(&mut self, path: &Path) -> CliResult<()> {
        let source = std::fs::read_to_string(path)?;
        let ops = crate::script::parse_script(&source)?;
        self.run(&ops)
    }

    fn scavenge(&mut self, live: usize) -> CliResult<()> {
        let prev_used = self.young_gen.used_in_bytes();
        if live > 0 {
            self.young_gen
                .to_space_mut()
                .allocate(live)
                .ok_or_else(|| CliError::OutOfSpace {
                    target: Target::To.to_string(),
                    bytes: live,
                })?;
        }
        self.young_gen.eden_space_mut().clear();
        self.young_gen.from_space_mut().clear();
        self.young_gen.swap_spaces();
        writeln!(self.out, "scavenge{}", self.young_gen.used_change(prev_used))?;
        Ok(())
    }

    fn report_resize(&mut self, eden: usize, survivor: usize, outcome: &ResizeOutcome) -> CliResult<()> {
        writeln!(
            self.out,
            "resize {}K {}K: committed {}K->{}K ({:?}, {:?})",
            eden / K,
            survivor / K,
            outcome.committed_before / K,
            outcome.committed_after / K,
            outcome.generation,
            outcome.spaces
        )?;
        Ok(())
    }
}

/// Loads a configuration file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> CliResult<YoungGenConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(YoungGenConfig::from_json(&json)?)
        }
        None => Ok(YoungGenConfig::default()),
    }
}

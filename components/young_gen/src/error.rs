//! Error types for the young generation.
//!
//! Two kinds of failure exist here. Recoverable ones (a refused expansion, a
//! bad configuration at startup) are returned as [`LayoutError`]. Broken
//! layout invariants are heap corruption: [`InvariantViolation`] describes
//! them, and the engine turns them into a panic at its checkpoints.

use thiserror::Error;

/// Errors returned by the young generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The configuration was rejected before anything was reserved.
    #[error("invalid young generation configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The reserved address range cannot back a generation.
    #[error("invalid reservation [{base:#x}, +{size:#x}) with alignment {alignment:#x}: {reason}")]
    InvalidReservation {
        base: usize,
        size: usize,
        alignment: usize,
        reason: &'static str,
    },

    /// The initial generation size could not be committed.
    #[error("could not commit {requested} bytes for the young generation (reserved {reserved})")]
    InitialCommitFailed { requested: usize, reserved: usize },

    /// Growing the generation failed; the previous layout is intact.
    #[error("could not expand the young generation by {requested} bytes (committed {committed})")]
    ExpansionFailed { requested: usize, committed: usize },
}

/// A configuration rule that was not met.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("alignment {0:#x} is not a power of two")]
    AlignmentNotPowerOfTwo(usize),

    #[error("{name} ({value:#x}) is not a multiple of the alignment {alignment:#x}")]
    Unaligned {
        name: &'static str,
        value: usize,
        alignment: usize,
    },

    #[error("sizes must satisfy min ({min}) <= initial ({initial}) <= max ({max})")]
    SizeOrder {
        min: usize,
        initial: usize,
        max: usize,
    },

    #[error("min_size {min} cannot hold three spaces of {alignment} bytes")]
    MinSizeTooSmall { min: usize, alignment: usize },

    #[error("{name} must be at least 3, got {value}")]
    RatioTooSmall { name: &'static str, value: usize },

    #[error("max_size {max} exceeds the reservation of {reserved} bytes")]
    ExceedsReservation { max: usize, reserved: usize },

    #[error("malformed configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// A broken layout invariant.
///
/// `check` names the invariant that failed and is stable enough to match on;
/// `detail` carries the addresses involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{check}: {detail}")]
pub struct InvariantViolation {
    pub check: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    pub fn new(check: &'static str, detail: impl Into<String>) -> Self {
        InvariantViolation {
            check,
            detail: detail.into(),
        }
    }
}

/// Result type for young generation operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Aborts on a broken invariant after logging it.
///
/// A violation means the heap layout is corrupt; there is nothing to unwind
/// to, so this never returns.
#[cold]
#[track_caller]
pub(crate) fn fatal(violation: InvariantViolation) -> ! {
    log::error!("young generation invariant violated: {}", violation);
    panic!("young generation invariant violated: {}", violation);
}

/// Checks a condition that must hold in every build and aborts through
/// [`fatal`] when it does not.
macro_rules! guarantee {
    ($cond:expr, $check:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::error::fatal($crate::error::InvariantViolation::new(
                $check,
                format!($($arg)+),
            ));
        }
    };
}

pub(crate) use guarantee;

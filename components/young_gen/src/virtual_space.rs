//! Reserved address range with a committed prefix.
//!
//! The generation lives in one contiguous reservation. Only a prefix of it,
//! `[low, high)`, is committed at any time; growing and shrinking the
//! generation moves `high`.

use crate::error::{InvariantViolation, LayoutError};
use crate::mem_region::{is_aligned, is_power_of_two, pointer_delta, MemRegion};

/// Storage the young generation commits and decommits.
///
/// `low_boundary..high_boundary` is the reservation and never changes.
/// `low..high` is the committed prefix; `low == low_boundary` always.
pub trait BackingStore {
    /// Granularity of every commit and decommit.
    fn alignment(&self) -> usize;

    fn low_boundary(&self) -> usize;

    fn high_boundary(&self) -> usize;

    fn low(&self) -> usize;

    fn high(&self) -> usize;

    /// Commits `bytes` more at `high`.
    ///
    /// # Returns
    ///
    /// False if the memory could not be committed. The committed range is
    /// unchanged in that case.
    fn expand_by(&mut self, bytes: usize) -> bool;

    /// Decommits `bytes` at `high`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is unaligned or more than is committed.
    fn shrink_by(&mut self, bytes: usize);

    fn committed_size(&self) -> usize {
        self.high() - self.low()
    }

    fn reserved_size(&self) -> usize {
        self.high_boundary() - self.low_boundary()
    }

    fn uncommitted_size(&self) -> usize {
        self.reserved_size() - self.committed_size()
    }

    /// The committed range.
    fn committed_region(&self) -> MemRegion {
        MemRegion::new(self.low(), self.high())
    }

    /// The whole reservation.
    fn reserved_region(&self) -> MemRegion {
        MemRegion::new(self.low_boundary(), self.high_boundary())
    }

    /// Checks the committed range against the reservation.
    fn verify(&self) -> Result<(), InvariantViolation> {
        let alignment = self.alignment();
        if self.low() != self.low_boundary() {
            return Err(InvariantViolation::new(
                "committed range detached",
                format!("low {:#x} low_boundary {:#x}", self.low(), self.low_boundary()),
            ));
        }
        if self.high() < self.low() || self.high() > self.high_boundary() {
            return Err(InvariantViolation::new(
                "committed beyond reservation",
                format!("high {:#x} reserved {}", self.high(), self.reserved_region()),
            ));
        }
        if !is_aligned(self.committed_size(), alignment) {
            return Err(InvariantViolation::new(
                "committed size unaligned",
                format!("{:#x} by {:#x}", self.committed_size(), alignment),
            ));
        }
        Ok(())
    }
}

/// An address range set aside for the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedSpace {
    base: usize,
    size: usize,
    alignment: usize,
}

impl ReservedSpace {
    /// Describes a reservation of `size` bytes at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidReservation`] if the alignment is not a
    /// power of two, the bounds are unaligned, or the range wraps.
    pub fn new(base: usize, size: usize, alignment: usize) -> Result<Self, LayoutError> {
        let invalid = |reason| LayoutError::InvalidReservation {
            base,
            size,
            alignment,
            reason,
        };
        if !is_power_of_two(alignment) {
            return Err(invalid("alignment is not a power of two"));
        }
        if !is_aligned(base, alignment) || !is_aligned(size, alignment) {
            return Err(invalid("bounds are not aligned"));
        }
        if size == 0 {
            return Err(invalid("reservation is empty"));
        }
        if base.checked_add(size).is_none() {
            return Err(invalid("reservation wraps the address space"));
        }
        Ok(ReservedSpace {
            base,
            size,
            alignment,
        })
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn region(&self) -> MemRegion {
        MemRegion::with_size(self.base, self.size)
    }
}

/// Accounting implementation of [`BackingStore`].
///
/// Tracks the committed prefix of a [`ReservedSpace`]. An optional commit
/// limit caps how far `high` may move, which is how a platform that refuses
/// to commit more memory shows up to the generation.
#[derive(Debug, Clone)]
pub struct VirtualSpace {
    reserved: ReservedSpace,
    high: usize,
    commit_limit: Option<usize>,
}

impl VirtualSpace {
    /// Creates a virtual space over `reserved` with nothing committed.
    pub fn new(reserved: ReservedSpace) -> Self {
        VirtualSpace {
            reserved,
            high: reserved.base(),
            commit_limit: None,
        }
    }

    /// Caps the committed size at `bytes`; later expansions past it fail.
    pub fn with_commit_limit(mut self, bytes: usize) -> Self {
        self.commit_limit = Some(bytes);
        self
    }

    /// Changes or removes the commit cap.
    pub fn set_commit_limit(&mut self, bytes: Option<usize>) {
        self.commit_limit = bytes;
    }

    pub fn commit_limit(&self) -> Option<usize> {
        self.commit_limit
    }
}

impl BackingStore for VirtualSpace {
    fn alignment(&self) -> usize {
        self.reserved.alignment()
    }

    fn low_boundary(&self) -> usize {
        self.reserved.base()
    }

    fn high_boundary(&self) -> usize {
        self.reserved.region().end()
    }

    fn low(&self) -> usize {
        self.reserved.base()
    }

    fn high(&self) -> usize {
        self.high
    }

    fn expand_by(&mut self, bytes: usize) -> bool {
        if bytes == 0 {
            return true;
        }
        if !is_aligned(bytes, self.alignment()) {
            log::warn!("refusing unaligned commit of {:#x} bytes", bytes);
            return false;
        }
        if bytes > self.uncommitted_size() {
            log::warn!(
                "commit of {} bytes exceeds the {} uncommitted bytes",
                bytes,
                self.uncommitted_size()
            );
            return false;
        }
        let new_committed = self.committed_size() + bytes;
        if let Some(limit) = self.commit_limit {
            if new_committed > limit {
                log::warn!(
                    "commit of {} bytes refused: limit {} bytes",
                    bytes,
                    limit
                );
                return false;
            }
        }
        self.high += bytes;
        log::trace!("committed {} bytes, high now {:#x}", bytes, self.high);
        true
    }

    fn shrink_by(&mut self, bytes: usize) {
        assert!(
            is_aligned(bytes, self.alignment()),
            "unaligned decommit of {:#x} bytes",
            bytes
        );
        assert!(
            bytes <= self.committed_size(),
            "decommit of {} bytes exceeds the {} committed",
            bytes,
            self.committed_size()
        );
        self.high = pointer_delta(self.high, bytes);
        log::trace!("decommitted {} bytes, high now {:#x}", bytes, self.high);
    }
}

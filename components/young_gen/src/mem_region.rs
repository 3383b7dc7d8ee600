//! Address ranges and alignment arithmetic.
//!
//! Every boundary in the young generation is a plain `usize` address. All
//! arithmetic that could wrap goes through the checked helpers here; a wrap
//! is a layout bug, never a value to carry on with.

use std::fmt;

/// Size of a heap word in bytes. Objects are allocated in whole words.
pub const HEAP_WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Bytes per kilobyte, used when printing sizes.
pub const K: usize = 1024;

/// Bytes per megabyte.
pub const M: usize = 1024 * K;

/// Returns true if `value` is a non-zero power of two.
#[inline]
pub fn is_power_of_two(value: usize) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Returns true if `value` is a multiple of `alignment`.
///
/// `alignment` must be a power of two.
#[inline]
pub fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(is_power_of_two(alignment), "alignment must be a power of two");
    value & (alignment - 1) == 0
}

/// Rounds `value` down to a multiple of `alignment`.
#[inline]
pub fn align_down(value: usize, alignment: usize) -> usize {
    debug_assert!(is_power_of_two(alignment), "alignment must be a power of two");
    value & !(alignment - 1)
}

/// Rounds `value` up to a multiple of `alignment`.
///
/// # Returns
///
/// `None` if the rounded value is not representable.
#[inline]
pub fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(is_power_of_two(alignment), "alignment must be a power of two");
    value
        .checked_add(alignment - 1)
        .map(|bumped| bumped & !(alignment - 1))
}

/// Rounds `value` up to a multiple of `alignment`.
///
/// # Panics
///
/// Panics if the result would overflow the address space.
#[inline]
pub fn align_up(value: usize, alignment: usize) -> usize {
    checked_align_up(value, alignment)
        .unwrap_or_else(|| panic!("align_up({:#x}, {:#x}) overflowed", value, alignment))
}

/// Rounds `value` up to a multiple of `alignment`, saturating at the largest
/// aligned value instead of overflowing.
#[inline]
pub fn saturating_align_up(value: usize, alignment: usize) -> usize {
    checked_align_up(value, alignment).unwrap_or_else(|| align_down(usize::MAX, alignment))
}

/// Distance in bytes from `low` up to `high`.
///
/// # Panics
///
/// Panics if `high < low`.
#[inline]
pub fn pointer_delta(high: usize, low: usize) -> usize {
    high.checked_sub(low)
        .unwrap_or_else(|| panic!("pointer_delta: {:#x} is below {:#x}", high, low))
}

/// Adds a byte offset to an address.
///
/// # Panics
///
/// Panics if the address wraps.
#[inline]
pub fn offset(addr: usize, bytes: usize) -> usize {
    addr.checked_add(bytes)
        .unwrap_or_else(|| panic!("address {:#x} + {:#x} wrapped", addr, bytes))
}

/// A half-open address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemRegion {
    start: usize,
    end: usize,
}

impl MemRegion {
    /// Creates a region from its bounds.
    ///
    /// # Panics
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "inverted region [{:#x}, {:#x})",
            start,
            end
        );
        MemRegion { start, end }
    }

    /// Creates a region of `size` bytes starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `start + size` wraps.
    pub fn with_size(start: usize, size: usize) -> Self {
        MemRegion {
            start,
            end: offset(start, size),
        }
    }

    /// An empty region at address zero.
    pub const fn empty() -> Self {
        MemRegion { start: 0, end: 0 }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn byte_size(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `addr` lies inside the region.
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Returns true if `other` lies entirely inside this region.
    pub fn contains_range(&self, other: &MemRegion) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Returns true if the two regions share at least one byte.
    pub fn intersects(&self, other: &MemRegion) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true if both bounds are multiples of `alignment`.
    pub fn is_aligned(&self, alignment: usize) -> bool {
        is_aligned(self.start, alignment) && is_aligned(self.end, alignment)
    }
}

impl fmt::Display for MemRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

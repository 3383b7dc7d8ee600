//! Contiguous spaces with bump-pointer allocation.
//!
//! A [`MutableSpace`] covers `[bottom, end)` and allocates by bumping `top`.
//! The generation re-ranges its spaces in place when it resizes; `top` and
//! the recorded objects survive a re-range that does not ask for clearing.

use std::fmt;

use crate::error::{guarantee, InvariantViolation};
use crate::mem_region::{checked_align_up, offset, pointer_delta, MemRegion, HEAP_WORD_SIZE, K};

/// Fixed identity of a space.
///
/// Roles (from/to) move between the two survivors on every swap; the
/// identity does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceId {
    Eden,
    Survivor0,
    Survivor1,
}

impl SpaceId {
    pub fn name(&self) -> &'static str {
        match self {
            SpaceId::Eden => "eden",
            SpaceId::Survivor0 => "s0",
            SpaceId::Survivor1 => "s1",
        }
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An object recorded in a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRef {
    pub addr: usize,
    pub size: usize,
}

/// A space inside the young generation.
#[derive(Debug, Clone)]
pub struct MutableSpace {
    id: SpaceId,
    /// First address of the space
    bottom: usize,
    /// High-water mark of allocated bytes
    top: usize,
    /// One past the last address of the space
    end: usize,
    /// Objects between bottom and top, in address order
    objects: Vec<ObjectRef>,
}

impl MutableSpace {
    /// Creates an empty, zero-sized space. The generation gives it a range
    /// with [`MutableSpace::initialize`].
    pub fn new(id: SpaceId) -> Self {
        MutableSpace {
            id,
            bottom: 0,
            top: 0,
            end: 0,
            objects: Vec::new(),
        }
    }

    /// Re-ranges the space over `region`.
    ///
    /// With `clear` the space becomes empty. Without it, `top` and the
    /// recorded objects are kept, and the new range must still contain them.
    ///
    /// # Panics
    ///
    /// Panics if a non-clearing re-range would cut off live data.
    pub(crate) fn initialize(&mut self, region: MemRegion, clear: bool) {
        if clear {
            self.bottom = region.start();
            self.end = region.end();
            self.clear();
        } else if self.is_empty() {
            self.bottom = region.start();
            self.top = region.start();
            self.end = region.end();
        } else {
            guarantee!(
                region.start() == self.bottom,
                "space bottom moved under live data",
                "{} re-ranged to {} with live data from {:#x}",
                self.id,
                region,
                self.bottom
            );
            guarantee!(
                self.top <= region.end(),
                "space end moved into live data",
                "{} re-ranged to {} with top {:#x}",
                self.id,
                region,
                self.top
            );
            self.end = region.end();
        }
        log::trace!(
            "{} initialized to {} (clear: {}, top {:#x})",
            self.id,
            region,
            clear,
            self.top
        );
    }

    /// Allocates `bytes`, rounded up to whole heap words.
    ///
    /// # Returns
    ///
    /// The address of the new object, or `None` if the space is full.
    pub fn allocate(&mut self, bytes: usize) -> Option<usize> {
        let size = checked_align_up(bytes.max(1), HEAP_WORD_SIZE)?;
        if size > self.free_in_bytes() {
            return None;
        }
        let addr = self.top;
        self.top = offset(self.top, size);
        self.objects.push(ObjectRef { addr, size });
        Some(addr)
    }

    /// Empties the space. The range is unchanged.
    pub fn clear(&mut self) {
        self.top = self.bottom;
        self.objects.clear();
    }

    /// Sets the high-water mark directly.
    ///
    /// Used by collectors that fill a space wholesale (a compacted or copied
    /// block). The bytes up to `top` are recorded as one object.
    ///
    /// # Panics
    ///
    /// Panics if `top` is outside `[bottom, end]`.
    pub fn set_top(&mut self, top: usize) {
        assert!(
            top >= self.bottom && top <= self.end,
            "top {:#x} outside {} [{:#x}, {:#x}]",
            top,
            self.id,
            self.bottom,
            self.end
        );
        self.objects.clear();
        if top > self.bottom {
            self.objects.push(ObjectRef {
                addr: self.bottom,
                size: top - self.bottom,
            });
        }
        self.top = top;
    }

    pub fn id(&self) -> SpaceId {
        self.id
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// The range `[bottom, end)`.
    pub fn region(&self) -> MemRegion {
        MemRegion::new(self.bottom, self.end)
    }

    /// The occupied range `[bottom, top)`.
    pub fn used_region(&self) -> MemRegion {
        MemRegion::new(self.bottom, self.top)
    }

    pub fn capacity_in_bytes(&self) -> usize {
        pointer_delta(self.end, self.bottom)
    }

    pub fn used_in_bytes(&self) -> usize {
        pointer_delta(self.top, self.bottom)
    }

    pub fn free_in_bytes(&self) -> usize {
        pointer_delta(self.end, self.top)
    }

    pub fn capacity_in_words(&self) -> usize {
        self.capacity_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn used_in_words(&self) -> usize {
        self.used_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn free_in_words(&self) -> usize {
        self.free_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.top == self.bottom
    }

    /// Returns true if `addr` lies inside `[bottom, end)`.
    pub fn contains(&self, addr: usize) -> bool {
        self.region().contains(addr)
    }

    /// Calls `visitor` for every object in address order.
    pub fn object_iterate(&self, visitor: &mut dyn FnMut(ObjectRef)) {
        for &object in &self.objects {
            visitor(object);
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Checks that the space is well formed.
    ///
    /// `top` must lie in `[bottom, end]` and the recorded objects must tile
    /// `[bottom, top)` exactly.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        if self.bottom > self.top || self.top > self.end {
            return Err(InvariantViolation::new(
                "top outside space",
                format!(
                    "{} bottom {:#x} top {:#x} end {:#x}",
                    self.id, self.bottom, self.top, self.end
                ),
            ));
        }
        if self.objects.is_empty() {
            return Ok(());
        }
        let mut cursor = self.bottom;
        for object in &self.objects {
            if object.addr != cursor {
                return Err(InvariantViolation::new(
                    "space not walkable",
                    format!("{} expected object at {:#x}, found {:#x}", self.id, cursor, object.addr),
                ));
            }
            cursor = offset(cursor, object.size);
        }
        if cursor != self.top {
            return Err(InvariantViolation::new(
                "space not walkable",
                format!("{} objects end at {:#x}, top {:#x}", self.id, cursor, self.top),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for MutableSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let capacity = self.capacity_in_bytes();
        let percent = if capacity == 0 {
            0
        } else {
            self.used_in_bytes() * 100 / capacity
        };
        write!(
            f,
            " space {}K, {}% used [{:#x}, {:#x}, {:#x})",
            capacity / K,
            percent,
            self.bottom,
            self.top,
            self.end
        )
    }
}

//! Full-collection view of the young generation's spaces.
//!
//! During a full (non-copying) collection the young generation is compacted
//! in place by a mark-sweep collector. The generation drives the phases over
//! its spaces in a fixed order; the collector itself is supplied by the
//! caller through [`MarkSweep`] and [`CompactionManager`].

use std::fmt;

use crate::space::{MutableSpace, SpaceId};

/// The role a space plays at the time of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceRole {
    Eden,
    From,
    To,
}

impl fmt::Display for SpaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpaceRole::Eden => "eden",
            SpaceRole::From => "from",
            SpaceRole::To => "to",
        })
    }
}

/// What compaction may do with the free tail of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeSpace {
    /// Overwrite the freed tail with a debug pattern.
    Mangle,
    /// Leave every byte of the space as it is. To-space holds the mark words
    /// preserved during marking, so it is always compacted this way.
    Preserve,
}

/// The phases of a sliding mark-compact collector, per space.
pub trait MarkSweep {
    /// Computes forwarding addresses for the live objects of `space`.
    fn precompact(&mut self, role: SpaceRole, space: &mut MutableSpace, allowed_dead_ratio: usize);

    /// Rewrites the references held by the objects of `space`.
    fn adjust_pointers(&mut self, role: SpaceRole, space: &MutableSpace);

    /// Slides the live objects of `space` to their forwarding addresses.
    fn compact(&mut self, role: SpaceRole, space: &mut MutableSpace, free: FreeSpace);
}

/// The parallel compactor's per-space entry point.
pub trait CompactionManager {
    fn move_and_update(&mut self, role: SpaceRole);
}

/// Binds one space to the mark-sweep collector.
///
/// Each space has exactly one decorator. When the survivors swap roles their
/// decorators swap with them, so `space()` always names the space the
/// decorator is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSweepDecorator {
    space: SpaceId,
    allowed_dead_ratio: usize,
}

impl MarkSweepDecorator {
    pub fn new(space: SpaceId, allowed_dead_ratio: usize) -> Self {
        MarkSweepDecorator {
            space,
            allowed_dead_ratio,
        }
    }

    /// The space this decorator belongs to.
    pub fn space(&self) -> SpaceId {
        self.space
    }

    pub fn allowed_dead_ratio(&self) -> usize {
        self.allowed_dead_ratio
    }

    fn check(&self, space: &MutableSpace) {
        assert_eq!(
            self.space,
            space.id(),
            "mark-sweep decorator for {} handed {}",
            self.space,
            space.id()
        );
    }

    pub fn precompact(&self, collector: &mut dyn MarkSweep, role: SpaceRole, space: &mut MutableSpace) {
        self.check(space);
        collector.precompact(role, space, self.allowed_dead_ratio);
    }

    pub fn adjust_pointers(&self, collector: &mut dyn MarkSweep, role: SpaceRole, space: &MutableSpace) {
        self.check(space);
        collector.adjust_pointers(role, space);
    }

    pub fn compact(
        &self,
        collector: &mut dyn MarkSweep,
        role: SpaceRole,
        space: &mut MutableSpace,
        free: FreeSpace,
    ) {
        self.check(space);
        collector.compact(role, space, free);
    }
}

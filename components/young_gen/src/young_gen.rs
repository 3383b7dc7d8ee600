//! The young generation: eden plus two survivor spaces in one committed
//! range.
//!
//! The generation owns the range `[low, high)` of its virtual space and
//! divides it among three spaces. Eden is always at `low`; the two
//! survivors sit above it in either order, and their roles (from/to) swap
//! after every scavenge.
//!
//! Resizing happens between collections:
//! - [`YoungGen::resize_generation`] moves `high`, committing or
//!   decommitting memory at the top of the range.
//! - [`YoungGen::resize_spaces`] re-lays the spaces inside the committed
//!   range without ever moving the live data in from-space.

use std::fmt;
use std::mem;

use crate::card_table::{CardTable, SharedBarrierSet};
use crate::config::YoungGenConfig;
use crate::error::{fatal, guarantee, ConfigError, InvariantViolation, LayoutError, Result};
use crate::layout::{self, LayoutInput, SpaceLayout, SpaceOrder};
use crate::mark_sweep::{CompactionManager, FreeSpace, MarkSweep, MarkSweepDecorator, SpaceRole};
use crate::mem_region::{
    align_down, pointer_delta, saturating_align_up, MemRegion, HEAP_WORD_SIZE, K,
};
use crate::space::{MutableSpace, ObjectRef, SpaceId};
use crate::virtual_space::{BackingStore, ReservedSpace, VirtualSpace};

/// Upper bounds on space sizes for the whole reservation, reported to
/// performance counters and size policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceLimits {
    pub max_eden_size: usize,
    pub max_survivor_size: usize,
}

impl SpaceLimits {
    fn compute(config: &YoungGenConfig, reserved_size: usize, alignment: usize) -> Self {
        if config.use_adaptive_size_policy {
            // The policy may shrink the survivors down to one unit each.
            SpaceLimits {
                max_survivor_size: align_down(reserved_size / config.min_survivor_ratio, alignment)
                    .max(alignment),
                max_eden_size: reserved_size - 2 * alignment,
            }
        } else {
            let max_survivor_size =
                align_down(reserved_size / config.initial_survivor_ratio, alignment).max(alignment);
            SpaceLimits {
                max_survivor_size,
                max_eden_size: reserved_size - 2 * max_survivor_size,
            }
        }
    }
}

/// What [`YoungGen::resize_generation`] did to the committed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationChange {
    Grew(usize),
    /// `realized` is what the shrink limit allowed out of `requested`.
    Shrunk { requested: usize, realized: usize },
    /// A shrink was wanted but nothing could be given back.
    ShrinkBlocked { requested: usize },
    Unchanged,
}

impl GenerationChange {
    /// True if the committed range moved.
    pub fn changed(&self) -> bool {
        matches!(self, GenerationChange::Grew(_) | GenerationChange::Shrunk { .. })
    }
}

/// What [`YoungGen::resize_spaces`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacesOutcome {
    /// New boundaries were computed and applied.
    Relaid,
    /// The spaces already had the requested sizes.
    AlreadySized,
    /// Eden or to-space held objects; nothing was touched.
    SkippedNotEmpty,
}

/// Summary of one [`YoungGen::resize`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub committed_before: usize,
    pub committed_after: usize,
    pub generation: GenerationChange,
    pub spaces: SpacesOutcome,
}

/// The young generation of a generational heap.
///
/// All operations take `&mut self`; the caller provides the exclusion a
/// stop-the-world pause gives.
pub struct YoungGen<V: BackingStore = VirtualSpace> {
    config: YoungGenConfig,
    virtual_space: V,
    /// Whole reservation of the generation
    reserved: MemRegion,
    barrier_set: SharedBarrierSet,
    eden_space: MutableSpace,
    from_space: MutableSpace,
    to_space: MutableSpace,
    eden_mark_sweep: MarkSweepDecorator,
    from_mark_sweep: MarkSweepDecorator,
    to_mark_sweep: MarkSweepDecorator,
    limits: SpaceLimits,
}

impl YoungGen<VirtualSpace> {
    /// Reserves `config.max_size` bytes at `base` and builds a generation
    /// covered by a fresh card table.
    ///
    /// # Returns
    ///
    /// The generation together with the card table it reports to.
    pub fn reserve(
        config: YoungGenConfig,
        base: usize,
    ) -> Result<(Self, std::sync::Arc<parking_lot::Mutex<CardTable>>)> {
        config.validate()?;
        let reserved = ReservedSpace::new(base, config.max_size, config.alignment)?;
        let card_table = CardTable::with_default_card_size().into_shared();
        let barrier_set: SharedBarrierSet = card_table.clone();
        let young_gen = YoungGen::new(config, VirtualSpace::new(reserved), barrier_set)?;
        Ok((young_gen, card_table))
    }
}

impl<V: BackingStore> YoungGen<V> {
    /// Builds the generation over `virtual_space`.
    ///
    /// Commits `config.initial_size` bytes, makes the barrier cover them and
    /// lays out eden, to-space and from-space in that order.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::InvalidConfig`] if the configuration does not
    ///   validate or does not fit the reservation.
    /// - [`LayoutError::InvalidReservation`] if the virtual space already
    ///   has memory committed or a different alignment.
    /// - [`LayoutError::InitialCommitFailed`] if the initial size cannot be
    ///   committed.
    pub fn new(config: YoungGenConfig, mut virtual_space: V, barrier_set: SharedBarrierSet) -> Result<Self> {
        config.validate()?;

        let reserved = virtual_space.reserved_region();
        let alignment = virtual_space.alignment();
        let invalid = |reason| LayoutError::InvalidReservation {
            base: reserved.start(),
            size: reserved.byte_size(),
            alignment,
            reason,
        };
        if alignment != config.alignment {
            return Err(invalid("alignment differs from the configured alignment"));
        }
        if virtual_space.committed_size() != 0 {
            return Err(invalid("memory is already committed"));
        }
        if config.max_size > reserved.byte_size() {
            return Err(ConfigError::ExceedsReservation {
                max: config.max_size,
                reserved: reserved.byte_size(),
            }
            .into());
        }

        if !virtual_space.expand_by(config.initial_size) {
            log::error!(
                "could not reserve enough space for the young generation ({} bytes)",
                config.initial_size
            );
            return Err(LayoutError::InitialCommitFailed {
                requested: config.initial_size,
                reserved: reserved.byte_size(),
            });
        }

        let committed = virtual_space.committed_region();
        barrier_set.lock().resize_covered_region(committed);

        let limits = SpaceLimits::compute(&config, virtual_space.reserved_size(), alignment);
        let dead_ratio = config.mark_sweep_dead_ratio;
        let mut young_gen = YoungGen {
            virtual_space,
            reserved,
            barrier_set,
            eden_space: MutableSpace::new(SpaceId::Eden),
            from_space: MutableSpace::new(SpaceId::Survivor0),
            to_space: MutableSpace::new(SpaceId::Survivor1),
            eden_mark_sweep: MarkSweepDecorator::new(SpaceId::Eden, dead_ratio),
            from_mark_sweep: MarkSweepDecorator::new(SpaceId::Survivor0, dead_ratio),
            to_mark_sweep: MarkSweepDecorator::new(SpaceId::Survivor1, dead_ratio),
            limits,
            config,
        };
        young_gen.compute_initial_space_boundaries();
        log::info!(
            "young generation initialized: committed {}K of {}K reserved at {}",
            young_gen.virtual_space.committed_size() / K,
            young_gen.reserved.byte_size() / K,
            young_gen.reserved
        );
        Ok(young_gen)
    }

    fn compute_initial_space_boundaries(&mut self) {
        let alignment = self.alignment();
        let committed_size = self.virtual_space.committed_size();
        let survivor_size =
            layout::initial_survivor_size(committed_size, alignment, self.config.survivor_ratio());
        let eden_size = committed_size - 2 * survivor_size;
        self.set_space_boundaries(eden_size, survivor_size);
        self.space_invariants();
    }

    fn set_space_boundaries(&mut self, eden_size: usize, survivor_size: usize) {
        let plan = layout::initial_layout(self.virtual_space.committed_region(), eden_size, survivor_size);
        self.eden_space.initialize(plan.eden, true);
        self.to_space.initialize(plan.to, true);
        self.from_space.initialize(plan.from, true);
        log::debug!(
            "space boundaries: eden {} to {} from {}",
            plan.eden,
            plan.to,
            plan.from
        );
    }

    /// Resizes the generation and then its spaces to the requested eden and
    /// survivor sizes.
    ///
    /// Requested sizes are aligned up to the space alignment and never
    /// taken as less than one unit.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ExpansionFailed`] if more memory was needed
    /// and could not be committed. Nothing is changed in that case.
    pub fn resize(&mut self, eden_size: usize, survivor_size: usize) -> Result<ResizeOutcome> {
        let committed_before = self.virtual_space.committed_size();
        let generation = self.resize_generation(eden_size, survivor_size)?;
        let spaces = self.resize_spaces(eden_size, survivor_size);
        self.space_invariants();

        let outcome = ResizeOutcome {
            committed_before,
            committed_after: self.virtual_space.committed_size(),
            generation,
            spaces,
        };
        log::debug!(
            "young generation size: desired eden {} survivor {}, capacity {} eden {} survivor {} ({:?}, {:?})",
            eden_size,
            survivor_size,
            self.capacity_in_bytes(),
            self.eden_space.capacity_in_bytes(),
            self.from_space.capacity_in_bytes(),
            outcome.generation,
            outcome.spaces
        );
        Ok(outcome)
    }

    /// Grows or shrinks the committed range toward
    /// `eden_size + 2 * survivor_size`, clamped to the generation's size
    /// bounds. Shrinking is further limited by [`YoungGen::limit_gen_shrink`].
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ExpansionFailed`] if the virtual space refuses
    /// to grow. The committed range is unchanged in that case.
    pub fn resize_generation(&mut self, eden_size: usize, survivor_size: usize) -> Result<GenerationChange> {
        let alignment = self.alignment();
        let orig_size = self.virtual_space.committed_size();
        debug_assert!(
            orig_size >= self.min_gen_size() && orig_size <= self.max_size(),
            "committed size {} outside [{}, {}]",
            orig_size,
            self.min_gen_size(),
            self.max_size()
        );

        let eden_plus_survivors = saturating_align_up(
            eden_size.saturating_add(survivor_size.saturating_mul(2)),
            alignment,
        );
        let desired_size = layout::desired_generation_size(
            eden_size,
            survivor_size,
            alignment,
            self.min_gen_size(),
            self.max_size(),
        );

        let change = if desired_size > orig_size {
            let change = desired_size - orig_size;
            if !self.virtual_space.expand_by(change) {
                log::warn!(
                    "young generation expansion by {} bytes failed at {} committed",
                    change,
                    orig_size
                );
                return Err(LayoutError::ExpansionFailed {
                    requested: change,
                    committed: orig_size,
                });
            }
            GenerationChange::Grew(change)
        } else if desired_size < orig_size {
            let desired_change = orig_size - desired_size;
            let change = self.limit_gen_shrink(desired_change);
            if change > 0 {
                self.virtual_space.shrink_by(change);
                self.reset_survivors_after_shrink();
                GenerationChange::Shrunk {
                    requested: desired_change,
                    realized: change,
                }
            } else {
                GenerationChange::ShrinkBlocked {
                    requested: desired_change,
                }
            }
        } else {
            if orig_size == self.max_size() {
                log::debug!("young generation size at maximum: {}K", orig_size / K);
            } else if orig_size == self.min_gen_size() {
                log::debug!("young generation size at minimum: {}K", orig_size / K);
            }
            GenerationChange::Unchanged
        };

        if change.changed() {
            self.post_resize();
            log::info!(
                "young generation size changed: {}K->{}K",
                orig_size / K,
                self.virtual_space.committed_size() / K
            );
        }

        let committed = self.virtual_space.committed_size();
        guarantee!(
            eden_plus_survivors <= committed || committed == self.max_size(),
            "generation size sanity",
            "eden_plus_survivors {} committed {} max {}",
            eden_plus_survivors,
            committed,
            self.max_size()
        );
        Ok(change)
    }

    /// How far the generation can shrink before reaching its minimum size.
    pub fn available_to_min_gen(&self) -> usize {
        let committed = self.virtual_space.committed_size();
        guarantee!(
            committed >= self.min_gen_size(),
            "committed below minimum",
            "committed {} min {}",
            committed,
            self.min_gen_size()
        );
        committed - self.min_gen_size()
    }

    /// True if from-space is the survivor ending closest to `high`.
    fn from_is_outer_survivor(&self) -> bool {
        self.from_space.end() > self.to_space.end()
    }

    fn outer_survivor(&self) -> &MutableSpace {
        if self.from_is_outer_survivor() {
            &self.from_space
        } else {
            &self.to_space
        }
    }

    /// Bytes that can be decommitted from the top without touching live
    /// data: the committed tail above the outer survivor plus the free part
    /// of that survivor. An empty survivor still keeps one unit.
    pub fn available_to_live(&self) -> usize {
        let alignment = self.alignment();
        let high = self.virtual_space.high();
        let space_shrinking = self.outer_survivor();

        guarantee!(
            high >= space_shrinking.end(),
            "survivor space beyond high end",
            "{} ends at {:#x}, high {:#x}",
            space_shrinking.id(),
            space_shrinking.end(),
            high
        );
        let unused_committed = pointer_delta(high, space_shrinking.end());

        let delta_in_survivor = if space_shrinking.is_empty() {
            let capacity = space_shrinking.capacity_in_bytes();
            guarantee!(
                capacity >= alignment,
                "survivor space too small",
                "{} capacity {} alignment {}",
                space_shrinking.id(),
                capacity,
                alignment
            );
            capacity - alignment
        } else {
            space_shrinking.free_in_bytes()
        };

        align_down(unused_committed + delta_in_survivor, alignment)
    }

    /// Limits a shrink request to what both the minimum size and the live
    /// data allow, aligned down.
    ///
    /// # Returns
    ///
    /// The number of bytes that can actually be decommitted; may be zero.
    pub fn limit_gen_shrink(&self, bytes: usize) -> usize {
        let alignment = self.alignment();
        let available_to_min_gen = self.available_to_min_gen();
        let available_to_live = self.available_to_live();
        let result = align_down(
            bytes.min(available_to_min_gen).min(available_to_live),
            alignment,
        );
        log::trace!(
            "limit_gen_shrink: requested {} min_gen {} live {} -> {}",
            bytes,
            available_to_min_gen,
            available_to_live,
            result
        );
        result
    }

    /// Pulls the outer survivor's end back to the new `high` after a
    /// decommit and refreshes the reserved-range bookkeeping.
    pub fn reset_survivors_after_shrink(&mut self) {
        self.reserved = self.virtual_space.reserved_region();
        let new_end = self.virtual_space.high();
        let space_shrinking = if self.from_is_outer_survivor() {
            &mut self.from_space
        } else {
            &mut self.to_space
        };

        guarantee!(
            new_end >= space_shrinking.bottom(),
            "shrink was too large",
            "high {:#x} below {} bottom {:#x}",
            new_end,
            space_shrinking.id(),
            space_shrinking.bottom()
        );
        if new_end < space_shrinking.end() {
            guarantee!(
                new_end >= space_shrinking.top(),
                "shrink cut into live data",
                "high {:#x} below {} top {:#x}",
                new_end,
                space_shrinking.id(),
                space_shrinking.top()
            );
            let region = MemRegion::new(space_shrinking.bottom(), new_end);
            space_shrinking.initialize(region, false);
        }
    }

    /// Work after the committed range changed: the barrier follows the new
    /// range and the layout is checked.
    pub fn post_resize(&mut self) {
        guarantee!(
            self.eden_space.bottom() < self.to_space.bottom()
                && self.eden_space.bottom() < self.from_space.bottom(),
            "eden not below survivors",
            "eden {:#x} from {:#x} to {:#x}",
            self.eden_space.bottom(),
            self.from_space.bottom(),
            self.to_space.bottom()
        );
        let committed = self.virtual_space.committed_region();
        self.barrier_set.lock().resize_covered_region(committed);
        self.space_invariants();
    }

    /// Re-lays the spaces inside the committed range.
    ///
    /// Does nothing unless eden and to-space are both empty. From-space
    /// keeps its bottom and never ends below its top; eden takes at most
    /// the requested size, or all the room it has while the generation is
    /// at its minimum size.
    pub fn resize_spaces(&mut self, requested_eden_size: usize, requested_survivor_size: usize) -> SpacesOutcome {
        let alignment = self.alignment();
        let eden_size = layout::normalize_request(requested_eden_size, alignment);
        let survivor_size = layout::normalize_request(requested_survivor_size, alignment);

        if !self.eden_space.is_empty() || !self.to_space.is_empty() {
            log::debug!(
                "resize_spaces skipped: eden used {} to used {}",
                self.eden_space.used_in_bytes(),
                self.to_space.used_in_bytes()
            );
            return SpacesOutcome::SkippedNotEmpty;
        }

        log::debug!(
            "resize_spaces(requested_eden_size: {}, requested_survivor_size: {})",
            eden_size,
            survivor_size
        );
        log::trace!(
            "    eden: {}  from: {} (top {:#x})  to: {}",
            self.eden_space.region(),
            self.from_space.region(),
            self.from_space.top(),
            self.to_space.region()
        );

        if requested_survivor_size == self.to_space.capacity_in_bytes()
            && requested_survivor_size == self.from_space.capacity_in_bytes()
            && requested_eden_size == self.eden_space.capacity_in_bytes()
        {
            log::trace!("    capacities are the right sizes, returning");
            return SpacesOutcome::AlreadySized;
        }

        // Decided on the sizes as asked for; rounding must not switch it off.
        let maintain_minimum = requested_eden_size
            .saturating_add(requested_survivor_size.saturating_mul(2))
            <= self.min_gen_size();
        let input = LayoutInput {
            committed: self.virtual_space.committed_region(),
            alignment,
            maintain_minimum,
            eden: self.eden_space.region(),
            from: self.from_space.region(),
            from_top: self.from_space.top(),
            to: self.to_space.region(),
        };
        let plan = layout::plan_space_resize(&input, eden_size, survivor_size);
        if let Err(violation) = layout::check_plan(&input, &plan) {
            fatal(violation);
        }
        self.apply_layout(&plan);

        log::debug!(
            "young generation survivor sizes: ({}, {}) -> ({}, {})",
            input.from.byte_size(),
            input.to.byte_size(),
            self.from_space.capacity_in_bytes(),
            self.to_space.capacity_in_bytes()
        );
        SpacesOutcome::Relaid
    }

    fn apply_layout(&mut self, plan: &SpaceLayout) {
        let from_top = self.from_space.top();
        self.eden_space.initialize(plan.eden, true);
        self.to_space.initialize(plan.to, true);
        self.from_space.initialize(plan.from, false);
        guarantee!(
            self.from_space.top() == from_top,
            "from top changed during resize",
            "{:#x} -> {:#x}",
            from_top,
            self.from_space.top()
        );
    }

    /// Exchanges the roles of the two survivors, together with their
    /// mark-sweep decorators.
    pub fn swap_spaces(&mut self) {
        mem::swap(&mut self.from_space, &mut self.to_space);
        mem::swap(&mut self.from_mark_sweep, &mut self.to_mark_sweep);
        debug_assert_eq!(self.from_mark_sweep.space(), self.from_space.id());
        debug_assert_eq!(self.to_mark_sweep.space(), self.to_space.id());
        log::trace!(
            "survivors swapped: from {} to {}",
            self.from_space.id(),
            self.to_space.id()
        );
    }

    fn free_space_mode(&self) -> FreeSpace {
        if self.config.zap_unused_heap_area {
            FreeSpace::Mangle
        } else {
            FreeSpace::Preserve
        }
    }

    /// Runs the precompact phase over eden, from-space and to-space.
    pub fn precompact(&mut self, collector: &mut dyn MarkSweep) {
        self.eden_mark_sweep
            .precompact(collector, SpaceRole::Eden, &mut self.eden_space);
        self.from_mark_sweep
            .precompact(collector, SpaceRole::From, &mut self.from_space);
        self.to_mark_sweep
            .precompact(collector, SpaceRole::To, &mut self.to_space);
    }

    /// Runs the pointer-adjust phase over eden, from-space and to-space.
    pub fn adjust_pointers(&mut self, collector: &mut dyn MarkSweep) {
        self.eden_mark_sweep
            .adjust_pointers(collector, SpaceRole::Eden, &self.eden_space);
        self.from_mark_sweep
            .adjust_pointers(collector, SpaceRole::From, &self.from_space);
        self.to_mark_sweep
            .adjust_pointers(collector, SpaceRole::To, &self.to_space);
    }

    /// Runs the compact phase over eden, from-space and to-space.
    ///
    /// To-space holds preserved mark words and is never mangled.
    pub fn compact(&mut self, collector: &mut dyn MarkSweep) {
        let mode = self.free_space_mode();
        self.eden_mark_sweep
            .compact(collector, SpaceRole::Eden, &mut self.eden_space, mode);
        self.from_mark_sweep
            .compact(collector, SpaceRole::From, &mut self.from_space, mode);
        self.to_mark_sweep
            .compact(collector, SpaceRole::To, &mut self.to_space, FreeSpace::Preserve);
    }

    /// Hands eden, from-space and to-space to the parallel compactor.
    pub fn move_and_update(&mut self, manager: &mut dyn CompactionManager) {
        manager.move_and_update(SpaceRole::Eden);
        manager.move_and_update(SpaceRole::From);
        manager.move_and_update(SpaceRole::To);
    }

    /// Visits every object in eden, from-space and to-space.
    pub fn object_iterate(&self, visitor: &mut dyn FnMut(ObjectRef)) {
        self.eden_space.object_iterate(visitor);
        self.from_space.object_iterate(visitor);
        self.to_space.object_iterate(visitor);
    }

    /// Usable capacity: eden plus from-space. To-space only receives
    /// copies during a scavenge.
    pub fn capacity_in_bytes(&self) -> usize {
        self.eden_space.capacity_in_bytes() + self.from_space.capacity_in_bytes()
    }

    pub fn used_in_bytes(&self) -> usize {
        self.eden_space.used_in_bytes() + self.from_space.used_in_bytes()
    }

    pub fn free_in_bytes(&self) -> usize {
        self.eden_space.free_in_bytes() + self.from_space.free_in_bytes()
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

    /// Checks the layout invariants and aborts if one is broken.
    ///
    /// The critical checks always run; the complete pass runs when
    /// `full_verification` is configured.
    pub fn space_invariants(&self) {
        let result = self.check_critical().and_then(|()| {
            if self.config.full_verification {
                self.check_full()
            } else {
                Ok(())
            }
        });
        if let Err(violation) = result {
            fatal(violation);
        }
    }

    /// Runs every layout check plus per-space and virtual space checks.
    pub fn verify(&self) -> std::result::Result<(), InvariantViolation> {
        self.check_critical()?;
        self.check_full()?;
        self.virtual_space.verify()?;
        for space in [&self.eden_space, &self.from_space, &self.to_space] {
            space.verify()?;
        }
        Ok(())
    }

    fn check_critical(&self) -> std::result::Result<(), InvariantViolation> {
        let alignment = self.alignment();
        let eden = &self.eden_space;
        let from = &self.from_space;
        let to = &self.to_space;

        if eden.capacity_in_bytes() < alignment {
            return Err(InvariantViolation::new(
                "eden space too small",
                format!("capacity {} alignment {}", eden.capacity_in_bytes(), alignment),
            ));
        }
        for survivor in [from, to] {
            if survivor.capacity_in_bytes() < alignment {
                return Err(InvariantViolation::new(
                    "survivor space too small",
                    format!(
                        "{} capacity {} alignment {}",
                        survivor.id(),
                        survivor.capacity_in_bytes(),
                        alignment
                    ),
                ));
            }
        }
        if eden.bottom() != self.virtual_space.low() {
            return Err(InvariantViolation::new(
                "eden not at low end",
                format!("eden bottom {:#x} low {:#x}", eden.bottom(), self.virtual_space.low()),
            ));
        }
        Ok(())
    }

    fn check_full(&self) -> std::result::Result<(), InvariantViolation> {
        let alignment = self.alignment();
        let eden = &self.eden_space;
        let from = &self.from_space;
        let to = &self.to_space;

        for space in [eden, from, to] {
            if space.bottom() > space.top() || space.top() > space.end() {
                return Err(InvariantViolation::new(
                    "space boundaries out of order",
                    format!(
                        "{} bottom {:#x} top {:#x} end {:#x}",
                        space.id(),
                        space.bottom(),
                        space.top(),
                        space.end()
                    ),
                ));
            }
            if !space.region().is_aligned(alignment) {
                return Err(InvariantViolation::new(
                    "space boundary unaligned",
                    format!("{} {} alignment {:#x}", space.id(), space.region(), alignment),
                ));
            }
        }

        let low = self.virtual_space.low();
        let high = self.virtual_space.high();
        let committed = self.virtual_space.committed_region();
        for space in [eden, from, to] {
            if !committed.contains_range(&space.region()) {
                return Err(InvariantViolation::new(
                    "space outside committed range",
                    format!("{} {} committed {}", space.id(), space.region(), committed),
                ));
            }
        }

        let total = eden.capacity_in_bytes() + from.capacity_in_bytes() + to.capacity_in_bytes();
        if total > committed.byte_size() {
            return Err(InvariantViolation::new(
                "space capacities exceed committed size",
                format!(
                    "eden {} from {} to {} committed {}",
                    eden.capacity_in_bytes(),
                    from.capacity_in_bytes(),
                    to.capacity_in_bytes(),
                    committed.byte_size()
                ),
            ));
        }

        match self.order() {
            SpaceOrder::EdenFromTo => {
                if eden.end() > from.bottom() {
                    return Err(InvariantViolation::new(
                        "eden overlaps from space",
                        format!("eden end {:#x} from bottom {:#x}", eden.end(), from.bottom()),
                    ));
                }
                if from.end() > to.bottom() {
                    return Err(InvariantViolation::new(
                        "from space overlaps to space",
                        format!("from end {:#x} to bottom {:#x}", from.end(), to.bottom()),
                    ));
                }
            }
            SpaceOrder::EdenToFrom => {
                if eden.end() > to.bottom() {
                    return Err(InvariantViolation::new(
                        "eden overlaps to space",
                        format!("eden end {:#x} to bottom {:#x}", eden.end(), to.bottom()),
                    ));
                }
                if to.end() > from.bottom() {
                    return Err(InvariantViolation::new(
                        "to space overlaps from space",
                        format!("to end {:#x} from bottom {:#x}", to.end(), from.bottom()),
                    ));
                }
            }
        }

        let outer_end = from.end().max(to.end());
        if outer_end > high || low > eden.bottom() {
            return Err(InvariantViolation::new(
                "spaces outside committed range",
                format!("[{:#x}, {:#x}) committed {}", eden.bottom(), outer_end, committed),
            ));
        }
        if !self.reserved.contains_range(&committed) {
            return Err(InvariantViolation::new(
                "committed outside reservation",
                format!("committed {} reserved {}", committed, self.reserved),
            ));
        }
        Ok(())
    }

    /// Current order of the survivors above eden.
    pub fn order(&self) -> SpaceOrder {
        SpaceOrder::of(&self.from_space.region(), &self.to_space.region())
    }

    pub fn eden_space(&self) -> &MutableSpace {
        &self.eden_space
    }

    pub fn from_space(&self) -> &MutableSpace {
        &self.from_space
    }

    pub fn to_space(&self) -> &MutableSpace {
        &self.to_space
    }

    /// Eden, for allocation.
    pub fn eden_space_mut(&mut self) -> &mut MutableSpace {
        &mut self.eden_space
    }

    pub fn from_space_mut(&mut self) -> &mut MutableSpace {
        &mut self.from_space
    }

    /// To-space, for copying survivors into during a scavenge.
    pub fn to_space_mut(&mut self) -> &mut MutableSpace {
        &mut self.to_space
    }

    pub fn virtual_space(&self) -> &V {
        &self.virtual_space
    }

    pub fn config(&self) -> &YoungGenConfig {
        &self.config
    }

    pub fn alignment(&self) -> usize {
        self.virtual_space.alignment()
    }

    /// The whole reserved range.
    pub fn reserved(&self) -> MemRegion {
        self.reserved
    }

    /// The committed range `[low, high)`.
    pub fn committed(&self) -> MemRegion {
        self.virtual_space.committed_region()
    }

    /// Most the generation can ever commit.
    pub fn gen_size_limit(&self) -> usize {
        self.max_size()
    }

    pub fn min_gen_size(&self) -> usize {
        self.config.min_size
    }

    pub fn max_size(&self) -> usize {
        self.config.max_size
    }

    pub fn initial_size(&self) -> usize {
        self.config.initial_size
    }

    pub fn space_limits(&self) -> SpaceLimits {
        self.limits
    }

    pub fn name(&self) -> &'static str {
        "YoungGen"
    }

    /// One-line usage change since `prev_used`, in the form
    /// ` [YoungGen: 1024K->0K(11264K)]`.
    pub fn used_change(&self, prev_used: usize) -> String {
        format!(
            " [{}: {}K->{}K({}K)]",
            self.name(),
            prev_used / K,
            self.used_in_bytes() / K,
            self.capacity_in_bytes() / K
        )
    }
}

impl<V: BackingStore> fmt::Display for YoungGen<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            " {:<15} total {}K, used {}K [{:#x}, {:#x}, {:#x})",
            self.name(),
            self.capacity_in_bytes() / K,
            self.used_in_bytes() / K,
            self.virtual_space.low_boundary(),
            self.virtual_space.high(),
            self.virtual_space.high_boundary()
        )?;
        writeln!(f, "  eden{}", self.eden_space)?;
        writeln!(f, "  from{}", self.from_space)?;
        write!(f, "  to  {}", self.to_space)
    }
}

impl<V: BackingStore> fmt::Debug for YoungGen<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoungGen")
            .field("committed", &self.committed())
            .field("reserved", &self.reserved)
            .field("eden", &self.eden_space.region())
            .field("from", &self.from_space.region())
            .field("to", &self.to_space.region())
            .finish()
    }
}

//! Space boundary computations.
//!
//! These functions turn sizes into eden/from/to ranges. They only compute;
//! the generation applies the result to its spaces after checking it with
//! [`check_plan`].
//!
//! Arithmetic is done as "distance, then add": a size is first bounded by
//! the distance between two existing boundaries and only then added to an
//! address, so no intermediate value can run past the committed range.

use std::fmt;

use crate::error::{guarantee, InvariantViolation};
use crate::mem_region::{
    align_down, align_up, offset, pointer_delta, saturating_align_up, MemRegion,
};

/// Which survivor sits directly above eden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceOrder {
    /// `[eden][from][to]`
    EdenFromTo,
    /// `[eden][to][from]`
    EdenToFrom,
}

impl SpaceOrder {
    /// Derives the order from the two survivor ranges.
    pub fn of(from: &MemRegion, to: &MemRegion) -> Self {
        if from.start() < to.start() {
            SpaceOrder::EdenFromTo
        } else {
            SpaceOrder::EdenToFrom
        }
    }
}

impl fmt::Display for SpaceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpaceOrder::EdenFromTo => "eden, from, to",
            SpaceOrder::EdenToFrom => "eden, to, from",
        })
    }
}

/// Ranges for the three spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceLayout {
    pub eden: MemRegion,
    pub from: MemRegion,
    pub to: MemRegion,
}

impl SpaceLayout {
    pub fn order(&self) -> SpaceOrder {
        SpaceOrder::of(&self.from, &self.to)
    }
}

/// Survivor size at startup: `committed / ratio`, aligned down, never less
/// than one alignment unit.
pub fn initial_survivor_size(committed_size: usize, alignment: usize, ratio: usize) -> usize {
    align_down(committed_size / ratio, alignment).max(alignment)
}

/// Startup layout over `committed`: eden, then to, then from.
///
/// After the first swap this becomes eden, from, to, which is the order the
/// resize with live data in from-space starts from.
pub fn initial_layout(committed: MemRegion, eden_size: usize, survivor_size: usize) -> SpaceLayout {
    guarantee!(
        eden_size > 0 && survivor_size > 0,
        "initial space sizes",
        "eden {} survivor {}",
        eden_size,
        survivor_size
    );
    guarantee!(
        eden_size < committed.byte_size(),
        "initial space sizes",
        "eden {} does not fit in {}",
        eden_size,
        committed
    );

    let eden_start = committed.start();
    let to_start = offset(eden_start, eden_size);
    let from_start = offset(to_start, survivor_size);
    let from_end = offset(from_start, survivor_size);
    guarantee!(
        from_end == committed.end(),
        "initial space sizes",
        "spaces end at {:#x}, committed ends at {:#x}",
        from_end,
        committed.end()
    );

    SpaceLayout {
        eden: MemRegion::new(eden_start, to_start),
        to: MemRegion::new(to_start, from_start),
        from: MemRegion::new(from_start, from_end),
    }
}

/// Rounds a requested space size to something the layout can honor: a
/// multiple of the alignment, at least one unit.
pub fn normalize_request(size: usize, alignment: usize) -> usize {
    saturating_align_up(size.max(alignment), alignment)
}

/// Committed size wanted for `eden_size + 2 * survivor_size`, aligned up and
/// clamped to `[min_size, max_size]`.
pub fn desired_generation_size(
    eden_size: usize,
    survivor_size: usize,
    alignment: usize,
    min_size: usize,
    max_size: usize,
) -> usize {
    let eden_plus_survivors = saturating_align_up(
        eden_size.saturating_add(survivor_size.saturating_mul(2)),
        alignment,
    );
    eden_plus_survivors.min(max_size).max(min_size)
}

/// The current state a re-layout starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInput {
    /// Committed range of the generation
    pub committed: MemRegion,
    pub alignment: usize,
    /// Let eden take all the room it has, even beyond the requested size,
    /// so the generation stays at its minimum size.
    pub maintain_minimum: bool,
    pub eden: MemRegion,
    pub from: MemRegion,
    /// High-water mark of live data in from-space
    pub from_top: usize,
    pub to: MemRegion,
}

impl LayoutInput {
    pub fn order(&self) -> SpaceOrder {
        SpaceOrder::of(&self.from, &self.to)
    }
}

/// Computes new ranges for the requested sizes.
///
/// Eden and to-space are assumed empty. From-space keeps its bottom and
/// never ends below its top.
pub fn plan_space_resize(input: &LayoutInput, eden_size: usize, survivor_size: usize) -> SpaceLayout {
    match input.order() {
        SpaceOrder::EdenFromTo => plan_eden_from_to(input, eden_size, survivor_size),
        SpaceOrder::EdenToFrom => plan_eden_to_from(input, eden_size, survivor_size),
    }
}

fn plan_eden_from_to(input: &LayoutInput, eden_size: usize, survivor_size: usize) -> SpaceLayout {
    let alignment = input.alignment;
    let eden_start = input.eden.start();
    let from_start = input.from.start();

    // From-space holds live data and stays where it is, so eden can grow
    // at most up to it.
    let eden_room = pointer_delta(from_start, eden_start);
    let eden_size = if input.maintain_minimum {
        eden_room
    } else {
        eden_size.min(eden_room)
    };
    let eden_end = offset(eden_start, eden_size);

    // Best to-space ends at the committed high boundary. It may reach down
    // into from-space as long as it stays clear of the live data there.
    let to_end = input.committed.end();
    let mut to_start = to_end.saturating_sub(survivor_size);
    let mut from_end = input.from.end();

    if to_start < input.from.end() {
        let live = pointer_delta(input.from_top, from_start);
        let from_size = if live == 0 {
            alignment
        } else {
            align_up(live, alignment)
        };
        from_end = offset(from_start, from_size);
        guarantee!(
            from_end <= input.from.end(),
            "from end moved to the right",
            "from end {:#x} beyond {:#x}",
            from_end,
            input.from.end()
        );
        to_start = to_start.max(from_end);
    }

    guarantee!(
        to_start < to_end,
        "to space is zero sized",
        "to [{:#x}, {:#x})",
        to_start,
        to_end
    );

    log::debug!(
        "  eden, from, to: eden [{:#x}, {:#x}) from [{:#x}, {:#x}) to [{:#x}, {:#x})",
        eden_start,
        eden_end,
        from_start,
        from_end,
        to_start,
        to_end
    );

    SpaceLayout {
        eden: MemRegion::new(eden_start, eden_end),
        from: MemRegion::new(from_start, from_end),
        to: MemRegion::new(to_start, to_end),
    }
}

fn plan_eden_to_from(input: &LayoutInput, eden_size: usize, survivor_size: usize) -> SpaceLayout {
    let alignment = input.alignment;
    let eden_start = input.eden.start();
    let from_start = input.from.start();
    let eden_floor = offset(eden_start, alignment);

    // To-space is placed where it would sit if from-space could be resized
    // to the requested survivor size at the top, but it never runs into
    // from-space and always leaves room for one unit of eden and one of
    // to-space below from-space.
    let to_end = input
        .committed
        .end()
        .saturating_sub(survivor_size)
        .min(from_start)
        .max(offset(eden_start, 2 * alignment));
    let to_start = to_end.saturating_sub(survivor_size).max(eden_floor);

    let eden_room = pointer_delta(to_start, eden_start);
    let eden_size = if input.maintain_minimum {
        eden_room
    } else {
        eden_size.min(eden_room)
    };
    let eden_end = offset(eden_start, eden_size).max(eden_floor);
    let to_start = to_start.max(eden_end);

    log::debug!(
        "  eden, to, from: eden [{:#x}, {:#x}) to [{:#x}, {:#x}) from {}",
        eden_start,
        eden_end,
        to_start,
        to_end,
        input.from
    );

    SpaceLayout {
        eden: MemRegion::new(eden_start, eden_end),
        from: input.from,
        to: MemRegion::new(to_start, to_end),
    }
}

/// Checks a computed layout before it is applied.
///
/// From-space must keep its bottom and still cover its live data; every
/// range must be aligned, non-empty, inside the committed range, and
/// disjoint from the others.
pub fn check_plan(input: &LayoutInput, plan: &SpaceLayout) -> Result<(), InvariantViolation> {
    if plan.from.start() > input.from.start() {
        return Err(InvariantViolation::new(
            "from start moved to the right",
            format!("{:#x} -> {:#x}", input.from.start(), plan.from.start()),
        ));
    }
    if plan.from.end() < input.from_top {
        return Err(InvariantViolation::new(
            "from end moved into live data",
            format!("end {:#x} top {:#x}", plan.from.end(), input.from_top),
        ));
    }
    let spaces = [("eden", plan.eden), ("from", plan.from), ("to", plan.to)];
    for (name, region) in spaces {
        if !region.is_aligned(input.alignment) {
            return Err(InvariantViolation::new(
                "space boundary unaligned",
                format!("{} {} alignment {:#x}", name, region, input.alignment),
            ));
        }
        if region.byte_size() < input.alignment {
            return Err(InvariantViolation::new(
                "space too small",
                format!("{} {}", name, region),
            ));
        }
        if !input.committed.contains_range(&region) {
            return Err(InvariantViolation::new(
                "space outside committed range",
                format!("{} {} committed {}", name, region, input.committed),
            ));
        }
    }
    for (i, (a_name, a)) in spaces.iter().enumerate() {
        for (b_name, b) in &spaces[i + 1..] {
            if a.intersects(b) {
                return Err(InvariantViolation::new(
                    "spaces overlap",
                    format!("{} {} and {} {}", a_name, a, b_name, b),
                ));
            }
        }
    }
    Ok(())
}

//! Unit tests for growing and shrinking the committed range

use crate::support::{config, layout, region, scavenge, young_gen, young_gen_with};
use young_gen::{
    BackingStore, CardTable, GenerationChange, LayoutError, ReservedSpace, SharedBarrierSet,
    SpacesOutcome, VirtualSpace, YoungGen, YoungGenConfig, M,
};

#[test]
fn grow_commits_eden_plus_two_survivors() {
    let mut gen = young_gen();
    let outcome = gen.resize(20 * M, 2 * M).unwrap();
    assert_eq!(outcome.committed_before, 12 * M);
    assert_eq!(outcome.committed_after, 24 * M);
    assert_eq!(outcome.generation, GenerationChange::Grew(12 * M));
    assert_eq!(gen.committed(), region(0, 24));
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn grow_is_capped_at_max_size() {
    let mut gen = young_gen();
    let outcome = gen.resize(100 * M, 10 * M).unwrap();
    assert_eq!(outcome.committed_after, 32 * M);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn huge_request_does_not_overflow() {
    let mut gen = young_gen();
    gen.resize(usize::MAX, usize::MAX).unwrap();
    assert_eq!(gen.committed().byte_size(), 32 * M);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn unaligned_request_rounds_up() {
    let mut gen = young_gen();
    let outcome = gen.resize(12 * M + 1, M).unwrap();
    assert_eq!(outcome.committed_after, 15 * M);
}

#[test]
fn shrink_blocked_when_from_space_is_outermost() {
    let mut gen = young_gen();
    let outcome = gen.resize(M, M).unwrap();
    assert_eq!(
        outcome.generation,
        GenerationChange::ShrinkBlocked { requested: 8 * M }
    );
    assert_eq!(gen.committed(), region(0, 12));
}

#[test]
fn shrink_is_capped_at_min_size() {
    let mut gen = young_gen();

    // Move the survivors to eden [0,1M), from [1M,2M), to [2M,12M).
    gen.resize_spaces(M, 10 * M);
    scavenge(&mut gen, 0);
    gen.resize_spaces(M, 10 * M);
    assert_eq!(layout(&gen), (region(0, 1), region(1, 2), region(2, 12)));

    assert_eq!(gen.available_to_min_gen(), 8 * M);
    assert_eq!(gen.available_to_live(), 9 * M);
    assert_eq!(gen.limit_gen_shrink(10 * M), 8 * M);

    let outcome = gen.resize(M, M).unwrap();
    assert_eq!(
        outcome.generation,
        GenerationChange::Shrunk {
            requested: 8 * M,
            realized: 8 * M,
        }
    );
    assert_eq!(gen.committed(), region(0, 4));
    assert!(gen.to_space().end() <= 4 * M);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn shrink_stops_at_live_data() {
    let mut gen = young_gen();
    gen.resize_spaces(M, 10 * M);
    scavenge(&mut gen, 0);
    gen.resize_spaces(M, 10 * M);
    // Survivors land in to-space [2M,12M); it becomes from-space.
    scavenge(&mut gen, 5 * M + 8);
    assert_eq!(gen.from_space().region(), region(2, 12));

    gen.resize(M, M).unwrap();
    assert_eq!(gen.committed(), region(0, 8));
    assert_eq!(gen.from_space().region(), region(2, 8));
    assert_eq!(gen.from_space().top(), 7 * M + 8);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn shrink_after_growth_gives_back_unused_tail() {
    let config = YoungGenConfig {
        initial_size: 16 * M,
        min_size: 16 * M,
        ..config()
    };
    let (mut gen, _) = young_gen_with(config);
    gen.resize(24 * M, 2 * M).unwrap();
    assert_eq!(gen.committed(), region(0, 28));
    assert_eq!(gen.limit_gen_shrink(20 * M), 12 * M);

    let outcome = gen.resize(M, M).unwrap();
    assert_eq!(outcome.committed_after, 16 * M);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn expansion_failure_leaves_layout_untouched() {
    let reserved = ReservedSpace::new(0, 32 * M, M).unwrap();
    let virtual_space = VirtualSpace::new(reserved).with_commit_limit(12 * M);
    let barrier: SharedBarrierSet = CardTable::with_default_card_size().into_shared();
    let mut gen = YoungGen::new(config(), virtual_space, barrier).unwrap();
    let before = layout(&gen);

    let err = gen.resize(20 * M, 2 * M).unwrap_err();
    assert_eq!(
        err,
        LayoutError::ExpansionFailed {
            requested: 12 * M,
            committed: 12 * M,
        }
    );
    assert_eq!(layout(&gen), before);
    assert_eq!(gen.virtual_space().committed_size(), 12 * M);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn unchanged_size_still_relays_spaces() {
    let mut gen = young_gen();
    let outcome = gen.resize(8 * M, 2 * M).unwrap();
    assert_eq!(outcome.generation, GenerationChange::Unchanged);
    assert_eq!(outcome.spaces, SpacesOutcome::Relaid);
    assert_eq!(gen.to_space().region(), region(8, 10));
}

/// Backing store that decommits one unit more than it is asked to.
struct OvershootingStore(VirtualSpace);

impl BackingStore for OvershootingStore {
    fn alignment(&self) -> usize {
        self.0.alignment()
    }

    fn low_boundary(&self) -> usize {
        self.0.low_boundary()
    }

    fn high_boundary(&self) -> usize {
        self.0.high_boundary()
    }

    fn low(&self) -> usize {
        self.0.low()
    }

    fn high(&self) -> usize {
        self.0.high()
    }

    fn expand_by(&mut self, bytes: usize) -> bool {
        self.0.expand_by(bytes)
    }

    fn shrink_by(&mut self, bytes: usize) {
        let alignment = self.0.alignment();
        self.0.shrink_by(bytes + alignment);
    }
}

#[test]
#[should_panic(expected = "shrink cut into live data")]
fn decommit_below_survivor_top_is_fatal() {
    let reserved = ReservedSpace::new(0, 32 * M, M).unwrap();
    let barrier: SharedBarrierSet = CardTable::with_default_card_size().into_shared();
    let mut gen = YoungGen::new(config(), OvershootingStore(VirtualSpace::new(reserved)), barrier).unwrap();
    gen.resize_spaces(M, 10 * M);
    scavenge_with(&mut gen, 0);
    gen.resize_spaces(M, 10 * M);
    scavenge_with(&mut gen, 5 * M + 8);
    assert_eq!(gen.from_space().region(), region(2, 12));

    // The limit allows 4M; the store takes 5M and lands below top.
    assert_eq!(gen.limit_gen_shrink(8 * M), 4 * M);
    let _ = gen.resize(M, M);
}

fn scavenge_with<V: BackingStore>(gen: &mut YoungGen<V>, survivors: usize) {
    if survivors > 0 {
        gen.to_space_mut().allocate(survivors).unwrap();
    }
    gen.eden_space_mut().clear();
    gen.from_space_mut().clear();
    gen.swap_spaces();
}

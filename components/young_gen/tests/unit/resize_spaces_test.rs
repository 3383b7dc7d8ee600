//! Unit tests for re-laying the spaces inside the committed range

use crate::support::{layout, live_from_space, region, scavenge, young_gen};
use young_gen::{SpaceOrder, SpacesOutcome, M};

#[test]
fn eden_from_to_keeps_from_space_in_place() {
    let mut gen = live_from_space();
    assert_eq!(gen.order(), SpaceOrder::EdenFromTo);

    let outcome = gen.resize_spaces(9 * M, 2 * M);
    assert_eq!(outcome, SpacesOutcome::Relaid);

    let from = gen.from_space();
    assert_eq!(from.bottom(), 8 * M);
    assert!(from.end() <= 10 * M);
    assert!(from.top() <= from.end());
    assert_eq!(from.top(), 8 * M + M / 4);
    assert_eq!(gen.eden_space().region(), region(0, 8));
    assert_eq!(gen.to_space().region(), region(10, 12));
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn eden_from_to_trims_from_space_for_larger_to_space() {
    let mut gen = live_from_space();
    gen.resize_spaces(6 * M, 3 * M);
    assert_eq!(layout(&gen), (region(0, 6), region(8, 9), region(9, 12)));
    assert_eq!(gen.from_space().object_count(), 1);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn eden_to_from_places_to_space_below_from() {
    let mut gen = young_gen();
    assert_eq!(gen.order(), SpaceOrder::EdenToFrom);
    gen.resize_spaces(6 * M, 2 * M);
    assert_eq!(layout(&gen), (region(0, 6), region(11, 12), region(8, 10)));
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn eden_never_exceeds_request_above_minimum() {
    let mut gen = young_gen();
    gen.resize_spaces(3 * M, M);
    assert_eq!(gen.eden_space().capacity_in_bytes(), 3 * M);
}

#[test]
fn eden_takes_all_room_at_minimum_size() {
    let mut gen = young_gen();
    gen.resize_spaces(M, M);
    // 1M + 2 * 1M fits in the 4M minimum: eden keeps everything below to.
    assert_eq!(gen.eden_space().region(), region(0, 10));
}

#[test]
fn unaligned_request_at_minimum_keeps_eden_room() {
    let mut gen = young_gen();
    scavenge(&mut gen, 0);
    assert_eq!(layout(&gen), (region(0, 10), region(10, 11), region(11, 12)));

    // 1.1M + 2 * 1.1M fits in the 4M minimum even though each request
    // rounds up to 2M.
    let request = M + M / 10;
    let outcome = gen.resize(request, request).unwrap();
    assert_eq!(outcome.committed_after, 12 * M);
    assert_eq!(gen.eden_space().region(), region(0, 10));
    assert!(gen.capacity_in_bytes() >= gen.min_gen_size());
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn unaligned_request_at_minimum_eden_to_from() {
    let mut gen = young_gen();
    let request = M + M / 10;
    gen.resize_spaces(request, request);
    // To-space takes the rounded 2M below from-space; eden keeps the rest.
    assert_eq!(layout(&gen), (region(0, 8), region(11, 12), region(8, 10)));
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn unaligned_request_is_never_already_sized() {
    let mut gen = young_gen();
    let outcome = gen.resize_spaces(10 * M - 1, M);
    assert_eq!(outcome, SpacesOutcome::Relaid);
    assert_eq!(layout(&gen), (region(0, 10), region(11, 12), region(10, 11)));
}

#[test]
fn skipped_when_eden_holds_objects() {
    let mut gen = young_gen();
    gen.eden_space_mut().allocate(64).unwrap();
    let before = layout(&gen);
    assert_eq!(gen.resize_spaces(4 * M, 2 * M), SpacesOutcome::SkippedNotEmpty);
    assert_eq!(layout(&gen), before);
    assert_eq!(gen.eden_space().used_in_bytes(), 64);
}

#[test]
fn skipped_when_to_space_holds_objects() {
    let mut gen = young_gen();
    gen.to_space_mut().allocate(64).unwrap();
    let before = layout(&gen);
    assert_eq!(gen.resize_spaces(4 * M, 2 * M), SpacesOutcome::SkippedNotEmpty);
    assert_eq!(layout(&gen), before);
}

#[test]
fn already_sized_is_a_no_op() {
    let mut gen = young_gen();
    assert_eq!(gen.resize_spaces(10 * M, M), SpacesOutcome::AlreadySized);
    assert_eq!(layout(&gen), (region(0, 10), region(11, 12), region(10, 11)));
}

#[test]
fn repeated_resize_is_idempotent() {
    let mut gen = young_gen();
    let first = gen.resize(8 * M, M).unwrap();
    assert_eq!(first.spaces, SpacesOutcome::Relaid);
    let after_first = layout(&gen);

    let second = gen.resize(8 * M, M).unwrap();
    assert_eq!(second.spaces, SpacesOutcome::AlreadySized);
    assert_eq!(layout(&gen), after_first);
}

#[test]
fn request_below_alignment_takes_one_unit() {
    let mut gen = young_gen();
    scavenge(&mut gen, 0);
    gen.resize_spaces(4 * M, 0);
    assert_eq!(gen.to_space().capacity_in_bytes(), M);
    assert_eq!(gen.verify(), Ok(()));
}

#[test]
fn from_space_data_survives_many_resizes() {
    let mut gen = live_from_space();
    let mut before = Vec::new();
    gen.from_space().object_iterate(&mut |obj| before.push(obj));

    for (eden, survivor) in [(2 * M, 6 * M), (7 * M, M), (M, 3 * M), (9 * M, 9 * M)] {
        gen.resize(eden, survivor).unwrap();
        let mut after = Vec::new();
        gen.from_space().object_iterate(&mut |obj| after.push(obj));
        assert_eq!(after, before);
        assert_eq!(gen.verify(), Ok(()));
    }
}

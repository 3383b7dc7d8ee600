//! Unit tests for keeping the card table in step with the committed range

use crate::support::{config, region, young_gen_with};
use young_gen::{MemRegion, M};

#[test]
fn card_table_covers_initial_commit() {
    let (_gen, cards) = young_gen_with(config());
    let cards = cards.lock();
    assert_eq!(cards.covered_regions(), vec![region(0, 12)]);
    assert_eq!(cards.num_cards(), 12 * M / cards.card_size());
}

#[test]
fn card_table_follows_growth_and_shrink() {
    let (mut gen, cards) = young_gen_with(config());
    gen.resize(20 * M, 2 * M).unwrap();
    assert_eq!(cards.lock().covered_region_at(0), Some(region(0, 24)));

    gen.resize(M, M).unwrap();
    let covered = cards.lock().covered_region_at(0);
    assert_eq!(covered, Some(gen.committed()));
    assert!(gen.committed().byte_size() < 24 * M);
}

#[test]
fn dirty_cards_survive_growth() {
    let (mut gen, cards) = young_gen_with(config());
    assert!(cards.lock().mark_dirty(4096));
    gen.resize(20 * M, 2 * M).unwrap();
    assert_eq!(cards.lock().dirty_cards(), vec![8]);
}

#[test]
fn blocked_shrink_leaves_card_table_alone() {
    let (mut gen, cards) = young_gen_with(config());
    gen.resize(M, M).unwrap();
    assert_eq!(gen.committed(), MemRegion::new(0, 12 * M));
    assert_eq!(cards.lock().covered_regions(), vec![region(0, 12)]);
}

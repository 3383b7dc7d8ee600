//! Shared fixtures: a 12M generation at address zero with 1M alignment.

use std::sync::Arc;

use parking_lot::Mutex;
use young_gen::{CardTable, MemRegion, YoungGen, YoungGenConfig, M};

pub fn config() -> YoungGenConfig {
    YoungGenConfig {
        initial_size: 12 * M,
        min_size: 4 * M,
        max_size: 32 * M,
        alignment: M,
        initial_survivor_ratio: 8,
        use_adaptive_size_policy: false,
        zap_unused_heap_area: false,
        full_verification: true,
        ..Default::default()
    }
}

pub fn young_gen_with(config: YoungGenConfig) -> (YoungGen, Arc<Mutex<CardTable>>) {
    YoungGen::reserve(config, 0).expect("young generation")
}

pub fn young_gen() -> YoungGen {
    young_gen_with(config()).0
}

pub fn region(start_m: usize, end_m: usize) -> MemRegion {
    MemRegion::new(start_m * M, end_m * M)
}

/// Ranges of eden, from-space and to-space.
pub fn layout(gen: &YoungGen) -> (MemRegion, MemRegion, MemRegion) {
    (
        gen.eden_space().region(),
        gen.from_space().region(),
        gen.to_space().region(),
    )
}

/// Simulates a scavenge: `survivors` bytes are copied into to-space, eden
/// and from-space are emptied, and the survivors swap roles.
pub fn scavenge(gen: &mut YoungGen, survivors: usize) {
    if survivors > 0 {
        gen.to_space_mut()
            .allocate(survivors)
            .expect("survivors fit in to-space");
    }
    gen.eden_space_mut().clear();
    gen.from_space_mut().clear();
    gen.swap_spaces();
}

/// Drives a fresh generation to eden [0,8M), from [8M,10M) holding 256K of
/// live data, to [11M,12M), in eden-from-to order.
pub fn live_from_space() -> YoungGen {
    let mut gen = young_gen();

    scavenge(&mut gen, 0);
    gen.resize(8 * M, 2 * M).unwrap();
    assert_eq!(layout(&gen), (region(0, 8), region(10, 11), region(11, 12)));

    scavenge(&mut gen, 0);
    gen.resize(8 * M, 2 * M).unwrap();
    assert_eq!(layout(&gen), (region(0, 8), region(11, 12), region(8, 10)));

    scavenge(&mut gen, M / 4);
    assert_eq!(gen.from_space().region(), region(8, 10));
    assert_eq!(gen.from_space().top(), 8 * M + M / 4);
    gen
}

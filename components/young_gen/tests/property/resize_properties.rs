//! Property-based tests for the young generation layout.
//!
//! Uses proptest to drive random sequences of allocation, scavenges and
//! resizes and checks the layout invariants after every step.

use proptest::prelude::*;
use young_gen::{ObjectRef, SpaceOrder, YoungGen, YoungGenConfig, M};

const K: usize = 1024;

#[derive(Debug, Clone)]
enum Op {
    /// Allocate this many bytes in eden
    Allocate(usize),
    /// Copy this percentage of eden plus from-space into to-space, then swap
    Scavenge(usize),
    /// Resize with eden and survivor sizes in bytes
    Resize(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..=512 * K).prop_map(Op::Allocate),
        (0usize..=100).prop_map(Op::Scavenge),
        (0usize..=40 * M, 0usize..=12 * M).prop_map(|(e, s)| Op::Resize(e, s)),
    ]
}

fn generation_config() -> impl Strategy<Value = YoungGenConfig> {
    (4usize..=16, 0usize..=8, any::<bool>(), 3usize..=10).prop_map(
        |(min_m, extra_m, adaptive, ratio)| YoungGenConfig {
            initial_size: (min_m + extra_m) * M,
            min_size: min_m * M,
            max_size: 32 * M,
            alignment: M,
            initial_survivor_ratio: ratio,
            min_survivor_ratio: 3,
            use_adaptive_size_policy: adaptive,
            zap_unused_heap_area: false,
            mark_sweep_dead_ratio: 5,
            full_verification: true,
        },
    )
}

fn from_objects(gen: &YoungGen) -> Vec<ObjectRef> {
    let mut objects = Vec::new();
    gen.from_space().object_iterate(&mut |obj| objects.push(obj));
    objects
}

fn scavenge(gen: &mut YoungGen, percent: usize) {
    let live = (gen.used_in_bytes() * percent / 100).min(gen.to_space().free_in_bytes());
    if live > 0 {
        gen.to_space_mut().allocate(live);
    }
    gen.eden_space_mut().clear();
    gen.from_space_mut().clear();
    gen.swap_spaces();
}

fn check_layout(gen: &YoungGen) -> Result<(), TestCaseError> {
    prop_assert_eq!(gen.verify(), Ok(()));
    let committed = gen.committed();
    prop_assert_eq!(gen.eden_space().bottom(), committed.start());
    prop_assert!(committed.byte_size() >= gen.min_gen_size());
    prop_assert!(committed.byte_size() <= gen.max_size());
    let (lower, upper) = match gen.order() {
        SpaceOrder::EdenFromTo => (gen.from_space(), gen.to_space()),
        SpaceOrder::EdenToFrom => (gen.to_space(), gen.from_space()),
    };
    prop_assert!(gen.eden_space().end() <= lower.bottom());
    prop_assert!(lower.end() <= upper.bottom());
    prop_assert!(upper.end() <= committed.end());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every reachable layout satisfies the invariants
    #[test]
    fn layout_invariants_hold(config in generation_config(), ops in prop::collection::vec(op(), 1..40)) {
        let (mut gen, _cards) = YoungGen::reserve(config, 0).unwrap();
        check_layout(&gen)?;
        for op in ops {
            match op {
                Op::Allocate(bytes) => {
                    gen.eden_space_mut().allocate(bytes);
                }
                Op::Scavenge(percent) => scavenge(&mut gen, percent),
                Op::Resize(eden, survivor) => {
                    gen.resize(eden, survivor).unwrap();
                }
            }
            check_layout(&gen)?;
        }
    }

    /// Resizing never moves or drops live data in from-space
    #[test]
    fn resize_preserves_from_space(
        config in generation_config(),
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let (mut gen, _cards) = YoungGen::reserve(config, 0).unwrap();
        for op in ops {
            match op {
                Op::Allocate(bytes) => {
                    gen.eden_space_mut().allocate(bytes);
                }
                Op::Scavenge(percent) => scavenge(&mut gen, percent),
                Op::Resize(eden, survivor) => {
                    let bottom = gen.from_space().bottom();
                    let top = gen.from_space().top();
                    let before = from_objects(&gen);
                    gen.resize(eden, survivor).unwrap();
                    prop_assert_eq!(gen.from_space().bottom(), bottom);
                    prop_assert_eq!(gen.from_space().top(), top);
                    prop_assert!(gen.from_space().end() >= top);
                    prop_assert_eq!(from_objects(&gen), before);
                }
            }
        }
    }

    /// A shrink never gives back more than was asked for, nor more than
    /// the minimum size allows
    #[test]
    fn shrink_is_bounded(config in generation_config(), eden in 0usize..=8 * M, survivor in 0usize..=2 * M) {
        let (mut gen, _cards) = YoungGen::reserve(config, 0).unwrap();
        gen.resize(24 * M, M).unwrap();
        scavenge(&mut gen, 0);
        let before = gen.committed().byte_size();
        let limit = gen.limit_gen_shrink(usize::MAX);
        prop_assert!(limit <= gen.available_to_min_gen());
        prop_assert!(limit <= gen.available_to_live());
        prop_assert_eq!(limit % gen.alignment(), 0);

        let outcome = gen.resize(eden, survivor).unwrap();
        prop_assert!(outcome.committed_after >= gen.min_gen_size());
        let realized = before - outcome.committed_after;
        prop_assert!(realized <= limit);
        prop_assert_eq!(realized % gen.alignment(), 0);
        check_layout(&gen)?;
    }

    /// Re-laying the spaces the same way twice changes nothing the second time
    #[test]
    fn resize_spaces_is_idempotent(config in generation_config(), eden in 0usize..=30 * M, survivor in 0usize..=8 * M) {
        let (mut gen, _cards) = YoungGen::reserve(config, 0).unwrap();
        gen.resize_generation(eden, survivor).unwrap();
        gen.resize_spaces(eden, survivor);
        let layout = (gen.eden_space().region(), gen.from_space().region(), gen.to_space().region());

        gen.resize_spaces(eden, survivor);
        prop_assert_eq!(
            (gen.eden_space().region(), gen.from_space().region(), gen.to_space().region()),
            layout
        );
        check_layout(&gen)?;
    }
}

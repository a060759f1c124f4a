// SPDX-License-Identifier: Apache-2.0

//! Property checks on randomly generated networks: both passes must preserve
//! the function at every primary output, keep the store invariants intact,
//! and meet their respective post-conditions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_case::test_case;

use miginv::summary::{complement_count, complement_count_internal};
use miginv::test_utils::assert_same_function;
use miginv::{
    mig_inv_minimization, mig_inv_propagation, InvMinimizationParams, InvMinimizationStats,
    InvPropagationParams, InvPropagationStats, Mig, MigSignal,
};

fn pick(rng: &mut StdRng, signals: &[MigSignal]) -> MigSignal {
    let s = signals[rng.gen_range(0..signals.len())];
    if rng.gen_bool(0.5) {
        s.negate()
    } else {
        s
    }
}

/// Builds a network of `num_gates` majority gates over random fan-ins with
/// random complements. Every gate that ends up without a consumer becomes a
/// primary output, so the whole network is reachable from the outputs; a few
/// extra outputs exercise duplicate entries.
fn gen_random_network(seed: u64, num_pis: usize, num_gates: usize) -> Mig {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mig = Mig::new();
    let mut signals: Vec<MigSignal> = Vec::new();
    signals.push(mig.get_constant(false));
    for _ in 0..num_pis {
        let pi = mig.create_pi();
        signals.push(pi);
    }
    for _ in 0..num_gates {
        let a = pick(&mut rng, &signals);
        let b = pick(&mut rng, &signals);
        let c = pick(&mut rng, &signals);
        let f = mig.create_maj(a, b, c);
        signals.push(f);
    }
    let unreferenced: Vec<MigSignal> = mig
        .gates()
        .filter(|&g| mig.fanout_size(g) == 0)
        .map(MigSignal::from)
        .collect();
    for s in unreferenced {
        mig.create_po(if rng.gen_bool(0.5) { s.negate() } else { s });
    }
    for _ in 0..3 {
        let s = pick(&mut rng, &signals);
        mig.create_po(s);
    }
    mig
}

#[test_case(1, 6, 20; "small")]
#[test_case(2, 7, 40; "medium")]
#[test_case(3, 8, 60; "large")]
#[test_case(4, 5, 8; "shallow")]
fn test_minimization_preserves_function(seed: u64, num_pis: usize, num_gates: usize) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mig = gen_random_network(seed, num_pis, num_gates);
    let before = mig.clone();
    let gates_before = mig.num_gates();

    let mut stats = InvMinimizationStats::default();
    mig_inv_minimization(&mut mig, &InvMinimizationParams::default(), Some(&mut stats));

    assert!(mig.num_gates() <= gates_before, "minimization added gates");
    mig.check_invariants_with_debug_assert();
    assert_same_function(&before, &mig);
}

#[test_case(11, 6, 20; "small")]
#[test_case(12, 7, 40; "medium")]
#[test_case(13, 8, 60; "large")]
#[test_case(14, 5, 8; "shallow")]
fn test_propagation_preserves_function_and_reaches_inputs(
    seed: u64,
    num_pis: usize,
    num_gates: usize,
) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mig = gen_random_network(seed, num_pis, num_gates);
    let before = mig.clone();

    mig_inv_propagation(&mut mig, &InvPropagationParams::default(), None);

    assert_eq!(
        complement_count_internal(&mig),
        0,
        "a gate-sourced edge kept its complement"
    );
    mig.check_invariants_with_debug_assert();
    assert_same_function(&before, &mig);

    // Idempotence: a second sweep finds nothing to flip.
    let count_after_first = complement_count(&mig);
    let mut stats = InvPropagationStats::default();
    mig_inv_propagation(&mut mig, &InvPropagationParams::default(), Some(&mut stats));
    assert_eq!(stats.num_inverters_removed, 0);
    assert_eq!(complement_count(&mig), count_after_first);
}

#[test_case(21, 6, 24; "small")]
#[test_case(22, 8, 48; "large")]
fn test_minimization_then_propagation(seed: u64, num_pis: usize, num_gates: usize) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut mig = gen_random_network(seed, num_pis, num_gates);
    let before = mig.clone();

    mig_inv_minimization(&mut mig, &InvMinimizationParams::default(), None);
    mig_inv_propagation(&mut mig, &InvPropagationParams::default(), None);

    assert_eq!(complement_count_internal(&mig), 0);
    mig.check_invariants_with_debug_assert();
    assert_same_function(&before, &mig);
}

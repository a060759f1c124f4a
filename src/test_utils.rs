// SPDX-License-Identifier: Apache-2.0

//! Networks and helpers shared by unit and integration tests.

use crate::eval::eval;
use crate::mig::{Mig, MigSignal};

/// The fan-out-chain network used by the minimization and propagation
/// scenarios: ten gates over five primary inputs, with heavy sharing of `f1`
/// and `f2`. Outputs are left to the caller.
pub struct ChainNetwork {
    pub mig: Mig,
    pub pis: [MigSignal; 5],
    /// Gate signals, 1-indexed so that `f[3]` is `f3`; `f[0]` is unused.
    pub f: [MigSignal; 11],
}

pub fn setup_chain_network() -> ChainNetwork {
    let mut mig = Mig::new();
    let a = mig.create_pi();
    let b = mig.create_pi();
    let c = mig.create_pi();
    let d = mig.create_pi();
    let e = mig.create_pi();
    let one = mig.get_constant(true);

    let f1 = mig.create_maj(a, b, c.negate());
    let f2 = mig.create_maj(a, b, one);
    let f3 = mig.create_maj(f1.negate(), f2, a);
    let f4 = mig.create_maj(f1.negate(), f2, b);
    let f5 = mig.create_maj(f1.negate(), f2, c);
    let f6 = mig.create_maj(f1, f2.negate(), a);
    let f7 = mig.create_maj(f4, f2.negate(), b);
    let f8 = mig.create_maj(f5, f2.negate(), c);
    let f9 = mig.create_maj(f6, f2.negate(), d);
    let f10 = mig.create_maj(f7, f2.negate(), e);

    let placeholder = mig.get_constant(false);
    ChainNetwork {
        mig,
        pis: [a, b, c, d, e],
        f: [placeholder, f1, f2, f3, f4, f5, f6, f7, f8, f9, f10],
    }
}

/// The six-gate network where only a two-level look-ahead finds a profitable
/// inversion. Outputs are left to the caller.
pub struct TwoLevelNetwork {
    pub mig: Mig,
    pub pis: [MigSignal; 5],
    /// Gate signals, 1-indexed so that `f[4]` is `f4`; `f[0]` is unused.
    pub f: [MigSignal; 7],
}

pub fn setup_two_level_network() -> TwoLevelNetwork {
    let mut mig = Mig::new();
    let a = mig.create_pi();
    let b = mig.create_pi();
    let c = mig.create_pi();
    let d = mig.create_pi();
    let e = mig.create_pi();

    let f1 = mig.create_maj(a, b, c.negate());
    let f2 = mig.create_maj(a, b, c);
    let f3 = mig.create_maj(f1.negate(), f2, a);
    let f4 = mig.create_maj(f3.negate(), b, c);
    let f5 = mig.create_maj(f1, b, a.negate());
    let f6 = mig.create_maj(f1.negate(), f2, b);

    let placeholder = mig.get_constant(false);
    TwoLevelNetwork {
        mig,
        pis: [a, b, c, d, e],
        f: [placeholder, f1, f2, f3, f4, f5, f6],
    }
}

/// Asserts that two networks with matching interfaces compute the same value
/// at every primary output for every input assignment.
pub fn assert_same_function(before: &Mig, after: &Mig) {
    assert_eq!(before.num_pis(), after.num_pis(), "input count changed");
    assert_eq!(before.num_pos(), after.num_pos(), "output count changed");
    let num_pis = before.num_pis();
    assert!(
        num_pis <= 16,
        "exhaustive comparison is limited to 16 inputs"
    );
    for bits in 0u32..(1u32 << num_pis) {
        let assignment: Vec<bool> = (0..num_pis).map(|i| (bits >> i) & 1 == 1).collect();
        assert_eq!(
            eval(before, &assignment),
            eval(after, &assignment),
            "functions differ under assignment {:?}",
            assignment
        );
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::mig::Mig;

/// Number of complemented fan-in edges on live gates plus complemented
/// primary-output entries. This is the objective inverter minimization
/// reduces.
pub fn complement_count(mig: &Mig) -> u64 {
    let mut count = 0;
    for n in mig.gates() {
        for s in mig.fanins(n).unwrap() {
            if s.negated {
                count += 1;
            }
        }
    }
    for po in mig.outputs() {
        if po.negated {
            count += 1;
        }
    }
    count
}

/// Like [`complement_count`], but ignoring edges whose source is a primary
/// input or the constant. Inverter propagation drives this to zero.
pub fn complement_count_internal(mig: &Mig) -> u64 {
    let mut count = 0;
    for n in mig.gates() {
        for s in mig.fanins(n).unwrap() {
            if s.negated && !mig.is_pi(s.node) && !mig.is_constant(s.node) {
                count += 1;
            }
        }
    }
    for po in mig.outputs() {
        if po.negated && !mig.is_pi(po.node) && !mig.is_constant(po.node) {
            count += 1;
        }
    }
    count
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SummaryStats {
    pub num_gates: usize,
    pub complement_count: u64,
}

pub fn get_summary_stats(mig: &Mig) -> SummaryStats {
    SummaryStats {
        num_gates: mig.num_gates(),
        complement_count: complement_count(mig),
    }
}

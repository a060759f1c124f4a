// SPDX-License-Identifier: Apache-2.0

//! Gain functions for inverter minimization: the net number of complemented
//! edges removed by inverting a node, at one and two levels of lookahead.

use crate::mig::{FanoutView, MigRef};

/// Net complement reduction from inverting `n` alone.
///
/// Inverting a node flips the complement of each of its fan-in edges (they
/// move with the node by self-duality), of each consumer edge, and of each
/// primary-output entry on it. Fan-ins on the constant are excluded: a
/// complement there is free to flip either way. Terminals and dead nodes
/// yield 0.
pub fn one_level(ntk: &FanoutView<'_>, n: MigRef) -> i32 {
    if ntk.is_pi(n) || ntk.is_constant(n) || ntk.is_dead(n) {
        return 0;
    }
    let mut complemented = 0i32;
    let mut plain = 0i32;
    for s in ntk.fanins(n).expect("gate expected") {
        if ntk.is_constant(s.node) {
            continue;
        }
        if s.negated {
            complemented += 1;
        } else {
            plain += 1;
        }
    }
    for consumer in ntk.fanout(n) {
        if ntk.consumes_negated(consumer, n) {
            complemented += 1;
        } else {
            plain += 1;
        }
    }
    for po in ntk.outputs() {
        if po.node == n {
            if po.negated {
                complemented += 1;
            } else {
                plain += 1;
            }
        }
    }
    complemented - plain
}

/// One-level gain of `n` plus the profitable follow-up inversions of its
/// consumers.
///
/// If `n` is inverted, the edge to each consumer flips: a consumer reached
/// through a complemented edge would then save two units fewer by inverting,
/// one reached plain two units more. Only consumers whose adjusted gain stays
/// positive are credited.
pub fn two_level(ntk: &FanoutView<'_>, n: MigRef) -> i32 {
    if ntk.is_pi(n) || ntk.is_constant(n) || ntk.is_dead(n) {
        return 0;
    }
    let mut gain = one_level(ntk, n);
    for consumer in ntk.fanout(n) {
        let mut consumer_gain = one_level(ntk, consumer);
        if ntk.consumes_negated(consumer, n) {
            consumer_gain -= 2;
        } else {
            consumer_gain += 2;
        }
        if consumer_gain > 0 {
            gain += consumer_gain;
        }
    }
    gain
}

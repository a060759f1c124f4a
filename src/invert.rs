// SPDX-License-Identifier: Apache-2.0

//! In-place node inversion by majority self-duality.
//!
//! `!M(x, y, z) = M(!x, !y, !z)`, so a node is inverted by building a new
//! majority node over its complemented fan-ins (subject to structural
//! hashing) and rewiring consumers onto the complemented result. The old node
//! is never flipped in place: consumers that are not rewired keep observing
//! it unchanged, and it is removed only once its reference count drains.

use crate::mig::{FanoutView, MigRef};

/// Replaces `n` with the self-dual form of its complement and rewires
/// consumers so the network function is preserved.
///
/// With `force_all_consumers` set, every consumer gate and every
/// primary-output entry on `n` is retargeted, so each previously complemented
/// incoming edge becomes plain and vice versa. Without it, only consumers
/// reaching `n` through a complemented edge (and complemented primary-output
/// entries) are retargeted; the rest keep the old node alive.
///
/// A rewired consumer may collapse to one of its fan-ins or alias onto an
/// existing node; such consumers are substituted network-wide before the next
/// one is processed.
///
/// Returns the node implementing the inverted function (`n` itself for
/// primary inputs and the constant, which are returned unchanged).
pub fn invert_node(ntk: &mut FanoutView<'_>, n: MigRef, force_all_consumers: bool) -> MigRef {
    if ntk.is_pi(n) || ntk.is_constant(n) {
        return n;
    }
    let [a, b, c] = *ntk.fanins(n).expect("inverting a non-majority node");
    let s_new = ntk
        .create_maj(a.negate(), b.negate(), c.negate())
        .negate();
    log::debug!(
        "invert: node {} -> {}{} (force={})",
        n.id,
        if s_new.negated { "!" } else { "" },
        s_new.node.id,
        force_all_consumers
    );

    if force_all_consumers {
        ntk.replace_in_outputs(n, s_new);
    } else {
        ntk.replace_in_complemented_outputs(n, s_new);
    }

    for consumer in ntk.fanout(n) {
        if ntk.is_dead(consumer) {
            continue;
        }
        if force_all_consumers || ntk.consumes_negated(consumer, n) {
            if let Some(sub) = ntk.replace_in_node(consumer, n, s_new) {
                log::debug!(
                    "invert: consumer {} collapsed to {}{}",
                    consumer.id,
                    if sub.negated { "!" } else { "" },
                    sub.node.id
                );
                ntk.substitute_node(consumer, sub);
            }
        }
    }

    if !ntk.is_dead(n) && ntk.fanout_size(n) == 0 {
        ntk.take_out_node(n);
    }
    // When every rewired consumer collapsed away, the replacement node ends
    // up unreferenced; drop it rather than leave an unused gate behind.
    if !ntk.is_dead(s_new.node) && ntk.fanout_size(s_new.node) == 0 {
        ntk.take_out_node(s_new.node);
    }
    s_new.node
}

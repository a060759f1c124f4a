// SPDX-License-Identifier: Apache-2.0

//! Inverter propagation: a sink-to-source sweep that drives every complement
//! towards the primary inputs. After the pass, complements survive only on
//! edges emanating from primary inputs or the constant.
//!
//! The sweep walks breadth-first from the primary outputs. Whenever a visited
//! node is reached through at least one complemented edge, it is inverted
//! with the non-forcing policy: only the complemented consumers are rewired,
//! so the complement is absorbed while plain consumers keep the old node.
//! Nodes are processed at most once per epoch; a node that gains an incoming
//! edge during rewiring (through node creation, consumer rewires, or
//! collapse substitutions) has its visited mark cleared and is queued again.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::invert::invert_node;
use crate::mig::{FanoutView, Mig, MigListener, MigRef, MigSignal};

/// Parameters for [`mig_inv_propagation`]; reserved for future knobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvPropagationParams {}

/// Statistics for [`mig_inv_propagation`].
#[derive(Debug, Default, Clone, Serialize)]
pub struct InvPropagationStats {
    /// Total runtime.
    pub time_total: Duration,
    /// Reserved invocation counter.
    pub num_calls: u64,
    /// Complemented gate-sourced edges (fan-ins and primary outputs) cleared
    /// by the sweep.
    pub num_inverters_removed: u64,
}

/// Records which nodes gained an incoming edge, so the sweep can revisit
/// them.
#[derive(Default)]
struct TouchLog {
    targets: Vec<MigRef>,
}

impl MigListener for TouchLog {
    fn on_add(&mut self, _node: MigRef, fanins: &[MigSignal; 3]) {
        self.targets.extend(fanins.iter().map(|s| s.node));
    }

    fn on_modified(&mut self, _node: MigRef, previous: &[MigSignal; 3], fanins: &[MigSignal; 3]) {
        self.targets.extend(
            fanins
                .iter()
                .filter(|s| !previous.iter().any(|p| p.node == s.node))
                .map(|s| s.node),
        );
    }

    fn on_delete(&mut self, _node: MigRef, _fanins: &[MigSignal; 3]) {}

    fn on_outputs_replaced(&mut self, _old: MigRef, new: MigSignal) {
        self.targets.push(new.node);
    }
}

/// Runs inverter propagation over `mig`.
pub fn mig_inv_propagation(
    mig: &mut Mig,
    _params: &InvPropagationParams,
    stats_out: Option<&mut InvPropagationStats>,
) {
    let start = Instant::now();
    let mut stats = InvPropagationStats::default();
    {
        let mut ntk = FanoutView::new(mig);
        let log: Rc<RefCell<TouchLog>> = Rc::new(RefCell::new(TouchLog::default()));
        let log_id = ntk.register_listener(log.clone());

        let mut queue: VecDeque<MigRef> = ntk.outputs().iter().map(|po| po.node).collect();
        let mut visited: HashSet<MigRef> = HashSet::new();
        while let Some(n) = queue.pop_front() {
            if ntk.is_constant(n) || ntk.is_pi(n) || ntk.is_dead(n) {
                continue;
            }
            if !visited.insert(n) {
                continue;
            }
            let cleared = complemented_uses(&ntk, n);
            if cleared > 0 {
                log::debug!(
                    "inv_propagation: node {} has {} complemented uses",
                    n.id,
                    cleared
                );
                stats.num_inverters_removed += u64::from(cleared);
                invert_node(&mut ntk, n, false);
                let touched: Vec<MigRef> = log.borrow_mut().targets.drain(..).collect();
                for target in touched {
                    if ntk.is_constant(target) || ntk.is_pi(target) {
                        continue;
                    }
                    visited.remove(&target);
                    queue.push_back(target);
                }
            }
            if let Some(fanins) = ntk.fanins(n) {
                for s in fanins {
                    queue.push_back(s.node);
                }
            }
        }
        ntk.unregister_listener(log_id);
    }
    stats.time_total = start.elapsed();
    if let Some(out) = stats_out {
        *out = stats;
    }
}

/// Number of complemented edges into `n`: consumer gates reaching it through
/// a complemented fan-in plus complemented primary-output entries.
fn complemented_uses(ntk: &FanoutView<'_>, n: MigRef) -> u32 {
    let mut count = 0;
    for consumer in ntk.fanout(n) {
        if ntk.consumes_negated(consumer, n) {
            count += 1;
        }
    }
    for po in ntk.outputs() {
        if po.node == n && po.negated {
            count += 1;
        }
    }
    count
}

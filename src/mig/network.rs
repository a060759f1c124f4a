// SPDX-License-Identifier: Apache-2.0

//! Majority-inverter graph storage: an arena of nodes addressed by integer
//! index, a structural-hash table that canonicalizes majority nodes by their
//! sorted fan-in triple, the primary-output table, and per-node reference
//! counts.
//!
//! Mutators keep the structure consistent on every exit: the hash table never
//! holds a dead node, reference counts always equal the number of live fan-in
//! and primary-output occurrences, and registered listeners observe every node
//! creation, fan-in rewire, and removal before the next query.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::mig::node::{MigNode, MigRef, MigSignal};

/// Observer protocol for node-pool mutations.
///
/// Listeners are invoked after the pool state has been updated, so a listener
/// may not re-enter the network; it receives everything it needs as arguments.
pub trait MigListener {
    /// A majority node was appended with the given fan-ins.
    fn on_add(&mut self, node: MigRef, fanins: &[MigSignal; 3]);
    /// A majority node's fan-ins were rewired from `previous` to `fanins`.
    fn on_modified(&mut self, node: MigRef, previous: &[MigSignal; 3], fanins: &[MigSignal; 3]);
    /// A majority node was removed from the live set; `fanins` is its final
    /// wiring.
    fn on_delete(&mut self, node: MigRef, fanins: &[MigSignal; 3]);
    /// Primary-output entries on `old` were retargeted to `new`.
    fn on_outputs_replaced(&mut self, _old: MigRef, _new: MigSignal) {}
}

#[derive(Debug, Clone)]
struct NodeEntry {
    node: MigNode,
    /// Number of live fan-in and primary-output occurrences of this node.
    refcount: u32,
    dead: bool,
}

pub struct Mig {
    nodes: Vec<NodeEntry>,
    /// Canonical fan-in triple (sorted by node index) to implementing node.
    hash: HashMap<[MigSignal; 3], MigRef>,
    outputs: Vec<MigSignal>,
    inputs: Vec<MigRef>,
    num_gates: usize,
    listeners: Vec<(usize, Rc<RefCell<dyn MigListener>>)>,
    next_listener_id: usize,
}

impl Default for Mig {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Mig {
    /// Clones the network structure; listener registrations are per-instance
    /// and do not carry over.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            hash: self.hash.clone(),
            outputs: self.outputs.clone(),
            inputs: self.inputs.clone(),
            num_gates: self.num_gates,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }
}

impl std::fmt::Debug for Mig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mig")
            .field("nodes", &self.nodes)
            .field("outputs", &self.outputs)
            .field("num_gates", &self.num_gates)
            .finish()
    }
}

impl Mig {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeEntry {
                node: MigNode::Constant,
                refcount: 0,
                dead: false,
            }],
            hash: HashMap::new(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            num_gates: 0,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn get_constant(&self, value: bool) -> MigSignal {
        MigSignal {
            node: MigRef::CONSTANT,
            negated: value,
        }
    }

    pub fn create_pi(&mut self) -> MigSignal {
        let r = MigRef {
            id: self.nodes.len(),
        };
        self.nodes.push(NodeEntry {
            node: MigNode::Input {
                index: self.inputs.len(),
            },
            refcount: 0,
            dead: false,
        });
        self.inputs.push(r);
        r.into()
    }

    pub fn create_po(&mut self, s: MigSignal) {
        debug_assert!(s.node.id < self.nodes.len());
        self.outputs.push(s);
        self.nodes[s.node.id].refcount += 1;
    }

    /// Builds `M(a, b, c)` in canonical form.
    ///
    /// The fan-ins are ordered by node index with their complement bits
    /// carried along. Two fan-ins on the same node either decide the majority
    /// (equal complements) or cancel, leaving the third; otherwise the sorted
    /// triple is looked up in the structural hash and a node is appended only
    /// on a miss. Existing nodes are never rewired by construction.
    pub fn create_maj(&mut self, a: MigSignal, b: MigSignal, c: MigSignal) -> MigSignal {
        let mut fanins = [a, b, c];
        debug_assert!(fanins.iter().all(|s| s.node.id < self.nodes.len()));
        if fanins[0].node.id > fanins[1].node.id {
            fanins.swap(0, 1);
        }
        if fanins[1].node.id > fanins[2].node.id {
            fanins.swap(1, 2);
        }
        if fanins[0].node.id > fanins[1].node.id {
            fanins.swap(0, 1);
        }
        let [a, b, c] = fanins;

        if a.node == b.node {
            return if a.negated == b.negated { a } else { c };
        }
        if b.node == c.node {
            return if b.negated == c.negated { b } else { a };
        }

        if let Some(&existing) = self.hash.get(&fanins) {
            return existing.into();
        }

        let r = MigRef {
            id: self.nodes.len(),
        };
        self.nodes.push(NodeEntry {
            node: MigNode::Maj3 { fanins },
            refcount: 0,
            dead: false,
        });
        self.hash.insert(fanins, r);
        self.num_gates += 1;
        for s in &fanins {
            self.nodes[s.node.id].refcount += 1;
        }
        self.notify_add(r, &fanins);
        r.into()
    }

    pub fn is_constant(&self, n: MigRef) -> bool {
        n == MigRef::CONSTANT
    }

    pub fn is_pi(&self, n: MigRef) -> bool {
        matches!(self.nodes[n.id].node, MigNode::Input { .. })
    }

    /// True for majority nodes, dead or alive.
    pub fn is_maj(&self, n: MigRef) -> bool {
        matches!(self.nodes[n.id].node, MigNode::Maj3 { .. })
    }

    pub fn is_dead(&self, n: MigRef) -> bool {
        self.nodes[n.id].dead
    }

    /// Current reference count of `n`: live fan-in edges plus primary-output
    /// entries targeting it.
    pub fn fanout_size(&self, n: MigRef) -> u32 {
        self.nodes[n.id].refcount
    }

    /// Fan-in signals of a majority node (including a dead one); `None` for
    /// the constant and primary inputs.
    pub fn fanins(&self, n: MigRef) -> Option<&[MigSignal; 3]> {
        match &self.nodes[n.id].node {
            MigNode::Maj3 { fanins } => Some(fanins),
            _ => None,
        }
    }

    pub fn node(&self, n: MigRef) -> &MigNode {
        &self.nodes[n.id].node
    }

    /// Pool size, dead nodes included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_gates(&self) -> usize {
        self.num_gates
    }

    pub fn num_pis(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_pos(&self) -> usize {
        self.outputs.len()
    }

    pub fn outputs(&self) -> &[MigSignal] {
        &self.outputs
    }

    /// Live majority nodes in index order.
    pub fn gates(&self) -> impl Iterator<Item = MigRef> + '_ {
        (1..self.nodes.len())
            .map(|id| MigRef { id })
            .filter(|&r| self.is_maj(r) && !self.is_dead(r))
    }

    /// True iff `m` has a fan-in on `n` with the complement bit set.
    pub fn consumes_negated(&self, m: MigRef, n: MigRef) -> bool {
        self.fanins(m)
            .map(|fanins| fanins.iter().any(|s| s.node == n && s.negated))
            .unwrap_or(false)
    }

    /// Retargets every primary-output entry on `old` to `new`, XOR-ing the
    /// complement bits and adjusting reference counts.
    pub fn replace_in_outputs(&mut self, old: MigRef, new: MigSignal) {
        self.replace_in_outputs_impl(old, new, false);
    }

    /// Like [`Mig::replace_in_outputs`], but only retargets entries whose
    /// complement bit is set.
    pub fn replace_in_complemented_outputs(&mut self, old: MigRef, new: MigSignal) {
        self.replace_in_outputs_impl(old, new, true);
    }

    fn replace_in_outputs_impl(&mut self, old: MigRef, new: MigSignal, only_negated: bool) {
        if self.is_dead(old) {
            return;
        }
        let mut replaced = false;
        for i in 0..self.outputs.len() {
            let entry = self.outputs[i];
            if entry.node != old || (only_negated && !entry.negated) {
                continue;
            }
            self.outputs[i] = MigSignal {
                node: new.node,
                negated: entry.negated ^ new.negated,
            };
            replaced = true;
            if old != new.node {
                self.nodes[new.node.id].refcount += 1;
                debug_assert!(self.nodes[old.id].refcount > 0);
                self.nodes[old.id].refcount -= 1;
            }
        }
        if replaced {
            for (_, listener) in &self.listeners {
                listener.borrow_mut().on_outputs_replaced(old, new);
            }
        }
    }

    /// Rewires `m`'s fan-ins so that the occurrence of `old` becomes
    /// `(new.node, comp ^ new.negated)` and re-canonicalizes.
    ///
    /// If the rewired triple collapses via trivial reduction, or aliases onto
    /// another live node through the structural hash, `m` is left untouched
    /// and the substitution signal is returned; the caller is expected to
    /// propagate it with [`Mig::substitute_node`]. Otherwise the rewire is
    /// committed (hash entry moved, reference counts transferred, listeners
    /// notified) and `None` is returned.
    pub fn replace_in_node(
        &mut self,
        m: MigRef,
        old: MigRef,
        new: MigSignal,
    ) -> Option<MigSignal> {
        if self.is_dead(m) {
            return None;
        }
        debug_assert!(m != old, "cannot replace a node within itself");
        debug_assert!(!self.is_dead(new.node), "rewiring onto a dead node");
        let previous = *self.fanins(m)?;
        if !previous.iter().any(|s| s.node == old) {
            return None;
        }

        let mut fanins = previous;
        for s in &mut fanins {
            if s.node == old {
                *s = MigSignal {
                    node: new.node,
                    negated: s.negated ^ new.negated,
                };
            }
        }
        if fanins[0].node.id > fanins[1].node.id {
            fanins.swap(0, 1);
        }
        if fanins[1].node.id > fanins[2].node.id {
            fanins.swap(1, 2);
        }
        if fanins[0].node.id > fanins[1].node.id {
            fanins.swap(0, 1);
        }

        // Trivial reduction on the rewired triple: m collapses to a signal.
        if fanins[0].node == fanins[1].node {
            return Some(if fanins[0].negated == fanins[1].negated {
                fanins[0]
            } else {
                fanins[2]
            });
        }
        if fanins[1].node == fanins[2].node {
            return Some(if fanins[1].negated == fanins[2].negated {
                fanins[1]
            } else {
                fanins[0]
            });
        }

        if let Some(&existing) = self.hash.get(&fanins) {
            if existing != m {
                return Some(existing.into());
            }
            // The rewire was a no-op (new aliases old with no net change).
            return None;
        }

        let removed = self.hash.remove(&previous);
        debug_assert_eq!(removed, Some(m));
        match &mut self.nodes[m.id].node {
            MigNode::Maj3 { fanins: slot } => *slot = fanins,
            _ => unreachable!(),
        }
        self.hash.insert(fanins, m);
        self.nodes[new.node.id].refcount += 1;
        debug_assert!(self.nodes[old.id].refcount > 0);
        self.nodes[old.id].refcount -= 1;
        self.notify_modified(m, &previous, &fanins);
        None
    }

    /// Replaces every live use of `m` (fan-ins and primary outputs) with the
    /// signal `s`, cascading through consumers that collapse or alias in the
    /// process.
    ///
    /// Substituted nodes are retired only after the whole cascade has been
    /// rewired: a pending substitution signal may still point at one of them,
    /// and a node that picks up a fresh reference mid-cascade (through hash
    /// aliasing) simply stays alive.
    pub fn substitute_node(&mut self, m: MigRef, s: MigSignal) {
        let mut pending = vec![(m, s)];
        let mut retired = Vec::new();
        while let Some((old, new)) = pending.pop() {
            if self.is_dead(old) {
                continue;
            }
            log::trace!(
                "substitute: node {} becomes {}{}",
                old.id,
                if new.negated { "!" } else { "" },
                new.node.id
            );
            for id in 1..self.nodes.len() {
                let consumer = MigRef { id };
                if consumer == old || !self.is_maj(consumer) || self.is_dead(consumer) {
                    continue;
                }
                if !self.fanins(consumer).unwrap().iter().any(|f| f.node == old) {
                    continue;
                }
                if let Some(sub) = self.replace_in_node(consumer, old, new) {
                    pending.push((consumer, sub));
                }
            }
            self.replace_in_outputs(old, new);
            retired.push(old);
        }
        for old in retired {
            if !self.is_dead(old) && self.fanout_size(old) == 0 {
                self.take_out_node(old);
            }
        }
    }

    /// Marks `n` dead, drops its structural-hash entry, notifies listeners,
    /// and releases its fan-ins, removing any child gate whose reference
    /// count reaches zero.
    pub fn take_out_node(&mut self, n: MigRef) {
        let mut pending = vec![n];
        while let Some(n) = pending.pop() {
            if self.is_constant(n) || self.is_pi(n) || self.is_dead(n) {
                continue;
            }
            debug_assert_eq!(self.nodes[n.id].refcount, 0, "taking out a referenced node");
            let fanins = *self.fanins(n).expect("only majority nodes are removable");
            self.nodes[n.id].dead = true;
            self.num_gates -= 1;
            let removed = self.hash.remove(&fanins);
            debug_assert_eq!(removed, Some(n));
            self.notify_delete(n, &fanins);
            for s in &fanins {
                debug_assert!(self.nodes[s.node.id].refcount > 0);
                self.nodes[s.node.id].refcount -= 1;
                if self.nodes[s.node.id].refcount == 0 && self.is_maj(s.node) {
                    pending.push(s.node);
                }
            }
        }
    }

    /// Registers a mutation listener; returns a token for unregistration.
    pub fn register_listener(&mut self, listener: Rc<RefCell<dyn MigListener>>) -> usize {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn unregister_listener(&mut self, id: usize) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify_add(&mut self, node: MigRef, fanins: &[MigSignal; 3]) {
        for (_, listener) in &self.listeners {
            listener.borrow_mut().on_add(node, fanins);
        }
    }

    fn notify_modified(&mut self, node: MigRef, previous: &[MigSignal; 3], fanins: &[MigSignal; 3]) {
        for (_, listener) in &self.listeners {
            listener.borrow_mut().on_modified(node, previous, fanins);
        }
    }

    fn notify_delete(&mut self, node: MigRef, fanins: &[MigSignal; 3]) {
        for (_, listener) in &self.listeners {
            listener.borrow_mut().on_delete(node, fanins);
        }
    }

    /// Validates canonical uniqueness, reference-count accuracy, and
    /// acyclicity in debug builds.
    pub fn check_invariants_with_debug_assert(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        // Reference counts equal live fan-in plus primary-output occurrences.
        let mut counts = vec![0u32; self.nodes.len()];
        for r in self.gates() {
            for s in self.fanins(r).unwrap() {
                assert!(!self.is_dead(s.node), "live gate {} references dead node {}", r.id, s.node.id);
                counts[s.node.id] += 1;
            }
        }
        for po in &self.outputs {
            assert!(!self.is_dead(po.node), "output references dead node {}", po.node.id);
            counts[po.node.id] += 1;
        }
        for (id, entry) in self.nodes.iter().enumerate() {
            if entry.dead {
                assert_eq!(counts[id], 0, "dead node {} is still referenced", id);
            } else {
                assert_eq!(
                    entry.refcount, counts[id],
                    "refcount mismatch on node {}",
                    id
                );
            }
        }
        // Structural-hash exactness: one entry per live gate, canonical keys.
        assert_eq!(self.hash.len(), self.num_gates);
        for r in self.gates() {
            let fanins = self.fanins(r).unwrap();
            assert!(
                fanins[0].node.id < fanins[1].node.id && fanins[1].node.id < fanins[2].node.id,
                "fan-ins of node {} are not canonical",
                r.id
            );
            assert_eq!(self.hash.get(fanins), Some(&r));
        }
        // Acyclicity.
        let mut state = vec![0u8; self.nodes.len()]; // 0 unvisited, 1 on stack, 2 done
        for root in self.gates() {
            if state[root.id] != 0 {
                continue;
            }
            let mut stack = vec![(root, 0usize)];
            state[root.id] = 1;
            while let Some(top) = stack.last_mut() {
                let (n, next) = *top;
                if next < 3 {
                    top.1 += 1;
                    let child = self.fanins(n).unwrap()[next].node;
                    if self.is_maj(child) && !self.is_dead(child) {
                        assert_ne!(state[child.id], 1, "cycle through node {}", child.id);
                        if state[child.id] == 0 {
                            state[child.id] = 1;
                            stack.push((child, 0));
                        }
                    }
                } else {
                    state[n.id] = 2;
                    stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_maj_orders_fanins() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_maj(c, a.negate(), b);
        let fanins = mig.fanins(f.node).unwrap();
        assert_eq!(fanins[0], a.negate());
        assert_eq!(fanins[1], b);
        assert_eq!(fanins[2], c);
        assert!(!f.negated);
    }

    #[test]
    fn test_create_maj_trivial_equal_pair() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        assert_eq!(mig.create_maj(a, a, b), a);
        assert_eq!(mig.create_maj(b, a, b), b);
        assert_eq!(mig.num_gates(), 0);
    }

    #[test]
    fn test_create_maj_trivial_cancelling_pair() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        assert_eq!(mig.create_maj(a, a.negate(), b), b);
        assert_eq!(mig.create_maj(b.negate(), a, b), a);
        assert_eq!(mig.num_gates(), 0);
    }

    #[test]
    fn test_create_maj_structural_hash_hit() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_maj(a, b.negate(), c);
        let g = mig.create_maj(c, a, b.negate());
        assert_eq!(f, g);
        assert_eq!(mig.num_gates(), 1);
        // A different complement pattern is a different node.
        let h = mig.create_maj(a, b, c);
        assert_ne!(f.node, h.node);
        assert_eq!(mig.num_gates(), 2);
    }

    #[test]
    fn test_refcounts_track_fanins_and_outputs() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_maj(a, b, c);
        let g = mig.create_maj(f, b.negate(), c);
        mig.create_po(g);
        mig.create_po(g.negate());
        assert_eq!(mig.fanout_size(f.node), 1);
        assert_eq!(mig.fanout_size(g.node), 2);
        assert_eq!(mig.fanout_size(b.node), 2);
        mig.check_invariants_with_debug_assert();
    }

    #[test]
    fn test_replace_in_node_commits_rewire() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let d = mig.create_pi();
        let f = mig.create_maj(a, b, c);
        let g = mig.create_maj(f.negate(), c, d);
        mig.create_po(g);
        let replacement = mig.create_maj(a, b, d);
        let result = mig.replace_in_node(g.node, f.node, replacement);
        assert!(result.is_none());
        let fanins = mig.fanins(g.node).unwrap();
        assert!(fanins.contains(&replacement.negate()));
        assert_eq!(mig.fanout_size(f.node), 0);
        assert_eq!(mig.fanout_size(replacement.node), 1);
        mig.check_invariants_with_debug_assert();
    }

    #[test]
    fn test_replace_in_node_reports_collapse() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_maj(a, b, c);
        let g = mig.create_maj(f, b.negate(), c.negate());
        mig.create_po(g);
        // Rewiring f -> b makes g's triple (b, !b, !c): the pair cancels and
        // g collapses to its remaining fan-in.
        let result = mig.replace_in_node(g.node, f.node, b);
        assert_eq!(result, Some(c.negate()));
        // The collapse is only reported; g itself is untouched.
        assert!(mig.fanins(g.node).unwrap().contains(&f));
        mig.check_invariants_with_debug_assert();
    }

    #[test]
    fn test_replace_in_node_reports_alias() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let d = mig.create_pi();
        let f1 = mig.create_maj(a, b, c);
        let f2 = mig.create_maj(a, b, d);
        let g = mig.create_maj(f1, c, d);
        let h = mig.create_maj(f2, c, d);
        mig.create_po(g);
        mig.create_po(h);
        // Retargeting h's f2 edge onto f1 makes h's triple equal to g's.
        let result = mig.replace_in_node(h.node, f2.node, f1);
        assert_eq!(result, Some(g));
        mig.check_invariants_with_debug_assert();
    }

    #[test]
    fn test_substitute_node_rewires_outputs_and_consumers() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let d = mig.create_pi();
        let f = mig.create_maj(a, b, c);
        let g = mig.create_maj(f, c, d);
        mig.create_po(g);
        mig.create_po(f.negate());
        let replacement = mig.create_maj(a, b, d);
        mig.substitute_node(f.node, replacement.negate());
        assert!(mig.is_dead(f.node));
        assert_eq!(mig.outputs()[1], replacement);
        assert!(mig
            .fanins(g.node)
            .unwrap()
            .contains(&replacement.negate()));
        mig.check_invariants_with_debug_assert();
    }

    #[test]
    fn test_take_out_node_releases_children_recursively() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_maj(a, b, c);
        let g = mig.create_maj(f, a.negate(), b);
        assert_eq!(mig.num_gates(), 2);
        // g is unreferenced; removing it drains f's only reference too.
        mig.take_out_node(g.node);
        assert!(mig.is_dead(g.node));
        assert!(mig.is_dead(f.node));
        assert_eq!(mig.num_gates(), 0);
        mig.check_invariants_with_debug_assert();
    }

    #[test]
    fn test_duplicate_outputs_on_one_node() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let c = mig.create_pi();
        let f = mig.create_maj(a, b, c);
        mig.create_po(f);
        mig.create_po(f.negate());
        mig.create_po(f);
        assert_eq!(mig.fanout_size(f.node), 3);
        let g = mig.create_maj(a, b, c.negate());
        mig.replace_in_outputs(f.node, g.negate());
        assert_eq!(mig.fanout_size(f.node), 0);
        assert_eq!(mig.fanout_size(g.node), 3);
        assert_eq!(mig.outputs()[0], g.negate());
        assert_eq!(mig.outputs()[1], g);
        assert_eq!(mig.outputs()[2], g.negate());
    }
}

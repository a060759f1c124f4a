// SPDX-License-Identifier: Apache-2.0

//! Reverse index from a node to the gates that consume it, kept current
//! across mutations by listening to the node pool's event hooks.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::mig::network::{Mig, MigListener};
use crate::mig::node::{MigRef, MigSignal};

#[derive(Debug, Default)]
struct FanoutIndex {
    fanout: Vec<Vec<MigRef>>,
}

impl FanoutIndex {
    fn build(mig: &Mig) -> Self {
        let mut index = Self {
            fanout: vec![Vec::new(); mig.node_count()],
        };
        for m in mig.gates() {
            for s in mig.fanins(m).unwrap() {
                index.insert(s.node, m);
            }
        }
        index
    }

    fn ensure_slot(&mut self, n: MigRef) {
        if n.id >= self.fanout.len() {
            self.fanout.resize_with(n.id + 1, Vec::new);
        }
    }

    fn insert(&mut self, target: MigRef, consumer: MigRef) {
        self.ensure_slot(target);
        self.fanout[target.id].push(consumer);
    }

    fn remove(&mut self, target: MigRef, consumer: MigRef) {
        self.ensure_slot(target);
        let list = &mut self.fanout[target.id];
        let position = list
            .iter()
            .position(|&m| m == consumer)
            .expect("fanout index out of sync");
        list.swap_remove(position);
    }
}

impl MigListener for FanoutIndex {
    fn on_add(&mut self, node: MigRef, fanins: &[MigSignal; 3]) {
        self.ensure_slot(node);
        for s in fanins {
            self.insert(s.node, node);
        }
    }

    fn on_modified(&mut self, node: MigRef, previous: &[MigSignal; 3], fanins: &[MigSignal; 3]) {
        for s in previous {
            self.remove(s.node, node);
        }
        for s in fanins {
            self.insert(s.node, node);
        }
    }

    fn on_delete(&mut self, node: MigRef, fanins: &[MigSignal; 3]) {
        for s in fanins {
            self.remove(s.node, node);
        }
        self.ensure_slot(node);
        debug_assert!(
            self.fanout[node.id].is_empty(),
            "removed node {} still has consumers",
            node.id
        );
        self.fanout[node.id].clear();
    }
}

/// Borrows the network together with an incrementally maintained fanout
/// index. All store operations remain available through deref; each one the
/// view forwards keeps the index consistent before the next query.
pub struct FanoutView<'a> {
    mig: &'a mut Mig,
    index: Rc<RefCell<FanoutIndex>>,
    listener_id: usize,
}

impl<'a> FanoutView<'a> {
    pub fn new(mig: &'a mut Mig) -> Self {
        let index = Rc::new(RefCell::new(FanoutIndex::build(mig)));
        let listener_id = mig.register_listener(index.clone());
        Self {
            mig,
            index,
            listener_id,
        }
    }

    /// The gates currently consuming `n`, as a snapshot that stays valid
    /// while the caller mutates the network.
    pub fn fanout(&self, n: MigRef) -> Vec<MigRef> {
        let index = self.index.borrow();
        if n.id < index.fanout.len() {
            index.fanout[n.id].clone()
        } else {
            Vec::new()
        }
    }
}

impl Deref for FanoutView<'_> {
    type Target = Mig;

    fn deref(&self) -> &Mig {
        self.mig
    }
}

impl DerefMut for FanoutView<'_> {
    fn deref_mut(&mut self) -> &mut Mig {
        self.mig
    }
}

impl Drop for FanoutView<'_> {
    fn drop(&mut self) {
        self.mig.unregister_listener(self.listener_id);
    }
}

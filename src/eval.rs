// SPDX-License-Identifier: Apache-2.0

//! Concrete evaluation of a network under a primary-input assignment.
//!
//! Node indices are not assumed to be a topological order (rewrites can point
//! a gate at a later index), so evaluation walks the fan-in cones with an
//! explicit worklist instead of a pool sweep.

use crate::mig::{Mig, MigNode, MigRef};

/// Evaluates every primary output of `mig` under `assignment`, which holds
/// one value per primary input in creation order.
pub fn eval(mig: &Mig, assignment: &[bool]) -> Vec<bool> {
    assert_eq!(
        assignment.len(),
        mig.num_pis(),
        "assignment must cover every primary input"
    );
    let mut values: Vec<Option<bool>> = vec![None; mig.node_count()];
    values[MigRef::CONSTANT.id] = Some(false);
    mig.outputs()
        .iter()
        .map(|po| eval_node(mig, po.node, assignment, &mut values) ^ po.negated)
        .collect()
}

fn eval_node(mig: &Mig, root: MigRef, assignment: &[bool], values: &mut [Option<bool>]) -> bool {
    let mut worklist = vec![root];
    while let Some(n) = worklist.pop() {
        if values[n.id].is_some() {
            continue;
        }
        match mig.node(n) {
            MigNode::Constant => {
                values[n.id] = Some(false);
            }
            MigNode::Input { index } => {
                values[n.id] = Some(assignment[*index]);
            }
            MigNode::Maj3 { fanins } => {
                let mut ready = true;
                for s in fanins {
                    if values[s.node.id].is_none() {
                        if ready {
                            worklist.push(n);
                            ready = false;
                        }
                        worklist.push(s.node);
                    }
                }
                if ready {
                    let votes = fanins
                        .iter()
                        .filter(|s| values[s.node.id].unwrap() ^ s.negated)
                        .count();
                    values[n.id] = Some(votes >= 2);
                }
            }
        }
    }
    values[root.id].unwrap()
}

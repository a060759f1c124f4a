// SPDX-License-Identifier: Apache-2.0

//! Rewriting passes over majority-inverter graphs (MIGs) that redistribute
//! and eliminate edge complements without changing the Boolean function of
//! the network.
//!
//! A MIG is a DAG whose internal nodes compute the three-input majority
//! function and whose edges carry a complement attribute. Both passes exploit
//! the self-duality of majority, `!M(x, y, z) = M(!x, !y, !z)`, and the fact
//! that complements compose by XOR along a path:
//!
//! - [`inv_minimization::mig_inv_minimization`] pushes complements through
//!   majority nodes wherever that reduces the total number of complemented
//!   edges (complemented primary outputs included).
//! - [`inv_propagation::mig_inv_propagation`] drives every complement towards
//!   the primary inputs, so that afterwards only edges emanating from primary
//!   inputs or the constant may be complemented.

pub mod eval;
pub mod gain;
pub mod inv_minimization;
pub mod inv_propagation;
pub mod invert;
pub mod mig;
pub mod summary;
pub mod test_utils;

pub use crate::inv_minimization::{
    mig_inv_minimization, InvMinimizationParams, InvMinimizationStats,
};
pub use crate::inv_propagation::{mig_inv_propagation, InvPropagationParams, InvPropagationStats};
pub use crate::mig::{FanoutView, Mig, MigListener, MigNode, MigRef, MigSignal};

// SPDX-License-Identifier: Apache-2.0

/// Index of a node in the MIG node pool.
///
/// Index 0 is reserved for the constant-zero node.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MigRef {
    pub id: usize,
}

impl MigRef {
    pub const CONSTANT: MigRef = MigRef { id: 0 };
}

/// An edge in the network: a node index plus a complement attribute.
///
/// Signals appear on every fan-in of a majority node and on every
/// primary-output entry. Complements compose by XOR along a path.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct MigSignal {
    pub node: MigRef,
    pub negated: bool,
}

impl MigSignal {
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            node: self.node,
            negated: !self.negated,
        }
    }
}

impl From<MigRef> for MigSignal {
    fn from(node: MigRef) -> Self {
        MigSignal {
            node,
            negated: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigNode {
    /// Constant zero; the constant one is its negation.
    Constant,
    Input {
        /// Ordinal of this primary input, 0 is the first one created.
        index: usize,
    },
    Maj3 {
        /// Fan-in signals, kept sorted by node index ascending.
        fanins: [MigSignal; 3],
    },
}

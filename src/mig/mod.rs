// SPDX-License-Identifier: Apache-2.0

pub mod fanout;
pub mod network;
pub mod node;

pub use crate::mig::fanout::FanoutView;
pub use crate::mig::network::{Mig, MigListener};
pub use crate::mig::node::{MigNode, MigRef, MigSignal};

//! Simulation-based combinational equivalence checking (CEC) of AIGs.
//!
//! Build (or parse) two [`Aig`]s and call [`simulation_cec`] to decide
//! whether they compute the same functions.

pub mod aig;
pub mod cec;
pub mod miter;
pub mod sim;
pub mod tt;

// Re-exporting symbols and modules.
pub use aig::{Aig, AigEdge, AigError, AigNode, AigNodeRef, NodeId, Result};
pub use cec::{CecStats, simulation_cec};

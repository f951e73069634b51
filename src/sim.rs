//! Generic node-by-node simulation of an [`Aig`].
//!
//! The engine is polymorphic over the value type it computes: a [`Simulator`]
//! supplies the three primitives (constant, primary input, negation) and
//! [`simulate`] combines AND-gate fanins with the value type's bitwise AND.
//! Simulating with `bool` values evaluates one input assignment
//! ([`BoolSimulator`]); simulating with [`TruthTable`] values evaluates many
//! assignments at once (see [`crate::cec`]).
//!
//! [`TruthTable`]: crate::tt::TruthTable

use std::{collections::HashMap, ops::BitAnd};

use crate::{Aig, AigEdge, AigError, AigNode, NodeId, Result};

/// Value provider for the three AIG primitives.
///
/// Gate semantics are not part of this trait: they belong to the engine.
pub trait Simulator<V> {
    /// The value of a constant signal.
    fn compute_constant(&self, value: bool) -> V;

    /// The value of the primary input with dense index `index`
    /// (see [`Aig::pi_index`]).
    fn compute_pi(&self, index: usize) -> V;

    /// The negation of a value.
    fn compute_not(&self, value: &V) -> V;
}

/// Evaluates a single input assignment.
///
/// Bit `k` of `assignment` is the value of the primary input with dense
/// index `k`.
#[derive(Debug, Clone, Copy)]
pub struct BoolSimulator {
    assignment: u64,
}

impl BoolSimulator {
    pub fn new(assignment: u64) -> Self {
        BoolSimulator { assignment }
    }
}

impl Simulator<bool> for BoolSimulator {
    fn compute_constant(&self, value: bool) -> bool {
        value
    }

    fn compute_pi(&self, index: usize) -> bool {
        (self.assignment >> index) & 1 == 1
    }

    fn compute_not(&self, value: &bool) -> bool {
        !value
    }
}

fn edge_value<V, S>(sim: &S, values: &HashMap<NodeId, V>, edge: &AigEdge) -> Result<V>
where
    V: Clone,
    S: Simulator<V>,
{
    let value = values
        .get(&edge.get_node_id())
        .ok_or_else(|| AigError::InvalidState(format!("node {} has no value", edge.get_node_id())))?;
    Ok(if edge.get_complement() {
        sim.compute_not(value)
    } else {
        value.clone()
    })
}

/// Simulate the whole AIG, returning one value per primary output, in output
/// order.
///
/// Every node reachable from the outputs is evaluated exactly once, in
/// dependency order. The node-value map is local to this call and dropped on
/// return.
pub fn simulate<V, S>(aig: &Aig, sim: &S) -> Result<Vec<V>>
where
    V: BitAnd<Output = V> + Clone,
    S: Simulator<V>,
{
    let pi_index = aig.pi_index();
    let mut values: HashMap<NodeId, V> = HashMap::new();

    for node in aig.get_topological_sort()? {
        let (id, value) = {
            let n = node.borrow();
            let value = match &*n {
                AigNode::False => sim.compute_constant(false),
                AigNode::Input(id) => {
                    let index = pi_index.get(id).ok_or_else(|| {
                        AigError::InvalidState(format!("input {} is not registered", id))
                    })?;
                    sim.compute_pi(*index)
                }
                AigNode::And { fanin0, fanin1, .. } => {
                    let v0 = edge_value(sim, &values, fanin0)?;
                    let v1 = edge_value(sim, &values, fanin1)?;
                    v0 & v1
                }
            };
            (n.get_id(), value)
        };
        values.insert(id, value);
    }

    aig.get_outputs()
        .iter()
        .map(|output| edge_value(sim, &values, output))
        .collect()
}

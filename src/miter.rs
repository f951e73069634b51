//! Miter construction for combinational equivalence checking.
//!
//! For background on what is a miter, please check
//! [Verification of large synthesized designs](https://doi.org/10.1109/ICCAD.1993.580110) by D. Brand.
//!
//! [`miter`] combines two AIGs over the same inputs into a single AIG whose
//! output `k` is true, for a given input assignment, exactly when the two
//! source AIGs disagree on their output `k` for that assignment. The two
//! AIGs are equivalent iff every miter output is constant false.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{Aig, AigEdge, AigError, AigNode, NodeId, Result};

/// Error returned when miter construction fails.
#[derive(Debug, Error)]
pub enum MiterError {
    /// The two AIGs have different inputs.
    /// We are just checking for the inputs id, they should correspond.
    #[error("AIGs have different inputs : {0:?} vs {1:?}")]
    DifferentInputs(HashSet<NodeId>, HashSet<NodeId>),

    /// The two AIGs have different output counts, so there is no way to pair
    /// their outputs positionally.
    #[error("AIGs have different output counts : {0} vs {1}")]
    DifferentOutputCount(usize, usize),
}

/// Import the gates of `src` into `dst` in topological order, assigning fresh
/// ids from `next_id`. Returns the mapping from `src` gate ids to `dst` ids.
/// Inputs and the constant node keep their ids and are expected to already be
/// in `dst`.
fn import_gates(dst: &mut Aig, src: &Aig, next_id: &mut NodeId) -> Result<HashMap<NodeId, NodeId>> {
    let mut map = HashMap::new();

    for node in src.get_topological_sort()? {
        let n = node.borrow();
        if let AigNode::And { id, fanin0, fanin1 } = &*n {
            let f0 = remap_edge(dst, &map, fanin0)?;
            let f1 = remap_edge(dst, &map, fanin1)?;
            dst.new_and(*next_id, f0, f1)?;
            map.insert(*id, *next_id);
            *next_id += 1;
        }
    }

    Ok(map)
}

/// Rebuild an edge of an imported AIG inside the miter.
fn remap_edge(dst: &Aig, map: &HashMap<NodeId, NodeId>, edge: &AigEdge) -> Result<AigEdge> {
    let old_id = edge.get_node_id();
    // Gates were renumbered, inputs and the constant node keep their id
    let new_id = map.get(&old_id).copied().unwrap_or(old_id);
    let node = dst
        .get_node(new_id)
        .ok_or(AigError::NodeDoesNotExist(new_id))?;
    Ok(AigEdge::new(node, edge.get_complement()))
}

/// Create the miter of two AIGs.
///
/// This will fail if:
/// - the given AIGs have different inputs (ie inputs with different ids)
/// - or they have different output counts (outputs are paired positionally:
///   output `k` of `a` against output `k` of `b`).
///
/// The resulting AIG shares the input ids of `a` and `b` one-for-one, and has
/// one output per output pair, true exactly when the pair disagrees (an XOR
/// built from three AND gates).
pub fn miter(a: &Aig, b: &Aig) -> Result<Aig> {
    if a.get_inputs_id() != b.get_inputs_id() {
        return Err(MiterError::DifferentInputs(a.get_inputs_id(), b.get_inputs_id()).into());
    }
    if a.get_outputs().len() != b.get_outputs().len() {
        return Err(
            MiterError::DifferentOutputCount(a.get_outputs().len(), b.get_outputs().len()).into(),
        );
    }

    let mut m = Aig::new();
    for id in a.get_inputs_id() {
        m.add_node(AigNode::Input(id))?;
    }

    let mut next_id = a.get_inputs_id().iter().max().copied().unwrap_or(0) + 1;
    let map_a = import_gates(&mut m, a, &mut next_id)?;
    let map_b = import_gates(&mut m, b, &mut next_id)?;

    for (out_a, out_b) in a.get_outputs().iter().zip(b.get_outputs()) {
        let ea = remap_edge(&m, &map_a, out_a)?;
        let eb = remap_edge(&m, &map_b, &out_b)?;

        // ea ^ eb = !( !(ea & !eb) & !(!ea & eb) )
        let n1 = m.new_and(next_id, ea.clone(), !eb.clone())?;
        next_id += 1;
        let n2 = m.new_and(next_id, !ea, eb)?;
        next_id += 1;
        let xor_id = next_id;
        m.new_and(xor_id, AigEdge::new(n1, true), AigEdge::new(n2, true))?;
        next_id += 1;
        m.add_output(xor_id, true)?;
    }

    m.update();
    m.check_integrity()?;

    Ok(m)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{BoolSimulator, simulate};

    fn and2(complement_out: bool) -> Aig {
        let mut aig = Aig::new();
        let i1 = aig.add_node(AigNode::Input(1)).unwrap();
        let i2 = aig.add_node(AigNode::Input(2)).unwrap();
        aig.new_and(3, AigEdge::new(i1, false), AigEdge::new(i2, false))
            .unwrap();
        aig.add_output(3, complement_out).unwrap();
        aig.update();
        aig
    }

    fn or2() -> Aig {
        // x | y = !(!x & !y)
        let mut aig = Aig::new();
        let i1 = aig.add_node(AigNode::Input(1)).unwrap();
        let i2 = aig.add_node(AigNode::Input(2)).unwrap();
        aig.new_and(3, AigEdge::new(i1, true), AigEdge::new(i2, true))
            .unwrap();
        aig.add_output(3, true).unwrap();
        aig.update();
        aig
    }

    fn miter_outputs(m: &Aig, assignment: u64) -> Vec<bool> {
        simulate(m, &BoolSimulator::new(assignment)).unwrap()
    }

    #[test]
    fn miter_different_inputs() {
        let mut a = Aig::new();
        a.add_node(AigNode::Input(1)).unwrap();
        let mut b = Aig::new();
        b.add_node(AigNode::Input(2)).unwrap();
        assert!(matches!(
            miter(&a, &b),
            Err(AigError::MiterError(MiterError::DifferentInputs(_, _)))
        ));
    }

    #[test]
    fn miter_different_output_counts() {
        let a = and2(false);
        let mut b = and2(false);
        b.add_output(3, true).unwrap();
        assert!(matches!(
            miter(&a, &b),
            Err(AigError::MiterError(MiterError::DifferentOutputCount(1, 2)))
        ));
    }

    #[test]
    fn miter_of_identical_networks_is_const0() {
        let m = miter(&and2(false), &and2(false)).unwrap();
        assert_eq!(m.num_pis(), 2);
        assert_eq!(m.get_outputs().len(), 1);
        for assignment in 0..4 {
            assert_eq!(miter_outputs(&m, assignment), vec![false]);
        }
    }

    #[test]
    fn miter_flags_disagreements() {
        // AND vs OR disagree exactly on assignments 01 and 10
        let m = miter(&and2(false), &or2()).unwrap();
        for assignment in 0..4 {
            let expected = assignment == 1 || assignment == 2;
            assert_eq!(miter_outputs(&m, assignment), vec![expected]);
        }
    }

    #[test]
    fn miter_output_polarity() {
        // Same gate, complemented output on one side: disagree everywhere
        let m = miter(&and2(false), &and2(true)).unwrap();
        for assignment in 0..4 {
            assert_eq!(miter_outputs(&m, assignment), vec![true]);
        }
    }
}

//! Simulation-based combinational equivalence checking.
//!
//! [`simulation_cec`] decides whether two AIGs compute the same functions by
//! building their miter and proving every miter output constant false by
//! exhaustive truth-table simulation.
//!
//! A truth table over all inputs would take `2^num_pis` bits per node, which
//! is infeasible beyond a handful of inputs. Instead the inputs are split:
//! the first `split_var` of them (by dense index) are encoded directly as
//! truth-table bit positions, and the remaining ones are enumerated - each
//! simulation round fixes them to one assignment, the bits of the round
//! index. Covering every round covers the full `2^num_pis` input space
//! exactly once. For memory and speed reasons the check is limited to
//! networks with up to 40 inputs, and declines (returns `None`) above that.

use log::debug;

use crate::{
    Aig, Result,
    miter::miter,
    sim::{Simulator, simulate},
    tt::TruthTable,
};

/// Statistics to be reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CecStats {
    /// Split variable (number of inputs simulated directly as truth-table bits).
    pub split_var: u32,

    /// Number of simulation rounds, ie `2^(num_pis - split_var)`.
    ///
    /// With up to 40 inputs and a split variable of at least 6, this can reach
    /// `2^34`, hence the width.
    pub rounds: u64,
}

/// Per-node truth-table memory ceiling, in bytes.
const MEMORY_CEILING: u64 = 1 << 29;

/// Number of inputs above which [`simulation_cec`] declines to answer.
const MAX_PIS: usize = 40;

/// Computes how many input variables are encoded directly in the truth tables,
/// the rest being enumerated across rounds.
///
/// Up to 6 inputs fit in a single 64-bit block, so they are all simulated in
/// one round. Beyond that, the split variable is the largest `m` such that the
/// projected table memory `32 + 2^(m-3) * num_nodes` bytes stays within
/// [`MEMORY_CEILING`], clamped to `[6, num_pis]`.
pub fn calculate_split_var(num_pis: u32, num_nodes: u64) -> u32 {
    if num_pis <= 6 {
        return num_pis;
    }
    let mut m = 7;
    while m <= num_pis && 32 + (1u64 << (m - 3)).saturating_mul(num_nodes) <= MEMORY_CEILING {
        m += 1;
    }
    m - 1
}

/// Value provider for one simulation round.
///
/// Fixed for the duration of the round: inputs below `split_var` get their
/// canonical projection pattern, inputs at or above it are held constant at
/// the corresponding bit of the round index, uniformly across all
/// `2^split_var` rows.
pub struct RoundSimulator {
    split_var: u32,
    round: u64,
}

impl RoundSimulator {
    pub fn new(split_var: u32, round: u64) -> Self {
        RoundSimulator { split_var, round }
    }
}

impl Simulator<TruthTable> for RoundSimulator {
    fn compute_constant(&self, value: bool) -> TruthTable {
        let tt = TruthTable::new(self.split_var);
        if value { !tt } else { tt }
    }

    fn compute_pi(&self, index: usize) -> TruthTable {
        let index = index as u32;
        if index < self.split_var {
            TruthTable::nth_var(self.split_var, index)
        } else {
            self.compute_constant((self.round >> (index - self.split_var)) & 1 == 1)
        }
    }

    fn compute_not(&self, value: &TruthTable) -> TruthTable {
        !value.clone()
    }
}

/// Outcome of the round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Every output of every round was constant false.
    Clean,
    /// Some output was not constant false; `round` and `output` identify the
    /// first violation found. No later round is simulated.
    Violation { round: u64, output: usize },
}

/// Runs every simulation round over `aig`, stopping at the first round with a
/// non-constant-false output.
fn run_rounds(aig: &Aig, split_var: u32, rounds: u64) -> Result<RoundOutcome> {
    for round in 0..rounds {
        let sim = RoundSimulator::new(split_var, round);
        let outputs = simulate(aig, &sim)?;
        if let Some(output) = outputs.iter().position(|tt| !tt.is_const0()) {
            return Ok(RoundOutcome::Violation { round, output });
        }
    }
    Ok(RoundOutcome::Clean)
}

/// Simulation-based combinational equivalence checking.
///
/// Creates the miter of the two networks and runs as many rounds of
/// simulation as needed to cover the full input space. For memory and speed
/// reasons this approach is limited to networks with up to 40 inputs: above
/// that, `Ok(None)` is returned without any work ("no verdict attempted").
///
/// `Ok(Some(false))` always means a genuine disagreement was found;
/// structurally incompatible networks (different inputs or output counts) are
/// reported as an error instead.
///
/// If `stats` is supplied, the split variable and round count of the check
/// actually performed are written into it.
///
/// ```rust
/// use simcec::{Aig, AigEdge, AigNode, CecStats, simulation_cec};
///
/// let mut a = Aig::new();
/// a.add_node(AigNode::Input(1)).unwrap();
/// a.add_output(1, false).unwrap();
///
/// let mut b = Aig::new();
/// let i1 = b.add_node(AigNode::Input(1)).unwrap();
/// // !!x = x
/// b.new_and(2, AigEdge::new(i1.clone(), true), AigEdge::new(i1, true))
///     .unwrap();
/// b.add_output(2, true).unwrap();
///
/// let mut stats = CecStats::default();
/// let result = simulation_cec(&a, &b, Some(&mut stats)).unwrap();
/// assert_eq!(result, Some(true));
/// assert_eq!(stats.rounds, 1);
/// ```
pub fn simulation_cec(a: &Aig, b: &Aig, stats: Option<&mut CecStats>) -> Result<Option<bool>> {
    if a.num_pis() > MAX_PIS {
        return Ok(None);
    }

    let m = miter(a, b)?;

    let num_pis = m.num_pis() as u32;
    let split_var = calculate_split_var(num_pis, m.num_nodes() as u64);
    let rounds = 1u64 << (num_pis - split_var);
    debug!(
        "miter has {} inputs and {} nodes: split_var={}, rounds={}",
        num_pis,
        m.num_nodes(),
        split_var,
        rounds
    );

    let outcome = run_rounds(&m, split_var, rounds)?;

    if let Some(stats) = stats {
        stats.split_var = split_var;
        stats.rounds = rounds;
    }

    match outcome {
        RoundOutcome::Clean => Ok(Some(true)),
        RoundOutcome::Violation { round, output } => {
            debug!("networks disagree on output {} (round {})", output, round);
            Ok(Some(false))
        }
    }
}

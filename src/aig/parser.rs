use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{Aig, AigEdge, AigNode, NodeId, Result, aig::error::ParserError};

fn read_u64(s: &str) -> std::result::Result<u64, ParserError> {
    s.parse::<u64>()
        .map_err(|_| ParserError::InvalidToken(s.to_string() + " expected u64"))
}

fn check_even(x: u64) -> Result<()> {
    if x & 1 == 1 {
        return Err(ParserError::InvalidToken(
            "expected literal to be even, got ".to_string() + &x.to_string(),
        )
        .into());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    _m: u64,
    i: u64,
    l: u64,
    o: u64,
    a: u64,
}

impl TryFrom<&str> for Header {
    type Error = ParserError;

    fn try_from(line: &str) -> std::result::Result<Self, Self::Error> {
        let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

        if tokens.len() < 6 {
            return Err(ParserError::InvalidToken(
                "missing header tokens".to_string(),
            ));
        }

        if tokens[0] != "aag" {
            return Err(ParserError::InvalidToken("expected aag".to_string()));
        }

        if tokens.len() > 6 {
            return Err(ParserError::UnsupportedFeature(
                "header only supports M I L O A".to_string(),
            ));
        }

        let m = read_u64(tokens[1])?;
        let i = read_u64(tokens[2])?;
        let l = read_u64(tokens[3])?;
        let o = read_u64(tokens[4])?;
        let a = read_u64(tokens[5])?;

        Ok(Header { _m: m, i, l, o, a })
    }
}

fn read_line(reader: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|e| ParserError::IoError(e.to_string()))?;
    if n == 0 {
        return Err(ParserError::InvalidToken("unexpected end of file".to_string()).into());
    }
    Ok(line)
}

fn read_literals(line: &str, expected: usize) -> Result<Vec<u64>> {
    let tokens = line.trim().split_whitespace().collect::<Vec<&str>>();

    if tokens.len() < expected {
        return Err(ParserError::InvalidToken(format!(
            "expected {} literals, got {}",
            expected,
            tokens.len()
        ))
        .into());
    }
    if tokens.len() > expected {
        return Err(ParserError::InvalidToken(
            "expected nothing after literals, got ".to_string() + tokens[expected],
        )
        .into());
    }

    tokens.iter().map(|t| Ok(read_u64(t)?)).collect()
}

/// Builder for the combinational AIGER subset.
///
/// The ASCII format does not constrain the order of the and-gate definitions,
/// so gates whose fanins are not known yet are retried on a later pass.
fn build_aig(
    inputs: Vec<NodeId>,
    outputs: Vec<(NodeId, bool)>,
    ands: Vec<(NodeId, NodeId, bool, NodeId, bool)>,
) -> Result<Aig> {
    let mut aig = Aig::new();

    // First, the constant node false (already there), then the inputs
    for &id in &inputs {
        aig.add_node(AigNode::Input(id))?;
    }

    // Adding and gates, deferring the ones with yet-unknown fanins
    let mut pending = ands;
    while !pending.is_empty() {
        let before = pending.len();
        let mut retry = Vec::new();
        for (id, f0, c0, f1, c1) in pending {
            match (aig.get_node(f0), aig.get_node(f1)) {
                (Some(n0), Some(n1)) => {
                    aig.new_and(id, AigEdge::new(n0, c0), AigEdge::new(n1, c1))?;
                }
                _ => retry.push((id, f0, c0, f1, c1)),
            }
        }
        if retry.len() == before {
            return Err(ParserError::InvalidToken(
                "and gate refers to an undefined node".to_string(),
            )
            .into());
        }
        pending = retry;
    }

    // Mark outputs
    for (id, complement) in outputs {
        aig.add_output(id, complement)?;
    }

    aig.update();
    aig.check_integrity()?;

    Ok(aig)
}

impl Aig {
    /// Parse a combinational AIG from an ASCII AIGER (`aag`) stream.
    ///
    /// Only the combinational subset is supported: a non-zero latch count in
    /// the header is rejected as an unsupported feature.
    pub fn from_ascii(reader: &mut impl BufRead) -> Result<Self> {
        let header = Header::try_from(read_line(reader)?.as_str())?;

        if header.l != 0 {
            return Err(ParserError::UnsupportedFeature(
                "latches (this crate is combinational only)".to_string(),
            )
            .into());
        }

        let mut inputs = Vec::new();
        for _ in 0..header.i {
            let lit = read_literals(&read_line(reader)?, 1)?[0];
            check_even(lit)?;
            inputs.push(lit >> 1);
        }

        let mut outputs = Vec::new();
        for _ in 0..header.o {
            let lit = read_literals(&read_line(reader)?, 1)?[0];
            outputs.push((lit >> 1, lit & 1 != 0));
        }

        let mut ands = Vec::new();
        for _ in 0..header.a {
            let lits = read_literals(&read_line(reader)?, 3)?;
            check_even(lits[0])?;
            ands.push((
                lits[0] >> 1,
                lits[1] >> 1,
                lits[1] & 1 != 0,
                lits[2] >> 1,
                lits[2] & 1 != 0,
            ));
        }

        build_aig(inputs, outputs, ands)
    }

    /// Parse a combinational AIG from an ASCII AIGER (`.aag`) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(|e| ParserError::IoError(e.to_string()))?;
        Self::from_ascii(&mut BufReader::new(file))
    }
}

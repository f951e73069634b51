//! Explicit truth tables packed in 64-bit blocks.
//!
//! A [`TruthTable`] over `n` variables stores one bit per assignment of those
//! variables, `2^n` bits in total. Row `r` is the assignment where variable
//! `i` takes bit `i` of `r`.

use std::ops::{BitAnd, Not};

/// Word-level projection patterns for the first six variables.
/// Bit `r` of `VAR_MASKS[i]` is bit `i` of `r`.
const VAR_MASKS: [u64; 6] = [
    0xaaaa_aaaa_aaaa_aaaa,
    0xcccc_cccc_cccc_cccc,
    0xf0f0_f0f0_f0f0_f0f0,
    0xff00_ff00_ff00_ff00,
    0xffff_0000_ffff_0000,
    0xffff_ffff_0000_0000,
];

/// A truth table over a fixed number of variables.
///
/// Bits above `2^num_vars` in the last block are always zero, so tables can be
/// compared with `==` directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    num_vars: u32,
    blocks: Vec<u64>,
}

impl TruthTable {
    /// The all-zero (constant false) table over `num_vars` variables.
    pub fn new(num_vars: u32) -> Self {
        TruthTable {
            num_vars,
            blocks: vec![0; Self::block_count(num_vars)],
        }
    }

    /// The canonical projection of variable `index`: bit at row `r` equals
    /// bit `index` of `r`.
    pub fn nth_var(num_vars: u32, index: u32) -> Self {
        assert!(
            index < num_vars,
            "variable index {} out of range for {} variables",
            index,
            num_vars
        );

        let mut tt = Self::new(num_vars);
        if index < 6 {
            let mask = tt.last_block_mask();
            for block in &mut tt.blocks {
                *block = VAR_MASKS[index as usize] & mask;
            }
        } else {
            // Blocks alternate between all-zero and all-one in runs of 2^(index - 6).
            let run = 1usize << (index - 6);
            for (b, block) in tt.blocks.iter_mut().enumerate() {
                if (b / run) & 1 == 1 {
                    *block = !0;
                }
            }
        }
        tt
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of rows, ie `2^num_vars`.
    pub fn num_bits(&self) -> u64 {
        1 << self.num_vars
    }

    /// True iff every bit is zero.
    pub fn is_const0(&self) -> bool {
        self.blocks.iter().all(|&block| block == 0)
    }

    /// The bit at row `row`.
    pub fn get_bit(&self, row: u64) -> bool {
        assert!(row < self.num_bits());
        (self.blocks[(row >> 6) as usize] >> (row & 63)) & 1 == 1
    }

    fn block_count(num_vars: u32) -> usize {
        if num_vars < 6 { 1 } else { 1 << (num_vars - 6) }
    }

    /// Mask of the rows actually used in the last block.
    fn last_block_mask(&self) -> u64 {
        if self.num_vars >= 6 {
            !0
        } else {
            (1u64 << (1 << self.num_vars)) - 1
        }
    }
}

impl Not for TruthTable {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        for block in &mut self.blocks {
            *block = !*block;
        }
        let mask = self.last_block_mask();
        if let Some(last) = self.blocks.last_mut() {
            *last &= mask;
        }
        self
    }
}

impl BitAnd for TruthTable {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self::Output {
        assert_eq!(
            self.num_vars, rhs.num_vars,
            "cannot AND truth tables over different variable counts"
        );
        for (block, rhs_block) in self.blocks.iter_mut().zip(rhs.blocks) {
            *block &= rhs_block;
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn const_tables() {
        let zero = TruthTable::new(3);
        assert!(zero.is_const0());
        assert_eq!(zero.num_bits(), 8);

        let one = !zero.clone();
        assert!(!one.is_const0());
        for row in 0..8 {
            assert!(!zero.get_bit(row));
            assert!(one.get_bit(row));
        }
        // Complement masks the unused bits so it round-trips
        assert_eq!(!one, zero);
    }

    #[test]
    fn nth_var_small() {
        let tt = TruthTable::nth_var(3, 1);
        for row in 0..8 {
            assert_eq!(tt.get_bit(row), (row >> 1) & 1 == 1);
        }
        assert_eq!(tt.blocks, vec![0xcc]);
    }

    #[test]
    fn nth_var_large() {
        // Variable 6 over 8 variables: 4 blocks alternating zero/one
        let tt = TruthTable::nth_var(8, 6);
        assert_eq!(tt.blocks, vec![0, !0, 0, !0]);

        // Variable 7: runs of two blocks
        let tt = TruthTable::nth_var(8, 7);
        assert_eq!(tt.blocks, vec![0, 0, !0, !0]);

        for row in 0..256 {
            assert_eq!(
                TruthTable::nth_var(8, 6).get_bit(row),
                (row >> 6) & 1 == 1
            );
        }
    }

    #[test]
    fn and_tables() {
        let x = TruthTable::nth_var(2, 0);
        let y = TruthTable::nth_var(2, 1);
        let and = x & y;
        for row in 0..4 {
            assert_eq!(and.get_bit(row), row == 3);
        }
    }

    #[test]
    fn zero_vars() {
        // Degenerate one-row table
        let tt = TruthTable::new(0);
        assert_eq!(tt.num_bits(), 1);
        assert!(tt.is_const0());
        let one = !tt;
        assert!(one.get_bit(0));
        assert_eq!(one.blocks, vec![1]);
    }

    #[test]
    #[should_panic]
    fn nth_var_out_of_range() {
        let _ = TruthTable::nth_var(3, 3);
    }
}

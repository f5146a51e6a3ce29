//! Operation-count weights
//!
//! The weight of an opcode is the number of elementary scalar operations it
//! performs, and is the numerator contribution used for arithmetic intensity.
//! The counts for sum-of-absolute-differences and shuffles are conventions
//! the consumer depends on, not derived quantities.

use crate::category::Category;

/// Flavour of a [`Category::PlurArith`] opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiStep {
    /// MAdd, MSub: a multiply and an add per lane
    MultiplyAccumulate,
    /// Sad: a subtract per lane, then one fewer sums than pairs
    SumOfAbsoluteDifferences,
    /// Avg: counted as one operation per lane
    Average,
}

impl MultiStep {
    pub fn from_mnemonic(mnemonic: &str) -> Self {
        if mnemonic.contains("Sad") {
            MultiStep::SumOfAbsoluteDifferences
        } else if mnemonic.contains("Avg") {
            MultiStep::Average
        } else {
            MultiStep::MultiplyAccumulate
        }
    }
}

/// Number of elementary operations performed by an opcode.
pub fn op_count(category: Category, mnemonic: &str, lane_count: u32) -> u32 {
    match category {
        // Pairwise reduction: one fewer combine than lanes
        Category::HozArith => lane_count.saturating_sub(1),
        Category::PlurArith => match MultiStep::from_mnemonic(mnemonic) {
            MultiStep::MultiplyAccumulate => lane_count.saturating_mul(2),
            MultiStep::SumOfAbsoluteDifferences => lane_count.saturating_mul(2).saturating_sub(1),
            MultiStep::Average => lane_count,
        },
        // Data movement is not arithmetic work
        Category::Shuffle => 1,
        _ => lane_count,
    }
}

use crate::breakeven::BreakevenResult;
use crate::rounding::round_money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proceeds allocated to a single share class at one exit amount.
///
/// All monetary fields are rounded to two decimal places; `total_shares` is
/// truncated to whole shares. Serialized by serde as exact decimal strings,
/// never binary floating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClassAllocation {
    pub share_class_id: Uuid,
    pub class_name: String,
    /// Whole shares outstanding (truncated).
    pub total_shares: Decimal,
    pub liquidation_preference: Decimal,
    pub participation_proceeds: Decimal,
    /// Preference plus participation.
    pub total_proceeds: Decimal,
    /// Total proceeds per share; zero for a class with no shares.
    pub per_share_value: Decimal,
    pub roi_multiple: Option<Decimal>, // Option<> because common has no investment basis
    pub is_participating: bool,
    pub participation_capped: bool,
}

/// The complete result of one waterfall computation.
///
/// This struct is the final output of the engine pipeline and serves as the
/// data transfer object for analysis results throughout the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallAnalysis {
    pub exit_amount: Decimal,
    pub generated_at: DateTime<Utc>,
    pub allocations: Vec<ShareClassAllocation>,
    pub breakeven: BreakevenResult,
    /// Exit amount minus the sum of all allocated proceeds, floored at zero
    /// to guard against negative values caused by rounding.
    pub unallocated_proceeds: Decimal,
}

impl WaterfallAnalysis {
    /// Assembles and timestamps the final analysis from its parts.
    pub fn assemble(
        exit_amount: Decimal,
        allocations: Vec<ShareClassAllocation>,
        breakeven: BreakevenResult,
    ) -> Self {
        let allocated: Decimal = allocations.iter().map(|a| a.total_proceeds).sum();
        let unallocated = (exit_amount - allocated).max(Decimal::ZERO);

        Self {
            exit_amount: round_money(exit_amount),
            generated_at: Utc::now(),
            allocations,
            breakeven,
            unallocated_proceeds: round_money(unallocated),
        }
    }
}

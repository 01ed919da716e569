use crate::enums::ShareClassType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable snapshot record of a single equity class, as handed to the
/// distribution engine.
///
/// The snapshot assembler resolves `total_shares` to include vested
/// as-if-exercised options and as-if-converted convertibles *before* this
/// struct is constructed; the engine treats every field as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClassInput {
    pub id: Uuid,
    pub class_name: String,
    pub class_type: ShareClassType,
    /// Shares outstanding, including as-if-exercised vested options and
    /// as-if-converted convertibles attributed to this class.
    pub total_shares: Decimal,
    /// Multiple of original investment owed before common participates.
    /// Zero marks a common-like class with no preference.
    pub liquidation_preference_multiple: Decimal,
    pub participating_rights: bool,
    /// Ceiling on total proceeds, as a multiple of original investment.
    /// `None` means uncapped.
    pub participation_cap: Option<Decimal>,
    /// Higher seniority is paid first; classes sharing a seniority are
    /// pari passu.
    pub seniority: i32,
    /// Shares issued in this class multiplied by historical price per share,
    /// summed across all closed funding rounds targeting it. Zero for common.
    pub original_investment: Decimal,
}

impl ShareClassInput {
    /// A zero liquidation multiple makes the class common-like for
    /// distribution purposes regardless of its `class_type` label.
    pub fn is_common_like(&self) -> bool {
        self.liquidation_preference_multiple.is_zero()
    }

    /// The full preference claim: multiple times original investment.
    pub fn preference_amount(&self) -> Decimal {
        self.liquidation_preference_multiple * self.original_investment
    }

    /// True for classes that share in residual proceeds after preferences:
    /// common-like classes always, preferred only with participating rights.
    pub fn participates_in_residual(&self) -> bool {
        self.is_common_like() || self.participating_rights
    }
}

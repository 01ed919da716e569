use chrono::NaiveDate;
use core_types::ShareClassType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The liquidation terms of an equity class as recorded on the cap table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClassRecord {
    pub id: Uuid,
    pub class_name: String,
    pub class_type: ShareClassType,
    pub liquidation_preference_multiple: Decimal,
    pub participating_rights: bool,
    pub participation_cap: Option<Decimal>,
    pub seniority: i32,
}

/// Issued shares held in a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shareholding {
    pub share_class_id: Uuid,
    pub shares: Decimal,
}

/// A funding round targeting one share class. Only closed rounds contribute
/// to the original investment basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    pub name: String,
    pub share_class_id: Uuid,
    pub shares_issued: Decimal,
    pub price_per_share: Decimal,
    pub closed: bool,
}

/// An option grant vesting linearly by month after a cliff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGrant {
    pub share_class_id: Uuid,
    pub quantity: Decimal,
    pub grant_date: NaiveDate,
    pub cliff_months: u32,
    pub vesting_months: u32,
}

/// An outstanding convertible note or SAFE-style instrument.
///
/// Eligible for as-if conversion only when a valuation cap or a discount is
/// present; an instrument with neither is excluded from the snapshot and
/// reported with a reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertibleInstrument {
    pub id: Uuid,
    pub name: String,
    /// The class this instrument converts into.
    pub share_class_id: Uuid,
    pub principal: Decimal,
    /// Simple annual interest rate, e.g. 0.06 for 6%.
    pub annual_interest_rate: Decimal,
    pub issue_date: NaiveDate,
    pub valuation_cap: Option<Decimal>,
    /// Discount off the reference price, e.g. 0.20 for 20%.
    pub discount_pct: Option<Decimal>,
}

/// A company's full cap table as loaded from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapTable {
    pub company_name: String,
    pub share_classes: Vec<ShareClassRecord>,
    #[serde(default)]
    pub shareholdings: Vec<Shareholding>,
    #[serde(default)]
    pub funding_rounds: Vec<FundingRound>,
    #[serde(default)]
    pub option_grants: Vec<OptionGrant>,
    #[serde(default)]
    pub convertibles: Vec<ConvertibleInstrument>,
}

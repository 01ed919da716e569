use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// The root configuration structure for the cascade CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub defaults: Defaults,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// Inputs applied when a command does not override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    /// Path to the cap table JSON file.
    pub captable_file: String,
    /// Snapshot date used for option vesting and convertible interest accrual.
    pub as_of: NaiveDate,
    /// Latest round price per share; the reference for convertible discounts.
    pub reference_price: Decimal,
}

/// A named exit scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Total proceeds of the modeled exit.
    pub exit_amount: Decimal,
    /// Share class IDs overriding the seniority stacking order, first paid
    /// first. Empty means the default order.
    #[serde(default)]
    pub stacking_order: Vec<Uuid>,
}

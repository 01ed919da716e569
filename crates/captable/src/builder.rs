use crate::convertible::{analyze_conversion, ConversionOutcome};
use crate::error::CapTableError;
use crate::records::CapTable;
use crate::vesting::vested_quantity;
use chrono::NaiveDate;
use core_types::ShareClassInput;
use rust_decimal::Decimal;
use uuid::Uuid;

/// The assembled snapshot: one input record per share class, plus the
/// reasons for any convertibles left out. The reasons travel alongside the
/// analysis result, never inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapSnapshot {
    pub classes: Vec<ShareClassInput>,
    pub excluded_convertibles: Vec<String>,
}

/// Assembles the capitalization snapshot the waterfall engine consumes.
///
/// Each class's share count is resolved to issued shares plus vested
/// as-if-exercised options plus as-if-converted convertibles, and its
/// original investment to shares issued times price per share across closed
/// funding rounds. The builder reads the cap table and produces a new
/// snapshot array; it never mutates the records it was given.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    /// Snapshot date for vesting and interest accrual.
    as_of: NaiveDate,
    /// Latest round price per share; the reference for convertible discounts.
    reference_price: Decimal,
}

impl SnapshotBuilder {
    pub fn new(as_of: NaiveDate, reference_price: Decimal) -> Self {
        Self {
            as_of,
            reference_price,
        }
    }

    /// Builds the snapshot, or fails on the first dangling class reference
    /// or malformed record.
    pub fn build(&self, table: &CapTable) -> Result<CapSnapshot, CapTableError> {
        validate(table)?;

        let class_index = |id: Uuid| table.share_classes.iter().position(|c| c.id == id);

        // Issued shares and vested options per class, by share_classes index.
        let mut shares = vec![Decimal::ZERO; table.share_classes.len()];
        for holding in &table.shareholdings {
            let index = class_index(holding.share_class_id).expect("validated above");
            shares[index] += holding.shares;
        }
        for grant in &table.option_grants {
            let index = class_index(grant.share_class_id).expect("validated above");
            shares[index] += vested_quantity(grant, self.as_of);
        }

        // Pre-conversion fully-diluted count, the denominator for cap pricing.
        let fully_diluted: Decimal = shares.iter().copied().sum();

        let mut excluded = Vec::new();
        for instrument in &table.convertibles {
            let index = class_index(instrument.share_class_id).expect("validated above");
            match analyze_conversion(instrument, self.as_of, self.reference_price, fully_diluted)
            {
                ConversionOutcome::Converted {
                    shares: converted_shares,
                } => shares[index] += converted_shares,
                ConversionOutcome::Excluded { reason } => {
                    tracing::debug!(instrument = %instrument.name, "convertible excluded");
                    excluded.push(reason);
                }
            }
        }

        let mut investment = vec![Decimal::ZERO; table.share_classes.len()];
        for round in table.funding_rounds.iter().filter(|r| r.closed) {
            let index = class_index(round.share_class_id).expect("validated above");
            investment[index] += round.shares_issued * round.price_per_share;
        }

        let classes = table
            .share_classes
            .iter()
            .enumerate()
            .map(|(index, record)| ShareClassInput {
                id: record.id,
                class_name: record.class_name.clone(),
                class_type: record.class_type,
                total_shares: shares[index],
                liquidation_preference_multiple: record.liquidation_preference_multiple,
                participating_rights: record.participating_rights,
                participation_cap: record.participation_cap,
                seniority: record.seniority,
                original_investment: investment[index],
            })
            .collect();

        Ok(CapSnapshot {
            classes,
            excluded_convertibles: excluded,
        })
    }
}

fn validate(table: &CapTable) -> Result<(), CapTableError> {
    let known = |id: Uuid| table.share_classes.iter().any(|c| c.id == id);
    let unknown = |context: &str, id: Uuid| CapTableError::UnknownShareClass {
        context: context.to_string(),
        id,
    };

    for holding in &table.shareholdings {
        if !known(holding.share_class_id) {
            return Err(unknown("shareholding", holding.share_class_id));
        }
        if holding.shares < Decimal::ZERO {
            return Err(CapTableError::InvalidInput {
                field: "shareholding.shares".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
    }
    for round in &table.funding_rounds {
        if !known(round.share_class_id) {
            return Err(unknown("funding round", round.share_class_id));
        }
    }
    for grant in &table.option_grants {
        if !known(grant.share_class_id) {
            return Err(unknown("option grant", grant.share_class_id));
        }
    }
    for instrument in &table.convertibles {
        if !known(instrument.share_class_id) {
            return Err(unknown("convertible", instrument.share_class_id));
        }
        if instrument.principal < Decimal::ZERO {
            return Err(CapTableError::InvalidInput {
                field: "convertible.principal".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        if let Some(discount) = instrument.discount_pct {
            if discount < Decimal::ZERO || discount >= Decimal::ONE {
                return Err(CapTableError::InvalidInput {
                    field: "convertible.discount_pct".to_string(),
                    reason: "must be in [0, 1)".to_string(),
                });
            }
        }
    }

    Ok(())
}

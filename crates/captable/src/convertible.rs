use crate::records::ConvertibleInstrument;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Outcome of the as-if-conversion analysis for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// The instrument converts; `shares` join its target class.
    Converted { shares: Decimal },
    /// The instrument is left out of the snapshot, with the reason reported
    /// alongside the analysis result.
    Excluded { reason: String },
}

/// Principal plus simple interest accrued from the issue date to `as_of`.
pub fn accrued_amount(instrument: &ConvertibleInstrument, as_of: NaiveDate) -> Decimal {
    let days = (as_of - instrument.issue_date).num_days().max(0);
    instrument.principal
        * (Decimal::ONE + instrument.annual_interest_rate * Decimal::from(days) / dec!(365))
}

/// The price at which the instrument converts: the lower of the discounted
/// reference price and the valuation-cap price, using whichever terms the
/// instrument carries. `None` when it carries neither.
pub fn conversion_price(
    instrument: &ConvertibleInstrument,
    reference_price: Decimal,
    fully_diluted_shares: Decimal,
) -> Option<Decimal> {
    let discount_price = instrument
        .discount_pct
        .map(|discount| reference_price * (Decimal::ONE - discount));
    let cap_price = instrument.valuation_cap.and_then(|cap| {
        if fully_diluted_shares > Decimal::ZERO {
            Some(cap / fully_diluted_shares)
        } else {
            None
        }
    });

    match (discount_price, cap_price) {
        (Some(d), Some(c)) => Some(d.min(c)),
        (Some(d), None) => Some(d),
        (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

/// Runs the full as-if-conversion analysis for one instrument.
///
/// `fully_diluted_shares` is the pre-conversion share count (issued plus
/// vested options across all classes), the denominator for the cap price.
pub fn analyze_conversion(
    instrument: &ConvertibleInstrument,
    as_of: NaiveDate,
    reference_price: Decimal,
    fully_diluted_shares: Decimal,
) -> ConversionOutcome {
    match conversion_price(instrument, reference_price, fully_diluted_shares) {
        None => ConversionOutcome::Excluded {
            reason: format!(
                "{}: no valuation cap or discount; not eligible for as-if conversion",
                instrument.name
            ),
        },
        Some(price) if price <= Decimal::ZERO => ConversionOutcome::Excluded {
            reason: format!("{}: conversion price is not positive", instrument.name),
        },
        Some(price) => ConversionOutcome::Converted {
            shares: accrued_amount(instrument, as_of) / price,
        },
    }
}

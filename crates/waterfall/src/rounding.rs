use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits carried by every monetary output field.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary value to two decimal places, half-up.
///
/// The result is rescaled so serialized output always carries two fractional
/// digits (`"100.00"`, never `"100"`). Internal computation stays at full
/// precision; only final output fields pass through here.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Rounds a ratio (e.g. an ROI multiple) to two decimal places, half-up.
pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates a share count down to a whole number of shares.
pub fn truncate_shares(value: Decimal) -> Decimal {
    value.trunc()
}

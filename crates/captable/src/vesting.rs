use crate::records::OptionGrant;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Options vested under `grant` as of the snapshot date.
///
/// Linear monthly vesting: nothing before the cliff, `elapsed / vesting`
/// of the grant once the cliff has passed, the full quantity at or after the
/// end of the vesting term. A zero-month vesting term vests immediately.
pub fn vested_quantity(grant: &OptionGrant, as_of: NaiveDate) -> Decimal {
    let elapsed = whole_months_between(grant.grant_date, as_of);

    if elapsed < grant.cliff_months {
        return Decimal::ZERO;
    }
    if grant.vesting_months == 0 || elapsed >= grant.vesting_months {
        return grant.quantity;
    }

    grant.quantity * Decimal::from(elapsed) / Decimal::from(grant.vesting_months)
}

/// Whole months elapsed from `start` to `end`; a month counts only once its
/// day-of-month anniversary has passed. Zero when `end` precedes `start`.
fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

use crate::engine::DistributionEngine;
use crate::rounding::round_money;
use core_types::ShareClassInput;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Hard iteration bound on the bisection; guarantees termination.
const MAX_ITERATIONS: u32 = 100;

/// Width of the bisection interval, in currency units, at which the search
/// stops and reports the midpoint.
const TOLERANCE: Decimal = dec!(0.01);

/// The exit value at which common stock begins to out-earn preferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakevenResult {
    pub exit_value: Decimal,
    pub description: String,
}

/// Locates the breakeven exit value by bounded bisection over the
/// distribution engine.
///
/// This is a heuristic: it assumes the common-vs-preferred per-share ordering
/// is monotonic in the exit value, which holds for simple structures but is
/// not formally guaranteed once caps and multiple pari-passu groups interact.
/// The solver never fails; on non-convergence it reports the last upper bound
/// as a best-effort estimate.
#[derive(Debug, Default)]
pub struct BreakevenSolver {
    engine: DistributionEngine,
}

impl BreakevenSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the search over `ordered_classes` (see `resolve_stacking_order`).
    pub fn solve(&self, ordered_classes: &[ShareClassInput]) -> BreakevenResult {
        let has_preference = ordered_classes.iter().any(|c| !c.is_common_like());
        if !has_preference {
            // Common and preferred are already equivalent.
            return BreakevenResult {
                exit_value: round_money(Decimal::ZERO),
                description: "no preferred classes".to_string(),
            };
        }

        let total_shares: Decimal = ordered_classes.iter().map(|c| c.total_shares).sum();
        if total_shares.is_zero() {
            return BreakevenResult {
                exit_value: round_money(Decimal::ZERO),
                description: "no shares outstanding".to_string(),
            };
        }

        let total_preferences: Decimal = ordered_classes
            .iter()
            .map(|c| c.preference_amount())
            .sum();
        let mut low = Decimal::ZERO;
        let mut high = (total_preferences * dec!(10)).max(dec!(1_000_000));

        for _ in 0..MAX_ITERATIONS {
            let mid = (low + high) / dec!(2);
            if high - low <= TOLERANCE {
                return BreakevenResult {
                    exit_value: round_money(mid),
                    description: "common per-share proceeds meet preferred at this exit value"
                        .to_string(),
                };
            }

            let allocations = self.engine.distribute(ordered_classes, mid);
            // Compare at full quotient precision: the formatted per-share
            // field is quantized to cents, which at typical share counts
            // blurs the crossover by far more than the search tolerance.
            let mut best_common = Decimal::ZERO;
            let mut best_preferred = Decimal::ZERO;
            for (class, allocation) in ordered_classes.iter().zip(&allocations) {
                let per_share = if allocation.total_shares.is_zero() {
                    Decimal::ZERO
                } else {
                    allocation.total_proceeds / allocation.total_shares
                };
                if class.is_common_like() {
                    best_common = best_common.max(per_share);
                } else {
                    best_preferred = best_preferred.max(per_share);
                }
            }

            if best_common >= best_preferred {
                high = mid;
            } else {
                low = mid;
            }
        }

        BreakevenResult {
            exit_value: round_money(high),
            description: "search did not converge; best-effort upper bound".to_string(),
        }
    }
}

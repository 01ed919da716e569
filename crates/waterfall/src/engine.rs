use crate::report::ShareClassAllocation;
use crate::rounding::{round_money, round_ratio, truncate_shares};
use core_types::ShareClassInput;
use rust_decimal::Decimal;

/// A stateless calculator that distributes exit proceeds across a stack of
/// equity classes.
///
/// Every invocation builds its own per-class working data and discards it on
/// return, so the engine is re-entrant and side-effect-free: the breakeven
/// solver drives it through up to a hundred calls per analysis without any
/// cross-contamination between iterations.
#[derive(Debug, Default)]
pub struct DistributionEngine {}

/// Per-class accumulator for a single `distribute` call.
#[derive(Debug, Clone, Default)]
struct ClassWorkingData {
    preference_proceeds: Decimal,
    participation_proceeds: Decimal,
    capped: bool,
}

impl DistributionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for distributing exit proceeds.
    ///
    /// Applies, in order: liquidation preferences over pari-passu groups,
    /// residual pro-rata distribution, participation-cap enforcement with a
    /// single redistribution pass, and the non-participating conversion
    /// election.
    ///
    /// # Arguments
    ///
    /// * `ordered_classes` - The snapshot in stacking order (see
    ///   `resolve_stacking_order`). The slice is read-only; output order
    ///   matches input order.
    /// * `exit_amount` - Total proceeds of the exit.
    ///
    /// # Returns
    ///
    /// One `ShareClassAllocation` per input class, with monetary fields
    /// rounded to two decimal places.
    pub fn distribute(
        &self,
        ordered_classes: &[ShareClassInput],
        exit_amount: Decimal,
    ) -> Vec<ShareClassAllocation> {
        let mut working = vec![ClassWorkingData::default(); ordered_classes.len()];

        let remaining = self.allocate_preferences(ordered_classes, exit_amount, &mut working);
        self.distribute_residual(ordered_classes, remaining, &mut working);
        self.enforce_caps(ordered_classes, &mut working);
        self.elect_conversions(ordered_classes, exit_amount, &mut working);

        self.build_allocations(ordered_classes, &working)
    }

    /// Pays liquidation preferences group by group.
    ///
    /// Consecutive equal-seniority runs of preferred classes in the ordered
    /// sequence form the pari-passu groups, so the stacking order decides
    /// satisfaction order. Within a group, an underfunded claim is shared
    /// pro rata by claim size, not equally. Returns the proceeds left for
    /// residual distribution.
    fn allocate_preferences(
        &self,
        classes: &[ShareClassInput],
        exit_amount: Decimal,
        working: &mut [ClassWorkingData],
    ) -> Decimal {
        let mut remaining = exit_amount;

        // Common-like classes (zero multiple) take no part in this phase.
        let preferred: Vec<usize> = (0..classes.len())
            .filter(|&i| !classes[i].is_common_like())
            .collect();

        let mut start = 0;
        while start < preferred.len() {
            if remaining <= Decimal::ZERO {
                break;
            }

            let seniority = classes[preferred[start]].seniority;
            let mut end = start;
            while end < preferred.len() && classes[preferred[end]].seniority == seniority {
                end += 1;
            }
            let group = &preferred[start..end];
            start = end;

            let group_total: Decimal = group
                .iter()
                .map(|&i| classes[i].preference_amount())
                .sum();
            if group_total.is_zero() {
                continue;
            }

            let available = group_total.min(remaining);
            for &i in group {
                working[i].preference_proceeds =
                    available * classes[i].preference_amount() / group_total;
            }
            remaining -= available;
        }

        remaining
    }

    /// Distributes residual proceeds pro rata by share count across the
    /// participation pool: common-like classes plus participating preferred.
    /// Non-participating preferred receive nothing here; their conversion
    /// election happens in `elect_conversions`.
    fn distribute_residual(
        &self,
        classes: &[ShareClassInput],
        remaining: Decimal,
        working: &mut [ClassWorkingData],
    ) {
        if remaining <= Decimal::ZERO {
            return;
        }

        let pool: Vec<usize> = (0..classes.len())
            .filter(|&i| classes[i].participates_in_residual())
            .collect();
        let pool_shares: Decimal = pool.iter().map(|&i| classes[i].total_shares).sum();
        if pool_shares.is_zero() {
            return;
        }

        for &i in &pool {
            working[i].participation_proceeds = remaining * classes[i].total_shares / pool_shares;
        }
    }

    /// Clips participating classes that overshoot their participation cap and
    /// redistributes the clipped excess.
    ///
    /// Redistribution is a single pass: the excess goes pro rata by shares to
    /// common-like and uncapped participating classes, and recipients' own
    /// caps are not re-checked. A clipped class stays out of the pool even if
    /// the clip leaves it under its cap again.
    fn enforce_caps(&self, classes: &[ShareClassInput], working: &mut [ClassWorkingData]) {
        let mut excess = Decimal::ZERO;

        for (i, class) in classes.iter().enumerate() {
            if class.is_common_like() || !class.participating_rights {
                continue;
            }
            let Some(cap) = class.participation_cap else {
                continue;
            };

            let max_total = cap * class.original_investment;
            let total = working[i].preference_proceeds + working[i].participation_proceeds;
            if total > max_total {
                let clipped_participation =
                    (max_total - working[i].preference_proceeds).max(Decimal::ZERO);
                excess += working[i].participation_proceeds - clipped_participation;
                working[i].participation_proceeds = clipped_participation;
                working[i].capped = true;
            }
        }

        if excess <= Decimal::ZERO {
            return;
        }

        let pool: Vec<usize> = (0..classes.len())
            .filter(|&i| classes[i].participates_in_residual() && !working[i].capped)
            .collect();
        let pool_shares: Decimal = pool.iter().map(|&i| classes[i].total_shares).sum();
        if pool_shares.is_zero() {
            return;
        }

        for &i in &pool {
            working[i].participation_proceeds += excess * classes[i].total_shares / pool_shares;
        }
    }

    /// The non-participating election, evaluated independently per class.
    ///
    /// Option A is the preference as already computed; Option B is the
    /// class's pro-rata share of the *entire* exit amount, as if it had
    /// abandoned its preference and converted to common. A strictly greater
    /// Option B wins; ties keep the preference.
    fn elect_conversions(
        &self,
        classes: &[ShareClassInput],
        exit_amount: Decimal,
        working: &mut [ClassWorkingData],
    ) {
        let total_shares: Decimal = classes.iter().map(|c| c.total_shares).sum();

        for (i, class) in classes.iter().enumerate() {
            if class.is_common_like() || class.participating_rights {
                continue;
            }

            let preference_only = working[i].preference_proceeds;
            let as_converted = if total_shares > Decimal::ZERO {
                exit_amount * class.total_shares / total_shares
            } else {
                Decimal::ZERO
            };

            if as_converted > preference_only {
                working[i].preference_proceeds = Decimal::ZERO;
                working[i].participation_proceeds = as_converted;
            }
        }
    }

    /// Rounds the working data into the final allocation records.
    fn build_allocations(
        &self,
        classes: &[ShareClassInput],
        working: &[ClassWorkingData],
    ) -> Vec<ShareClassAllocation> {
        classes
            .iter()
            .zip(working)
            .map(|(class, data)| {
                let exact_total = data.preference_proceeds + data.participation_proceeds;

                let per_share_value = if class.total_shares.is_zero() {
                    round_money(Decimal::ZERO)
                } else {
                    round_money(exact_total / class.total_shares)
                };

                let roi_multiple = if !class.class_type.is_common()
                    && class.original_investment > Decimal::ZERO
                {
                    Some(round_ratio(exact_total / class.original_investment))
                } else {
                    None
                };

                let liquidation_preference = round_money(data.preference_proceeds);
                let participation_proceeds = round_money(data.participation_proceeds);

                ShareClassAllocation {
                    share_class_id: class.id,
                    class_name: class.class_name.clone(),
                    total_shares: truncate_shares(class.total_shares),
                    liquidation_preference,
                    participation_proceeds,
                    total_proceeds: liquidation_preference + participation_proceeds,
                    per_share_value,
                    roi_multiple,
                    is_participating: class.participating_rights,
                    participation_capped: data.capped,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::ShareClassType;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn common(name: &str, shares: Decimal) -> ShareClassInput {
        ShareClassInput {
            id: Uuid::new_v4(),
            class_name: name.to_string(),
            class_type: ShareClassType::Common,
            total_shares: shares,
            liquidation_preference_multiple: Decimal::ZERO,
            participating_rights: false,
            participation_cap: None,
            seniority: 0,
            original_investment: Decimal::ZERO,
        }
    }

    fn preferred(
        name: &str,
        shares: Decimal,
        investment: Decimal,
        multiple: Decimal,
        seniority: i32,
    ) -> ShareClassInput {
        ShareClassInput {
            id: Uuid::new_v4(),
            class_name: name.to_string(),
            class_type: ShareClassType::Preferred,
            total_shares: shares,
            liquidation_preference_multiple: multiple,
            participating_rights: false,
            participation_cap: None,
            seniority,
            original_investment: investment,
        }
    }

    fn participating(
        name: &str,
        shares: Decimal,
        investment: Decimal,
        multiple: Decimal,
        seniority: i32,
        cap: Option<Decimal>,
    ) -> ShareClassInput {
        ShareClassInput {
            participating_rights: true,
            participation_cap: cap,
            ..preferred(name, shares, investment, multiple, seniority)
        }
    }

    fn distribute(classes: &[ShareClassInput], exit: Decimal) -> Vec<ShareClassAllocation> {
        DistributionEngine::new().distribute(classes, exit)
    }

    #[test]
    fn single_common_class_takes_everything() {
        let classes = vec![common("Common", dec!(100_000))];
        let allocations = distribute(&classes, dec!(10_000_000));

        assert_eq!(allocations[0].total_proceeds.to_string(), "10000000.00");
        assert_eq!(allocations[0].per_share_value.to_string(), "100.00");
        assert_eq!(allocations[0].liquidation_preference, Decimal::ZERO);
        assert!(allocations[0].roi_multiple.is_none());
    }

    #[test]
    fn non_participating_tie_keeps_the_preference() {
        // Preference equals the as-converted pro-rata amount exactly; the
        // election must not flip on a tie.
        let classes = vec![
            preferred("Series A", dec!(30_000), dec!(3_000_000), dec!(1), 1),
            common("Common", dec!(70_000)),
        ];
        let allocations = distribute(&classes, dec!(10_000_000));

        assert_eq!(allocations[0].total_proceeds.to_string(), "3000000.00");
        assert_eq!(allocations[0].liquidation_preference, dec!(3_000_000));
        assert_eq!(allocations[0].participation_proceeds, Decimal::ZERO);
        assert_eq!(allocations[1].total_proceeds.to_string(), "7000000.00");
    }

    #[test]
    fn pari_passu_shortfall_splits_pro_rata_by_claim() {
        let classes = vec![
            preferred("Series A", dec!(20_000), dec!(2_000_000), dec!(1), 2),
            preferred("Series B", dec!(30_000), dec!(3_000_000), dec!(1), 2),
        ];
        let allocations = distribute(&classes, dec!(3_000_000));

        assert_eq!(allocations[0].total_proceeds, dec!(1_200_000));
        assert_eq!(allocations[1].total_proceeds, dec!(1_800_000));
    }

    #[test]
    fn senior_class_is_paid_in_full_before_junior_sees_anything() {
        let classes = vec![
            preferred("Series B", dec!(5_000), dec!(4_000_000), dec!(1), 2),
            preferred("Series A", dec!(5_000), dec!(2_000_000), dec!(1), 1),
            common("Common", dec!(90_000)),
        ];

        // Exit covers the senior claim but only half of the junior one.
        let allocations = distribute(&classes, dec!(5_000_000));
        assert_eq!(allocations[0].liquidation_preference, dec!(4_000_000));
        assert_eq!(allocations[1].liquidation_preference, dec!(1_000_000));

        // Exit below the senior claim leaves the junior preference unpaid.
        let allocations = distribute(&classes, dec!(3_000_000));
        assert_eq!(allocations[0].liquidation_preference, dec!(3_000_000));
        assert_eq!(allocations[1].liquidation_preference, Decimal::ZERO);
    }

    #[test]
    fn participating_preferred_takes_preference_and_residual() {
        let classes = vec![
            participating("Series A", dec!(25_000), dec!(1_000_000), dec!(1), 1, None),
            common("Common", dec!(75_000)),
        ];
        let allocations = distribute(&classes, dec!(5_000_000));

        // 1M preference, then 4M residual split 25/75 by shares.
        assert_eq!(allocations[0].liquidation_preference, dec!(1_000_000));
        assert_eq!(allocations[0].participation_proceeds, dec!(1_000_000));
        assert_eq!(allocations[1].total_proceeds, dec!(3_000_000));
    }

    #[test]
    fn participation_cap_clips_and_redistributes_to_common() {
        let classes = vec![
            participating(
                "Series A",
                dec!(10_000),
                dec!(1_000_000),
                dec!(1),
                1,
                Some(dec!(3)),
            ),
            common("Common", dec!(90_000)),
        ];
        let allocations = distribute(&classes, dec!(50_000_000));

        assert!(allocations[0].participation_capped);
        assert!(allocations[0].total_proceeds <= dec!(3_000_000.01));
        assert_eq!(allocations[0].total_proceeds, dec!(3_000_000));
        // Clipped excess flows to common: 49M residual share plus 2.9M excess.
        assert_eq!(allocations[1].total_proceeds, dec!(47_000_000));
    }

    #[test]
    fn capped_class_alone_leaves_excess_unallocated() {
        let classes = vec![participating(
            "Series A",
            dec!(10_000),
            dec!(1_000_000),
            dec!(1),
            1,
            Some(dec!(3)),
        )];
        let allocations = distribute(&classes, dec!(50_000_000));

        // No redistribution pool exists, so the clip is simply lost here and
        // surfaces as unallocated proceeds at the analysis level.
        assert_eq!(allocations[0].total_proceeds, dec!(3_000_000));
        assert!(allocations[0].participation_capped);
    }

    #[test]
    fn redistribution_skips_the_capped_class() {
        let classes = vec![
            participating(
                "Capped",
                dec!(10_000),
                dec!(1_000_000),
                dec!(1),
                1,
                Some(dec!(2)),
            ),
            participating("Uncapped", dec!(10_000), dec!(1_000_000), dec!(1), 1, None),
            common("Common", dec!(80_000)),
        ];
        let allocations = distribute(&classes, dec!(100_000_000));

        // 98M residual: capped gets 9.8M then clips to 1M participation,
        // leaving 8.8M excess shared by shares between uncapped and common.
        assert!(allocations[0].participation_capped);
        assert_eq!(allocations[0].total_proceeds, dec!(2_000_000));
        assert!(!allocations[1].participation_capped);
        // Uncapped: 1M pref + 9.8M residual + 8.8M * 1/9 excess.
        let expected = dec!(1_000_000) + dec!(9_800_000) + round_money(dec!(8_800_000) / dec!(9));
        assert!((allocations[1].total_proceeds - expected).abs() <= dec!(0.01));
    }

    #[test]
    fn conversion_election_takes_the_larger_of_preference_or_pro_rata() {
        let classes = vec![
            preferred("Series A", dec!(50_000), dec!(1_000_000), dec!(1), 1),
            common("Common", dec!(50_000)),
        ];
        let allocations = distribute(&classes, dec!(20_000_000));

        // Option A = 1M preference; Option B = 20M * 50% = 10M. B wins.
        assert_eq!(allocations[0].liquidation_preference, Decimal::ZERO);
        assert_eq!(allocations[0].participation_proceeds, dec!(10_000_000));
        assert_eq!(allocations[0].total_proceeds, dec!(10_000_000));
    }

    #[test]
    fn conversion_election_is_per_class() {
        // One class converts, the other keeps its preference.
        let classes = vec![
            preferred("Big stake", dec!(40_000), dec!(1_000_000), dec!(1), 2),
            preferred("Small stake", dec!(1_000), dec!(5_000_000), dec!(1), 1),
            common("Common", dec!(59_000)),
        ];
        let allocations = distribute(&classes, dec!(100_000_000));

        // Big stake: A = 1M, B = 100M * 40% = 40M -> converts.
        assert_eq!(allocations[0].total_proceeds, dec!(40_000_000));
        assert_eq!(allocations[0].liquidation_preference, Decimal::ZERO);
        // Small stake: A = 5M, B = 100M * 1% = 1M -> keeps preference.
        assert_eq!(allocations[1].total_proceeds, dec!(5_000_000));
        assert_eq!(allocations[1].participation_proceeds, Decimal::ZERO);
    }

    #[test]
    fn zero_exit_amount_allocates_nothing() {
        let classes = vec![
            preferred("Series A", dec!(10_000), dec!(1_000_000), dec!(1), 1),
            common("Common", dec!(90_000)),
        ];
        for allocation in distribute(&classes, Decimal::ZERO) {
            assert_eq!(allocation.total_proceeds, Decimal::ZERO);
            assert_eq!(allocation.per_share_value, Decimal::ZERO);
        }
    }

    #[test]
    fn zero_share_class_never_divides() {
        let classes = vec![
            preferred("Phantom", Decimal::ZERO, dec!(1_000_000), dec!(1), 1),
            common("Common", dec!(100_000)),
        ];
        let allocations = distribute(&classes, dec!(10_000_000));

        assert_eq!(allocations[0].per_share_value, Decimal::ZERO);
        assert_eq!(allocations[0].total_shares, Decimal::ZERO);
        // The preference itself is still owed and paid.
        assert_eq!(allocations[0].liquidation_preference, dec!(1_000_000));
    }

    #[test]
    fn zero_preference_group_is_skipped_without_dividing() {
        // Preferred label, non-zero multiple, but zero investment: the group
        // claim is zero and must be skipped, not divided by.
        let classes = vec![
            preferred("No basis", dec!(10_000), Decimal::ZERO, dec!(2), 1),
            common("Common", dec!(90_000)),
        ];
        let allocations = distribute(&classes, dec!(1_000_000));

        assert_eq!(allocations[0].liquidation_preference, Decimal::ZERO);
        assert_eq!(allocations[1].total_proceeds, dec!(1_000_000));
    }

    #[test]
    fn zero_multiple_class_is_grouped_as_common() {
        // PREFERRED label with a zero multiple shares the residual like
        // common and skips the preference phase entirely.
        let common_like = preferred("Seed SAFE-ish", dec!(50_000), dec!(500_000), dec!(0), 5);
        let classes = vec![common_like, common("Common", dec!(50_000))];
        let allocations = distribute(&classes, dec!(8_000_000));

        assert_eq!(allocations[0].liquidation_preference, Decimal::ZERO);
        assert_eq!(allocations[0].participation_proceeds, dec!(4_000_000));
        // The label still drives ROI reporting.
        assert_eq!(allocations[0].roi_multiple, Some(dec!(8)));
        assert_eq!(allocations[1].total_proceeds, dec!(4_000_000));
    }

    #[test]
    fn roi_multiple_is_total_over_investment() {
        let classes = vec![
            preferred("Series A", dec!(30_000), dec!(3_000_000), dec!(1), 1),
            common("Common", dec!(70_000)),
        ];
        let allocations = distribute(&classes, dec!(10_000_000));

        assert_eq!(allocations[0].roi_multiple, Some(dec!(1)));
        assert!(allocations[1].roi_multiple.is_none());
    }

    #[test]
    fn multiple_above_one_scales_the_claim() {
        let classes = vec![
            preferred("Series A", dec!(10_000), dec!(2_000_000), dec!(1.5), 1),
            common("Common", dec!(90_000)),
        ];
        let allocations = distribute(&classes, dec!(10_000_000));

        assert_eq!(allocations[0].liquidation_preference, dec!(3_000_000));
        assert_eq!(allocations[1].total_proceeds, dec!(7_000_000));
    }

    #[test]
    fn proceeds_are_never_negative_and_conserve_exit_amount() {
        // All-participating stack: the preference/residual/cap flow must
        // conserve proceeds at every exit level. (A non-participating
        // election is a hypothetical comparison against the full exit amount
        // and can over-count in aggregate; it is exercised separately above.)
        let classes = vec![
            participating(
                "Series B",
                dec!(15_000),
                dec!(5_000_000),
                dec!(1.5),
                3,
                Some(dec!(2.5)),
            ),
            participating("Series A", dec!(25_000), dec!(2_000_000), dec!(1), 2, None),
            participating("Seed", dec!(10_000), dec!(500_000), dec!(1), 1, None),
            common("Common", dec!(50_000)),
        ];

        for exit in [
            Decimal::ZERO,
            dec!(1_000_000),
            dec!(7_500_000),
            dec!(12_345_678.90),
            dec!(60_000_000),
        ] {
            let allocations = distribute(&classes, exit);
            let mut allocated = Decimal::ZERO;
            for allocation in &allocations {
                assert!(allocation.total_proceeds >= Decimal::ZERO);
                assert!(allocation.per_share_value >= Decimal::ZERO);
                allocated += allocation.total_proceeds;
            }
            // Rounding may shave cents either way.
            assert!(allocated <= exit + dec!(0.05), "exit {exit}: {allocated}");
        }
    }

    #[test]
    fn identical_inputs_produce_identical_outputs() {
        let classes = vec![
            participating(
                "Series A",
                dec!(33_333),
                dec!(1_234_567.89),
                dec!(1.25),
                2,
                Some(dec!(3)),
            ),
            preferred("Seed", dec!(11_111), dec!(250_000), dec!(1), 1),
            common("Common", dec!(55_556)),
        ];
        let first = distribute(&classes, dec!(9_876_543.21));
        let second = distribute(&classes, dec!(9_876_543.21));
        assert_eq!(first, second);
    }

    #[test]
    fn output_order_matches_input_order() {
        let classes = vec![
            common("Common", dec!(50_000)),
            preferred("Series A", dec!(50_000), dec!(1_000_000), dec!(1), 1),
        ];
        let allocations = distribute(&classes, dec!(2_000_000));
        assert_eq!(allocations[0].share_class_id, classes[0].id);
        assert_eq!(allocations[1].share_class_id, classes[1].id);
    }

    #[test]
    fn fractional_share_counts_are_truncated_in_output() {
        let classes = vec![common("Common", dec!(100_000.75))];
        let allocations = distribute(&classes, dec!(1_000_000));
        assert_eq!(allocations[0].total_shares, dec!(100_000));
    }
}

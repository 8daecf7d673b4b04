//! Progressive band allocation for income tax, dividend tax and NI.
//!
//! Band limits are held in taxable-income terms, i.e. after the personal
//! allowance. An amount is allocated by slicing the interval it occupies
//! (`[start, start + amount)`) across the bands; a band whose length works
//! out at or below zero simply takes nothing.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::rates::{NiTiers, RateTable};
use super::TaxBand;

/// Part of an amount falling in one band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BandCharge {
    pub band: TaxBand,
    #[schemars(with = "f64")]
    pub rate: Decimal,
    /// Amount charged at `rate`
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// Amount in this band covered by the dividend allowance (dividends only)
    #[serde(default)]
    #[schemars(with = "f64")]
    pub allowance: Decimal,
    #[schemars(with = "f64")]
    pub tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTaxBreakdown {
    /// Personal allowance set against non-dividend income
    #[schemars(with = "f64")]
    pub personal_allowance: Decimal,
    #[schemars(with = "f64")]
    pub taxable_income: Decimal,
    pub bands: Vec<BandCharge>,
    #[schemars(with = "f64")]
    pub total: Decimal,
}

impl IncomeTaxBreakdown {
    pub fn band_tax(&self, band: TaxBand) -> Decimal {
        self.bands
            .iter()
            .filter(|b| b.band == band)
            .map(|b| b.tax)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DividendTaxBreakdown {
    #[schemars(with = "f64")]
    pub dividends: Decimal,
    /// Personal allowance left over from other income and set against dividends
    #[schemars(with = "f64")]
    pub personal_allowance_used: Decimal,
    #[schemars(with = "f64")]
    pub allowance_used: Decimal,
    #[schemars(with = "f64")]
    pub taxable_dividends: Decimal,
    pub bands: Vec<BandCharge>,
    #[schemars(with = "f64")]
    pub total: Decimal,
}

impl DividendTaxBreakdown {
    pub fn band_tax(&self, band: TaxBand) -> Decimal {
        self.bands
            .iter()
            .filter(|b| b.band == band)
            .map(|b| b.tax)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NiBreakdown {
    #[schemars(with = "f64")]
    pub main: Decimal,
    #[schemars(with = "f64")]
    pub additional: Decimal,
    #[schemars(with = "f64")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy)]
struct BandLimit {
    band: TaxBand,
    upper: Option<Decimal>,
    rate: Decimal,
}

/// Personal allowance after the high income taper.
///
/// Reduced by one pound for every `taper_ratio` pounds of adjusted net income
/// above the taper threshold, never below zero.
pub fn tapered_personal_allowance(table: &RateTable, adjusted_net_income: Decimal) -> Decimal {
    let it = &table.income_tax;
    let excess = (adjusted_net_income - it.taper_threshold).max(Decimal::ZERO);
    let reduction = (excess / it.taper_ratio).floor();
    (it.personal_allowance - reduction).max(Decimal::ZERO)
}

/// rUK bands for someone with `personal_allowance` available.
///
/// The basic band is a fixed width: the basic threshold less the *standard*
/// allowance, not less `personal_allowance`, so a tapered allowance does not
/// widen it. The additional rate starts at the higher threshold less the
/// allowance actually available.
fn rest_of_uk_limits(table: &RateTable, personal_allowance: Decimal) -> [BandLimit; 3] {
    let it = &table.income_tax;
    let basic_upper = table.basic_band_width();
    let higher_upper = (it.higher_threshold - personal_allowance).max(basic_upper);
    [
        BandLimit {
            band: TaxBand::Basic,
            upper: Some(basic_upper),
            rate: it.basic_rate,
        },
        BandLimit {
            band: TaxBand::Higher,
            upper: Some(higher_upper),
            rate: it.higher_rate,
        },
        BandLimit {
            band: TaxBand::Additional,
            upper: None,
            rate: it.additional_rate,
        },
    ]
}

/// Split `[start, start + amount)` across `limits`, returning the part in each.
fn slice(limits: &[BandLimit], start: Decimal, amount: Decimal) -> Vec<(BandLimit, Decimal)> {
    let start = start.max(Decimal::ZERO);
    let end = start + amount.max(Decimal::ZERO);
    let mut lower = Decimal::ZERO;
    limits
        .iter()
        .map(|limit| {
            let upper = limit.upper.unwrap_or(end.max(lower));
            let part = (end.min(upper) - start.max(lower)).max(Decimal::ZERO);
            lower = upper.max(lower);
            (*limit, part)
        })
        .collect()
}

/// Income tax on non-dividend income (salary, other income, trading profit).
///
/// `personal_allowance` is the allowance available to the taxpayer, already
/// tapered (see [`tapered_personal_allowance`]). The Scottish schedule is used
/// when `scottish` is set and the year has one.
pub fn calculate_income_tax(
    table: &RateTable,
    non_dividend_income: Decimal,
    personal_allowance: Decimal,
    scottish: bool,
) -> IncomeTaxBreakdown {
    let income = non_dividend_income.max(Decimal::ZERO);
    let allowance_applied = personal_allowance.max(Decimal::ZERO).min(income);
    let taxable_income = income - allowance_applied;

    let limits: Vec<BandLimit> = match (&table.scottish_income_tax, scottish) {
        (Some(bands), true) => bands
            .iter()
            .map(|b| BandLimit {
                band: b.band,
                upper: b.upper,
                rate: b.rate,
            })
            .collect(),
        _ => rest_of_uk_limits(table, personal_allowance).to_vec(),
    };

    let bands: Vec<BandCharge> = slice(&limits, Decimal::ZERO, taxable_income)
        .into_iter()
        .map(|(limit, amount)| BandCharge {
            band: limit.band,
            rate: limit.rate,
            amount,
            allowance: Decimal::ZERO,
            tax: (amount * limit.rate).round_dp(2),
        })
        .collect();
    let total = bands.iter().map(|b| b.tax).sum();

    log::debug!(
        "Income tax: income={}, allowance={}, taxable={}, tax={}",
        income,
        allowance_applied,
        taxable_income,
        total
    );

    IncomeTaxBreakdown {
        personal_allowance: allowance_applied,
        taxable_income,
        bands,
        total,
    }
}

/// Dividend tax with dividends stacked on top of other income.
///
/// Order of application:
/// 1. the personal allowance goes against non-dividend income first, and
///    whatever is left offsets dividends;
/// 2. the remaining dividends are placed in the rUK bands above the taxable
///    non-dividend income;
/// 3. `dividend_allowance` is then consumed band by band from the lowest band
///    upwards (not pro rata), and the rest is taxed at the dividend rate for
///    its band.
///
/// `dividend_allowance` is the amount of the allowance applied to these
/// dividends, normally the year's full allowance.
pub fn calculate_dividend_tax(
    table: &RateTable,
    dividends: Decimal,
    non_dividend_income: Decimal,
    personal_allowance: Decimal,
    dividend_allowance: Decimal,
) -> DividendTaxBreakdown {
    let dividends = dividends.max(Decimal::ZERO);
    let other = non_dividend_income.max(Decimal::ZERO);
    let personal_allowance = personal_allowance.max(Decimal::ZERO);

    let allowance_left = (personal_allowance - other).max(Decimal::ZERO);
    let personal_allowance_used = allowance_left.min(dividends);
    let after_personal_allowance = dividends - personal_allowance_used;
    let taxable_other = (other - personal_allowance).max(Decimal::ZERO);

    let limits = rest_of_uk_limits(table, personal_allowance);
    let mut nil_rate_left = dividend_allowance
        .max(Decimal::ZERO)
        .min(after_personal_allowance);

    let bands: Vec<BandCharge> = slice(&limits, taxable_other, after_personal_allowance)
        .into_iter()
        .map(|(limit, part)| {
            let covered = part.min(nil_rate_left);
            nil_rate_left -= covered;
            let amount = part - covered;
            let rate = table.dividends.rate(limit.band);
            BandCharge {
                band: limit.band,
                rate,
                amount,
                allowance: covered,
                tax: (amount * rate).round_dp(2),
            }
        })
        .collect();

    let allowance_used: Decimal = bands.iter().map(|b| b.allowance).sum();
    let taxable_dividends = bands.iter().map(|b| b.amount).sum();
    let total = bands.iter().map(|b| b.tax).sum();

    log::debug!(
        "Dividend tax: dividends={}, pa_used={}, allowance_used={}, tax={}",
        dividends,
        personal_allowance_used,
        allowance_used,
        total
    );

    DividendTaxBreakdown {
        dividends,
        personal_allowance_used,
        allowance_used,
        taxable_dividends,
        bands,
        total,
    }
}

fn tiered_ni(tiers: &NiTiers, amount: Decimal) -> NiBreakdown {
    let amount = amount.max(Decimal::ZERO);
    let (main_band, additional_band) = match tiers.upper_limit {
        Some(upper) => (
            (amount.min(upper) - tiers.threshold).max(Decimal::ZERO),
            (amount - upper.max(tiers.threshold)).max(Decimal::ZERO),
        ),
        None => ((amount - tiers.threshold).max(Decimal::ZERO), Decimal::ZERO),
    };
    let main = (main_band * tiers.main_rate).round_dp(2);
    let additional = (additional_band * tiers.additional_rate).round_dp(2);
    NiBreakdown {
        main,
        additional,
        total: main + additional,
    }
}

/// Class 1 primary (employee) contributions on annual salary.
pub fn employee_ni(table: &RateTable, salary: Decimal) -> NiBreakdown {
    tiered_ni(&table.national_insurance.employee, salary)
}

/// Class 1 secondary (employer) contributions on annual salary.
pub fn employer_ni(table: &RateTable, salary: Decimal) -> NiBreakdown {
    tiered_ni(&table.national_insurance.employer, salary)
}

/// Class 4 contributions on self-employed profits.
pub fn class4_ni(table: &RateTable, profits: Decimal) -> NiBreakdown {
    tiered_ni(&table.national_insurance.class4, profits)
}

/// Student loan repayment, rounded down to whole pounds.
///
/// Unearned income (dividends, other income) only counts once it exceeds the
/// unearned income threshold, and then counts in full.
pub fn student_loan_repayment(table: &RateTable, earnings: Decimal, unearned: Decimal) -> Decimal {
    let sl = &table.student_loan;
    let unearned = if unearned > sl.unearned_income_threshold {
        unearned
    } else {
        Decimal::ZERO
    };
    let liable = (earnings.max(Decimal::ZERO) + unearned - sl.threshold).max(Decimal::ZERO);
    (liable * sl.rate).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TaxYear;
    use rust_decimal_macros::dec;

    fn rates_2024_25() -> RateTable {
        RateTable::builtin(TaxYear(2025)).unwrap()
    }

    fn income_tax(income: Decimal) -> IncomeTaxBreakdown {
        let table = rates_2024_25();
        let pa = tapered_personal_allowance(&table, income);
        calculate_income_tax(&table, income, pa, false)
    }

    #[test]
    fn allowance_taper() {
        let table = rates_2024_25();
        assert_eq!(tapered_personal_allowance(&table, dec!(100000)), dec!(12570));
        assert_eq!(tapered_personal_allowance(&table, dec!(110000)), dec!(7570));
        assert_eq!(tapered_personal_allowance(&table, dec!(110001)), dec!(7570));
        assert_eq!(tapered_personal_allowance(&table, dec!(125140)), dec!(0));
        assert_eq!(tapered_personal_allowance(&table, dec!(200000)), dec!(0));
    }

    #[test]
    fn income_below_allowance_is_untaxed() {
        let it = income_tax(dec!(10000));
        assert_eq!(it.taxable_income, dec!(0));
        assert_eq!(it.total, dec!(0));
        assert_eq!(it.personal_allowance, dec!(10000));
    }

    #[test]
    fn income_at_basic_threshold() {
        let it = income_tax(dec!(50270));
        assert_eq!(it.taxable_income, dec!(37700));
        assert_eq!(it.band_tax(TaxBand::Basic), dec!(7540));
        assert_eq!(it.band_tax(TaxBand::Higher), dec!(0));
        assert_eq!(it.total, dec!(7540));
    }

    #[test]
    fn income_in_higher_band() {
        let it = income_tax(dec!(60000));
        assert_eq!(it.band_tax(TaxBand::Higher), dec!(3892));
        assert_eq!(it.total, dec!(11432));
    }

    #[test]
    fn tapered_allowance_keeps_basic_band_width() {
        let it = income_tax(dec!(110000));
        assert_eq!(it.personal_allowance, dec!(7570));
        assert_eq!(it.taxable_income, dec!(102430));
        assert_eq!(it.bands[0].amount, dec!(37700));
        // not the basic threshold less the tapered allowance
        assert_ne!(it.bands[0].amount, dec!(50270) - it.personal_allowance);
        assert_eq!(it.bands[1].amount, dec!(64730));
        assert_eq!(it.bands[2].amount, dec!(0));
        assert_eq!(it.total, dec!(33432));
    }

    #[test]
    fn additional_rate_income() {
        let it = income_tax(dec!(150000));
        assert_eq!(it.personal_allowance, dec!(0));
        assert_eq!(it.band_tax(TaxBand::Basic), dec!(7540));
        assert_eq!(it.band_tax(TaxBand::Higher), dec!(34976));
        assert_eq!(it.band_tax(TaxBand::Additional), dec!(11187));
        assert_eq!(it.total, dec!(53703));
    }

    #[test]
    fn scottish_schedule() {
        let table = rates_2024_25();
        let it = calculate_income_tax(&table, dec!(30000), dec!(12570), true);
        assert_eq!(it.band_tax(TaxBand::Starter), dec!(438.14));
        assert_eq!(it.band_tax(TaxBand::Basic), dec!(2337));
        assert_eq!(it.band_tax(TaxBand::Intermediate), dec!(722.19));
        assert_eq!(it.total, dec!(3497.33));
    }

    #[test]
    fn scottish_flag_without_schedule_uses_rest_of_uk() {
        let mut table = rates_2024_25();
        table.scottish_income_tax = None;
        let it = calculate_income_tax(&table, dec!(30000), dec!(12570), true);
        assert_eq!(it.total, dec!(3486));
    }

    #[test]
    fn dividends_within_basic_band() {
        let table = rates_2024_25();
        let dt = calculate_dividend_tax(&table, dec!(20000), dec!(12570), dec!(12570), dec!(500));
        assert_eq!(dt.personal_allowance_used, dec!(0));
        assert_eq!(dt.allowance_used, dec!(500));
        assert_eq!(dt.taxable_dividends, dec!(19500));
        assert_eq!(dt.total, dec!(1706.25));
    }

    #[test]
    fn remaining_personal_allowance_offsets_dividends_first() {
        let table = rates_2024_25();
        let dt = calculate_dividend_tax(&table, dec!(20070), dec!(5000), dec!(12570), dec!(500));
        assert_eq!(dt.personal_allowance_used, dec!(7570));
        assert_eq!(dt.allowance_used, dec!(500));
        assert_eq!(dt.taxable_dividends, dec!(12000));
        assert_eq!(dt.total, dec!(1050));
    }

    #[test]
    fn dividends_stack_on_top_of_other_income() {
        let table = rates_2024_25();
        // taxable other income 25,000 leaves 12,700 of basic band
        let dt = calculate_dividend_tax(&table, dec!(20000), dec!(37570), dec!(12570), dec!(500));
        assert_eq!(dt.bands[0].allowance, dec!(500));
        assert_eq!(dt.bands[0].amount, dec!(12200));
        assert_eq!(dt.band_tax(TaxBand::Basic), dec!(1067.50));
        assert_eq!(dt.bands[1].amount, dec!(7300));
        assert_eq!(dt.band_tax(TaxBand::Higher), dec!(2463.75));
        assert_eq!(dt.total, dec!(3531.25));
    }

    #[test]
    fn dividend_allowance_consumed_from_lowest_band_upwards() {
        let table = rates_2024_25();
        // only 100 of basic band left above other income
        let dt = calculate_dividend_tax(&table, dec!(1000), dec!(50170), dec!(12570), dec!(500));
        assert_eq!(dt.bands[0].allowance, dec!(100));
        assert_eq!(dt.bands[0].amount, dec!(0));
        assert_eq!(dt.bands[1].allowance, dec!(400));
        assert_eq!(dt.bands[1].amount, dec!(500));
        assert_eq!(dt.total, dec!(168.75));
    }

    #[test]
    fn more_dividend_allowance_never_increases_tax() {
        let table = rates_2024_25();
        let mut previous = None;
        for allowance in [dec!(0), dec!(250), dec!(500), dec!(1000), dec!(2000), dec!(50000)] {
            let tax = calculate_dividend_tax(&table, dec!(30000), dec!(45000), dec!(12570), allowance)
                .total;
            if let Some(prev) = previous {
                assert!(tax <= prev, "{allowance}: {tax} > {prev}");
            }
            previous = Some(tax);
        }
        assert_eq!(previous, Some(dec!(0)));
    }

    #[test]
    fn zero_dividends_zero_tax() {
        let table = rates_2024_25();
        let dt = calculate_dividend_tax(&table, dec!(0), dec!(80000), dec!(12570), dec!(500));
        assert_eq!(dt.total, dec!(0));
        assert!(dt.bands.iter().all(|b| b.amount.is_zero() && b.allowance.is_zero()));
    }

    #[test]
    fn employee_ni_tiers() {
        let table = rates_2024_25();
        assert_eq!(employee_ni(&table, dec!(12570)).total, dec!(0));
        assert_eq!(employee_ni(&table, dec!(30000)).total, dec!(1394.40));
        let high = employee_ni(&table, dec!(60000));
        assert_eq!(high.main, dec!(3016));
        assert_eq!(high.additional, dec!(194.60));
        assert_eq!(high.total, dec!(3210.60));
    }

    #[test]
    fn employer_ni_has_no_upper_tier() {
        let table = rates_2024_25();
        assert_eq!(employer_ni(&table, dec!(9100)).total, dec!(0));
        assert_eq!(employer_ni(&table, dec!(12570)).total, dec!(478.86));
        let high = employer_ni(&table, dec!(100000));
        assert_eq!(high.additional, dec!(0));
        assert_eq!(high.main, dec!(12544.20));

        let next_year = RateTable::builtin(TaxYear(2026)).unwrap();
        assert_eq!(employer_ni(&next_year, dec!(12570)).total, dec!(1135.50));
    }

    #[test]
    fn class4_ni_tiers() {
        let table = rates_2024_25();
        assert_eq!(class4_ni(&table, dec!(60000)).total, dec!(2456.60));
        assert_eq!(class4_ni(&table, dec!(-500)).total, dec!(0));
    }

    #[test]
    fn student_loan_counts_unearned_income_over_threshold() {
        let table = rates_2024_25();
        assert_eq!(student_loan_repayment(&table, dec!(40000), dec!(1500)), dec!(1143));
        assert_eq!(student_loan_repayment(&table, dec!(40000), dec!(3000)), dec!(1413));
        assert_eq!(student_loan_repayment(&table, dec!(20000), dec!(0)), dec!(0));
    }
}

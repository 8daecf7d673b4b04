use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::rates::RateTable;
use super::ratio;

/// Which part of the corporation tax regime a profit falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProfitRegime {
    SmallProfits,
    MarginalRelief,
    Main,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporationTaxBreakdown {
    #[schemars(with = "f64")]
    pub taxable_profit: Decimal,
    pub regime: ProfitRegime,
    /// Relief deducted from tax at the main rate (zero outside the band)
    #[schemars(with = "f64")]
    pub marginal_relief: Decimal,
    #[schemars(with = "f64")]
    pub tax: Decimal,
    #[schemars(with = "f64")]
    pub effective_rate: Decimal,
}

/// Corporation tax on a year's taxable profit.
///
/// Up to the lower threshold the small profits rate applies, from the upper
/// threshold the main rate; in between, tax at the main rate less
/// `(upper - profit) * fraction`. Losses are charged nothing.
pub fn calculate_corporation_tax(table: &RateTable, taxable_profit: Decimal) -> CorporationTaxBreakdown {
    let ct = &table.corporation_tax;
    let profit = taxable_profit.max(Decimal::ZERO);

    let (regime, marginal_relief, tax) = if profit <= ct.lower_threshold {
        (ProfitRegime::SmallProfits, Decimal::ZERO, profit * ct.small_rate)
    } else if profit >= ct.upper_threshold {
        (ProfitRegime::Main, Decimal::ZERO, profit * ct.main_rate)
    } else {
        let relief = ((ct.upper_threshold - profit) * ct.marginal_relief_fraction).round_dp(2);
        (
            ProfitRegime::MarginalRelief,
            relief,
            profit * ct.main_rate - relief,
        )
    };
    let tax = tax.max(Decimal::ZERO).round_dp(2);

    log::debug!(
        "Corporation tax: profit={}, regime={:?}, relief={}, tax={}",
        profit,
        regime,
        marginal_relief,
        tax
    );

    CorporationTaxBreakdown {
        taxable_profit: profit,
        regime,
        marginal_relief,
        tax,
        effective_rate: ratio(tax, profit).round_dp(4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::TaxYear;
    use rust_decimal_macros::dec;

    fn ct(profit: Decimal) -> CorporationTaxBreakdown {
        calculate_corporation_tax(&RateTable::builtin(TaxYear(2025)).unwrap(), profit)
    }

    #[test]
    fn lower_threshold_is_small_profits_rate() {
        let result = ct(dec!(50000));
        assert_eq!(result.regime, ProfitRegime::SmallProfits);
        assert_eq!(result.tax, dec!(9500));
    }

    #[test]
    fn upper_threshold_is_main_rate() {
        let result = ct(dec!(250000));
        assert_eq!(result.regime, ProfitRegime::Main);
        assert_eq!(result.tax, dec!(62500));
    }

    #[test]
    fn marginal_relief_between_thresholds() {
        let result = ct(dec!(150000));
        assert_eq!(result.regime, ProfitRegime::MarginalRelief);
        assert_eq!(result.marginal_relief, dec!(1500));
        assert_eq!(result.tax, dec!(36000));
        assert!(result.effective_rate > dec!(0.19));
        assert!(result.effective_rate < dec!(0.25));
    }

    #[test]
    fn marginal_relief_is_continuous_at_both_thresholds() {
        let just_above = ct(dec!(50001));
        assert_eq!(just_above.tax, dec!(9500.27));
        let just_below = ct(dec!(249999));
        assert_eq!(just_below.tax, dec!(62499.73));
    }

    #[test]
    fn losses_pay_no_tax() {
        let result = ct(dec!(-1000));
        assert_eq!(result.tax, dec!(0));
        assert_eq!(result.taxable_profit, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
    }

    #[test]
    fn flat_rate_year_without_relief() {
        let mut table = RateTable::builtin(TaxYear(2025)).unwrap();
        table.corporation_tax.main_rate = dec!(0.19);
        table.corporation_tax.marginal_relief_fraction = dec!(0);
        let result = calculate_corporation_tax(&table, dec!(100000));
        assert_eq!(result.tax, dec!(19000));
    }
}

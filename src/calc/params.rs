use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tax::{CurrentArrangement, EngineError, ScenarioFlags, SearchConstraints, TaxYear};

/// A request to the engine, as read from a parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationParams {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub tax_year: TaxYear,
    pub calculation: Calculation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Calculation {
    SalaryOptimisation(SalaryOptimisationParams),
    ScenarioComparison(ScenarioComparisonParams),
    CorporationTax(CorporationTaxParams),
    IncomeTax(IncomeTaxParams),
    SoleTrader(SoleTraderParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CalculationType {
    SalaryOptimisation,
    ScenarioComparison,
    CorporationTax,
    IncomeTax,
    SoleTrader,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationType::SalaryOptimisation => "salaryOptimisation",
            CalculationType::ScenarioComparison => "scenarioComparison",
            CalculationType::CorporationTax => "corporationTax",
            CalculationType::IncomeTax => "incomeTax",
            CalculationType::SoleTrader => "soleTrader",
        }
    }
}

impl std::fmt::Display for CalculationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Calculation {
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            Calculation::SalaryOptimisation(_) => CalculationType::SalaryOptimisation,
            Calculation::ScenarioComparison(_) => CalculationType::ScenarioComparison,
            Calculation::CorporationTax(_) => CalculationType::CorporationTax,
            Calculation::IncomeTax(_) => CalculationType::IncomeTax,
            Calculation::SoleTrader(_) => CalculationType::SoleTrader,
        }
    }
}

/// Either `availableProfit` or `targetTakeHome` must be given. When both
/// are, the profit wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryOptimisationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub available_profit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub target_take_home: Option<Decimal>,
    #[serde(default)]
    pub constraints: SearchConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_arrangement: Option<CurrentArrangement>,
}

pub(crate) enum OptimisationGoal {
    Profit(Decimal),
    TargetTakeHome(Decimal),
}

impl SalaryOptimisationParams {
    pub(crate) fn goal(&self) -> Result<OptimisationGoal, EngineError> {
        match (self.available_profit, self.target_take_home) {
            (Some(profit), target) => {
                if target.is_some() {
                    log::warn!("Both availableProfit and targetTakeHome given, using availableProfit");
                }
                Ok(OptimisationGoal::Profit(profit))
            }
            (None, Some(target)) => Ok(OptimisationGoal::TargetTakeHome(target)),
            (None, None) => Err(EngineError::MissingField {
                calculation: "salaryOptimisation",
                field: "availableProfit or targetTakeHome",
            }),
        }
    }
}

/// Evaluate an explicit list of salaries against the same profit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparisonParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub available_profit: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Vec<f64>")]
    pub salaries: Vec<Decimal>,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    #[serde(default)]
    pub flags: ScenarioFlags,
}

impl ScenarioComparisonParams {
    pub(crate) fn validated(&self) -> Result<(Decimal, &[Decimal]), EngineError> {
        let profit = self.available_profit.ok_or(EngineError::MissingField {
            calculation: "scenarioComparison",
            field: "availableProfit",
        })?;
        if profit <= Decimal::ZERO {
            return Err(EngineError::NonPositiveProfit(profit));
        }
        if self.salaries.is_empty() {
            return Err(EngineError::MissingField {
                calculation: "scenarioComparison",
                field: "salaries",
            });
        }
        if let Some(&salary) = self.salaries.iter().find(|s| **s < Decimal::ZERO) {
            return Err(EngineError::NegativeAmount {
                field: "salaries",
                value: salary,
            });
        }
        non_negative("otherIncome", self.other_income)?;
        Ok((profit, &self.salaries))
    }
}

/// Taxable profit directly, or revenue less expenses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporationTaxParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub profit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub revenue: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub expenses: Option<Decimal>,
}

impl CorporationTaxParams {
    /// Losses are allowed and simply pay no tax.
    pub(crate) fn taxable_profit(&self) -> Result<Decimal, EngineError> {
        if let Some(profit) = self.profit {
            return Ok(profit);
        }
        let revenue = self.revenue.ok_or(EngineError::MissingField {
            calculation: "corporationTax",
            field: "profit or revenue",
        })?;
        let expenses = self.expenses.unwrap_or(Decimal::ZERO);
        non_negative("revenue", revenue)?;
        non_negative("expenses", expenses)?;
        Ok(revenue - expenses)
    }
}

/// Personal taxes on a known salary and dividend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeTaxParams {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub dividends: Decimal,
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    pub flags: ScenarioFlags,
}

impl IncomeTaxParams {
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        non_negative("salary", self.salary)?;
        non_negative("dividends", self.dividends)?;
        non_negative("otherIncome", self.other_income)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoleTraderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub trading_profit: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    #[serde(default)]
    pub flags: ScenarioFlags,
}

impl SoleTraderParams {
    pub(crate) fn validated_profit(&self) -> Result<Decimal, EngineError> {
        let profit = self.trading_profit.ok_or(EngineError::MissingField {
            calculation: "soleTrader",
            field: "tradingProfit",
        })?;
        non_negative("tradingProfit", profit)?;
        non_negative("otherIncome", self.other_income)?;
        Ok(profit)
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), EngineError> {
    if value < Decimal::ZERO {
        Err(EngineError::NegativeAmount { field, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::Objective;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_tagged_salary_optimisation() {
        let json = r#"{
            "clientId": "client-1",
            "taxYear": "2024-25",
            "calculation": {
                "type": "salaryOptimisation",
                "availableProfit": 60000,
                "constraints": { "objective": "minCostToCompany", "salaryIncrement": 500 },
                "currentArrangement": { "salary": 30000 }
            }
        }"#;
        let params: CalculationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.tax_year, TaxYear(2025));
        assert_eq!(params.company_id, None);
        match params.calculation {
            Calculation::SalaryOptimisation(p) => {
                assert_eq!(p.available_profit, Some(dec!(60000)));
                assert_eq!(p.constraints.objective, Objective::MinCostToCompany);
                assert_eq!(p.constraints.salary_increment, Some(dec!(500)));
                assert!(p.constraints.flags.consider_employer_ni);
                assert_eq!(p.current_arrangement.unwrap().salary, dec!(30000));
            }
            other => panic!("unexpected calculation {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_tax_year() {
        let json = r#"{"clientId": "c", "taxYear": "2024/25",
            "calculation": {"type": "incomeTax", "salary": 1}}"#;
        assert!(serde_json::from_str::<CalculationParams>(json).is_err());
    }

    #[test]
    fn optimisation_needs_profit_or_target() {
        let params = SalaryOptimisationParams::default();
        assert!(matches!(
            params.goal(),
            Err(EngineError::MissingField { calculation: "salaryOptimisation", .. })
        ));
    }

    #[test]
    fn corporation_tax_from_revenue_and_expenses() {
        let params = CorporationTaxParams {
            revenue: Some(dec!(120000)),
            expenses: Some(dec!(30000)),
            ..Default::default()
        };
        assert_eq!(params.taxable_profit().unwrap(), dec!(90000));

        let params = CorporationTaxParams {
            expenses: Some(dec!(30000)),
            ..Default::default()
        };
        assert!(matches!(params.taxable_profit(), Err(EngineError::MissingField { .. })));
    }

    #[test]
    fn comparison_requires_salaries() {
        let params = ScenarioComparisonParams {
            available_profit: Some(dec!(50000)),
            ..Default::default()
        };
        assert_eq!(
            params.validated().unwrap_err(),
            EngineError::MissingField {
                calculation: "scenarioComparison",
                field: "salaries"
            }
        );
    }

    #[test]
    fn negative_amounts_rejected() {
        let params = IncomeTaxParams {
            dividends: dec!(-1),
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap_err(),
            EngineError::NegativeAmount {
                field: "dividends",
                value: dec!(-1)
            }
        );
    }
}

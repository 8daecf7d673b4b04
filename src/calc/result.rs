use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::params::{Calculation, CalculationType};
use crate::tax::{
    CompanyResult, CorporationTaxBreakdown, IncomeTaxBreakdown, NiBreakdown, Objective,
    PersonalResult, Recommendation, ScenarioResult, TaxYear,
};

/// The record handed to storage once a calculation has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    pub id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub tax_year: TaxYear,
    /// Year whose rates were applied
    pub rates_tax_year: TaxYear,
    pub calculation_type: CalculationType,
    /// Date deadlines were computed from
    pub as_of: NaiveDate,
    pub summary: ResultSummary,
    pub scenarios: Vec<ScenarioResult>,
    pub report: Report,
    pub recommendations: Vec<Recommendation>,
}

impl TaxCalculationResult {
    pub fn rates_fell_back(&self) -> bool {
        self.tax_year != self.rates_tax_year
    }
}

/// Headline numbers for the chosen outcome.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub salary: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub dividends: Option<Decimal>,
    #[schemars(with = "f64")]
    pub total_tax: Decimal,
    /// Zero when no personal income is computed
    #[schemars(with = "f64")]
    pub take_home: Decimal,
    #[schemars(with = "f64")]
    pub effective_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub cost_to_company: Option<Decimal>,
}

impl ResultSummary {
    pub fn from_scenario(scenario: &ScenarioResult) -> Self {
        ResultSummary {
            salary: Some(scenario.salary()),
            dividends: Some(scenario.personal.dividends),
            total_tax: scenario.summary.total_tax,
            take_home: scenario.take_home(),
            effective_rate: scenario.summary.effective_rate,
            cost_to_company: Some(scenario.summary.cost_to_company),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// The calculation exactly as requested
    pub inputs: Calculation,
    pub results: ReportResults,
}

/// Every key is always present; sections a calculation does not produce are null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResults {
    pub personal: Option<PersonalResult>,
    pub company: Option<CompanyResult>,
    pub corporation_tax: Option<CorporationTaxBreakdown>,
    pub sole_trader: Option<SoleTraderResult>,
    pub optimisation: Option<OptimisationReport>,
    pub scenario_comparison: Option<Vec<ComparisonRow>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimisationReport {
    pub objective: Objective,
    #[schemars(with = "f64")]
    pub available_profit: Decimal,
    #[schemars(with = "f64")]
    pub min_salary: Decimal,
    #[schemars(with = "f64")]
    pub max_salary: Decimal,
    #[schemars(with = "f64")]
    pub salary_increment: Decimal,
    pub candidates_evaluated: usize,
    pub candidates_discarded: usize,
    #[schemars(with = "f64")]
    pub optimal_salary: Decimal,
    #[schemars(with = "f64")]
    pub optimal_dividends: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    #[schemars(with = "f64")]
    pub target_take_home: Decimal,
    #[schemars(with = "f64")]
    pub required_profit: Decimal,
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentComparison {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub take_home: Decimal,
    /// Optimal take-home less current take-home
    #[schemars(with = "f64")]
    pub improvement: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub dividends: Decimal,
    #[schemars(with = "f64")]
    pub total_tax: Decimal,
    #[schemars(with = "f64")]
    pub take_home: Decimal,
    #[schemars(with = "f64")]
    pub effective_rate: Decimal,
    /// Take-home given up against the best row
    #[schemars(with = "f64")]
    pub shortfall: Decimal,
    pub affordable: bool,
}

impl ComparisonRow {
    /// Rows in the order given, each measured against the best affordable take-home.
    pub fn rows(scenarios: &[ScenarioResult]) -> Vec<ComparisonRow> {
        let best = scenarios
            .iter()
            .filter(|s| !s.is_unaffordable())
            .map(|s| s.take_home())
            .max()
            .unwrap_or(Decimal::ZERO);
        scenarios
            .iter()
            .map(|s| ComparisonRow {
                salary: s.salary(),
                dividends: s.personal.dividends,
                total_tax: s.summary.total_tax,
                take_home: s.take_home(),
                effective_rate: s.summary.effective_rate,
                shortfall: (best - s.take_home()).max(Decimal::ZERO),
                affordable: !s.is_unaffordable(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoleTraderResult {
    #[schemars(with = "f64")]
    pub trading_profit: Decimal,
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    #[schemars(with = "f64")]
    pub personal_allowance: Decimal,
    #[schemars(with = "f64")]
    pub income_tax: Decimal,
    pub class4_ni: NiBreakdown,
    #[schemars(with = "f64")]
    pub student_loan: Decimal,
    #[schemars(with = "f64")]
    pub total_tax: Decimal,
    /// Trading profit and other income less income tax, Class 4 NI and student loan
    #[schemars(with = "f64")]
    pub take_home: Decimal,
    #[schemars(with = "f64")]
    pub effective_rate: Decimal,
    pub income_tax_detail: IncomeTaxBreakdown,
}

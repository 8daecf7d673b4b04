//! Flat CSV rendering of evaluated scenarios.

use std::io;

use rust_decimal::Decimal;
use serde::Serialize;
use taxopt_derive::CsvSchema;

use crate::tax::ScenarioResult;

/// One column of a CSV export, as generated by `#[derive(CsvSchema)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumn {
    pub name: &'static str,
    /// False for columns that may be left empty
    pub always_present: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, CsvSchema)]
pub struct ScenarioCsvRecord {
    /// Position in the ranking, 1 is the highest take-home
    pub rank: usize,
    /// Gross salary paid through payroll
    pub salary: Decimal,
    /// Dividends paid from post-tax profit
    pub dividends: Decimal,
    /// Employer secondary Class 1 NI
    pub employer_ni: Decimal,
    /// Corporation tax on profit after salary costs
    pub corporation_tax: Decimal,
    /// Income tax on salary and other income
    pub income_tax: Decimal,
    /// Employee primary Class 1 NI
    pub employee_ni: Decimal,
    /// Dividend tax after allowances
    pub dividend_tax: Decimal,
    /// Student loan repayment, when the flag is set
    pub student_loan: Option<Decimal>,
    /// Company and personal taxes combined
    pub total_tax: Decimal,
    /// Salary, employer NI and corporation tax
    pub cost_to_company: Decimal,
    /// Net personal cash after all deductions
    pub take_home: Decimal,
    /// Personal taxes over gross personal income
    #[serde(rename = "effective_rate_pct")]
    pub effective_rate: Decimal,
}

impl ScenarioCsvRecord {
    pub fn from_scenario(rank: usize, scenario: &ScenarioResult) -> Self {
        let student_loan = scenario
            .input
            .flags
            .student_loan
            .then_some(scenario.personal.student_loan);
        ScenarioCsvRecord {
            rank,
            salary: scenario.company.salary,
            dividends: scenario.personal.dividends,
            employer_ni: scenario.company.employer_ni,
            corporation_tax: scenario.company.corporation_tax,
            income_tax: scenario.personal.income_tax,
            employee_ni: scenario.personal.employee_ni,
            dividend_tax: scenario.personal.dividend_tax,
            student_loan,
            total_tax: scenario.summary.total_tax,
            cost_to_company: scenario.summary.cost_to_company,
            take_home: scenario.summary.take_home,
            effective_rate: (scenario.summary.effective_rate * Decimal::ONE_HUNDRED).round_dp(2),
        }
    }
}

/// Write scenarios in the order given, ranked from 1.
pub fn write_scenarios_csv<W: io::Write>(
    writer: W,
    scenarios: &[ScenarioResult],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, scenario) in scenarios.iter().enumerate() {
        wtr.serialize(ScenarioCsvRecord::from_scenario(i + 1, scenario))?;
    }
    wtr.flush()?;
    Ok(())
}

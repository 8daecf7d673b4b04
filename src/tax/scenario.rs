//! Evaluation of a single salary/dividend split.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::bands::{
    calculate_dividend_tax, calculate_income_tax, employee_ni, employer_ni,
    student_loan_repayment, tapered_personal_allowance, DividendTaxBreakdown, IncomeTaxBreakdown,
};
use super::corporation::{calculate_corporation_tax, ProfitRegime};
use super::rates::RateTable;
use super::{ratio, TaxYear};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioFlags {
    /// Use the Scottish schedule for non-dividend income
    pub scottish_taxpayer: bool,
    /// Deduct student loan repayments from take-home
    pub student_loan: bool,
    /// Charge employer NI on salary (off when the employment allowance covers it)
    pub consider_employer_ni: bool,
}

impl Default for ScenarioFlags {
    fn default() -> Self {
        ScenarioFlags {
            scottish_taxpayer: false,
            student_loan: false,
            consider_employer_ni: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    #[schemars(with = "f64")]
    pub available_profit: Decimal,
    #[schemars(with = "f64")]
    pub salary: Decimal,
    pub tax_year: TaxYear,
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    pub flags: ScenarioFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResult {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub employer_ni: Decimal,
    /// Available profit less salary and employer NI (negative when unaffordable)
    #[schemars(with = "f64")]
    pub taxable_profit: Decimal,
    pub regime: ProfitRegime,
    #[schemars(with = "f64")]
    pub marginal_relief: Decimal,
    #[schemars(with = "f64")]
    pub corporation_tax: Decimal,
    #[schemars(with = "f64")]
    pub profit_after_tax: Decimal,
    #[schemars(with = "f64")]
    pub dividend_pool: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalResult {
    #[schemars(with = "f64")]
    pub salary: Decimal,
    #[schemars(with = "f64")]
    pub dividends: Decimal,
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    /// Allowance available after the high income taper
    #[schemars(with = "f64")]
    pub personal_allowance: Decimal,
    #[schemars(with = "f64")]
    pub income_tax: Decimal,
    #[schemars(with = "f64")]
    pub employee_ni: Decimal,
    #[schemars(with = "f64")]
    pub dividend_tax: Decimal,
    #[schemars(with = "f64")]
    pub total_tax: Decimal,
    /// Not a tax, so not part of `total_tax`
    #[schemars(with = "f64")]
    pub student_loan: Decimal,
    /// Salary plus dividends less personal taxes and student loan
    #[schemars(with = "f64")]
    pub net_personal_cash: Decimal,
    pub income_tax_detail: IncomeTaxBreakdown,
    pub dividend_tax_detail: DividendTaxBreakdown,
}

impl PersonalResult {
    pub fn gross_income(&self) -> Decimal {
        self.salary + self.dividends + self.other_income
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    /// Corporation tax + employer NI + income tax + employee NI + dividend tax
    #[schemars(with = "f64")]
    pub total_tax: Decimal,
    #[schemars(with = "f64")]
    pub personal_tax: Decimal,
    /// Salary + employer NI + corporation tax
    #[schemars(with = "f64")]
    pub cost_to_company: Decimal,
    #[schemars(with = "f64")]
    pub take_home: Decimal,
    /// Personal taxes over gross personal income
    #[schemars(with = "f64")]
    pub effective_rate: Decimal,
    /// Total tax over available profit
    #[schemars(with = "f64")]
    pub overall_effective_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub input: ScenarioInput,
    pub company: CompanyResult,
    pub personal: PersonalResult,
    pub summary: ScenarioSummary,
}

impl ScenarioResult {
    pub fn salary(&self) -> Decimal {
        self.input.salary
    }

    pub fn take_home(&self) -> Decimal {
        self.summary.take_home
    }

    /// Salary costs more than the profit available to pay it.
    pub fn is_unaffordable(&self) -> bool {
        self.company.profit_after_tax < Decimal::ZERO
    }
}

/// Personal side of a salary/dividend split.
pub fn evaluate_personal(
    table: &RateTable,
    salary: Decimal,
    dividends: Decimal,
    other_income: Decimal,
    flags: ScenarioFlags,
) -> PersonalResult {
    let salary = salary.max(Decimal::ZERO);
    let dividends = dividends.max(Decimal::ZERO);
    let other_income = other_income.max(Decimal::ZERO);
    let non_dividend_income = salary + other_income;

    let personal_allowance = tapered_personal_allowance(table, non_dividend_income + dividends);
    let income_tax = calculate_income_tax(
        table,
        non_dividend_income,
        personal_allowance,
        flags.scottish_taxpayer,
    );
    let employee_ni = employee_ni(table, salary).total;
    let dividend_tax = calculate_dividend_tax(
        table,
        dividends,
        non_dividend_income,
        personal_allowance,
        table.dividends.allowance,
    );

    let total_tax = income_tax.total + employee_ni + dividend_tax.total;
    let student_loan = if flags.student_loan {
        student_loan_repayment(table, salary, other_income + dividends)
    } else {
        Decimal::ZERO
    };

    PersonalResult {
        salary,
        dividends,
        other_income,
        personal_allowance,
        income_tax: income_tax.total,
        employee_ni,
        dividend_tax: dividend_tax.total,
        total_tax,
        student_loan,
        net_personal_cash: salary + dividends - total_tax - student_loan,
        income_tax_detail: income_tax,
        dividend_tax_detail: dividend_tax,
    }
}

/// Full company and personal breakdown for one salary level, with the whole
/// of the post-tax profit paid out as dividends.
pub fn evaluate(table: &RateTable, input: &ScenarioInput) -> ScenarioResult {
    let salary = input.salary.max(Decimal::ZERO);
    let employer_ni = if input.flags.consider_employer_ni {
        employer_ni(table, salary).total
    } else {
        Decimal::ZERO
    };

    let taxable_profit = input.available_profit - salary - employer_ni;
    let ct = calculate_corporation_tax(table, taxable_profit);
    let profit_after_tax = taxable_profit - ct.tax;
    let dividend_pool = profit_after_tax.max(Decimal::ZERO);

    let company = CompanyResult {
        salary,
        employer_ni,
        taxable_profit,
        regime: ct.regime,
        marginal_relief: ct.marginal_relief,
        corporation_tax: ct.tax,
        profit_after_tax,
        dividend_pool,
    };

    let personal = evaluate_personal(table, salary, dividend_pool, input.other_income, input.flags);

    let total_tax = company.corporation_tax + company.employer_ni + personal.total_tax;
    let summary = ScenarioSummary {
        total_tax,
        personal_tax: personal.total_tax,
        cost_to_company: salary + employer_ni + company.corporation_tax,
        take_home: personal.net_personal_cash,
        effective_rate: ratio(personal.total_tax, personal.gross_income()).round_dp(4),
        overall_effective_rate: ratio(total_tax, input.available_profit).round_dp(4),
    };

    log::debug!(
        "Scenario salary={}: pool={}, total_tax={}, take_home={}",
        salary,
        dividend_pool,
        total_tax,
        summary.take_home
    );

    ScenarioResult {
        input: input.clone(),
        company,
        personal,
        summary,
    }
}

//! Human-readable rendering of a calculation result

use super::{format_gbp, format_pct};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use taxopt::calc::{ComparisonRow, CurrentComparison, SoleTraderResult, TaxCalculationResult};
use taxopt::tax::{CompanyResult, PersonalResult, Recommendation, ScenarioResult};

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Salary")]
    salary: String,
    #[tabled(rename = "Dividends")]
    dividends: String,
    #[tabled(rename = "Employer NI")]
    employer_ni: String,
    #[tabled(rename = "Corp. Tax")]
    corporation_tax: String,
    #[tabled(rename = "Income Tax")]
    income_tax: String,
    #[tabled(rename = "Employee NI")]
    employee_ni: String,
    #[tabled(rename = "Div. Tax")]
    dividend_tax: String,
    #[tabled(rename = "Total Tax")]
    total_tax: String,
    #[tabled(rename = "Take-home")]
    take_home: String,
    #[tabled(rename = "Eff. Rate")]
    effective_rate: String,
}

impl ScenarioRow {
    fn new(rank: usize, s: &ScenarioResult) -> Self {
        ScenarioRow {
            rank,
            salary: format_gbp(s.company.salary),
            dividends: format_gbp(s.personal.dividends),
            employer_ni: format_gbp(s.company.employer_ni),
            corporation_tax: format_gbp(s.company.corporation_tax),
            income_tax: format_gbp(s.personal.income_tax),
            employee_ni: format_gbp(s.personal.employee_ni),
            dividend_tax: format_gbp(s.personal.dividend_tax),
            total_tax: format_gbp(s.summary.total_tax),
            take_home: format_gbp(s.summary.take_home),
            effective_rate: format_pct(s.summary.effective_rate),
        }
    }
}

#[derive(Tabled)]
struct ComparisonTableRow {
    #[tabled(rename = "Salary")]
    salary: String,
    #[tabled(rename = "Dividends")]
    dividends: String,
    #[tabled(rename = "Total Tax")]
    total_tax: String,
    #[tabled(rename = "Take-home")]
    take_home: String,
    #[tabled(rename = "Eff. Rate")]
    effective_rate: String,
    #[tabled(rename = "vs Best")]
    shortfall: String,
}

impl From<&ComparisonRow> for ComparisonTableRow {
    fn from(row: &ComparisonRow) -> Self {
        ComparisonTableRow {
            salary: format_gbp(row.salary),
            dividends: format_gbp(row.dividends),
            total_tax: format_gbp(row.total_tax),
            take_home: format_gbp(row.take_home),
            effective_rate: format_pct(row.effective_rate),
            shortfall: if !row.affordable {
                "unaffordable".to_string()
            } else if row.shortfall.is_zero() {
                "best".to_string()
            } else {
                format_gbp(-row.shortfall)
            },
        }
    }
}

#[derive(Tabled)]
struct LineItem {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn line(item: &'static str, amount: Decimal) -> LineItem {
    LineItem {
        item,
        amount: format_gbp(amount),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

/// The current salary against the optimum. The optimum may be chosen for a
/// different objective, so the current split can take home more.
fn current_salary_line(current: &CurrentComparison) -> String {
    let difference = match current.improvement.cmp(&Decimal::ZERO) {
        Ordering::Greater => format!("{} less than optimal", format_gbp(current.improvement)),
        Ordering::Less => format!("{} more than optimal", format_gbp(-current.improvement)),
        Ordering::Equal => "same as optimal".to_string(),
    };
    format!(
        "Current salary {} takes home {} ({})",
        format_gbp(current.salary),
        format_gbp(current.take_home),
        difference
    )
}

pub fn print_result(result: &TaxCalculationResult, top: usize) {
    println!();
    println!(
        "TAX CALCULATION ({}, {}) - {}",
        result.calculation_type, result.tax_year, result.id
    );
    if result.rates_fell_back() {
        println!(
            "  Note: no rates held for {}, using {} rates",
            result.tax_year, result.rates_tax_year
        );
    }
    println!();

    let results = &result.report.results;
    if let Some(optimisation) = &results.optimisation {
        println!(
            "OPTIMISATION ({}) - profit {}",
            optimisation.objective.display(),
            format_gbp(optimisation.available_profit)
        );
        if let Some(target) = &optimisation.target {
            println!(
                "  Target take-home {} needs profit of {}",
                format_gbp(target.target_take_home),
                format_gbp(target.required_profit)
            );
        }
        println!(
            "  Salaries {} to {} in steps of {}: {} evaluated, {} unaffordable",
            format_gbp(optimisation.min_salary),
            format_gbp(optimisation.max_salary),
            format_gbp(optimisation.salary_increment),
            optimisation.candidates_evaluated,
            optimisation.candidates_discarded
        );
        println!(
            "  Optimal: salary {} + dividends {}",
            format_gbp(optimisation.optimal_salary),
            format_gbp(optimisation.optimal_dividends)
        );
        if let Some(current) = &optimisation.current {
            println!("  {}", current_salary_line(current));
        }
        println!();
    }

    if let Some(company) = &results.company {
        print_company(company);
    }
    if let Some(personal) = &results.personal {
        print_personal(personal);
    }
    if let Some(sole_trader) = &results.sole_trader {
        print_sole_trader(sole_trader);
    }

    if results.optimisation.is_some() && top > 0 {
        println!("TOP SCENARIOS");
        let rows: Vec<_> = result
            .scenarios
            .iter()
            .take(top)
            .enumerate()
            .map(|(i, s)| ScenarioRow::new(i + 1, s))
            .collect();
        print_table(rows);
        println!();
    } else if let Some(comparison) = &results.scenario_comparison {
        println!("SCENARIO COMPARISON");
        print_table(comparison.iter().map(ComparisonTableRow::from).collect());
        println!();
    }

    println!(
        "TOTAL TAX: {} | TAKE-HOME: {} | EFFECTIVE RATE: {}",
        format_gbp(result.summary.total_tax),
        format_gbp(result.summary.take_home),
        format_pct(result.summary.effective_rate)
    );
    println!();

    print_recommendations(&result.recommendations);
}

fn print_company(company: &CompanyResult) {
    println!("COMPANY");
    print_table(vec![
        line("Salary", company.salary),
        line("Employer NI", company.employer_ni),
        line("Taxable profit", company.taxable_profit),
        line("Marginal relief", company.marginal_relief),
        line("Corporation tax", company.corporation_tax),
        line("Profit after tax", company.profit_after_tax),
        line("Dividend pool", company.dividend_pool),
    ]);
    println!();
}

fn print_personal(personal: &PersonalResult) {
    println!("PERSONAL");
    let mut rows = vec![
        line("Salary", personal.salary),
        line("Dividends", personal.dividends),
    ];
    if !personal.other_income.is_zero() {
        rows.push(line("Other income", personal.other_income));
    }
    rows.extend([
        line("Personal allowance", personal.personal_allowance),
        line("Income tax", personal.income_tax),
        line("Employee NI", personal.employee_ni),
        line("Dividend tax", personal.dividend_tax),
    ]);
    if !personal.student_loan.is_zero() {
        rows.push(line("Student loan", personal.student_loan));
    }
    rows.push(line("Net personal cash", personal.net_personal_cash));
    print_table(rows);
    println!();
}

fn print_sole_trader(result: &SoleTraderResult) {
    println!("SOLE TRADER");
    let mut rows = vec![
        line("Trading profit", result.trading_profit),
        line("Personal allowance", result.personal_allowance),
        line("Income tax", result.income_tax),
        line("Class 4 NI", result.class4_ni.total),
    ];
    if !result.student_loan.is_zero() {
        rows.push(line("Student loan", result.student_loan));
    }
    rows.push(line("Take-home", result.take_home));
    print_table(rows);
    println!();
}

fn print_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        return;
    }
    println!("RECOMMENDATIONS");
    for rec in recommendations {
        let mut detail = Vec::new();
        if rec.potential_saving > Decimal::ZERO {
            detail.push(format!("saving {}", format_gbp(rec.potential_saving)));
        }
        if let Some(deadline) = rec.deadline {
            detail.push(format!("due {}", deadline.format("%Y-%m-%d")));
        }
        let detail = if detail.is_empty() {
            String::new()
        } else {
            format!(" ({})", detail.join(", "))
        };
        println!(
            "  [{}] {}: {}{}",
            rec.priority.display(),
            rec.kind.display(),
            rec.title,
            detail
        );
        println!("      {}", rec.description);
    }
    println!();
}

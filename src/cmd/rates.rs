//! Rates command - show the rate table used for a tax year

use super::{format_gbp, format_pct};
use clap::Args;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use taxopt::tax::{RateRegistry, RateTable, TaxYear};

#[derive(Args, Debug)]
pub struct RatesCommand {
    /// Tax year, e.g. 2024-25 (defaults to the latest held)
    #[arg(short, long)]
    year: Option<TaxYear>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Rate")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn amount(name: &str, value: Decimal) -> RateRow {
    RateRow {
        name: name.to_string(),
        value: format_gbp(value),
    }
}

fn rate(name: &str, value: Decimal) -> RateRow {
    RateRow {
        name: name.to_string(),
        value: format_pct(value),
    }
}

impl RatesCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let table = match self.year {
            Some(year) => registry.resolve(year).table,
            None => registry.latest(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(table)?);
            return Ok(());
        }

        let years: Vec<_> = registry.years().map(|y| y.display()).collect();
        println!();
        println!("RATES {} (held: {})", table.tax_year, years.join(", "));
        let table = Table::new(rows(table))
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

fn rows(table: &RateTable) -> Vec<RateRow> {
    let it = &table.income_tax;
    let ni = &table.national_insurance;
    let div = &table.dividends;
    let ct = &table.corporation_tax;
    let sl = &table.student_loan;

    let mut rows = vec![
        amount("Personal allowance", it.personal_allowance),
        amount("Allowance taper from", it.taper_threshold),
        rate("Basic rate", it.basic_rate),
        amount("Higher rate from", it.basic_threshold),
        rate("Higher rate", it.higher_rate),
        amount("Additional rate from", it.higher_threshold),
        rate("Additional rate", it.additional_rate),
        amount("NI lower earnings limit", ni.lower_earnings_limit),
        amount("Employee NI threshold", ni.employee.threshold),
        rate("Employee NI rate", ni.employee.main_rate),
    ];
    if let Some(limit) = ni.employee.upper_limit {
        rows.push(amount("Upper earnings limit", limit));
        rows.push(rate("Employee NI above limit", ni.employee.additional_rate));
    }
    rows.extend([
        amount("Employer NI threshold", ni.employer.threshold),
        rate("Employer NI rate", ni.employer.main_rate),
        amount("Class 4 lower profits limit", ni.class4.threshold),
        rate("Class 4 rate", ni.class4.main_rate),
        amount("Dividend allowance", div.allowance),
        rate("Dividend basic rate", div.basic_rate),
        rate("Dividend higher rate", div.higher_rate),
        rate("Dividend additional rate", div.additional_rate),
        rate("Corporation tax small profits rate", ct.small_rate),
        amount("Marginal relief from", ct.lower_threshold),
        amount("Main rate from", ct.upper_threshold),
        rate("Corporation tax main rate", ct.main_rate),
        RateRow {
            name: "Marginal relief fraction".to_string(),
            value: ct.marginal_relief_fraction.to_string(),
        },
        amount("Student loan threshold", sl.threshold),
        rate("Student loan rate", sl.rate),
        amount("Pension annual allowance", table.pension_annual_allowance),
    ]);
    if let Some(bands) = &table.scottish_income_tax {
        for band in bands {
            rows.push(rate(&format!("Scottish {} rate", band.band.display()), band.rate));
        }
    }
    rows
}

//! Income-tax command - personal taxes on a known salary and dividend

use super::{run_and_print, OutputArgs, PersonArgs};
use clap::Args;
use rust_decimal::Decimal;
use taxopt::calc::{Calculation, CalculationParams, IncomeTaxParams};
use taxopt::tax::RateRegistry;

#[derive(Args, Debug)]
pub struct IncomeTaxCommand {
    /// Gross salary
    #[arg(short, long, default_value = "0")]
    salary: Decimal,

    /// Dividends received
    #[arg(short, long, default_value = "0")]
    dividends: Decimal,

    #[command(flatten)]
    person: PersonArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl IncomeTaxCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let as_of = self.output.as_of();
        let params = CalculationParams {
            client_id: self.output.client.clone(),
            company_id: self.output.company.clone(),
            tax_year: self.person.tax_year(as_of),
            calculation: Calculation::IncomeTax(IncomeTaxParams {
                salary: self.salary,
                dividends: self.dividends,
                other_income: self.person.other_income,
                flags: self.person.flags(),
            }),
        };
        run_and_print(registry, &params, &self.output, 0)
    }
}

//! Compare command - side by side evaluation of chosen salaries

use super::{run_and_print, OutputArgs, PersonArgs};
use clap::Args;
use rust_decimal::Decimal;
use taxopt::calc::{Calculation, CalculationParams, ScenarioComparisonParams};
use taxopt::tax::RateRegistry;

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// Company profit available before salary costs
    #[arg(short, long)]
    profit: Decimal,

    /// Salaries to compare (comma separated or repeated)
    #[arg(short, long, value_delimiter = ',', num_args = 1.., required = true)]
    salary: Vec<Decimal>,

    #[command(flatten)]
    person: PersonArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl CompareCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let as_of = self.output.as_of();
        let params = CalculationParams {
            client_id: self.output.client.clone(),
            company_id: self.output.company.clone(),
            tax_year: self.person.tax_year(as_of),
            calculation: Calculation::ScenarioComparison(ScenarioComparisonParams {
                available_profit: Some(self.profit),
                salaries: self.salary.clone(),
                other_income: self.person.other_income,
                flags: self.person.flags(),
            }),
        };
        run_and_print(registry, &params, &self.output, 0)
    }
}

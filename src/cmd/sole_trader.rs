//! Sole-trader command - income tax and Class 4 NI on trading profit

use super::{run_and_print, OutputArgs, PersonArgs};
use clap::Args;
use rust_decimal::Decimal;
use taxopt::calc::{Calculation, CalculationParams, SoleTraderParams};
use taxopt::tax::RateRegistry;

#[derive(Args, Debug)]
pub struct SoleTraderCommand {
    /// Trading profit for the year
    #[arg(short, long)]
    profit: Decimal,

    #[command(flatten)]
    person: PersonArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl SoleTraderCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let as_of = self.output.as_of();
        let params = CalculationParams {
            client_id: self.output.client.clone(),
            company_id: self.output.company.clone(),
            tax_year: self.person.tax_year(as_of),
            calculation: Calculation::SoleTrader(SoleTraderParams {
                trading_profit: Some(self.profit),
                other_income: self.person.other_income,
                flags: self.person.flags(),
            }),
        };
        run_and_print(registry, &params, &self.output, 0)
    }
}

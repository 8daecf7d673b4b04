//! Corp-tax command - corporation tax with marginal relief

use super::{run_and_print, OutputArgs};
use clap::Args;
use rust_decimal::Decimal;
use taxopt::calc::{Calculation, CalculationParams, CorporationTaxParams};
use taxopt::tax::{RateRegistry, TaxYear};

#[derive(Args, Debug)]
pub struct CorpTaxCommand {
    /// Taxable profit for the year
    #[arg(short, long, required_unless_present = "revenue")]
    profit: Option<Decimal>,

    /// Turnover, when giving revenue and expenses instead of profit
    #[arg(long, conflicts_with = "profit")]
    revenue: Option<Decimal>,

    /// Allowable expenses set against revenue
    #[arg(long, requires = "revenue")]
    expenses: Option<Decimal>,

    /// Tax year, e.g. 2024-25 (defaults to the year containing today)
    #[arg(short, long)]
    year: Option<TaxYear>,

    #[command(flatten)]
    output: OutputArgs,
}

impl CorpTaxCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let as_of = self.output.as_of();
        let params = CalculationParams {
            client_id: self.output.client.clone(),
            company_id: self.output.company.clone(),
            tax_year: self.year.unwrap_or_else(|| TaxYear::from_date(as_of)),
            calculation: Calculation::CorporationTax(CorporationTaxParams {
                profit: self.profit,
                revenue: self.revenue,
                expenses: self.expenses,
            }),
        };
        run_and_print(registry, &params, &self.output, 0)
    }
}

//! Optimise command - best salary/dividend split for a profit or target

use super::{run_and_print, ObjectiveArg, OutputArgs, PersonArgs};
use clap::Args;
use rust_decimal::Decimal;
use taxopt::calc::{Calculation, CalculationParams, SalaryOptimisationParams};
use taxopt::tax::{CurrentArrangement, RateRegistry, SearchConstraints};

#[derive(Args, Debug)]
pub struct OptimiseCommand {
    /// Company profit available before salary costs
    #[arg(short, long, required_unless_present = "target")]
    profit: Option<Decimal>,

    /// Solve for the profit needed to reach this take-home instead
    #[arg(short, long, conflicts_with = "profit")]
    target: Option<Decimal>,

    /// What to optimise for
    #[arg(short, long, value_enum, default_value_t = ObjectiveArg::TakeHome)]
    objective: ObjectiveArg,

    /// Lowest salary to consider
    #[arg(long)]
    min_salary: Option<Decimal>,

    /// Highest salary to consider (defaults to the profit)
    #[arg(long)]
    max_salary: Option<Decimal>,

    /// Salary grid step (thresholds are always included)
    #[arg(long)]
    increment: Option<Decimal>,

    /// Current salary, to report the improvement on
    #[arg(long)]
    current_salary: Option<Decimal>,

    /// Current dividends (defaults to the whole post-tax profit)
    #[arg(long, requires = "current_salary")]
    current_dividends: Option<Decimal>,

    /// Number of ranked scenarios to show
    #[arg(long, default_value_t = 10)]
    top: usize,

    #[command(flatten)]
    person: PersonArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl OptimiseCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let as_of = self.output.as_of();
        let constraints = SearchConstraints {
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            salary_increment: self.increment,
            other_income: self.person.other_income,
            flags: self.person.flags(),
            objective: self.objective.into(),
        };
        let current_arrangement = self.current_salary.map(|salary| CurrentArrangement {
            salary,
            dividends: self.current_dividends,
        });

        let params = CalculationParams {
            client_id: self.output.client.clone(),
            company_id: self.output.company.clone(),
            tax_year: self.person.tax_year(as_of),
            calculation: Calculation::SalaryOptimisation(SalaryOptimisationParams {
                available_profit: self.profit,
                target_take_home: self.target,
                constraints,
                current_arrangement,
            }),
        };
        run_and_print(registry, &params, &self.output, self.top)
    }
}

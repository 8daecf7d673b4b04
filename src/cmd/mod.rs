pub mod calc;
pub mod compare;
pub mod corp_tax;
pub mod display;
pub mod income_tax;
pub mod optimise;
pub mod rates;
pub mod schema;
pub mod show;
pub mod sole_trader;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use taxopt::calc::{run as run_calculation, CalculationParams, TaxCalculationResult};
use taxopt::export::write_scenarios_csv;
use taxopt::store::{JsonDirStore, RecommendationStore, ResultStore};
use taxopt::tax::{Objective, RateRegistry, ScenarioFlags, TaxYear};

/// Built-in rates, plus any tables from the `--rates` file
pub fn load_registry(rates: Option<&Path>) -> anyhow::Result<RateRegistry> {
    match rates {
        None => Ok(RateRegistry::builtin()),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open rates file {}", path.display()))?;
            RateRegistry::from_json_reader(BufReader::new(file))
                .with_context(|| format!("Invalid rates file {}", path.display()))
        }
    }
}

/// Personal circumstances shared by the calculation commands
#[derive(Args, Debug, Clone)]
pub struct PersonArgs {
    /// Tax year, e.g. 2024-25 (defaults to the year containing today)
    #[arg(short, long)]
    pub year: Option<TaxYear>,

    /// Non-salary, non-dividend income (rental, interest, other employment)
    #[arg(long, default_value = "0")]
    pub other_income: Decimal,

    /// Apply the Scottish income tax schedule
    #[arg(long)]
    pub scottish: bool,

    /// Deduct student loan repayments from take-home
    #[arg(long)]
    pub student_loan: bool,

    /// Leave employer NI out (e.g. covered by the employment allowance)
    #[arg(long)]
    pub no_employer_ni: bool,
}

impl PersonArgs {
    pub fn flags(&self) -> ScenarioFlags {
        ScenarioFlags {
            scottish_taxpayer: self.scottish,
            student_loan: self.student_loan,
            consider_employer_ni: !self.no_employer_ni,
        }
    }

    pub fn tax_year(&self, as_of: NaiveDate) -> TaxYear {
        self.year.unwrap_or_else(|| TaxYear::from_date(as_of))
    }
}

/// Where and how a result is written
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Client the calculation is recorded against
    #[arg(long, default_value = "cli")]
    pub client: String,

    /// Company the calculation is recorded against
    #[arg(long)]
    pub company: Option<String>,

    /// Date deadlines are computed from (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Save the result (and its recommendations) in this directory
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,

    /// Output the evaluated scenarios as CSV
    #[arg(long)]
    pub csv: bool,
}

impl OutputArgs {
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_flags(self.json, self.csv)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_flags(json: bool, csv: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ObjectiveArg {
    #[default]
    TakeHome,
    Cost,
    TotalTax,
}

impl From<ObjectiveArg> for Objective {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::TakeHome => Objective::MaxTakeHome,
            ObjectiveArg::Cost => Objective::MinCostToCompany,
            ObjectiveArg::TotalTax => Objective::MinTotalTax,
        }
    }
}

/// Run, optionally save, then print in the requested format.
pub fn run_and_print(
    registry: &RateRegistry,
    params: &CalculationParams,
    output: &OutputArgs,
    top: usize,
) -> anyhow::Result<()> {
    let result = run_calculation(registry, params, output.as_of())?;
    if let Some(dir) = &output.save {
        save_result(dir, &result)?;
    }
    print_result(&result, output.format(), top)
}

pub fn print_result(
    result: &TaxCalculationResult,
    format: OutputFormat,
    top: usize,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => write_scenarios_csv(io::stdout(), &result.scenarios)?,
        OutputFormat::Text => display::print_result(result, top),
    }
    Ok(())
}

pub fn save_result(dir: &Path, result: &TaxCalculationResult) -> anyhow::Result<()> {
    let mut store = JsonDirStore::open(dir)
        .with_context(|| format!("Failed to open result store {}", dir.display()))?;
    store.store(result)?;
    store.store_recommendations(&result.id, &result.recommendations)?;
    log::info!("Saved result {} to {}", result.id, dir.display());
    Ok(())
}

pub fn format_gbp(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-£{:.2}", amount.abs())
    } else {
        format!("£{:.2}", amount)
    }
}

pub fn format_pct(rate: Decimal) -> String {
    format!("{:.2}%", rate * Decimal::ONE_HUNDRED)
}

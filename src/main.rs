mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taxopt", version, about = "UK owner-manager salary and dividend tax optimiser")]
struct Opts {
    /// JSON file of rate tables added to (or replacing) the built-in years
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the best salary/dividend split for a profit or target take-home
    Optimise(cmd::optimise::OptimiseCommand),
    /// Compare chosen salaries against the same profit
    Compare(cmd::compare::CompareCommand),
    /// Corporation tax on a year's profit
    CorpTax(cmd::corp_tax::CorpTaxCommand),
    /// Personal taxes on a given salary and dividend
    IncomeTax(cmd::income_tax::IncomeTaxCommand),
    /// Income tax and Class 4 NI for a sole trader
    SoleTrader(cmd::sole_trader::SoleTraderCommand),
    /// Run a calculation from a JSON parameter file
    Calc(cmd::calc::CalcCommand),
    /// Show the rates held for a tax year
    Rates(cmd::rates::RatesCommand),
    /// Print input and output formats
    Schema(cmd::schema::SchemaCommand),
    /// Print a saved result
    Show(cmd::show::ShowCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let opts = Opts::parse();
    log::debug!("{:?}", opts);

    let registry = cmd::load_registry(opts.rates.as_deref())?;
    match opts.command {
        Command::Optimise(optimise) => optimise.exec(&registry),
        Command::Compare(compare) => compare.exec(&registry),
        Command::CorpTax(corp_tax) => corp_tax.exec(&registry),
        Command::IncomeTax(income_tax) => income_tax.exec(&registry),
        Command::SoleTrader(sole_trader) => sole_trader.exec(&registry),
        Command::Calc(calc) => calc.exec(&registry),
        Command::Rates(rates) => rates.exec(&registry),
        Command::Schema(schema) => schema.exec(),
        Command::Show(show) => show.exec(),
    }
}

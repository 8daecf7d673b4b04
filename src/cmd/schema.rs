//! Schema command - print expected input and output formats

use clap::Args;
use schemars::schema_for;
use taxopt::calc::{CalculationParams, TaxCalculationResult};
use taxopt::export::ScenarioCsvRecord;
use taxopt::tax::rates::RateTableConfig;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which format to describe
    #[arg(value_enum, default_value = "params")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for calculation parameter files
    Params,
    /// JSON Schema for saved results
    Result,
    /// JSON Schema for entries of a --rates file
    Rates,
    /// CSV header row of the scenario export
    CsvHeader,
    /// Scenario export column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::Params => print_json(schema_for!(CalculationParams)),
            SchemaFormat::Result => print_json(schema_for!(TaxCalculationResult)),
            SchemaFormat::Rates => print_json(schema_for!(Vec<RateTableConfig>)),
            SchemaFormat::CsvHeader => {
                println!("{}", ScenarioCsvRecord::csv_header());
                Ok(())
            }
            SchemaFormat::CsvFields => {
                print_csv_fields();
                Ok(())
            }
        }
    }
}

fn print_json(schema: schemars::schema::RootSchema) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn print_csv_fields() {
    println!("Scenario CSV Format");
    println!("===================");
    println!();
    for column in ScenarioCsvRecord::csv_columns() {
        let presence = if column.always_present {
            "always"
        } else {
            "optional"
        };
        println!("{:20} ({:8})  {}", column.name, presence, column.description);
    }
    println!();
    println!("Amounts are in pounds to two decimal places; rates are percentages.");
}

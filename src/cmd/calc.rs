//! Calc command - run a calculation from a JSON parameter file

use super::{print_result, save_result, OutputArgs};
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use taxopt::calc::{self, CalculationParams};
use taxopt::store::{JsonDirStore, ResultStore};
use taxopt::tax::RateRegistry;

#[derive(Args, Debug)]
pub struct CalcCommand {
    /// Parameter file (JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Rerun into an existing saved result, keeping its id (needs --save)
    #[arg(long, requires = "save")]
    recalculate: Option<String>,

    /// Number of ranked scenarios to show
    #[arg(long, default_value_t = 10)]
    top: usize,

    #[command(flatten)]
    output: OutputArgs,
}

impl CalcCommand {
    pub fn exec(&self, registry: &RateRegistry) -> anyhow::Result<()> {
        let params = read_params(&self.file)?;
        let as_of = self.output.as_of();

        let result = match (&self.recalculate, &self.output.save) {
            (Some(id), Some(dir)) => {
                let store = JsonDirStore::open(dir)?;
                let existing = store
                    .get_by_id(id)?
                    .with_context(|| format!("No saved result with id {}", id))?;
                calc::recalculate(registry, &existing, &params, as_of)?
            }
            _ => calc::run(registry, &params, as_of)?,
        };

        if let Some(dir) = &self.output.save {
            save_result(dir, &result)?;
        }
        print_result(&result, self.output.format(), self.top)
    }
}

/// Read calculation parameters (or stdin with "-")
pub fn read_params(path: &Path) -> anyhow::Result<CalculationParams> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe parameters to stdin.");
        }
    } else {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        BufReader::new(file).read_to_end(&mut buffer)?;
    }
    serde_json::from_slice(&buffer).context("Invalid calculation parameters")
}

//! Show command - print a saved result

use super::{print_result, OutputFormat};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use taxopt::store::{JsonDirStore, RecommendationStore, ResultStore};

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Result id, as printed when the calculation ran
    id: String,

    /// Directory results were saved to
    #[arg(long, default_value = "results")]
    store: PathBuf,

    /// Only list the stored recommendations (as JSON)
    #[arg(long)]
    recommendations: bool,

    /// Number of ranked scenarios to show
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output the evaluated scenarios as CSV
    #[arg(long)]
    csv: bool,
}

impl ShowCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let store = JsonDirStore::open(&self.store)?;
        if self.recommendations {
            let recommendations = store.recommendations_for(&self.id)?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
            return Ok(());
        }
        let result = store.get_by_id(&self.id)?.with_context(|| {
            format!(
                "No saved result with id {} in {}",
                self.id,
                self.store.display()
            )
        })?;
        print_result(&result, OutputFormat::from_flags(self.json, self.csv), self.top)
    }
}

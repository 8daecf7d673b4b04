//! Where finished calculations are handed off. The engine never calls these
//! itself; the CLI stores results after a run.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::calc::TaxCalculationResult;
use crate::tax::Recommendation;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid calculation id '{0}'")]
    InvalidId(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub trait ResultStore {
    /// Insert or replace the record with the same id.
    fn store(&mut self, result: &TaxCalculationResult) -> Result<(), StoreError>;
    fn get_by_id(&self, id: &str) -> Result<Option<TaxCalculationResult>, StoreError>;
}

pub trait RecommendationStore {
    fn store_recommendations(
        &mut self,
        calculation_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError>;
    fn recommendations_for(&self, calculation_id: &str) -> Result<Vec<Recommendation>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    results: HashMap<String, TaxCalculationResult>,
    recommendations: HashMap<String, Vec<Recommendation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn store(&mut self, result: &TaxCalculationResult) -> Result<(), StoreError> {
        self.results.insert(result.id.clone(), result.clone());
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<TaxCalculationResult>, StoreError> {
        Ok(self.results.get(id).cloned())
    }
}

impl RecommendationStore for MemoryStore {
    fn store_recommendations(
        &mut self,
        calculation_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError> {
        self.recommendations
            .insert(calculation_id.to_string(), recommendations.to_vec());
        Ok(())
    }

    fn recommendations_for(&self, calculation_id: &str) -> Result<Vec<Recommendation>, StoreError> {
        Ok(self
            .recommendations
            .get(calculation_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// One pretty-printed JSON file per record in a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Creates the directory if it does not exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(JsonDirStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, id: &str, suffix: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{}{}.json", id, suffix)))
    }

    fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(Some(serde_json::from_reader(reader)?))
    }
}

impl ResultStore for JsonDirStore {
    fn store(&mut self, result: &TaxCalculationResult) -> Result<(), StoreError> {
        let path = self.path(&result.id, "")?;
        Self::write_json(&path, result)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<TaxCalculationResult>, StoreError> {
        Self::read_json(&self.path(id, "")?)
    }
}

impl RecommendationStore for JsonDirStore {
    fn store_recommendations(
        &mut self,
        calculation_id: &str,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError> {
        let path = self.path(calculation_id, ".recommendations")?;
        Self::write_json(&path, recommendations)
    }

    fn recommendations_for(&self, calculation_id: &str) -> Result<Vec<Recommendation>, StoreError> {
        let path = self.path(calculation_id, ".recommendations")?;
        Ok(Self::read_json(&path)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{self, Calculation, CalculationParams, IncomeTaxParams};
    use crate::tax::{RateRegistry, TaxYear};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn result() -> TaxCalculationResult {
        let params = CalculationParams {
            client_id: "client-1".to_string(),
            company_id: None,
            tax_year: TaxYear(2025),
            calculation: Calculation::IncomeTax(IncomeTaxParams {
                salary: dec!(12570),
                dividends: dec!(30000),
                ..Default::default()
            }),
        };
        calc::run(
            &RateRegistry::builtin(),
            &params,
            NaiveDate::from_ymd_opt(2024, 6, 25).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let result = result();
        store.store(&result).unwrap();
        store
            .store_recommendations(&result.id, &result.recommendations)
            .unwrap();

        assert_eq!(store.get_by_id(&result.id).unwrap(), Some(result.clone()));
        assert_eq!(store.get_by_id("missing").unwrap(), None);
        assert_eq!(
            store.recommendations_for(&result.id).unwrap(),
            result.recommendations
        );
        assert!(store.recommendations_for("missing").unwrap().is_empty());
    }

    #[test]
    fn json_dir_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let result = result();
        {
            let mut store = JsonDirStore::open(dir.path().join("results")).unwrap();
            store.store(&result).unwrap();
            store
                .store_recommendations(&result.id, &result.recommendations)
                .unwrap();
        }

        let store = JsonDirStore::open(dir.path().join("results")).unwrap();
        assert_eq!(store.get_by_id(&result.id).unwrap(), Some(result.clone()));
        assert_eq!(
            store.recommendations_for(&result.id).unwrap(),
            result.recommendations
        );
    }

    #[test]
    fn json_dir_store_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.get_by_id("../etc/passwd"),
            Err(StoreError::InvalidId(_))
        ));
    }
}

// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Turns the raw competition files into the derived files every
// later step reads:
//
//   Step 1: Read raw training rows     (Layer 4 - loader)
//   Step 2: Parse labels, compose text (Layer 4 - preprocessor)
//   Step 3: Read raw test rows         (Layer 4 - loader)
//   Step 4: Write train.csv / test.csv (Layer 4 - loader)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    loader::{write_derived, TestFileLoader, TrainFileLoader},
    preprocessor::LabelPreprocessor,
};
use crate::domain::{script_line::DerivedRow, traits::LineSource};

// ─── Data Paths ───────────────────────────────────────────────────────────────
/// Where the raw inputs live; derived files go next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    pub data_dir:    PathBuf,
    pub train_file:  String,
    pub test_file:   String,
    pub submit_file: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            data_dir:    PathBuf::from("data"),
            train_file:  "train_dataset_v2.tsv".to_string(),
            test_file:   "test_dataset.tsv".to_string(),
            submit_file: "submit_example.tsv".to_string(),
        }
    }
}

impl DataPaths {
    pub fn raw_train(&self) -> PathBuf {
        self.data_dir.join(&self.train_file)
    }

    pub fn raw_test(&self) -> PathBuf {
        self.data_dir.join(&self.test_file)
    }

    pub fn submit_template(&self) -> PathBuf {
        self.data_dir.join(&self.submit_file)
    }

    pub fn derived_train(&self) -> PathBuf {
        self.data_dir.join("train.csv")
    }

    pub fn derived_test(&self) -> PathBuf {
        self.data_dir.join("test.csv")
    }
}

/// Row counts of the derived files just written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedCounts {
    pub train_rows: usize,
    pub test_rows:  usize,
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    paths: DataPaths,
}

impl PrepareUseCase {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn execute(&self) -> Result<PreparedCounts> {
        let paths = &self.paths;

        // ── Steps 1–2: training rows ──────────────────────────────────────────
        let raw_train = TrainFileLoader::new(paths.raw_train()).load_all()?;
        let train_rows = LabelPreprocessor::new().process(&raw_train);
        if train_rows.is_empty() {
            bail!("No usable training rows in '{}'", paths.raw_train().display());
        }

        // ── Step 3: test rows, labels all zero ────────────────────────────────
        let test_rows: Vec<DerivedRow> = TestFileLoader::new(paths.raw_test())
            .load_all()?
            .iter()
            .map(DerivedRow::from_test)
            .collect();

        // ── Step 4: derived files ─────────────────────────────────────────────
        write_derived(&paths.derived_train(), &train_rows)?;
        write_derived(&paths.derived_test(), &test_rows)?;

        tracing::info!(
            "Prepared {} training and {} test rows in '{}'",
            train_rows.len(),
            test_rows.len(),
            paths.data_dir.display(),
        );
        Ok(PreparedCounts { train_rows: train_rows.len(), test_rows: test_rows.len() })
    }
}

// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Rebuilds a trained model from an earlier `run` and writes a
// fresh submission, without retraining:
//
//   Step 1: Load config + weights   (Layer 6 - checkpoint)
//   Step 2: Load saved tokenizer    (Layer 6 - tokenizer_store)
//   Step 3: Read derived test.csv,  (Layer 4 - loader, encoder)
//           encode it
//   Step 4: Predict in order        (Layer 5 - inferencer)
//   Step 5: Write submission        (Layer 4 - submission)

use anyhow::Result;
use burn::prelude::Backend;
use std::path::PathBuf;

use crate::application::{prepare_use_case::DataPaths, run_use_case::encode_rows};
use crate::data::{
    encoder::SampleEncoder,
    loader::DerivedFileLoader,
    submission::{submission_path, SubmissionWriter},
};
use crate::domain::traits::LineSource;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::Inferencer;

pub struct PredictUseCase {
    paths:      DataPaths,
    output_dir: PathBuf,
    model_name: String,
}

impl PredictUseCase {
    pub fn new(paths: DataPaths, output_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self { paths, output_dir: output_dir.into(), model_name: model_name.into() }
    }

    /// Returns the path of the submission written.
    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<PathBuf> {
        let inferencer = Inferencer::<B>::from_checkpoint(&CheckpointManager::new(&self.output_dir), device)?;
        let tokenizer  = TokenizerStore::new(&self.output_dir).load()?;
        let encoder    = SampleEncoder::new(tokenizer, inferencer.max_len())?;

        let rows        = DerivedFileLoader::new(self.paths.derived_test()).load_all()?;
        let samples     = encode_rows(&encoder, &rows)?;
        let predictions = inferencer.predict(&samples)?;

        let out = submission_path(&self.output_dir, &self.model_name);
        SubmissionWriter::new(self.paths.submit_template()).write(predictions.rows(), &out)?;
        Ok(out)
    }
}

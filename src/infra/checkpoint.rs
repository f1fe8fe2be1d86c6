// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores weights with Burn's CompactRecorder, and
// the run configuration as JSON.
//
// Output directory layout:
//   <dir>/
//     model_final.mpk      ← all weights after training
//     train_config.json    ← SessionConfig + model architecture
//
// Pretrained encoder:
//   <model_dir>/encoder.mpk  ← a TextEncoder record; when present
//                              it replaces the random encoder init
//                              before fine-tuning starts
//
// CompactRecorder stores half-precision MessagePack. Loading is
// type-checked: a record from a different architecture fails.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::ml::encoder::TextEncoder;
use crate::ml::model::{EmotionRegressor, EmotionRegressorConfig};
use crate::ml::trainer::SessionConfig;

const MODEL_FILE:  &str = "model_final";
const CONFIG_FILE: &str = "train_config.json";
pub const PRETRAINED_ENCODER_FILE: &str = "encoder";

/// Everything needed to rebuild the model for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedConfig {
    session: SessionConfig,
    model:   EmotionRegressorConfig,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save all model weights to {dir}/model_final.mpk.
    pub fn save_model<B: Backend>(&self, model: &EmotionRegressor<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        tracing::info!("Saved trained model to '{}.mpk'", path.display());
        Ok(())
    }

    /// Restore weights saved by `save_model` into `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  EmotionRegressor<B>,
        device: &B::Device,
    ) -> Result<EmotionRegressor<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you run training first?", path.display())
            })?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, session: &SessionConfig, model: &EmotionRegressorConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(&SavedConfig {
            session: session.clone(),
            model:   model.clone(),
        })?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<(SessionConfig, EmotionRegressorConfig)> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let saved: SavedConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))?;
        Ok((saved.session, saved.model))
    }
}

/// Load pretrained encoder weights from `<model_dir>/encoder.mpk` if present.
/// Returns the encoder unchanged (random init) when the file is missing.
pub fn load_pretrained_encoder<B: Backend>(
    encoder:   TextEncoder<B>,
    model_dir: &Path,
    device:    &B::Device,
) -> Result<TextEncoder<B>> {
    let path = model_dir.join(PRETRAINED_ENCODER_FILE);
    if !path.with_extension("mpk").exists() {
        tracing::warn!(
            "No pretrained encoder at '{}.mpk'; fine-tuning from random initialisation",
            path.display()
        );
        return Ok(encoder);
    }
    let record = CompactRecorder::new()
        .load(path.clone(), device)
        .with_context(|| format!("Cannot load pretrained encoder '{}'", path.display()))?;
    tracing::info!("Loaded pretrained encoder from '{}.mpk'", path.display());
    Ok(encoder.load_record(record))
}

// ============================================================
// Layer 2 — RunUseCase
// ============================================================
// The full single-run pipeline:
//
//   Step 1: Prepare derived files        (PrepareUseCase)
//   Step 2: Reload derived rows          (Layer 4 - loader)
//   Step 3: Load / build tokenizer       (Layer 6 - infra)
//   Step 4: Encode samples               (Layer 4 - encoder)
//   Step 5: Build model, load encoder    (Layer 5 / Layer 6)
//   Step 6: Save config                  (Layer 6 - infra)
//   Step 7: Train                        (Layer 5 - trainer)
//   Step 8: Save weights                 (Layer 6 - infra)
//   Step 9: Predict test rows in order   (Layer 5 - inferencer)
//   Step 10: Write submission            (Layer 4 - submission)
//
// Generic over the autodiff backend; the CLI picks CPU or GPU.
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::prepare_use_case::{DataPaths, PrepareUseCase};
use crate::data::{
    dataset::{EmotionDataset, EmotionSample},
    encoder::SampleEncoder,
    loader::DerivedFileLoader,
    submission::{submission_path, SubmissionWriter},
};
use crate::domain::{script_line::DerivedRow, traits::LineSource};
use crate::infra::{
    checkpoint::{load_pretrained_encoder, CheckpointManager},
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::{
    encoder::{TextEncoderConfig, MAX_POSITIONS},
    model::EmotionRegressorConfig,
    trainer::{adamw_session, SessionConfig, TrainReport},
};

pub const DEFAULT_MODEL_NAME: &str = "hfl/chinese-roberta-wwm-ext";

// ─── Run Configuration ────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub paths:         DataPaths,
    pub output_dir:    PathBuf,
    /// Holds tokenizer.json and optionally encoder.mpk
    pub model_dir:     PathBuf,
    /// Picks the encoder architecture and names the submission file
    pub model_name:    String,
    /// Cap for the fallback vocabulary when model_dir has no tokenizer
    pub vocab_size:    usize,

    // Encoder architecture overrides
    pub encoder_layers: Option<usize>,
    pub hidden_dim:     Option<usize>,
    pub num_heads:      Option<usize>,
    pub d_ff:           Option<usize>,

    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub weight_decay:  f64,
    pub warmup_ratio:  f64,
    pub max_len:       usize,
    /// Drawn at random when unset
    pub seed:          Option<u64>,
    pub log_every:     usize,
    pub num_workers:   usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            paths:          DataPaths::default(),
            output_dir:     PathBuf::from("output"),
            model_dir:      PathBuf::from("models/chinese-roberta-wwm-ext"),
            model_name:     DEFAULT_MODEL_NAME.to_string(),
            vocab_size:     21128,
            encoder_layers: None,
            hidden_dim:     None,
            num_heads:      None,
            d_ff:           None,
            epochs:         session.epochs,
            batch_size:     session.batch_size,
            learning_rate:  session.learning_rate,
            weight_decay:   session.weight_decay,
            warmup_ratio:   session.warmup_ratio,
            max_len:        session.max_len,
            seed:           None,
            log_every:      session.log_every,
            num_workers:    session.num_workers,
        }
    }
}

impl RunConfig {
    /// Validated training session settings, with the seed resolved.
    pub fn session_config(&self) -> Result<SessionConfig> {
        if self.max_len < 2 || self.max_len > MAX_POSITIONS {
            bail!("max_len must be within 2..={MAX_POSITIONS}, got {}", self.max_len);
        }
        if !(0.0..=1.0).contains(&self.warmup_ratio) {
            bail!("warmup_ratio must be within [0, 1], got {}", self.warmup_ratio);
        }
        let seed = self.seed.unwrap_or_else(rand::random);
        Ok(SessionConfig {
            epochs:        self.epochs,
            batch_size:    self.batch_size,
            learning_rate: self.learning_rate,
            weight_decay:  self.weight_decay,
            warmup_ratio:  self.warmup_ratio,
            max_len:       self.max_len,
            seed,
            log_every:     self.log_every,
            num_workers:   self.num_workers,
        })
    }

    /// Architecture for `model_name`, with any overrides applied.
    pub fn model_config(&self, vocab_size: usize) -> Result<EmotionRegressorConfig> {
        let mut encoder = TextEncoderConfig::for_model_name(&self.model_name, vocab_size);
        if let Some(n) = self.encoder_layers { encoder.num_layers = n; }
        if let Some(h) = self.hidden_dim     { encoder.hidden_dim = h; }
        if let Some(h) = self.num_heads      { encoder.num_heads = h; }
        if let Some(d) = self.d_ff           { encoder.d_ff = d; }

        if encoder.num_heads == 0 || encoder.hidden_dim % encoder.num_heads != 0 {
            bail!(
                "hidden_dim ({}) must be divisible by num_heads ({})",
                encoder.hidden_dim,
                encoder.num_heads
            );
        }
        Ok(EmotionRegressorConfig::new(encoder))
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report:     TrainReport,
    pub submission: PathBuf,
    pub rows:       usize,
}

// ─── RunUseCase ───────────────────────────────────────────────────────────────
pub struct RunUseCase {
    config: RunConfig,
}

impl RunUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<RunSummary> {
        let cfg         = &self.config;
        let session_cfg = cfg.session_config()?;
        tracing::info!("Run seed: {}", session_cfg.seed);

        // ── Step 1: derived files ─────────────────────────────────────────────
        PrepareUseCase::new(cfg.paths.clone()).execute()?;

        // ── Step 2: reload them ───────────────────────────────────────────────
        let train_rows = DerivedFileLoader::new(cfg.paths.derived_train()).load_all()?;
        let test_rows  = DerivedFileLoader::new(cfg.paths.derived_test()).load_all()?;

        // ── Step 3: tokenizer ─────────────────────────────────────────────────
        let corpus: Vec<String> = train_rows
            .iter()
            .chain(&test_rows)
            .map(|r| r.text.clone())
            .collect();
        let tokenizer = TokenizerStore::new(&cfg.model_dir)
            .load_or_build(&corpus, cfg.vocab_size, &cfg.output_dir)?;

        // ── Step 4: encode ────────────────────────────────────────────────────
        let encoder       = SampleEncoder::new(tokenizer, session_cfg.max_len)?;
        let train_samples = encode_rows(&encoder, &train_rows)?;
        let test_samples  = encode_rows(&encoder, &test_rows)?;
        tracing::info!(
            "Encoded {} training and {} test samples (max_len {})",
            train_samples.len(),
            test_samples.len(),
            encoder.max_len(),
        );

        // ── Step 5: model ─────────────────────────────────────────────────────
        let model_cfg = cfg.model_config(encoder.vocab_size())?;
        let mut model = model_cfg.init::<B>(&device);
        model.encoder = load_pretrained_encoder(model.encoder, &cfg.model_dir, &device)?;

        // ── Step 6: config for a later `predict` ──────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.output_dir);
        ckpt.save_config(&session_cfg, &model_cfg)?;

        // ── Step 7: train ─────────────────────────────────────────────────────
        let mut session = adamw_session(session_cfg, model, device)
            .with_metrics(MetricsLogger::new(&cfg.output_dir)?);
        let report = session.train(EmotionDataset::new(train_samples))?;

        // ── Step 8: weights ───────────────────────────────────────────────────
        ckpt.save_model(session.model())?;

        // ── Steps 9–10: predict and submit ────────────────────────────────────
        let predictions = session.predict(&test_samples)?;
        let means = predictions
            .columns()
            .map(|col| col.iter().sum::<f32>() / col.len().max(1) as f32);
        tracing::info!("Predicted {} rows, mean intensity {:?}", predictions.len(), means.named());

        let submission  = submission_path(&cfg.output_dir, &cfg.model_name);
        let rows = SubmissionWriter::new(cfg.paths.submit_template())
            .write(predictions.rows(), &submission)?;

        Ok(RunSummary { report, submission, rows })
    }
}

pub(crate) fn encode_rows(encoder: &SampleEncoder, rows: &[DerivedRow]) -> Result<Vec<EmotionSample>> {
    rows.iter()
        .map(|r| encoder.encode_sample(&r.text, r.labels()))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::prepare_use_case::tests::write_fixture;
    use crate::ml::testing::AutodiffTestBackend;
    use std::{fs, path::Path};

    /// A run small enough for a unit test.
    pub(crate) fn tiny_run(data_dir: &Path, output_dir: &Path) -> RunConfig {
        RunConfig {
            paths:          write_fixture(data_dir),
            output_dir:     output_dir.to_path_buf(),
            model_dir:      data_dir.join("no-such-model"),
            vocab_size:     64,
            encoder_layers: Some(1),
            hidden_dim:     Some(16),
            num_heads:      Some(2),
            d_ff:           Some(32),
            batch_size:     2,
            max_len:        16,
            seed:           Some(7),
            log_every:      1,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_session_config_validates_max_len() {
        let mut cfg = RunConfig { max_len: MAX_POSITIONS + 1, ..RunConfig::default() };
        assert!(cfg.session_config().is_err());
        cfg.max_len = 128;
        assert_eq!(cfg.session_config().unwrap().max_len, 128);
    }

    #[test]
    fn test_seed_is_kept_when_given() {
        let cfg = RunConfig { seed: Some(99), ..RunConfig::default() };
        assert_eq!(cfg.session_config().unwrap().seed, 99);
    }

    #[test]
    fn test_model_config_overrides() {
        let cfg = RunConfig { encoder_layers: Some(2), ..RunConfig::default() };
        let m = cfg.model_config(100).unwrap();
        assert_eq!(m.encoder.num_layers, 2);
        assert_eq!(m.encoder.hidden_dim, 768);
        assert_eq!(m.encoder.vocab_size, 100);

        let bad = RunConfig { hidden_dim: Some(10), num_heads: Some(3), ..RunConfig::default() };
        assert!(bad.model_config(100).is_err());
    }

    #[test]
    fn test_full_run_writes_all_outputs() {
        let data = tempfile::tempdir().unwrap();
        let out  = tempfile::tempdir().unwrap();
        let cfg  = tiny_run(data.path(), out.path());

        let summary = RunUseCase::new(cfg)
            .execute::<AutodiffTestBackend>(Default::default())
            .unwrap();

        // 3 training rows, batch 2, 1 epoch
        assert_eq!(summary.report.global_steps, 2);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.submission, out.path().join("baseline_chinese-roberta-wwm-ext.tsv"));

        for file in ["train_config.json", "metrics.csv", "model_final.mpk", "tokenizer.json"] {
            assert!(out.path().join(file).exists(), "{file} missing");
        }

        let written = fs::read_to_string(&summary.submission).unwrap();
        let rows: Vec<&str> = written.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        for row in rows {
            let (_, emotion) = row.split_once('\t').unwrap();
            let values: Vec<f32> = emotion.split(',').map(|v| v.parse().unwrap()).collect();
            assert_eq!(values.len(), 6);
            assert!(values.iter().all(|v| (0.0..=3.0).contains(v)));
        }
    }
}

// ============================================================
// Layer 5 — Inference
// ============================================================
// Forward pass only, on the non-autodiff inner backend, so no
// gradient graph is recorded. Batches are cut in input order
// and never shuffled: row i of the output belongs to sample i.
//
//   logit ─ sigmoid ─▶ [0,1] ─ ×3 ─▶ intensity in [0,3]
//
// Two entry points:
//   TrainingSession::predict — right after training, same run
//   Inferencer               — rebuilt from a saved checkpoint

use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::Optimizer,
    prelude::*,
    tensor::{activation::sigmoid, backend::AutodiffBackend},
};

use crate::data::{
    batcher::{ordered_batches, EmotionBatch, EmotionBatcher},
    dataset::EmotionSample,
};
use crate::domain::emotions::{Emotions, MAX_INTENSITY};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::EmotionRegressor;
use crate::ml::trainer::TrainingSession;

/// Per-sample predictions in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Predictions {
    rows: Vec<Emotions<f32>>,
}

impl Predictions {
    pub fn rows(&self) -> &[Emotions<f32>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// One list per emotion, each in row order.
    pub fn columns(&self) -> Emotions<Vec<f32>> {
        let column = |f: fn(&Emotions<f32>) -> f32| self.rows.iter().map(f).collect::<Vec<_>>();
        Emotions {
            love:   column(|e| e.love),
            joy:    column(|e| e.joy),
            fright: column(|e| e.fright),
            anger:  column(|e| e.anger),
            fear:   column(|e| e.fear),
            sorrow: column(|e| e.sorrow),
        }
    }
}

impl<B, O> TrainingSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<EmotionRegressor<B>, B>,
{
    /// Predict intensities for `samples` with the current weights.
    pub fn predict(&self, samples: &[EmotionSample]) -> Result<Predictions> {
        let model = self.model.valid();
        predict_with(&model, samples, self.config.batch_size, &self.device)
    }
}

/// Run `model` over `samples` in order, `batch_size` at a time.
pub fn predict_with<B: Backend>(
    model:      &EmotionRegressor<B>,
    samples:    &[EmotionSample],
    batch_size: usize,
    device:     &B::Device,
) -> Result<Predictions> {
    let batcher  = EmotionBatcher::new();
    let mut rows = Vec::with_capacity(samples.len());

    for chunk in ordered_batches(samples, batch_size) {
        let batch: EmotionBatch<B> = batcher.batch(chunk, device);
        let logits  = model.forward(batch.input_ids, batch.attention_mask);
        let columns = logits.try_map(to_intensity)?;
        rows.extend(columns.into_rows());
    }

    tracing::debug!("Predicted {} rows", rows.len());
    Ok(Predictions { rows })
}

/// Map raw logits onto the label scale: sigmoid(x) × 3.
pub fn to_intensity<B: Backend>(logits: Tensor<B, 1>) -> Result<Vec<f32>> {
    sigmoid(logits)
        .mul_scalar(MAX_INTENSITY as f32)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))
}

// ─── Inferencer ───────────────────────────────────────────────────────────────
/// A trained model restored from disk, ready to predict.
pub struct Inferencer<B: Backend> {
    model:      EmotionRegressor<B>,
    batch_size: usize,
    max_len:    usize,
    device:     B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let (session_cfg, model_cfg) = ckpt_manager.load_config()?;
        let model: EmotionRegressor<B> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self {
            model,
            batch_size: session_cfg.batch_size,
            max_len:    session_cfg.max_len,
            device,
        })
    }

    /// Sequence length the model was trained with.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn predict(&self, samples: &[EmotionSample]) -> Result<Predictions> {
        predict_with(&self.model, samples, self.batch_size, &self.device)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::testing::{tiny_config, tiny_samples, AutodiffTestBackend, TestBackend};
    use crate::ml::trainer::{adamw_session, SessionConfig};

    #[test]
    fn test_intensity_bounds_for_extreme_logits() {
        let device = Default::default();
        let logits = Tensor::<TestBackend, 1>::from_data(
            TensorData::new(vec![-1e4f32, -20.0, -1.0, 0.0, 1.0, 20.0, 1e4], [7]),
            &device,
        );
        let out = to_intensity(logits).unwrap();
        for v in &out {
            assert!((0.0..=3.0).contains(v), "{v} out of range");
        }
        assert!((out[3] - 1.5).abs() < 1e-6);
        assert!(out[2] < out[4]);
    }

    #[test]
    fn test_batch_of_sixteen_keeps_order() {
        let device  = Default::default();
        let model   = tiny_config().init::<TestBackend>(&device);
        let samples = tiny_samples(16, 8);

        let preds = predict_with(&model, &samples, 16, &device).unwrap();
        assert_eq!(preds.len(), 16);

        let columns = preds.columns();
        for (_, col) in columns.named() {
            assert_eq!(col.len(), 16);
            assert!(col.iter().all(|v| (0.0..=3.0).contains(v)));
        }

        // Each row equals the prediction for that sample alone
        for (i, sample) in samples.iter().enumerate() {
            let single = predict_with(&model, std::slice::from_ref(sample), 1, &device).unwrap();
            let (a, b) = (single.rows()[0].into_array(), preds.rows()[i].into_array());
            for (x, y) in a.iter().zip(b) {
                assert!((x - y).abs() < 1e-4, "row {i}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn test_uneven_final_batch() {
        let device  = Default::default();
        let model   = tiny_config().init::<TestBackend>(&device);
        let preds = predict_with(&model, &tiny_samples(5, 8), 2, &device).unwrap();
        assert_eq!(preds.len(), 5);
    }

    #[test]
    fn test_session_predicts_after_training() {
        let device = Default::default();
        let model  = tiny_config().init::<AutodiffTestBackend>(&device);
        let config = SessionConfig { batch_size: 4, max_len: 8, ..SessionConfig::default() };
        let mut session = adamw_session(config, model, device);

        let samples = tiny_samples(6, 8);
        session.train(crate::data::dataset::EmotionDataset::new(samples.clone())).unwrap();
        let preds = session.predict(&samples).unwrap();
        assert_eq!(preds.len(), 6);
    }
}

// ============================================================
// Layer 5 — Training Session
// ============================================================
// A TrainingSession owns everything a run mutates:
//
//   model     — encoder + pooling + six heads (autodiff backend)
//   optim     — AdamW state
//   schedule  — linear warmup/decay learning rate
//   metrics   — optional CSV sink for step logs
//
// train() runs, per batch and strictly in this order:
//
//   forward → six BCE losses → sum → backward
//           → optimizer step at lr() → schedule step → log
//
// for a fixed number of epochs. There is no validation split
// and no early stopping; `epochs` is the only stop condition.
//
// predict() (inferencer.rs) borrows the session immutably, so
// it can never overlap an optimizer step.
//
// Reference: Burn Book §5 (Custom Training Loop)
//            Loshchilov & Hutter (2019) AdamW

use anyhow::{bail, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::data::{
    batcher::{EmotionBatch, EmotionBatcher},
    dataset::{EmotionDataset, EmotionSample},
};
use crate::infra::metrics::{MetricsLogger, StepLog};
use crate::ml::model::EmotionRegressor;
use crate::ml::schedule::LinearWarmupSchedule;

// ─── Session Configuration ────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub weight_decay:  f64,
    /// Fraction of all training steps spent warming up.
    pub warmup_ratio:  f64,
    pub max_len:       usize,
    /// Shuffle seed for the training loader.
    pub seed:          u64,
    /// Emit a step log every this many global steps.
    pub log_every:     usize,
    pub num_workers:   usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            epochs:        1,
            batch_size:    16,
            learning_rate: 1e-5,
            weight_decay:  0.0,
            warmup_ratio:  0.0,
            max_len:       128,
            seed:          42,
            log_every:     100,
            num_workers:   1,
        }
    }
}

/// What a finished training run reports back.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub global_steps: usize,
    /// Mean summed loss of each epoch, in epoch order.
    pub epoch_losses: Vec<f64>,
    pub final_lr:     f64,
    pub elapsed_secs: f64,
}

// ─── TrainingSession ──────────────────────────────────────────────────────────
pub struct TrainingSession<B: AutodiffBackend, O> {
    pub(crate) config:   SessionConfig,
    pub(crate) model:    EmotionRegressor<B>,
    optim:               O,
    schedule:            LinearWarmupSchedule,
    pub(crate) device:   B::Device,
    metrics:             Option<MetricsLogger>,
}

/// Build a session that optimises with AdamW.
pub fn adamw_session<B: AutodiffBackend>(
    config: SessionConfig,
    model:  EmotionRegressor<B>,
    device: B::Device,
) -> TrainingSession<B, impl Optimizer<EmotionRegressor<B>, B>> {
    let optim = AdamWConfig::new()
        .with_weight_decay(config.weight_decay as f32)
        .with_epsilon(1e-6)
        .init::<B, EmotionRegressor<B>>();
    TrainingSession::with_optimizer(config, model, optim, device)
}

impl<B, O> TrainingSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<EmotionRegressor<B>, B>,
{
    pub fn with_optimizer(
        config: SessionConfig,
        model:  EmotionRegressor<B>,
        optim:  O,
        device: B::Device,
    ) -> Self {
        let schedule = LinearWarmupSchedule::new(config.learning_rate, config.warmup_ratio, 0);
        Self { config, model, optim, schedule, device, metrics: None }
    }

    /// Also append every step log to `metrics`.
    pub fn with_metrics(mut self, metrics: MetricsLogger) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model(&self) -> &EmotionRegressor<B> {
        &self.model
    }

    pub fn train(&mut self, dataset: EmotionDataset) -> Result<TrainReport> {
        let cfg = self.config.clone();
        if dataset.is_empty() {
            bail!("Training set is empty");
        }
        if cfg.batch_size == 0 || cfg.log_every == 0 {
            bail!("batch_size and log_every must be positive");
        }

        let batches_per_epoch = dataset.len().div_ceil(cfg.batch_size);
        let total_steps       = batches_per_epoch * cfg.epochs;
        self.schedule = LinearWarmupSchedule::new(cfg.learning_rate, cfg.warmup_ratio, total_steps);

        tracing::info!(
            "Training on {} samples: {} epochs x {} batches, warmup {} steps",
            dataset.len(),
            cfg.epochs,
            batches_per_epoch,
            self.schedule.warmup_steps(),
        );

        let loader = DataLoaderBuilder::<B, EmotionSample, EmotionBatch<B>>::new(EmotionBatcher::new())
            .batch_size(cfg.batch_size)
            .shuffle(cfg.seed)
            .num_workers(cfg.num_workers.max(1))
            .set_device(self.device.clone())
            .build(dataset);

        let started         = Instant::now();
        let mut global_step = 0usize;
        let mut window_sum  = 0.0f64;
        let mut window_len  = 0usize;
        let mut epoch_losses = Vec::with_capacity(cfg.epochs);

        for epoch in 0..cfg.epochs {
            let mut epoch_sum     = 0.0f64;
            let mut epoch_batches = 0usize;

            for (batch_idx, batch) in loader.iter().enumerate() {
                let (loss, _) = self.model.forward_loss(
                    batch.input_ids,
                    batch.attention_mask,
                    batch.targets,
                );

                let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
                if !loss_val.is_finite() {
                    bail!("Loss diverged to {loss_val} at epoch {epoch}, batch {batch_idx}");
                }

                // Backward pass + AdamW update; the gradients are consumed here
                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &self.model);
                self.model = self.optim.step(self.schedule.lr(), self.model.clone(), grads);
                let lr = self.schedule.step();

                global_step   += 1;
                epoch_sum     += loss_val;
                epoch_batches += 1;
                window_sum    += loss_val;
                window_len    += 1;

                if global_step % cfg.log_every == 0 {
                    let elapsed = started.elapsed().as_secs_f64().max(f64::EPSILON);
                    self.report(&StepLog {
                        epoch,
                        batch: batch_idx,
                        global_step,
                        mean_loss: window_sum / window_len as f64,
                        steps_per_sec: global_step as f64 / elapsed,
                        lr,
                    });
                    window_sum = 0.0;
                    window_len = 0;
                }
            }

            let mean = if epoch_batches > 0 { epoch_sum / epoch_batches as f64 } else { f64::NAN };
            tracing::info!("Epoch {} done: mean loss {:.5} over {} batches", epoch, mean, epoch_batches);
            epoch_losses.push(mean);
        }

        let report = TrainReport {
            global_steps: global_step,
            epoch_losses,
            final_lr:     self.schedule.lr(),
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        tracing::info!("Training complete: {} steps in {:.1}s", report.global_steps, report.elapsed_secs);
        Ok(report)
    }

    fn report(&self, log: &StepLog) {
        tracing::info!(
            "global step {}, epoch: {}, batch: {}, loss: {:.5}, speed: {:.2} step/s, lr: {:.10}",
            log.global_step,
            log.epoch,
            log.batch,
            log.mean_loss,
            log.steps_per_sec,
            log.lr,
        );
        if let Some(metrics) = &self.metrics {
            if let Err(e) = metrics.log(log) {
                tracing::warn!("Could not write step metrics: {e}");
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::testing::{tiny_config, tiny_samples, AutodiffTestBackend};

    fn session_config(batch_size: usize, log_every: usize) -> SessionConfig {
        SessionConfig {
            batch_size,
            log_every,
            learning_rate: 1e-3,
            max_len: 8,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_one_epoch_takes_ceil_n_over_b_steps() {
        let device  = Default::default();
        let model   = tiny_config().init::<AutodiffTestBackend>(&device);
        let mut session = adamw_session(session_config(4, 1), model, device);

        let report = session.train(EmotionDataset::new(tiny_samples(10, 8))).unwrap();
        assert_eq!(report.global_steps, 3);
        assert_eq!(report.epoch_losses.len(), 1);
        assert!(report.epoch_losses[0].is_finite());
        // No warmup: lr decays linearly to zero at the final step
        assert_eq!(report.final_lr, 0.0);
    }

    #[test]
    fn test_training_moves_head_weights() {
        let device = Default::default();
        let model  = tiny_config().init::<AutodiffTestBackend>(&device);
        let before = model.heads.love.weight.val().into_data().to_vec::<f32>().unwrap();

        let mut session = adamw_session(session_config(4, 100), model, device);
        session.train(EmotionDataset::new(tiny_samples(8, 8))).unwrap();

        let after = session.model().heads.love.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_step_logs_reach_metrics_file() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = tiny_config().init::<AutodiffTestBackend>(&device);
        let mut session = adamw_session(session_config(2, 2), model, device)
            .with_metrics(MetricsLogger::new(dir.path()).unwrap());

        session.train(EmotionDataset::new(tiny_samples(8, 8))).unwrap();

        let text = std::fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        // header + steps 2 and 4
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(2).unwrap().starts_with("4,0,3,"));
    }

    #[test]
    fn test_unwritable_metrics_do_not_stop_training() {
        let dir         = tempfile::tempdir().unwrap();
        let metrics_dir = dir.path().join("metrics");
        let logger      = MetricsLogger::new(&metrics_dir).unwrap();
        std::fs::remove_dir_all(&metrics_dir).unwrap();

        let device = Default::default();
        let model  = tiny_config().init::<AutodiffTestBackend>(&device);
        let mut session = adamw_session(session_config(2, 1), model, device).with_metrics(logger);

        let report = session.train(EmotionDataset::new(tiny_samples(8, 8))).unwrap();
        assert_eq!(report.global_steps, 4);
        assert!(!metrics_dir.exists());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let device = Default::default();
        let model  = tiny_config().init::<AutodiffTestBackend>(&device);
        let mut session = adamw_session(session_config(4, 1), model, device);
        assert!(session.train(EmotionDataset::new(Vec::new())).is_err());
    }
}

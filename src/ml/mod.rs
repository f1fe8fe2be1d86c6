// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model, loss and optimisation code lives here.
//
//   encoder.rs    — BERT-style transformer text encoder
//                   (token + position embeddings, stacked
//                   self-attention blocks)
//
//   pooling.rs    — attention pooling: one learned weight per
//                   token, softmax over the sequence, weighted
//                   sum of hidden states
//
//   heads.rs      — six independent Linear(H→1) regressors
//
//   model.rs      — encoder → pooling → heads, plus the summed
//                   training objective
//
//   loss.rs       — numerically stable BCE with logits against
//                   fractional targets
//
//   schedule.rs   — linear warmup then linear decay of the lr
//
//   trainer.rs    — TrainingSession: owns model, AdamW state
//                   and schedule; runs the epoch loop
//
//   inferencer.rs — ordered, gradient-free prediction
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

/// Transformer encoder producing per-token hidden states
pub mod encoder;

/// Attention pooling over the sequence dimension
pub mod pooling;

/// One linear regressor per emotion
pub mod heads;

/// Full emotion intensity regressor
pub mod model;

/// BCE-with-logits objective
pub mod loss;

/// Learning-rate schedule
pub mod schedule;

/// Training session and epoch loop
pub mod trainer;

/// Prediction in input order
pub mod inferencer;

#[cfg(test)]
pub(crate) mod testing;

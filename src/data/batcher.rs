// ============================================================
// Layer 4 — Emotion Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<EmotionSample>
// into tensors on the requested device.
//
//   Input:  N samples, each with sequences of length L
//   Output: input_ids [N, L], attention_mask [N, L],
//           six target vectors [N]
//
// Sequences are pre-padded by the SampleEncoder, so stacking is
// a flatten + reshape:
//   [s1_t1, ..., s1_tL, s2_t1, ..., sN_tL] → [N, L]
//
// Batch order is the order of `items`: the training loader
// shuffles before calling us, `ordered_batches` does not.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::EmotionSample;
use crate::domain::emotions::Emotions;

// ─── EmotionBatch ─────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct EmotionBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Normalised targets, one [batch_size] vector per emotion
    pub targets: Emotions<Tensor<B, 1>>,
}

// ─── EmotionBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct EmotionBatcher;

impl EmotionBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, EmotionSample, EmotionBatch<B>> for EmotionBatcher {
    fn batch(&self, items: Vec<EmotionSample>, device: &B::Device) -> EmotionBatch<B> {
        let batch_size = items.len();
        // All sequences have the same length (pre-padded)
        let seq_len = items.first().map(|s| s.seq_len()).unwrap_or(0);

        let ids_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i64))
            .collect();
        let mask_flat: Vec<i64> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i64))
            .collect();

        let input_ids = Tensor::<B, 2, Int>::from_data(
            TensorData::new(ids_flat, [batch_size, seq_len]),
            device,
        );
        let attention_mask = Tensor::<B, 2, Int>::from_data(
            TensorData::new(mask_flat, [batch_size, seq_len]),
            device,
        );

        // Column per emotion: gather field i of every sample
        let columns: [Vec<f32>; 6] = std::array::from_fn(|i| {
            items.iter().map(|s| s.targets.into_array()[i]).collect()
        });
        let targets = Emotions::from_array(columns).map(|col| {
            Tensor::<B, 1>::from_data(TensorData::new(col, [batch_size]), device)
        });

        EmotionBatch { input_ids, attention_mask, targets }
    }
}

/// Split samples into consecutive batches without reordering.
/// The last batch may be smaller than `batch_size`.
pub fn ordered_batches<'a>(
    samples:    &'a [EmotionSample],
    batch_size: usize,
) -> impl Iterator<Item = Vec<EmotionSample>> + 'a {
    samples.chunks(batch_size.max(1)).map(|c| c.to_vec())
}

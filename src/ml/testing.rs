//! Small models and samples shared by the ml unit tests.

use burn::backend::{Autodiff, NdArray};

use crate::data::dataset::EmotionSample;
use crate::domain::emotions::Emotions;
use crate::ml::encoder::TextEncoderConfig;
use crate::ml::model::EmotionRegressorConfig;

pub type TestBackend = NdArray<f32>;
pub type AutodiffTestBackend = Autodiff<TestBackend>;

pub const TINY_VOCAB: usize = 32;

/// 16-wide, single-layer encoder.
pub fn tiny_config() -> EmotionRegressorConfig {
    EmotionRegressorConfig::new(TextEncoderConfig::new(TINY_VOCAB, 16, 2, 1, 32))
}

/// `n` distinct samples of length `max_len` with varied real lengths and labels.
pub fn tiny_samples(n: usize, max_len: usize) -> Vec<EmotionSample> {
    (0..n)
        .map(|i| {
            let real = 2 + i % (max_len - 1);
            let mut input_ids: Vec<u32> = (0..real)
                .map(|t| 4 + ((i * 7 + t * 3) % (TINY_VOCAB - 4)) as u32)
                .collect();
            input_ids[0] = 2;
            input_ids[real - 1] = 3;
            let mut attention_mask = vec![1u32; real];
            input_ids.resize(max_len, 0);
            attention_mask.resize(max_len, 0);

            let level = (i % 4) as u8;
            let labels = Emotions::from_array([level, 3 - level, 0, 1, 2, level]);
            EmotionSample { input_ids, attention_mask, targets: labels.normalized() }
        })
        .collect()
}

use burn::prelude::*;

use crate::domain::emotions::Emotions;
use crate::ml::encoder::{TextEncoder, TextEncoderConfig};
use crate::ml::heads::{EmotionHeads, EmotionHeadsConfig};
use crate::ml::loss::bce_with_logits;
use crate::ml::pooling::{AttentionPooling, AttentionPoolingConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct EmotionRegressorConfig {
    pub encoder: TextEncoderConfig,
}

impl EmotionRegressorConfig {
    pub fn hidden_dim(&self) -> usize {
        self.encoder.hidden_dim
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> EmotionRegressor<B> {
        let hidden_dim = self.hidden_dim();
        EmotionRegressor {
            encoder: self.encoder.init(device),
            pooling: AttentionPoolingConfig::new(hidden_dim).init(device),
            heads:   EmotionHeadsConfig::new(hidden_dim).init(device),
        }
    }
}

/// Encoder → attention pooling → six regression heads.
#[derive(Module, Debug)]
pub struct EmotionRegressor<B: Backend> {
    pub encoder: TextEncoder<B>,
    pub pooling: AttentionPooling<B>,
    pub heads:   EmotionHeads<B>,
}

impl<B: Backend> EmotionRegressor<B> {
    /// input_ids, attention_mask: [batch, seq_len] → six logit vectors [batch]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Emotions<Tensor<B, 1>> {
        let hidden = self.encoder.forward(input_ids, attention_mask);
        let pooled = self.pooling.forward(hidden);
        self.heads.forward(pooled)
    }

    /// Sum of the six per-emotion BCE-with-logits losses.
    /// Returns the scalar loss and the logits it was computed from.
    pub fn forward_loss(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        targets:        Emotions<Tensor<B, 1>>,
    ) -> (Tensor<B, 1>, Emotions<Tensor<B, 1>>) {
        let logits = self.forward(input_ids, attention_mask);
        let [love, joy, fright, anger, fear, sorrow] = logits
            .clone()
            .zip(targets)
            .into_array()
            .map(|(logit, target)| bce_with_logits(logit, target));
        (love + joy + fright + anger + fear + sorrow, logits)
    }
}

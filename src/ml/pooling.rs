// ============================================================
// Layer 5 — Attention Pooling
// ============================================================
// Collapses per-token hidden vectors into one vector per sample
// with a learned scalar weight per position:
//
//   score_t  = w2 · tanh(W1 · h_t + b1) + b2     W1: H→512, w2: 512→1
//   weight_t = softmax_t(score_t)                over the sequence axis
//   pooled   = Σ_t weight_t · h_t                [batch, H]
//
// Weights sum to 1 for every sample. Padding positions take part
// in the softmax like any other position.
//
// Reference: Bahdanau et al. (2015) additive attention
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::softmax,
};

/// Width of the hidden scoring layer.
pub const ATTENTION_HIDDEN: usize = 512;

#[derive(Config, Debug)]
pub struct AttentionPoolingConfig {
    pub hidden_dim: usize,
    #[config(default = "ATTENTION_HIDDEN")]
    pub attention_dim: usize,
}

impl AttentionPoolingConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AttentionPooling<B> {
        AttentionPooling {
            score_hidden: LinearConfig::new(self.hidden_dim, self.attention_dim)
                .with_initializer(xavier_uniform())
                .init(device),
            score_out: LinearConfig::new(self.attention_dim, 1)
                .with_initializer(xavier_uniform())
                .init(device),
        }
    }
}

/// Xavier-uniform init for every locally-owned linear layer. Burn's
/// `LinearConfig` applies it to the bias vector too, with the layer's
/// fan-in and fan-out.
pub fn xavier_uniform() -> Initializer {
    Initializer::XavierUniform { gain: 1.0 }
}

#[derive(Module, Debug)]
pub struct AttentionPooling<B: Backend> {
    pub score_hidden: Linear<B>,
    pub score_out:    Linear<B>,
}

impl<B: Backend> AttentionPooling<B> {
    /// hidden: [batch, seq_len, H] → weights: [batch, seq_len, 1]
    pub fn attention_weights(&self, hidden: Tensor<B, 3>) -> Tensor<B, 3> {
        let scores = self.score_out.forward(self.score_hidden.forward(hidden).tanh());
        softmax(scores, 1)
    }

    /// hidden: [batch, seq_len, H] → pooled: [batch, H]
    pub fn forward(&self, hidden: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_len, hidden_dim] = hidden.dims();
        let weights = self
            .attention_weights(hidden.clone())
            .expand([batch_size, seq_len, hidden_dim]);
        (weights * hidden)
            .sum_dim(1)
            .reshape([batch_size, hidden_dim])
    }
}

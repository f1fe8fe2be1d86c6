// ============================================================
// Layer 5 — Text Encoder
// ============================================================
// BERT-shaped encoder producing one hidden vector per token:
//
//   ids ─▶ token emb + position emb ─▶ LayerNorm
//       ─▶ N × [ self-attention ─▶ add & norm ─▶ GELU FFN ─▶ add & norm ]
//       ─▶ [batch, seq_len, hidden_dim]
//
// Padding positions (mask 0) are excluded as attention keys.
// Weights start random unless a pretrained record is loaded
// (see infra::checkpoint::load_pretrained_encoder).
//
// Reference: Devlin et al. (2019) BERT
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

/// Largest position the learned position table covers.
pub const MAX_POSITIONS: usize = 512;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; adding them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct TextEncoderConfig {
    pub vocab_size:  usize,
    /// Width of every per-token hidden vector.
    pub hidden_dim:  usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    #[config(default = "MAX_POSITIONS")]
    pub max_positions: usize,
    #[config(default = 0.0)]
    pub dropout:     f64,
    #[config(default = 1e-7)]
    pub layer_norm_eps: f64,
}

impl TextEncoderConfig {
    /// Architecture matching a BERT-family checkpoint name:
    /// names containing "large" get 1024-wide, 24-layer encoders,
    /// everything else 768-wide, 12-layer.
    pub fn for_model_name(model_name: &str, vocab_size: usize) -> Self {
        if model_name.contains("large") {
            Self::new(vocab_size, 1024, 16, 24, 4096)
        } else {
            Self::new(vocab_size, 768, 12, 12, 3072)
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.hidden_dim).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_positions, self.hidden_dim).init(device);
        let embedding_norm = LayerNormConfig::new(self.hidden_dim)
            .with_epsilon(self.layer_norm_eps)
            .init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let dropout = DropoutConfig::new(self.dropout).init();
        TextEncoder {
            token_embedding, position_embedding, embedding_norm, layers, dropout,
            hidden_dim: self.hidden_dim,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.hidden_dim, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.hidden_dim, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.hidden_dim).init(device);
        let norm1 = LayerNormConfig::new(self.hidden_dim).with_epsilon(self.layer_norm_eps).init(device);
        let norm2 = LayerNormConfig::new(self.hidden_dim).with_epsilon(self.layer_norm_eps).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

/// Post-norm transformer block: attention → add & norm → GELU FFN → add & norm.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(mask_pad))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Pretrained-style text encoder: token ids + attention mask in,
/// last-layer per-token hidden vectors out.
#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub embedding_norm:     LayerNorm<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub dropout:            Dropout,
    pub hidden_dim:         usize,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids, attention_mask: [batch, seq_len] → hidden: [batch, seq_len, hidden_dim]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(self.embedding_norm.forward(tok_emb + pos_emb));

        // true = padded position, ignored as an attention key
        let mask_pad = attention_mask.equal_elem(0);
        for layer in &self.layers {
            x = layer.forward(x, mask_pad.clone());
        }
        x
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_hidden_dim_follows_model_name() {
        assert_eq!(TextEncoderConfig::for_model_name("hfl/chinese-roberta-wwm-ext", 10).hidden_dim, 768);
        assert_eq!(TextEncoderConfig::for_model_name("hfl/chinese-roberta-wwm-ext-large", 10).hidden_dim, 1024);
    }

    #[test]
    fn test_forward_shape() {
        let device  = Default::default();
        let encoder = TextEncoderConfig::new(20, 16, 2, 1, 32).init::<TestBackend>(&device);
        let ids  = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![2i64, 5, 6, 3, 0, 0, 2, 7, 3, 0, 0, 0], [2, 6]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![1i64, 1, 1, 1, 0, 0, 1, 1, 1, 0, 0, 0], [2, 6]),
            &device,
        );
        let hidden = encoder.forward(ids, mask);
        assert_eq!(hidden.dims(), [2, 6, 16]);
    }
}

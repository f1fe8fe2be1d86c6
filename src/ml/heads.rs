// ============================================================
// Layer 5 — Multi-Head Regressor
// ============================================================
// Six independent Linear(H→1) projections, one per emotion.
// They read the same pooled vector and share no weights, so
// each emotion's loss moves only its own head (plus the shared
// encoder/pooling below it).
//
// Output is the raw logit per sample; sigmoid is applied by
// the loss (training) or the inferencer (prediction).

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
};

use crate::domain::emotions::Emotions;
use crate::ml::pooling::xavier_uniform;

#[derive(Config, Debug)]
pub struct EmotionHeadsConfig {
    pub hidden_dim: usize,
}

impl EmotionHeadsConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EmotionHeads<B> {
        let head = || {
            LinearConfig::new(self.hidden_dim, 1)
                .with_initializer(xavier_uniform())
                .init(device)
        };
        EmotionHeads {
            love:   head(),
            joy:    head(),
            fright: head(),
            anger:  head(),
            fear:   head(),
            sorrow: head(),
        }
    }
}

#[derive(Module, Debug)]
pub struct EmotionHeads<B: Backend> {
    pub love:   Linear<B>,
    pub joy:    Linear<B>,
    pub fright: Linear<B>,
    pub anger:  Linear<B>,
    pub fear:   Linear<B>,
    pub sorrow: Linear<B>,
}

impl<B: Backend> EmotionHeads<B> {
    /// pooled: [batch, H] → six logit vectors of shape [batch]
    pub fn forward(&self, pooled: Tensor<B, 2>) -> Emotions<Tensor<B, 1>> {
        Emotions {
            love:   project(&self.love, pooled.clone()),
            joy:    project(&self.joy, pooled.clone()),
            fright: project(&self.fright, pooled.clone()),
            anger:  project(&self.anger, pooled.clone()),
            fear:   project(&self.fear, pooled.clone()),
            sorrow: project(&self.sorrow, pooled),
        }
    }
}

fn project<B: Backend>(head: &Linear<B>, pooled: Tensor<B, 2>) -> Tensor<B, 1> {
    let [batch_size, _] = pooled.dims();
    head.forward(pooled).reshape([batch_size])
}

use burn::data::dataset::Dataset;

use crate::domain::emotions::Emotions;

/// One encoded, padded sample.
/// Sequence format: [CLS] text [SEP] [PAD]...
#[derive(Debug, Clone)]
pub struct EmotionSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    /// Intensities divided by 3, each in [0,1].
    pub targets:        Emotions<f32>,
}

impl EmotionSample {
    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }
}

pub struct EmotionDataset {
    samples: Vec<EmotionSample>,
}

impl EmotionDataset {
    pub fn new(samples: Vec<EmotionSample>) -> Self { Self { samples } }
}

impl Dataset<EmotionSample> for EmotionDataset {
    fn get(&self, index: usize) -> Option<EmotionSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

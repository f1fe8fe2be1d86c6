// ============================================================
// Layer 4 — Sample Encoder
// ============================================================
// Turns text into a fixed-length token sequence:
//
//   [CLS] t1 t2 ... tk [SEP] [PAD] ... [PAD]
//   └──────────── exactly max_len ids ──────┘
//
//   attention_mask: 1 for CLS, tokens and SEP; 0 for padding
//
// Text longer than max_len - 2 tokens is truncated before the
// SEP is appended, so every sequence keeps both boundaries.
// Tokenisation itself is the tokenizer's job.
//
// Reference: Devlin et al. (2019) BERT, §3 input representation

use anyhow::{anyhow, bail, Result};
use tokenizers::Tokenizer;

use crate::data::dataset::EmotionSample;
use crate::domain::emotions::Emotions;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const PAD_TOKEN: &str = "[PAD]";

/// Token ids and mask for one text, both exactly `max_len` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedText {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
}

pub struct SampleEncoder {
    tokenizer: Tokenizer,
    max_len:   usize,
    cls_id:    u32,
    sep_id:    u32,
    pad_id:    u32,
}

impl SampleEncoder {
    pub fn new(tokenizer: Tokenizer, max_len: usize) -> Result<Self> {
        if max_len < 2 {
            bail!("max_len must leave room for [CLS] and [SEP], got {max_len}");
        }
        let lookup = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| anyhow!("Tokenizer vocabulary has no {token} token"))
        };
        let cls_id = lookup(CLS_TOKEN)?;
        let sep_id = lookup(SEP_TOKEN)?;
        let pad_id = lookup(PAD_TOKEN)?;
        Ok(Self { tokenizer, max_len, cls_id, sep_id, pad_id })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Vocabulary size including added tokens; the embedding table
    /// must be at least this large.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    pub fn encode(&self, text: &str) -> Result<EncodedText> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;

        let body = enc.get_ids();
        let keep = body.len().min(self.max_len - 2);

        let mut input_ids = Vec::with_capacity(self.max_len);
        input_ids.push(self.cls_id);
        input_ids.extend_from_slice(&body[..keep]);
        input_ids.push(self.sep_id);

        let mut attention_mask = vec![1u32; input_ids.len()];
        input_ids.resize(self.max_len, self.pad_id);
        attention_mask.resize(self.max_len, 0);

        Ok(EncodedText { input_ids, attention_mask })
    }

    /// Encode text and attach [0,1]-normalised targets.
    pub fn encode_sample(&self, text: &str, labels: Emotions<u8>) -> Result<EmotionSample> {
        let EncodedText { input_ids, attention_mask } = self.encode(text)?;
        Ok(EmotionSample { input_ids, attention_mask, targets: labels.normalized() })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::build_char_tokenizer;

    fn encoder(max_len: usize) -> SampleEncoder {
        let corpus = vec!["你好角色: 张三".to_string(), "hello world".to_string()];
        let tok    = build_char_tokenizer(&corpus, 100).unwrap();
        SampleEncoder::new(tok, max_len).unwrap()
    }

    #[test]
    fn test_length_is_fixed_for_any_input() {
        let enc = encoder(8);
        for text in ["", "你", "你好角色: 张三", "hello world hello world hello world"] {
            let out = enc.encode(text).unwrap();
            assert_eq!(out.input_ids.len(), 8, "ids for {text:?}");
            assert_eq!(out.attention_mask.len(), 8, "mask for {text:?}");
        }
    }

    #[test]
    fn test_boundaries_and_padding() {
        let enc = encoder(8);
        let out = enc.encode("你好").unwrap();
        assert_eq!(out.input_ids[0], enc.cls_id);
        assert_eq!(out.input_ids[3], enc.sep_id);
        assert_eq!(out.input_ids[4..], [enc.pad_id; 4]);
        assert_eq!(out.attention_mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_truncation_keeps_sep() {
        let enc = encoder(4);
        let out = enc.encode("hello world hello world").unwrap();
        assert_eq!(out.input_ids[3], enc.sep_id);
        assert_eq!(out.attention_mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_rejects_tiny_max_len() {
        let corpus = vec!["a".to_string()];
        let tok    = build_char_tokenizer(&corpus, 10).unwrap();
        assert!(SampleEncoder::new(tok, 1).is_err());
    }

    #[test]
    fn test_encode_sample_normalises_targets() {
        let enc    = encoder(6);
        let sample = enc
            .encode_sample("你好", Emotions::from_array([0, 1, 2, 3, 0, 1]))
            .unwrap();
        assert_eq!(sample.targets.anger, 1.0);
        assert_eq!(sample.input_ids.len(), 6);
    }
}

// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Supplies the tokenizer the SampleEncoder runs on.
//
//   <model_dir>/tokenizer.json present → load it (HuggingFace
//       format, e.g. exported from a BERT-family checkpoint)
//   otherwise → build a character-level vocabulary from the
//       corpus
//
// The tokenizer in use is always saved next to the run outputs.
//
// The fallback uses BertNormalizer with handle_chinese_chars,
// which surrounds every CJK character with spaces, so Chinese
// text ends up one token per character.
//
// Special tokens get the first five ids:
//   [PAD]=0 [UNK]=1 [CLS]=2 [SEP]=3 [MASK]=4

use anyhow::{anyhow, Context, Result};
use std::{collections::HashMap, path::{Path, PathBuf}, str::FromStr};
use tokenizers::{
    Normalizer, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer,
};

const TOKENIZER_FILE: &str = "tokenizer.json";
const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load `tokenizer.json` from the store, or build one from `texts`.
    /// Either way a copy is written to `save_dir` so a later `predict`
    /// run encodes with exactly the same vocabulary.
    pub fn load_or_build(
        &self,
        texts:      &[String],
        vocab_size: usize,
        save_dir:   &Path,
    ) -> Result<Tokenizer> {
        let tokenizer = if self.dir.join(TOKENIZER_FILE).exists() {
            tracing::info!("Loading tokenizer from '{}'", self.dir.display());
            self.load()?
        } else {
            tracing::warn!(
                "No {} in '{}'; building a character-level vocabulary (max {})",
                TOKENIZER_FILE,
                self.dir.display(),
                vocab_size,
            );
            build_char_tokenizer(texts, vocab_size)?
        };

        std::fs::create_dir_all(save_dir).ok();
        let path = save_dir.join(TOKENIZER_FILE);
        tokenizer
            .save(&path, true)
            .map_err(|e| anyhow!("Cannot save tokenizer to '{}': {e}", path.display()))?;
        Ok(tokenizer)
    }

    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join(TOKENIZER_FILE);
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {e}", path.display()))
    }
}

/// Build a WordLevel tokenizer over the `vocab_size - 5` most frequent
/// pieces of `texts`, plus the five special tokens.
///
/// Pieces come from the tokenizer's own normalizer and pre-tokenizer,
/// so every counted piece is one the final tokenizer can look up.
pub fn build_char_tokenizer(texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
    let splitter = tokenizer_from_vocab(special_vocab())?;

    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for piece in split_pieces(&splitter, text)? {
            *freq.entry(piece).or_insert(0) += 1;
        }
    }

    // Most frequent first; ties broken alphabetically so ids are stable
    let mut words: Vec<(String, usize)> = freq
        .into_iter()
        .filter(|(word, _)| !SPECIAL_TOKENS.contains(&word.as_str()))
        .collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));

    let mut vocab = special_vocab();
    for (word, _) in words {
        let id = vocab.len();
        vocab.insert(word, serde_json::json!(id));
    }

    let tokenizer = tokenizer_from_vocab(vocab)?;
    tracing::info!("Built tokenizer with {} entries", tokenizer.get_vocab_size(true));
    Ok(tokenizer)
}

fn special_vocab() -> serde_json::Map<String, serde_json::Value> {
    SPECIAL_TOKENS
        .iter()
        .enumerate()
        .map(|(id, token)| (token.to_string(), serde_json::json!(id)))
        .collect()
}

fn tokenizer_from_vocab(vocab: serde_json::Map<String, serde_json::Value>) -> Result<Tokenizer> {
    let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
        .iter()
        .enumerate()
        .map(|(id, token)| serde_json::json!({
            "id": id, "content": token, "single_word": false, "lstrip": false,
            "rstrip": false, "normalized": false, "special": true
        }))
        .collect();

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added_tokens,
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": false,
            "lowercase": true
        },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    Tokenizer::from_str(&tokenizer_json.to_string())
        .map_err(|e| anyhow!("Cannot build tokenizer: {e}"))
        .context("Fallback vocabulary is not a valid tokenizer definition")
}

/// Run `text` through the tokenizer's normalizer and pre-tokenizer and
/// return the resulting pieces.
fn split_pieces(tokenizer: &Tokenizer, text: &str) -> Result<Vec<String>> {
    let mut pretokenized = PreTokenizedString::from(text);
    if let Some(normalizer) = tokenizer.get_normalizer() {
        pretokenized
            .normalize(|s| normalizer.normalize(s))
            .map_err(|e| anyhow!("Cannot normalise '{text}': {e}"))?;
    }
    if let Some(pre_tokenizer) = tokenizer.get_pre_tokenizer() {
        pre_tokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| anyhow!("Cannot pre-tokenise '{text}': {e}"))?;
    }
    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.to_string())
        .collect())
}

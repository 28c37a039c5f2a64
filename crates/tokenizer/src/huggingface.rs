//! `tokenizer.json` encoders via the `tokenizers` crate.

use stanza_core::{TokenId, Tokenizer, TokenizerError};
use std::path::Path;
use tracing::info;

pub struct HuggingFaceTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HuggingFaceTokenizer {
    /// Load a serialized tokenizer (`tokenizer.json`).
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            TokenizerError::NotConfigured(format!(
                "Failed to load tokenizer from {}: {e}",
                path.display()
            ))
        })?;
        info!(path = %path.display(), "Loaded HuggingFace tokenizer");
        Ok(Self { inner })
    }
}

impl Tokenizer for HuggingFaceTokenizer {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        self.inner
            .encode(text, false)
            .map(|encoding| encoding.get_ids().to_vec())
            .map_err(|e| TokenizerError::EncodeFailed(e.to_string()))
    }
}

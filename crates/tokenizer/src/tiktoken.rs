//! OpenAI BPE encodings via `tiktoken-rs`.

use stanza_core::{TokenId, Tokenizer, TokenizerError};
use tiktoken_rs::CoreBPE;
use tracing::debug;

pub struct TiktokenTokenizer {
    encoding: String,
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    /// Load a named encoding (`o200k_base`, `cl100k_base`, `p50k_base`,
    /// `p50k_edit`, `r50k_base`).
    pub fn new(encoding: &str) -> Result<Self, TokenizerError> {
        let bpe = match encoding {
            "o200k_base" => tiktoken_rs::o200k_base(),
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(TokenizerError::NotConfigured(format!(
                    "unknown tiktoken encoding '{other}'"
                )));
            }
        }
        .map_err(|e| TokenizerError::NotConfigured(format!("Failed to load {encoding}: {e}")))?;

        debug!(encoding, "Loaded tiktoken encoding");
        Ok(Self {
            encoding: encoding.to_string(),
            bpe,
        })
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn name(&self) -> &str {
        "tiktoken"
    }

    /// Special-token text is encoded as ordinary text.
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        Ok(self.bpe.encode_ordinary(text))
    }
}

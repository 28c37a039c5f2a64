//! Token encoders implementing [`stanza_core::Tokenizer`].
//!
//! - [`BuiltinTokenizer`]: deterministic and always available.
//! - `HuggingFaceTokenizer`: any `tokenizer.json`, behind the `huggingface`
//!   feature.
//! - `TiktokenTokenizer`: OpenAI BPE encodings, behind the `tiktoken` feature.
//!
//! [`from_config`] picks one from a [`TokenizerConfig`].

pub mod builtin;
#[cfg(feature = "huggingface")]
pub mod huggingface;
#[cfg(feature = "tiktoken")]
pub mod tiktoken;

pub use builtin::{BuiltinTokenizer, DEFAULT_MAX_PIECE_CHARS};
#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceTokenizer;
#[cfg(feature = "tiktoken")]
pub use tiktoken::TiktokenTokenizer;

use stanza_config::{TokenizerConfig, TokenizerKind};
use stanza_core::{Tokenizer, TokenizerError};
use std::sync::Arc;

/// Build the tokenizer described by `config`.
pub fn from_config(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    match config.kind {
        TokenizerKind::Builtin => Ok(Arc::new(BuiltinTokenizer::with_max_piece_chars(
            config.max_piece_chars,
        ))),
        TokenizerKind::Huggingface => load_huggingface(config),
        TokenizerKind::Tiktoken => load_tiktoken(config),
    }
}

#[cfg(feature = "huggingface")]
fn load_huggingface(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    let path = config.path.as_deref().ok_or_else(|| {
        TokenizerError::NotConfigured("tokenizer.path is required for huggingface".into())
    })?;
    Ok(Arc::new(HuggingFaceTokenizer::from_file(path)?))
}

#[cfg(not(feature = "huggingface"))]
fn load_huggingface(_config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    Err(TokenizerError::NotConfigured(
        "stanza-tokenizer was built without the `huggingface` feature".into(),
    ))
}

#[cfg(feature = "tiktoken")]
fn load_tiktoken(config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    Ok(Arc::new(TiktokenTokenizer::new(&config.encoding)?))
}

#[cfg(not(feature = "tiktoken"))]
fn load_tiktoken(_config: &TokenizerConfig) -> Result<Arc<dyn Tokenizer>, TokenizerError> {
    Err(TokenizerError::NotConfigured(
        "stanza-tokenizer was built without the `tiktoken` feature".into(),
    ))
}

//! The token encoder abstraction.
//!
//! The prompt layer only needs "string in, ordered token ids out". Any encoder
//! that maps the same text to the same sequence satisfies the contract; the
//! concrete encoders live in `stanza-tokenizer`.

use crate::error::TokenizerError;

/// An opaque token identifier.
pub type TokenId = u32;

/// The core Tokenizer trait.
///
/// Implementations must be deterministic: for a fixed configuration,
/// `encode(text)` returns the same sequence every time it is called.
pub trait Tokenizer: Send + Sync {
    /// A human-readable name for this tokenizer (e.g., "builtin", "huggingface").
    fn name(&self) -> &str;

    /// Encode `text` into an ordered sequence of token ids.
    fn encode(&self, text: &str) -> std::result::Result<Vec<TokenId>, TokenizerError>;

    /// Number of tokens in `text`.
    ///
    /// Default implementation encodes and counts.
    fn count(&self, text: &str) -> std::result::Result<usize, TokenizerError> {
        Ok(self.encode(text)?.len())
    }
}

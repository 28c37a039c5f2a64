//! Dependency-free deterministic tokenizer.
//!
//! Text is split GPT-style into letter runs, digit runs, punctuation runs and
//! whitespace runs (a single leading space sticks to the following word).
//! Pieces longer than `max_piece_chars` are chunked, which keeps counts close
//! to the usual ~4 characters per token for English text. Each piece maps to
//! the first four bytes of its SHA-256 digest.
//!
//! Because pieces never straddle a whitespace boundary, encoding `a` and `b`
//! separately and concatenating gives the same ids as encoding `a + b`
//! whenever `a` ends in a newline.

use regex::Regex;
use sha2::{Digest, Sha256};
use stanza_core::{TokenId, Tokenizer, TokenizerError};
use std::sync::LazyLock;

static PIECES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+")
        .expect("piece pattern is valid")
});

/// Default maximum characters per token.
pub const DEFAULT_MAX_PIECE_CHARS: usize = 4;

#[derive(Debug, Clone)]
pub struct BuiltinTokenizer {
    max_piece_chars: usize,
}

impl BuiltinTokenizer {
    pub fn new() -> Self {
        Self::with_max_piece_chars(DEFAULT_MAX_PIECE_CHARS)
    }

    /// A zero limit is treated as one character per token.
    pub fn with_max_piece_chars(max_piece_chars: usize) -> Self {
        Self {
            max_piece_chars: max_piece_chars.max(1),
        }
    }

    /// The text pieces `encode` hashes, in order.
    pub fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        for m in PIECES.find_iter(text) {
            let piece = m.as_str();
            let mut rest = piece;
            while !rest.is_empty() {
                let split = rest
                    .char_indices()
                    .nth(self.max_piece_chars)
                    .map_or(rest.len(), |(i, _)| i);
                let (head, tail) = rest.split_at(split);
                out.push(head);
                rest = tail;
            }
        }
        out
    }
}

impl Default for BuiltinTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn piece_id(piece: &str) -> TokenId {
    let digest = Sha256::digest(piece.as_bytes());
    TokenId::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

impl Tokenizer for BuiltinTokenizer {
    fn name(&self) -> &str {
        "builtin"
    }

    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        Ok(self.pieces(text).into_iter().map(piece_id).collect())
    }

    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.pieces(text).len())
    }
}

//! # Stanza Core
//!
//! Types shared by every Stanza crate: the error taxonomy, the chat
//! [`Message`] a prompt part turns into, and the [`Tokenizer`] trait.
//!
//! Nothing here renders templates or encodes text. Encoders live in
//! `stanza-tokenizer` and are handed to a prompt as `Arc<dyn Tokenizer>`, so
//! tests can substitute a stub without touching the rest of the pipeline.

pub mod error;
pub mod message;
pub mod tokenizer;

pub use error::{
    Error, PreconditionError, RenderError, Result, TokenizerError, ValidationError,
};
pub use message::{DEFAULT_ROLE, Message};
pub use tokenizer::{TokenId, Tokenizer};

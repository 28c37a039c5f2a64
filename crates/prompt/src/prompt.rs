//! The prompt aggregate.
//!
//! A [`Prompt`] owns its parts in template order. Rendering and parsing run
//! eagerly at construction; tokenization is explicit through
//! [`Prompt::tokenize`]. Mutating operations take `&mut self`, so a prompt has
//! a single writer at a time; share it across tasks behind a lock.

use crate::part::Part;
use stanza_config::{RenderConfig, StanzaConfig, TruncationConfig};
use stanza_core::{Message, PreconditionError, Result, TokenId, Tokenizer};
use stanza_template::render_template;
use stanza_tokenizer::BuiltinTokenizer;
use std::sync::Arc;
use tracing::debug;

/// Rendering and truncation options for a single prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOptions {
    pub render: RenderConfig,
    pub truncation: TruncationConfig,
}

impl From<&StanzaConfig> for PromptOptions {
    fn from(config: &StanzaConfig) -> Self {
        Self {
            render: config.render.clone(),
            truncation: config.truncation.clone(),
        }
    }
}

pub struct Prompt {
    pub(crate) parts: Vec<Part>,
    pretruncation: Option<Vec<Part>>,
    tokens: Option<Vec<TokenId>>,
    rendered: String,
    tokenizer: Arc<dyn Tokenizer>,
    pub(crate) truncation: TruncationConfig,
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt")
            .field("parts", &self.parts)
            .field("pretruncation", &self.pretruncation.as_ref().map(Vec::len))
            .field("tokens", &self.tokens.as_ref().map(Vec::len))
            .field("tokenizer", &self.tokenizer.name())
            .field("truncation", &self.truncation)
            .finish()
    }
}

impl Prompt {
    /// Render and parse `raw_template` with default options and the builtin
    /// tokenizer.
    pub fn new(raw_template: &str, data: &serde_json::Value) -> Result<Self> {
        Self::with_options(
            raw_template,
            data,
            &PromptOptions::default(),
            Arc::new(BuiltinTokenizer::new()),
        )
    }

    /// Build with options and tokenizer taken from a loaded configuration.
    pub fn from_config(
        raw_template: &str,
        data: &serde_json::Value,
        config: &StanzaConfig,
    ) -> Result<Self> {
        let tokenizer = stanza_tokenizer::from_config(&config.tokenizer)?;
        Self::with_options(raw_template, data, &PromptOptions::from(config), tokenizer)
    }

    pub fn with_options(
        raw_template: &str,
        data: &serde_json::Value,
        options: &PromptOptions,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self> {
        let rendered = render_template(raw_template, data, &options.render)?;
        let parts: Vec<Part> = rendered
            .parts
            .into_iter()
            .map(|def| Part::from_definition(def, &options.render))
            .collect();

        debug!(parts = parts.len(), tokenizer = tokenizer.name(), "Built prompt");

        Ok(Self {
            parts,
            pretruncation: None,
            tokens: None,
            rendered: rendered.text,
            tokenizer,
            truncation: options.truncation.clone(),
        })
    }

    /// Parts in prompt order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// The rendered YAML the parts were parsed from.
    pub fn rendered_template(&self) -> &str {
        &self.rendered
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// All part contents concatenated, no separator.
    pub fn string(&self) -> String {
        self.parts.iter().map(Part::content).collect()
    }

    /// One `{role, content}` message per part.
    pub fn messages(&self) -> Vec<Message> {
        self.parts.iter().map(Part::message).collect()
    }

    /// Encode every part and section. Safe to call repeatedly; each call
    /// overwrites the previous tokens.
    ///
    /// Nothing is stored unless every part encodes, so a tokenizer error
    /// leaves the prompt as it was before the call.
    pub fn tokenize(&mut self) -> Result<()> {
        let tokenizer = Arc::clone(&self.tokenizer);
        let encoded = self
            .parts
            .iter()
            .map(|part| part.encode(tokenizer.as_ref()).map_err(Into::into))
            .collect::<Result<Vec<_>>>()?;
        for (part, tokens) in self.parts.iter_mut().zip(encoded) {
            part.apply_tokens(tokens);
        }
        self.rebuild_tokens();

        debug!(
            parts = self.parts.len(),
            tokens = self.tokens.as_ref().map_or(0, Vec::len),
            tokenizer = tokenizer.name(),
            "Tokenized prompt"
        );
        Ok(())
    }

    pub fn is_tokenized(&self) -> bool {
        self.tokens.is_some()
    }

    /// Every surviving part's tokens, in part order.
    pub fn tokens(&self) -> Result<&[TokenId]> {
        self.tokens
            .as_deref()
            .ok_or_else(|| PreconditionError::NotTokenized.into())
    }

    pub fn total_tokens(&self) -> Result<usize> {
        Ok(self.tokens()?.len())
    }

    /// Take the pre-truncation snapshot if it does not exist yet.
    ///
    /// The snapshot is a deep copy of the tokenized parts. Once taken it is
    /// never refreshed; `truncate` takes it automatically before removing
    /// anything.
    pub fn snapshot_pretruncation(&mut self) -> Result<&[Part]> {
        self.require_tokenized()?;
        let parts = &self.parts;
        Ok(self
            .pretruncation
            .get_or_insert_with(|| parts.clone())
            .as_slice())
    }

    /// The snapshot, if one has been taken.
    pub fn pretruncation_parts(&self) -> Option<&[Part]> {
        self.pretruncation.as_deref()
    }

    pub(crate) fn require_tokenized(&self) -> Result<()> {
        if self.is_tokenized() {
            Ok(())
        } else {
            Err(PreconditionError::NotTokenized.into())
        }
    }

    pub(crate) fn rebuild_tokens(&mut self) {
        let tokens = self
            .parts
            .iter()
            .flat_map(|p| p.tokens().unwrap_or_default().iter().copied())
            .collect();
        self.tokens = Some(tokens);
    }
}

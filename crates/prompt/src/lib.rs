//! # Stanza Prompt
//!
//! The prompt aggregate: build a [`Prompt`] from a Jinja-templated YAML
//! definition, tokenize it, truncate it to a token budget by part priority,
//! and report token usage per part and section.
//!
//! ```no_run
//! use stanza_prompt::Prompt;
//! use serde_json::json;
//!
//! # fn main() -> stanza_prompt::Result<()> {
//! let raw = r#"
//! - name: system
//!   role: system
//!   content: You are terse.
//!   truncation_priority: 10
//! - name: history
//!   content: "{{ history }}"
//! "#;
//! let mut prompt = Prompt::new(raw, &json!({ "history": "earlier turns" }))?;
//! prompt.tokenize()?;
//! let report = prompt.truncate(256)?;
//! println!("dropped {} tokens", report.tokens_dropped());
//! # Ok(())
//! # }
//! ```

pub mod part;
pub mod prompt;
pub mod stats;
pub mod truncation;

pub use part::{Part, PartBody, Section};
pub use prompt::{Prompt, PromptOptions};
pub use stats::{PART_TOTAL_KEY, PartStats, SectionStats};
pub use truncation::{RemovedPart, TruncationReport, removal_order};

pub use stanza_config::{StanzaConfig, TieBreak, TruncationConfig};
pub use stanza_core::{Error, Message, Result};

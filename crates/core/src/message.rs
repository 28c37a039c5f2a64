//! Chat message view of a prompt.
//!
//! A `Message` is the `{role, content}` pair an LLM chat API consumes. Roles
//! are free-form tags here; templates decide what they mean.

use serde::{Deserialize, Serialize};

/// Role assigned to a part when the template does not name one.
pub const DEFAULT_ROLE: &str = "user";

/// A single `{role, content}` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who the content is attributed to (`system`, `user`, `assistant`, ...).
    pub role: String,

    /// The text content
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(DEFAULT_ROLE, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

//! Error types for the Stanza domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Stanza operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Definition errors ---
    #[error("invalid template definition: {0}")]
    InvalidTemplate(#[from] ValidationError),

    // --- Rendering errors ---
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    // --- Tokenizer errors ---
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    // --- Out-of-order calls ---
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A structural rule violated by the parsed template definition.
///
/// Part indices and section indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("template root must be a list of parts")]
    RootNotSequence,

    #[error("Part {index} must be a dict/mapping")]
    PartNotMapping { index: usize },

    #[error("Part {index} missing 'name' field")]
    PartMissingName { index: usize },

    #[error("Part '{part}' cannot have both 'content' and 'sections'")]
    ContentAndSections { part: String },

    #[error("Part '{part}': sections must be a list")]
    SectionsNotList { part: String },

    #[error("Part '{part}' has an empty sections field")]
    EmptySections { part: String },

    #[error("Part '{part}': Section {index} must be a dict/mapping")]
    SectionNotMapping { part: String, index: usize },

    #[error("Part '{part}': Section {index} missing 'name' field")]
    SectionMissingName { part: String, index: usize },

    #[error("Part '{part}': Section '{section}' missing 'content' field")]
    SectionMissingContent { part: String, section: String },

    #[error("{owner}: unknown field '{field}'")]
    UnknownField { owner: String, field: String },

    #[error("{owner}: field '{field}' must be {expected}")]
    InvalidField {
        owner: String,
        field: String,
        expected: &'static str,
    },

    #[error("duplicate part name '{name}'")]
    DuplicatePart { name: String },

    #[error("Part '{part}': duplicate section name '{name}'")]
    DuplicateSection { part: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("template syntax error: {0}")]
    Syntax(String),

    #[error("template evaluation failed: {0}")]
    Evaluation(String),

    #[error("rendered template is not valid YAML: {0}")]
    Yaml(String),
}

#[derive(Debug, Clone, Error)]
pub enum TokenizerError {
    #[error("tokenizer not configured: {0}")]
    NotConfigured(String),

    #[error("encoding failed: {0}")]
    EncodeFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("prompt has not been tokenized; call tokenize() first")]
    NotTokenized,
}

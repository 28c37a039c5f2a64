//! Configuration loading, validation, and management for Stanza.
//!
//! Loads configuration from a TOML file (`stanza.toml` by default, or the path
//! in `STANZA_CONFIG`) with environment variable overrides. Validates all
//! settings before they reach the renderer, tokenizer or truncation engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `stanza.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StanzaConfig {
    /// Template rendering options
    #[serde(default)]
    pub render: RenderConfig,

    /// Truncation engine options
    #[serde(default)]
    pub truncation: TruncationConfig,

    /// Token encoder selection
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

/// How the renderer treats variables missing from the data context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedMode {
    /// Missing variables are a render error.
    #[default]
    Strict,
    /// Missing variables render as empty strings.
    Lenient,
}

impl std::str::FromStr for UndefinedMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ConfigError::ValidationError(format!(
                "undefined mode must be 'strict' or 'lenient', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub undefined: UndefinedMode,

    /// Replace `<|space|>` markers in parsed content with a literal space.
    #[serde(default = "default_true")]
    pub space_marker: bool,

    /// Role given to parts that do not declare one.
    #[serde(default = "default_role")]
    pub default_role: String,
}

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    stanza_core::DEFAULT_ROLE.into()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            undefined: UndefinedMode::default(),
            space_marker: true,
            default_role: default_role(),
        }
    }
}

/// Which of two equal-priority parts the truncation engine removes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The part appearing later in prompt order goes first.
    #[default]
    LatestFirst,
    /// The part appearing earlier in prompt order goes first.
    EarliestFirst,
}

impl std::str::FromStr for TieBreak {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest_first" | "latest" => Ok(Self::LatestFirst),
            "earliest_first" | "earliest" => Ok(Self::EarliestFirst),
            other => Err(ConfigError::ValidationError(format!(
                "tie_break must be 'latest_first' or 'earliest_first', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationConfig {
    #[serde(default)]
    pub tie_break: TieBreak,

    /// Extra tokens to shed once truncation is needed, so a growing prompt
    /// keeps a stable prefix across turns. `None` truncates to the budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Builtin,
    /// A `tokenizer.json` loaded through the `tokenizers` crate.
    Huggingface,
    /// An OpenAI BPE encoding through `tiktoken-rs`.
    Tiktoken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub kind: TokenizerKind,

    /// Path to `tokenizer.json` (required for `huggingface`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Longest piece the builtin tokenizer emits as a single token.
    #[serde(default = "default_max_piece_chars")]
    pub max_piece_chars: usize,

    /// BPE encoding name for `tiktoken` (`o200k_base`, `cl100k_base`, ...).
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_max_piece_chars() -> usize {
    4
}

fn default_encoding() -> String {
    "o200k_base".into()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::default(),
            path: None,
            max_piece_chars: default_max_piece_chars(),
            encoding: default_encoding(),
        }
    }
}

impl StanzaConfig {
    /// Load configuration from `STANZA_CONFIG`, falling back to `./stanza.toml`.
    ///
    /// Environment overrides are applied last (highest priority):
    /// - `STANZA_UNDEFINED` (`strict` | `lenient`)
    /// - `STANZA_TIE_BREAK` (`latest_first` | `earliest_first`)
    /// - `STANZA_TRUNCATION_STEP` (integer)
    /// - `STANZA_TOKENIZER_PATH` (switches to the `huggingface` tokenizer)
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("STANZA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("stanza.toml"));
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("STANZA_UNDEFINED") {
            self.render.undefined = mode.parse()?;
        }

        if let Some(tie_break) = lookup("STANZA_TIE_BREAK") {
            self.truncation.tie_break = tie_break.parse()?;
        }

        if let Some(step) = lookup("STANZA_TRUNCATION_STEP") {
            let step = step.trim().parse::<usize>().map_err(|e| {
                ConfigError::ValidationError(format!("STANZA_TRUNCATION_STEP: {e}"))
            })?;
            self.truncation.step = Some(step);
        }

        if let Some(path) = lookup("STANZA_TOKENIZER_PATH") {
            self.tokenizer.kind = TokenizerKind::Huggingface;
            self.tokenizer.path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.default_role.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "render.default_role must not be empty".into(),
            ));
        }

        if self.truncation.step == Some(0) {
            return Err(ConfigError::ValidationError(
                "truncation.step must be > 0 when set".into(),
            ));
        }

        if self.tokenizer.max_piece_chars == 0 {
            return Err(ConfigError::ValidationError(
                "tokenizer.max_piece_chars must be > 0".into(),
            ));
        }

        if self.tokenizer.kind == TokenizerKind::Huggingface && self.tokenizer.path.is_none() {
            return Err(ConfigError::ValidationError(
                "tokenizer.path is required for the huggingface tokenizer".into(),
            ));
        }

        if self.tokenizer.kind == TokenizerKind::Tiktoken && self.tokenizer.encoding.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tokenizer.encoding must not be empty for the tiktoken tokenizer".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for stanza_core::Error {
    fn from(err: ConfigError) -> Self {
        stanza_core::Error::Config {
            message: err.to_string(),
        }
    }
}

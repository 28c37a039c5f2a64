//! Expression rendering for raw templates.
//!
//! The whole raw template is rendered with `minijinja` *before* it is parsed
//! as YAML. Substituted values therefore pass through the YAML scalar styles
//! (`|`, `|+`, `>-`, ...) exactly like authored text does.
//!
//! The renderer drops the template's final newline, if any. After YAML
//! parsing this only shows up in the last scalar of the last part: a literal
//! block there loses its clipped trailing newline.

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use stanza_config::{RenderConfig, UndefinedMode};
use stanza_core::RenderError;
use tracing::debug;

/// Marker authors write where YAML would otherwise swallow a space.
pub const SPACE_MARKER: &str = "<|space|>";

/// Renders raw template text against a data context.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    undefined: UndefinedMode,
}

impl TemplateRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            undefined: config.undefined,
        }
    }

    /// A renderer that rejects undefined variables.
    pub fn strict() -> Self {
        Self {
            undefined: UndefinedMode::Strict,
        }
    }

    /// A renderer that renders undefined variables as empty strings.
    pub fn lenient() -> Self {
        Self {
            undefined: UndefinedMode::Lenient,
        }
    }

    pub fn undefined_mode(&self) -> UndefinedMode {
        self.undefined
    }

    /// Render `raw` with every placeholder resolved from `data`.
    pub fn render(&self, raw: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(false);
        env.set_undefined_behavior(match self.undefined {
            UndefinedMode::Strict => UndefinedBehavior::Strict,
            UndefinedMode::Lenient => UndefinedBehavior::Lenient,
        });

        let rendered = env.render_str(raw, data).map_err(classify)?;
        debug!(
            raw_bytes = raw.len(),
            rendered_bytes = rendered.len(),
            "Rendered template"
        );
        Ok(rendered)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::strict()
    }
}

fn classify(err: minijinja::Error) -> RenderError {
    let detail = err.to_string();
    match err.kind() {
        ErrorKind::UndefinedError => RenderError::UndefinedVariable(detail),
        ErrorKind::SyntaxError => RenderError::Syntax(detail),
        _ => RenderError::Evaluation(detail),
    }
}

/// Replace every [`SPACE_MARKER`] in `text` with a single space.
pub fn expand_space_markers(text: &str) -> String {
    text.replace(SPACE_MARKER, " ")
}

//! Template rendering and definition parsing for Stanza.
//!
//! Turning a raw template into validated part definitions is a two-step
//! pipeline:
//!
//! 1. **Render** the raw text with `minijinja` against the data context
//!    ([`render::TemplateRenderer`]).
//! 2. **Parse** the rendered text as YAML and validate its structure
//!    ([`definition::parse_definition`]).
//!
//! [`render_template`] runs both steps.

pub mod definition;
pub mod render;

pub use definition::{
    BodyDefinition, PartDefinition, SectionDefinition, parse_definition, validate_definition,
};
pub use render::{SPACE_MARKER, TemplateRenderer, expand_space_markers};

use stanza_config::RenderConfig;
use stanza_core::Result;

/// Output of the render + parse pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// The rendered YAML text, kept for debugging.
    pub text: String,
    /// Validated part definitions in template order.
    pub parts: Vec<PartDefinition>,
}

/// Render `raw` against `data` and parse the result into part definitions.
pub fn render_template(
    raw: &str,
    data: &serde_json::Value,
    config: &RenderConfig,
) -> Result<RenderedTemplate> {
    let text = TemplateRenderer::new(config).render(raw, data)?;
    let parts = parse_definition(&text)?;
    tracing::debug!(parts = parts.len(), "Parsed template definition");
    Ok(RenderedTemplate { text, parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stanza_core::{Error, RenderError};

    #[test]
    fn last_leaf_loses_trailing_newline() {
        let raw = r#"
- name: test_part
  sections:
    - name: section1
      content: |
        Hello
        World
    - name: section2
      content: |
        Foo
        Bar
"#;
        let rendered = render_template(raw, &json!({}), &RenderConfig::default()).unwrap();
        let BodyDefinition::Sections(sections) = &rendered.parts[0].body else {
            panic!("expected sections");
        };
        assert_eq!(sections[0].content, "Hello\nWorld\n");
        assert_eq!(sections[1].content, "Foo\nBar");
    }

    #[test]
    fn variables_flow_into_sections() {
        let raw = r#"
- name: test_part
  sections:
    - name: section1
      content: |
        Hello {{ name }}
    - name: section2
      content: |
        You are {{ age }} years old
"#;
        let rendered = render_template(
            raw,
            &json!({"name": "Alice", "age": 30}),
            &RenderConfig::default(),
        )
        .unwrap();
        let BodyDefinition::Sections(sections) = &rendered.parts[0].body else {
            panic!("expected sections");
        };
        assert_eq!(sections[0].content, "Hello Alice\n");
        assert_eq!(sections[1].content, "You are 30 years old");
    }

    #[test]
    fn loop_generates_parts() {
        let raw = r#"
{% for turn in history %}
- name: turn_{{ loop.index }}
  role: {{ turn.role }}
  content: {{ turn.text }}
{% endfor %}
"#;
        let data = json!({"history": [
            {"role": "user", "text": "Hi"},
            {"role": "assistant", "text": "Hello there"},
        ]});
        let rendered = render_template(raw, &data, &RenderConfig::default()).unwrap();
        assert_eq!(rendered.parts.len(), 2);
        assert_eq!(rendered.parts[0].name, "turn_1");
        assert_eq!(rendered.parts[1].role.as_deref(), Some("assistant"));
        assert_eq!(
            rendered.parts[1].body,
            BodyDefinition::Content("Hello there".into())
        );
    }

    #[test]
    fn undefined_variable_fails_in_strict_mode() {
        let raw = "- name: p\n  content: Hi {{ who }}\n";
        let err = render_template(raw, &json!({}), &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::UndefinedVariable(_))));
    }

    #[test]
    fn rendered_text_is_kept() {
        let raw = "- name: p\n  content: Hi\n";
        let rendered = render_template(raw, &json!({}), &RenderConfig::default()).unwrap();
        assert_eq!(rendered.text, "- name: p\n  content: Hi");
    }
}

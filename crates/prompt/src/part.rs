//! Parts and sections, the content tree of a prompt.
//!
//! A [`Part`] is either direct content or an ordered list of [`Section`]s.
//! A sectioned part's content is the separator-free concatenation of its
//! sections; any visible separation comes from whitespace the author wrote.

use stanza_config::RenderConfig;
use stanza_core::{Message, TokenId, Tokenizer, TokenizerError};
use stanza_template::{BodyDefinition, PartDefinition, SectionDefinition, expand_space_markers};

/// A named sub-unit of a part's content, tokenized on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub content: String,
    /// Reported in statistics; truncation works on whole parts only.
    pub truncation_priority: Option<i64>,
    tokens: Option<Vec<TokenId>>,
}

impl Section {
    pub fn tokens(&self) -> Option<&[TokenId]> {
        self.tokens.as_deref()
    }

    pub fn token_count(&self) -> Option<usize> {
        self.tokens.as_ref().map(Vec::len)
    }

    fn from_definition(def: SectionDefinition, space_marker: bool) -> Self {
        Self {
            name: def.name,
            content: expand_if(def.content, space_marker),
            truncation_priority: def.truncation_priority,
            tokens: None,
        }
    }
}

/// The two shapes of part content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Direct(String),
    /// Never empty.
    Sectioned(Vec<Section>),
}

/// A named, ordered unit of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub role: String,
    /// Lower values are truncated first.
    pub truncation_priority: i64,
    body: PartBody,
    /// Derived once at construction.
    content: String,
    tokens: Option<Vec<TokenId>>,
}

impl Part {
    pub(crate) fn from_definition(def: PartDefinition, config: &RenderConfig) -> Self {
        let body = match def.body {
            BodyDefinition::Content(text) => PartBody::Direct(expand_if(text, config.space_marker)),
            BodyDefinition::Sections(defs) => PartBody::Sectioned(
                defs.into_iter()
                    .map(|s| Section::from_definition(s, config.space_marker))
                    .collect(),
            ),
        };
        let content = match &body {
            PartBody::Direct(text) => text.clone(),
            PartBody::Sectioned(sections) => sections.iter().map(|s| s.content.as_str()).collect(),
        };

        Self {
            name: def.name,
            role: def.role.unwrap_or_else(|| config.default_role.clone()),
            truncation_priority: def.truncation_priority,
            body,
            content,
            tokens: None,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn body(&self) -> &PartBody {
        &self.body
    }

    pub fn sections(&self) -> Option<&[Section]> {
        match &self.body {
            PartBody::Direct(_) => None,
            PartBody::Sectioned(sections) => Some(sections),
        }
    }

    pub fn has_sections(&self) -> bool {
        matches!(self.body, PartBody::Sectioned(_))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections()?.iter().find(|s| s.name == name)
    }

    /// `None` until the owning prompt is tokenized.
    pub fn tokens(&self) -> Option<&[TokenId]> {
        self.tokens.as_deref()
    }

    pub fn token_count(&self) -> Option<usize> {
        self.tokens.as_ref().map(Vec::len)
    }

    pub fn message(&self) -> Message {
        Message::new(self.role.clone(), self.content.clone())
    }

    /// Encode this part without touching it, each section separately when
    /// sectioned. The part's own tokens are the section tokens concatenated
    /// in order.
    pub(crate) fn encode(&self, tokenizer: &dyn Tokenizer) -> Result<EncodedPart, TokenizerError> {
        match &self.body {
            PartBody::Direct(text) => Ok(EncodedPart {
                tokens: tokenizer.encode(text)?,
                sections: Vec::new(),
            }),
            PartBody::Sectioned(sections) => {
                let sections = sections
                    .iter()
                    .map(|s| tokenizer.encode(&s.content))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(EncodedPart {
                    tokens: sections.concat(),
                    sections,
                })
            }
        }
    }

    /// Store tokens produced by [`Part::encode`] on this part.
    pub(crate) fn apply_tokens(&mut self, encoded: EncodedPart) -> usize {
        if let PartBody::Sectioned(sections) = &mut self.body {
            for (section, tokens) in sections.iter_mut().zip(encoded.sections) {
                section.tokens = Some(tokens);
            }
        }
        let count = encoded.tokens.len();
        self.tokens = Some(encoded.tokens);
        count
    }
}

/// Tokens for one part, not yet stored on it.
#[derive(Debug)]
pub(crate) struct EncodedPart {
    tokens: Vec<TokenId>,
    sections: Vec<Vec<TokenId>>,
}

fn expand_if(text: String, space_marker: bool) -> String {
    if space_marker {
        expand_space_markers(&text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_tokenizer::BuiltinTokenizer;

    fn section_def(name: &str, content: &str) -> SectionDefinition {
        SectionDefinition {
            name: name.into(),
            content: content.into(),
            truncation_priority: None,
        }
    }

    fn sectioned(sections: Vec<SectionDefinition>) -> Part {
        Part::from_definition(
            PartDefinition {
                name: "p".into(),
                role: None,
                truncation_priority: 0,
                body: BodyDefinition::Sections(sections),
            },
            &RenderConfig::default(),
        )
    }

    #[test]
    fn sectioned_content_is_concatenated() {
        let part = sectioned(vec![section_def("a", "Hello"), section_def("b", "World")]);
        assert_eq!(part.content(), "HelloWorld");
        assert!(matches!(part.body(), PartBody::Sectioned(sections) if sections.len() == 2));
        assert_eq!(part.role, "user");
        assert!(part.has_sections());
        assert_eq!(part.section("b").unwrap().content, "World");
        assert!(part.tokens().is_none());
    }

    #[test]
    fn space_marker_expanded_when_enabled() {
        let part = sectioned(vec![section_def("a", "Hi"), section_def("b", "<|space|>there")]);
        assert_eq!(part.content(), "Hi there");

        let config = RenderConfig {
            space_marker: false,
            ..RenderConfig::default()
        };
        let raw = Part::from_definition(
            PartDefinition {
                name: "p".into(),
                role: Some("system".into()),
                truncation_priority: 2,
                body: BodyDefinition::Content("<|space|>x".into()),
            },
            &config,
        );
        assert_eq!(raw.content(), "<|space|>x");
        assert_eq!(raw.role, "system");
        assert!(raw.sections().is_none());
        assert_eq!(raw.body(), &PartBody::Direct("<|space|>x".into()));
    }

    #[test]
    fn part_tokens_join_section_tokens() {
        let mut part = sectioned(vec![section_def("a", "Hello "), section_def("b", "World")]);
        let encoded = part.encode(&BuiltinTokenizer::new()).unwrap();
        assert!(part.tokens().is_none());
        let count = part.apply_tokens(encoded);

        let sections = part.sections().unwrap();
        let mut joined = sections[0].tokens().unwrap().to_vec();
        joined.extend_from_slice(sections[1].tokens().unwrap());
        assert_eq!(part.tokens().unwrap(), joined.as_slice());
        assert_eq!(count, joined.len());
    }

    #[test]
    fn message_mirrors_role_and_content() {
        let part = sectioned(vec![section_def("a", "x")]);
        assert_eq!(part.message(), Message::user("x"));
    }
}

//! Definition parsing and structural validation.
//!
//! A rendered template is a YAML sequence of part mappings:
//!
//! ```yaml
//! - name: system_instructions
//!   role: system
//!   sections:
//!     - name: character_intro
//!       content: |
//!         Your name is Alice.
//!     - name: safety_rules
//!       content: Never be harmful.
//! - name: user_query
//!   content: Hello!
//!   truncation_priority: 1
//! ```
//!
//! Validation fails fast: parts are checked in order and the first violated
//! rule is reported.

use serde_yaml_ng::{Mapping, Value};
use stanza_core::{Error, RenderError, ValidationError};
use std::collections::HashSet;

const PART_FIELDS: &[&str] = &["name", "role", "content", "sections", "truncation_priority"];
const SECTION_FIELDS: &[&str] = &["name", "content", "truncation_priority"];

/// A validated part, before rendering options (default role, space markers)
/// are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDefinition {
    pub name: String,
    pub role: Option<String>,
    pub truncation_priority: i64,
    pub body: BodyDefinition,
}

/// The two shapes a part body can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyDefinition {
    /// Content given directly. A part with neither `content` nor `sections`
    /// is `Content("")`.
    Content(String),
    /// Non-empty ordered sections.
    Sections(Vec<SectionDefinition>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDefinition {
    pub name: String,
    pub content: String,
    /// Stored and reported; never consulted by truncation.
    pub truncation_priority: Option<i64>,
}

/// Parse rendered YAML text into validated part definitions.
///
/// An empty document yields no parts.
pub fn parse_definition(rendered: &str) -> Result<Vec<PartDefinition>, Error> {
    if rendered.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut root: Value =
        serde_yaml_ng::from_str(rendered).map_err(|e| RenderError::Yaml(e.to_string()))?;
    root.apply_merge()
        .map_err(|e| RenderError::Yaml(e.to_string()))?;

    Ok(validate_definition(&root)?)
}

/// Validate an already-parsed YAML value.
pub fn validate_definition(root: &Value) -> Result<Vec<PartDefinition>, ValidationError> {
    let items = match root {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        _ => return Err(ValidationError::RootNotSequence),
    };

    let mut seen = HashSet::new();
    let mut parts = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let part = validate_part(index, item)?;
        if !seen.insert(part.name.clone()) {
            return Err(ValidationError::DuplicatePart { name: part.name });
        }
        parts.push(part);
    }

    Ok(parts)
}

fn validate_part(index: usize, item: &Value) -> Result<PartDefinition, ValidationError> {
    let Value::Mapping(map) = item else {
        return Err(ValidationError::PartNotMapping { index });
    };

    let name = match map.get("name") {
        None | Some(Value::Null) => return Err(ValidationError::PartMissingName { index }),
        Some(value) => scalar_text(value).ok_or_else(|| ValidationError::InvalidField {
            owner: format!("Part {index}"),
            field: "name".into(),
            expected: "a string",
        })?,
    };
    let owner = format!("Part '{name}'");

    let content = map.get("content");
    let sections = map.get("sections");

    let body = match (content, sections) {
        (Some(_), Some(_)) => return Err(ValidationError::ContentAndSections { part: name }),
        (None, Some(value)) => BodyDefinition::Sections(validate_sections(&name, value)?),
        (Some(value), None) => BodyDefinition::Content(content_text(&owner, value)?),
        (None, None) => BodyDefinition::Content(String::new()),
    };

    let role = match map.get("role") {
        None | Some(Value::Null) => None,
        Some(value) => Some(scalar_text(value).ok_or_else(|| ValidationError::InvalidField {
            owner: owner.clone(),
            field: "role".into(),
            expected: "a string",
        })?),
    };

    let truncation_priority = priority(&owner, map)?.unwrap_or(0);
    reject_unknown_fields(&owner, map, PART_FIELDS)?;

    Ok(PartDefinition {
        name,
        role,
        truncation_priority,
        body,
    })
}

fn validate_sections(part: &str, value: &Value) -> Result<Vec<SectionDefinition>, ValidationError> {
    let Value::Sequence(items) = value else {
        return Err(ValidationError::SectionsNotList { part: part.into() });
    };
    if items.is_empty() {
        return Err(ValidationError::EmptySections { part: part.into() });
    }

    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let Value::Mapping(map) = item else {
            return Err(ValidationError::SectionNotMapping {
                part: part.into(),
                index,
            });
        };

        let name = match map.get("name") {
            None | Some(Value::Null) => {
                return Err(ValidationError::SectionMissingName {
                    part: part.into(),
                    index,
                });
            }
            Some(value) => scalar_text(value).ok_or_else(|| ValidationError::InvalidField {
                owner: format!("Part '{part}': Section {index}"),
                field: "name".into(),
                expected: "a string",
            })?,
        };
        let owner = format!("Part '{part}': Section '{name}'");

        let content = match map.get("content") {
            None => {
                return Err(ValidationError::SectionMissingContent {
                    part: part.into(),
                    section: name,
                });
            }
            Some(value) => content_text(&owner, value)?,
        };

        let truncation_priority = priority(&owner, map)?;
        reject_unknown_fields(&owner, map, SECTION_FIELDS)?;

        if !seen.insert(name.clone()) {
            return Err(ValidationError::DuplicateSection {
                part: part.into(),
                name,
            });
        }

        sections.push(SectionDefinition {
            name,
            content,
            truncation_priority,
        });
    }

    Ok(sections)
}

/// Text of a scalar; strings verbatim, numbers and booleans stringified.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A null `content` is the empty string.
fn content_text(owner: &str, value: &Value) -> Result<String, ValidationError> {
    if value.is_null() {
        return Ok(String::new());
    }
    scalar_text(value).ok_or_else(|| ValidationError::InvalidField {
        owner: owner.into(),
        field: "content".into(),
        expected: "a string",
    })
}

fn priority(owner: &str, map: &Mapping) -> Result<Option<i64>, ValidationError> {
    match map.get("truncation_priority") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidField {
                owner: owner.into(),
                field: "truncation_priority".into(),
                expected: "an integer",
            }),
    }
}

fn reject_unknown_fields(
    owner: &str,
    map: &Mapping,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    for key in map.keys() {
        let known = key.as_str().is_some_and(|k| allowed.contains(&k));
        if !known {
            let field = scalar_text(key).unwrap_or_else(|| format!("{key:?}"));
            return Err(ValidationError::UnknownField {
                owner: owner.into(),
                field,
            });
        }
    }
    Ok(())
}

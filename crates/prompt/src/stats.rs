//! Per-part and per-section token statistics.

use crate::prompt::Prompt;
use serde::Serialize;
use stanza_core::{PreconditionError, Result};
use std::collections::BTreeMap;

/// Key used by [`Prompt::section_token_counts`] for parts without sections.
pub const PART_TOTAL_KEY: &str = "_part_total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub section_name: String,
    pub section_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation_priority: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartStats {
    pub part_name: String,
    pub part_tokens: usize,
    pub part_role: String,
    pub has_sections: bool,
    /// Empty for direct-content parts.
    pub sections: Vec<SectionStats>,
    pub truncation_priority: i64,
}

impl Prompt {
    /// One record per surviving part, in prompt order.
    pub fn section_stats(&self) -> Result<Vec<PartStats>> {
        self.require_tokenized()?;

        self.parts
            .iter()
            .map(|part| -> Result<PartStats> {
                let sections = part
                    .sections()
                    .unwrap_or_default()
                    .iter()
                    .map(|s| -> Result<SectionStats> {
                        Ok(SectionStats {
                            section_name: s.name.clone(),
                            section_tokens: s.token_count().ok_or(PreconditionError::NotTokenized)?,
                            truncation_priority: s.truncation_priority,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(PartStats {
                    part_name: part.name.clone(),
                    part_tokens: part.token_count().ok_or(PreconditionError::NotTokenized)?,
                    part_role: part.role.clone(),
                    has_sections: part.has_sections(),
                    sections,
                    truncation_priority: part.truncation_priority,
                })
            })
            .collect()
    }

    /// Part name to section name to token count. Parts without sections map
    /// [`PART_TOTAL_KEY`] to their own count.
    pub fn section_token_counts(&self) -> Result<BTreeMap<String, BTreeMap<String, usize>>> {
        Ok(self
            .section_stats()?
            .into_iter()
            .map(|stats| {
                let counts = if stats.has_sections {
                    stats
                        .sections
                        .into_iter()
                        .map(|s| (s.section_name, s.section_tokens))
                        .collect()
                } else {
                    BTreeMap::from([(PART_TOTAL_KEY.to_string(), stats.part_tokens)])
                };
                (stats.part_name, counts)
            })
            .collect())
    }
}

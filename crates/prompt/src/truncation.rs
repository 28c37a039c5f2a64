//! Token-budget truncation.
//!
//! Whole parts are removed, lowest `truncation_priority` first, until the
//! prompt fits. Sections are never removed on their own. Survivors keep their
//! relative order, and the untouched parts stay available through
//! [`Prompt::pretruncation_parts`].
//!
//! # Determinism
//!
//! Removal order is a total order over `(priority, position)`, so identical
//! prompts and budgets always drop the same parts.

use crate::part::Part;
use crate::prompt::Prompt;
use serde::Serialize;
use stanza_config::{TieBreak, TruncationConfig};
use stanza_core::Result;
use tracing::{debug, info, warn};

/// A part removed by [`Prompt::truncate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedPart {
    pub name: String,
    pub truncation_priority: i64,
    pub tokens: usize,
    /// Index in the part list before this call.
    pub position: usize,
}

/// What a truncation call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TruncationReport {
    /// Budget requested by the caller.
    pub budget: usize,
    /// Budget actually truncated to, after the configured step.
    pub effective_budget: usize,
    pub tokens_before: usize,
    pub tokens_after: usize,
    /// In removal order.
    pub removed: Vec<RemovedPart>,
}

impl TruncationReport {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
    }

    pub fn tokens_dropped(&self) -> usize {
        self.tokens_before - self.tokens_after
    }
}

/// Indices of `parts` in the order they would be removed.
pub fn removal_order(parts: &[Part], tie_break: TieBreak) -> Vec<usize> {
    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|&a, &b| {
        parts[a]
            .truncation_priority
            .cmp(&parts[b].truncation_priority)
            .then_with(|| match tie_break {
                TieBreak::LatestFirst => b.cmp(&a),
                TieBreak::EarliestFirst => a.cmp(&b),
            })
    });
    order
}

impl Prompt {
    /// Remove whole parts until the total token count is at most `budget`,
    /// using the truncation options the prompt was built with.
    ///
    /// Calls are cumulative. The pre-truncation snapshot is taken before the
    /// first removal.
    pub fn truncate(&mut self, budget: usize) -> Result<TruncationReport> {
        let config = self.truncation.clone();
        self.truncate_with(budget, &config)
    }

    pub fn truncate_with(
        &mut self,
        budget: usize,
        config: &TruncationConfig,
    ) -> Result<TruncationReport> {
        let tokens_before = self.total_tokens()?;

        if tokens_before <= budget {
            debug!(budget, tokens = tokens_before, "Prompt fits budget, nothing to truncate");
            return Ok(TruncationReport {
                budget,
                effective_budget: budget,
                tokens_before,
                tokens_after: tokens_before,
                removed: Vec::new(),
            });
        }

        let effective_budget = budget.saturating_sub(config.step.unwrap_or(0));
        self.snapshot_pretruncation()?;

        let mut total = tokens_before;
        let mut keep = vec![true; self.parts.len()];
        let mut removed = Vec::new();

        for index in removal_order(&self.parts, config.tie_break) {
            if total <= effective_budget {
                break;
            }
            let part = &self.parts[index];
            let tokens = part.token_count().unwrap_or(0);
            total -= tokens;
            keep[index] = false;

            info!(
                part = %part.name,
                priority = part.truncation_priority,
                tokens,
                remaining = total,
                "Truncated part"
            );
            removed.push(RemovedPart {
                name: part.name.clone(),
                truncation_priority: part.truncation_priority,
                tokens,
                position: index,
            });
        }

        let mut flags = keep.into_iter();
        self.parts.retain(|_| flags.next().unwrap_or(true));
        self.rebuild_tokens();

        if self.parts.is_empty() {
            warn!(budget, effective_budget, "Truncation removed every part");
        }

        Ok(TruncationReport {
            budget,
            effective_budget,
            tokens_before,
            tokens_after: total,
            removed,
        })
    }
}

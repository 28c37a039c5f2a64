//! Truncation engine behaviour, including property tests over random prompts.

use serde_json::json;
use stanza_core::PreconditionError;
use stanza_prompt::{Error, Prompt, StanzaConfig, TieBreak, TruncationConfig};

/// One part per `(priority, words)`; each word is a single builtin token.
fn template(layout: &[(i64, usize)]) -> String {
    layout
        .iter()
        .enumerate()
        .map(|(i, (priority, words))| {
            let content = vec!["tok"; *words].join(" ");
            format!("- name: p{i}\n  content: {content}\n  truncation_priority: {priority}\n")
        })
        .collect()
}

fn tokenized(layout: &[(i64, usize)]) -> Prompt {
    let mut prompt = Prompt::new(&template(layout), &json!({})).unwrap();
    prompt.tokenize().unwrap();
    prompt
}

fn names(prompt: &Prompt) -> Vec<String> {
    prompt.parts().iter().map(|p| p.name.clone()).collect()
}

#[test]
fn word_is_one_token() {
    let prompt = tokenized(&[(0, 3), (0, 1)]);
    assert_eq!(prompt.parts()[0].token_count(), Some(3));
    assert_eq!(prompt.total_tokens().unwrap(), 4);
}

#[test]
fn truncate_requires_tokenize() {
    let mut prompt = Prompt::new(&template(&[(0, 2)]), &json!({})).unwrap();
    assert!(matches!(
        prompt.truncate(1),
        Err(Error::Precondition(PreconditionError::NotTokenized))
    ));
    assert_eq!(prompt.parts().len(), 1);
}

#[test]
fn lowest_priority_goes_first() {
    let mut prompt = tokenized(&[(10, 2), (0, 2), (5, 2)]);
    prompt.truncate(4).unwrap();
    assert_eq!(names(&prompt), vec!["p0", "p2"]);

    prompt.truncate(2).unwrap();
    assert_eq!(names(&prompt), vec!["p0"]);
}

#[test]
fn equal_priority_removes_latest_first() {
    let mut prompt = tokenized(&[(0, 2), (0, 2), (0, 2)]);
    let report = prompt.truncate(4).unwrap();
    assert_eq!(names(&prompt), vec!["p0", "p1"]);
    assert_eq!(report.removed[0].name, "p2");
}

#[test]
fn earliest_first_from_config() {
    let config = StanzaConfig::from_toml_str("[truncation]\ntie_break = \"earliest_first\"\n").unwrap();
    let mut prompt = Prompt::from_config(&template(&[(0, 2), (0, 2), (0, 2)]), &json!({}), &config).unwrap();
    prompt.tokenize().unwrap();

    prompt.truncate(4).unwrap();
    assert_eq!(names(&prompt), vec!["p1", "p2"]);
}

#[test]
fn step_sheds_extra_tokens_once() {
    let config = StanzaConfig::from_toml_str("[truncation]\nstep = 2\n").unwrap();
    let mut prompt = Prompt::from_config(&template(&[(0, 2), (1, 2), (2, 2)]), &json!({}), &config).unwrap();
    prompt.tokenize().unwrap();

    let report = prompt.truncate(5).unwrap();
    assert_eq!(report.effective_budget, 3);
    assert_eq!(names(&prompt), vec!["p2"]);

    // Already under budget: the step does not apply again.
    let again = prompt.truncate(5).unwrap();
    assert!(again.is_noop());
    assert_eq!(names(&prompt), vec!["p2"]);
}

#[test]
fn truncate_with_overrides_prompt_options() {
    let mut prompt = tokenized(&[(0, 2), (0, 2)]);
    let config = TruncationConfig {
        tie_break: TieBreak::EarliestFirst,
        step: None,
    };
    prompt.truncate_with(2, &config).unwrap();
    assert_eq!(names(&prompt), vec!["p1"]);
}

#[test]
fn explicit_snapshot_survives_truncation() {
    let mut prompt = tokenized(&[(1, 2), (0, 3)]);
    let original = prompt.parts().to_vec();

    assert_eq!(prompt.snapshot_pretruncation().unwrap(), original.as_slice());
    prompt.truncate(2).unwrap();
    prompt.truncate(0).unwrap();

    assert!(prompt.parts().is_empty());
    assert_eq!(prompt.pretruncation_parts().unwrap(), original.as_slice());
}

#[test]
fn snapshot_is_never_refreshed() {
    let mut prompt = tokenized(&[(1, 2), (0, 3)]);
    prompt.truncate(2).unwrap();
    assert_eq!(prompt.pretruncation_parts().unwrap().len(), 2);

    // A later explicit call returns the first snapshot, not the trimmed parts.
    prompt.tokenize().unwrap();
    assert_eq!(prompt.snapshot_pretruncation().unwrap().len(), 2);
    assert_eq!(prompt.parts().len(), 1);
}

#[test]
fn empty_prompt_truncates_to_nothing() {
    let mut prompt = Prompt::new("", &json!({})).unwrap();
    prompt.tokenize().unwrap();
    let report = prompt.truncate(0).unwrap();
    assert!(report.is_noop());
    assert_eq!(prompt.total_tokens().unwrap(), 0);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn parts_strategy() -> impl Strategy<Value = Vec<(i64, usize)>> {
        proptest::collection::vec((-3i64..4, 1usize..6), 0..8)
    }

    proptest! {
        #[test]
        fn never_exceeds_budget_or_grows(layout in parts_strategy(), budget in 0usize..40) {
            let mut prompt = tokenized(&layout);
            let before = prompt.total_tokens().unwrap();
            let report = prompt.truncate(budget).unwrap();
            let after = prompt.total_tokens().unwrap();

            prop_assert!(after <= before);
            prop_assert!(after <= budget);
            prop_assert_eq!(report.tokens_after, after);
            let removed: usize = report.removed.iter().map(|r| r.tokens).sum();
            prop_assert_eq!(before - removed, after);

            let joined: Vec<u32> = prompt
                .parts()
                .iter()
                .flat_map(|p| p.tokens().unwrap().iter().copied())
                .collect();
            prop_assert_eq!(prompt.tokens().unwrap(), joined.as_slice());
        }

        #[test]
        fn survivors_keep_relative_order(layout in parts_strategy(), budget in 0usize..40) {
            let mut prompt = tokenized(&layout);
            prompt.truncate(budget).unwrap();

            let positions: Vec<usize> = prompt
                .parts()
                .iter()
                .map(|p| p.name[1..].parse().unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn larger_budget_never_removes_more(
            layout in parts_strategy(),
            small in 0usize..40,
            extra in 0usize..20,
        ) {
            let mut tight = tokenized(&layout);
            let mut loose = tokenized(&layout);
            tight.truncate(small).unwrap();
            loose.truncate(small + extra).unwrap();

            let kept_tight = names(&tight);
            let kept_loose = names(&loose);
            prop_assert!(kept_tight.iter().all(|n| kept_loose.contains(n)));
        }

        #[test]
        fn removed_parts_rank_below_survivors(layout in parts_strategy(), budget in 0usize..40) {
            let mut prompt = tokenized(&layout);
            let report = prompt.truncate(budget).unwrap();

            let max_removed = report.removed.iter().map(|r| r.truncation_priority).max();
            let min_kept = prompt.parts().iter().map(|p| p.truncation_priority).min();
            if let (Some(removed), Some(kept)) = (max_removed, min_kept) {
                prop_assert!(removed <= kept);
            }
        }

        #[test]
        fn repeated_truncation_is_stable(layout in parts_strategy(), budget in 0usize..40) {
            let mut prompt = tokenized(&layout);
            prompt.truncate(budget).unwrap();
            let once = names(&prompt);
            let report = prompt.truncate(budget).unwrap();

            prop_assert!(report.is_noop());
            prop_assert_eq!(names(&prompt), once);
        }

        #[test]
        fn snapshot_unaffected_by_truncation(
            layout in parts_strategy(),
            first in 0usize..40,
            second in 0usize..40,
        ) {
            let mut prompt = tokenized(&layout);
            let original = prompt.parts().to_vec();
            prompt.snapshot_pretruncation().unwrap();

            prompt.truncate(first).unwrap();
            prompt.truncate(second).unwrap();
            prop_assert_eq!(prompt.pretruncation_parts().unwrap(), original.as_slice());
        }
    }
}

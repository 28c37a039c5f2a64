//! Build a small chat prompt, fit it to a budget, and print what happened.
//!
//! ```text
//! RUST_LOG=debug cargo run -p stanza-prompt --example budget_report -- 40
//! ```

use serde_json::json;
use stanza_prompt::{Prompt, StanzaConfig};

const TEMPLATE: &str = r#"
- name: system
  role: system
  truncation_priority: 100
  sections:
    - name: persona
      content: |
        You are {{ assistant }}, a concise assistant.
    - name: rules
      content: |
        Answer in plain sentences.
{% for turn in history %}
- name: turn_{{ loop.index }}
  role: {{ turn.role }}
  truncation_priority: {{ loop.index }}
  content: |
    {{ turn.text }}
{% endfor %}
- name: question
  truncation_priority: 100
  content: |
    {{ question }}
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let budget: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(40);

    let data = json!({
        "assistant": "Quill",
        "history": [
            { "role": "user", "text": "What is a stanza?" },
            { "role": "assistant", "text": "A group of lines forming a unit in a poem." },
            { "role": "user", "text": "And a verse?" },
            { "role": "assistant", "text": "Often a single line, sometimes a whole stanza." },
        ],
        "question": "Which one is longer?",
    });

    let config = StanzaConfig::load()?;
    let mut prompt = Prompt::from_config(TEMPLATE, &data, &config)?;
    prompt.tokenize()?;

    println!("before: {} tokens", prompt.total_tokens()?);
    let report = prompt.truncate(budget)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!("{}", serde_json::to_string_pretty(&prompt.section_stats()?)?);

    for message in prompt.messages() {
        println!("[{}] {}", message.role, message.content.trim_end());
    }
    Ok(())
}

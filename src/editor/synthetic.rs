//! Synthetic dataset generation
//!
//! Each persona seed (topic, persona, tone) is rendered through the synthetic
//! prompt library once per action; the model answers with one email as a
//! JSON object, which becomes a dataset record with a sequential id.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Action, Generator, Task};
use crate::dataset::{Dataset, Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSeed {
    pub topic: String,
    pub persona: String,
    pub tone: String,
}

impl PersonaSeed {
    fn new(topic: &str, persona: &str, tone: &str) -> Self {
        Self {
            topic: topic.to_string(),
            persona: persona.to_string(),
            tone: tone.to_string(),
        }
    }

    fn to_record(&self, id: &str) -> Record {
        Record::from_pairs(
            id,
            &[
                ("topic", self.topic.as_str()),
                ("persona", self.persona.as_str()),
                ("tone", self.tone.as_str()),
            ],
        )
    }
}

pub fn default_seeds() -> Vec<PersonaSeed> {
    vec![
        PersonaSeed::new("flash flooding", "Master Wu", "wise"),
        PersonaSeed::new("potential business expenses", "Cosmo Kramer", "stressed"),
        PersonaSeed::new("a bad haircut", "Jimmy McNulty", "agitated"),
        PersonaSeed::new("angry pigs", "Boba Fett", "terrified"),
        PersonaSeed::new("kids these days", "Hank Hill", "proud"),
    ]
}

/// Which synthetic dataset each action family fills
pub fn plans() -> [(Task, &'static [Action]); 3] {
    [
        (Task::ShortenSynthetic, &[Action::Shorten]),
        (Task::LengthenSynthetic, &[Action::Lengthen]),
        (
            Task::ChangeToneSynthetic,
            &[Action::Friendly, Action::Sympathetic, Action::Professional],
        ),
    ]
}

/// Generate one record per (seed, action), ids counting up from 1.
pub async fn synthesize(
    generator: &Generator,
    name: &str,
    seeds: &[PersonaSeed],
    actions: &[Action],
    model: &str,
) -> Result<Dataset> {
    let mut dataset = Dataset::new(name);
    let mut next_id = 1;

    for seed in seeds {
        for &action in actions {
            let id = next_id.to_string();
            next_id += 1;

            let text = generator
                .generate(action, &seed.to_record(&id), model)
                .await
                .with_context(|| format!("Failed to generate {} record {}", name, id))?;
            let record = parse_generated(&id, &text)
                .with_context(|| format!("Model output for {} record {} is not an email", name, id))?;
            dataset.insert(record);
        }
    }

    tracing::info!("Synthesized {} record(s) for {}", dataset.len(), name);
    Ok(dataset)
}

/// Parse one generated email, forcing its id to `id`
fn parse_generated(id: &str, text: &str) -> Result<Record> {
    let body = strip_fence(text.trim());
    let value: Value = serde_json::from_str(body).context("invalid JSON")?;
    let Value::Object(generated) = value else {
        anyhow::bail!("expected a JSON object");
    };
    // The assigned id leads, as in hand-written datasets
    let mut fields = Map::new();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    fields.extend(generated.into_iter().filter(|(key, _)| key != "id"));
    Record::from_value(Value::Object(fields))
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

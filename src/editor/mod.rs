//! Email editing pipeline: generate a rewrite, then judge it
//!
//! - [`Generator`] renders an action's prompts and calls the generation model
//! - [`Judge`] grades a rewrite on each [`Criterion`] with the fixed judge model
//! - [`batch`] runs both over whole datasets and averages the ratings
//! - [`synthetic`] builds synthetic datasets from persona seeds

mod actions;
pub mod batch;
mod generate;
mod judge;
pub mod synthetic;

use std::sync::Arc;

pub use actions::{Action, Criterion, Task, Tone};
pub use batch::{BatchOptions, BatchReport, FailurePolicy, RecordOutcome};
pub use generate::Generator;
pub use judge::{Judge, Verdict};

use anyhow::Context;

use crate::ai::CompletionClient;
use crate::config::Config;
use crate::dataset::Record;
use crate::error::PipelineResult;
use crate::prompts::PromptLibrary;

/// A rewrite together with its verdicts
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub action: Action,
    pub generated: String,
    pub verdicts: Vec<Verdict>,
}

/// Generation and judging services sharing one completion client
#[derive(Clone)]
pub struct Editor {
    pub generator: Generator,
    pub judge: Judge,
}

impl Editor {
    pub fn new(
        prompts: Arc<PromptLibrary>,
        judge_prompts: Arc<PromptLibrary>,
        client: CompletionClient,
    ) -> Self {
        Self {
            generator: Generator::new(prompts, client.clone()),
            judge: Judge::new(judge_prompts, client),
        }
    }

    /// Load the edit and judge libraries and connect to the configured
    /// backend. Every action and criterion must have a template.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let prompts = PromptLibrary::load(&config.data.prompts)?;
        prompts.require(Action::ALL.iter().map(|a| a.template_key()))?;
        let judge_prompts = PromptLibrary::load(&config.data.judge_prompts)?;
        judge_prompts.require(Criterion::ALL.iter().map(|c| c.template_key()))?;

        let client = CompletionClient::from_config(&config.ai)
            .context("Failed to create completion client")?;

        Ok(Self::new(Arc::new(prompts), Arc::new(judge_prompts), client))
    }

    /// Generate once, then judge that rewrite on each criterion in order
    pub async fn edit_and_judge(
        &self,
        action: Action,
        record: &Record,
        model: &str,
        criteria: &[Criterion],
    ) -> PipelineResult<EditOutcome> {
        let generated = self.generator.generate(action, record, model).await?;
        let verdicts = self
            .judge
            .judge_all(criteria, action.task_description(), record, &generated)
            .await?;
        Ok(EditOutcome {
            action,
            generated,
            verdicts,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::ai::fake::ScriptedBackend;

    pub const PROMPTS: &str = r#"
        [lengthen]
        system = "Lengthen emails."
        user = "Lengthen: {content}"

        [shorten]
        system = "Shorten emails."
        user = "Shorten: {content}"

        [friendly]
        user = "Friendly: {content}"

        [sympathetic]
        user = "Sympathetic: {content}"

        [professional]
        user = "Professional: {content}"
    "#;

    pub const JUDGE_PROMPTS: &str = r#"
        [completeness]
        system = "Judge completeness of {task}."
        user = "ORIGINAL {selected_text}\nREWRITE {model_response}"

        [faithfulness]
        system = "Judge faithfulness of {task}."
        user = "ORIGINAL {selected_text}\nREWRITE {model_response}"
    "#;

    /// Editor over the test prompts and `backend`, judging with `gpt-4.1`
    pub fn editor(backend: Arc<ScriptedBackend>) -> Editor {
        Editor::new(
            Arc::new(PromptLibrary::from_toml_str("prompts.toml", PROMPTS).unwrap()),
            Arc::new(PromptLibrary::from_toml_str("judge_prompts.toml", JUDGE_PROMPTS).unwrap()),
            CompletionClient::new(backend, "gpt-4.1", 42),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fake::ScriptedBackend;

    #[tokio::test]
    async fn test_judging_follows_generation() {
        let backend = Arc::new(ScriptedBackend::new(|request| {
            if request.model == "gpt-4.1" {
                Ok(r#"{"rating": 3}"#.to_string())
            } else {
                Ok("Ship date: Friday.".to_string())
            }
        }));
        let editor = test_support::editor(backend.clone());
        let record = Record::from_pairs("1", &[("content", "Hi team, ship date is Friday.")]);

        let outcome = editor
            .edit_and_judge(Action::Shorten, &record, "gpt-4o-mini", &Criterion::ALL)
            .await
            .unwrap();
        assert_eq!(outcome.generated, "Ship date: Friday.");
        assert_eq!(outcome.verdicts.len(), 2);

        let requests = backend.requests();
        let models: Vec<_> = requests.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, vec!["gpt-4o-mini", "gpt-4.1", "gpt-4.1"]);
        // Judge prompts carry the generated text and the task phrase
        assert!(requests[1].messages[0].content.contains("shortening the original text"));
        assert!(requests[1].messages[1].content.ends_with("REWRITE Ship date: Friday."));
    }

    #[test]
    fn test_from_config_requires_every_action_template() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = dir.path().join("prompts.toml");
        let judge_prompts = dir.path().join("judge_prompts.toml");
        std::fs::write(&judge_prompts, test_support::JUDGE_PROMPTS).unwrap();

        let mut config = Config::default();
        config.data.prompts = prompts.clone();
        config.data.judge_prompts = judge_prompts;

        std::fs::write(&prompts, "[shorten]\nuser = \"{content}\"\n").unwrap();
        let err = Editor::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("lengthen"), "{err}");

        std::fs::write(&prompts, test_support::PROMPTS).unwrap();
        let editor = Editor::from_config(&config).unwrap();
        assert_eq!(editor.judge.model(), "gpt-4.1");
    }
}

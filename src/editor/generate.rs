//! Generation service: render an action's prompts for a record and ask the
//! generation model for the rewrite

use std::sync::Arc;

use super::actions::Action;
use crate::ai::{Backend, CompletionClient};
use crate::dataset::Record;
use crate::error::PipelineResult;
use crate::prompts::{PromptLibrary, render};

/// Concrete system/user prompt strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Clone)]
pub struct Generator {
    prompts: Arc<PromptLibrary>,
    client: CompletionClient,
}

impl Generator {
    pub fn new(prompts: Arc<PromptLibrary>, client: CompletionClient) -> Self {
        Self { prompts, client }
    }

    /// Render both prompt variants for `action` from the record's fields
    pub fn render(&self, action: Action, record: &Record) -> PipelineResult<RenderedPrompt> {
        let pair = self.prompts.get(action.template_key())?;
        Ok(RenderedPrompt {
            system: render(&pair.system, record)?,
            user: render(&pair.user, record)?,
        })
    }

    /// Rewrite `record` under `action` with the given generation model.
    ///
    /// Rendering happens first; a missing field means no backend call.
    pub async fn generate(
        &self,
        action: Action,
        record: &Record,
        model: &str,
    ) -> PipelineResult<String> {
        let prompt = self.render(action, record)?;
        tracing::info!(
            "Generating '{}' for record {} with {}",
            action,
            record.id(),
            model
        );
        self.client
            .complete(
                &prompt.system,
                &prompt.user,
                &Backend::Generation(model.to_string()),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fake::{ScriptedBackend, user_turn};
    use crate::error::PipelineError;

    const PROMPTS: &str = r#"
        [shorten]
        system = "You are a concise editor."
        user = "Shorten this email:\n{content}"

        [lengthen]
        system = "You expand emails."
        user = "From {sender}, subject {subject}:\n{content}"

        [friendly]
        system = "You rewrite emails in a friendly tone."
        user = "{content}"
    "#;

    fn generator(backend: Arc<ScriptedBackend>) -> Generator {
        let prompts = PromptLibrary::from_toml_str("prompts.toml", PROMPTS).unwrap();
        Generator::new(
            Arc::new(prompts),
            CompletionClient::new(backend, "gpt-4.1", 42),
        )
    }

    fn sample() -> Record {
        Record::from_pairs(
            "1",
            &[("content", "Hi team, quick update: ship date is Friday.")],
        )
    }

    #[tokio::test]
    async fn test_generate_shorten_round_trip() {
        let backend = Arc::new(ScriptedBackend::replying("Ship date: Friday."));
        let generator = generator(backend.clone());

        let text = generator
            .generate(Action::Shorten, &sample(), "gpt-4o-mini")
            .await
            .unwrap();
        assert!(!text.is_empty());

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-4o-mini");
        assert_eq!(
            user_turn(&requests[0]),
            "Shorten this email:\nHi team, quick update: ship date is Friday."
        );
    }

    #[tokio::test]
    async fn test_missing_field_skips_backend() {
        let backend = Arc::new(ScriptedBackend::replying("unused"));
        let generator = generator(backend.clone());

        let err = generator
            .generate(Action::Lengthen, &sample(), "gpt-4o-mini")
            .await
            .unwrap_err();
        match err {
            PipelineError::MissingField { template, fields } => {
                assert_eq!(template, "lengthen/user");
                assert_eq!(fields, vec!["sender".to_string(), "subject".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_friendly_needs_only_its_own_fields() {
        let backend = Arc::new(ScriptedBackend::replying("Hey all!"));
        let generator = generator(backend.clone());

        // `sender`/`subject` are required by lengthen, not by friendly
        let text = generator
            .generate(Action::Friendly, &sample(), "gpt-4o-mini")
            .await
            .unwrap();
        assert_eq!(text, "Hey all!");
    }

    #[tokio::test]
    async fn test_action_without_template_is_config_error() {
        let backend = Arc::new(ScriptedBackend::replying("unused"));
        let generator = generator(backend.clone());

        let err = generator
            .generate(Action::Professional, &sample(), "gpt-4o-mini")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_render_leaves_no_placeholders() {
        let generator = generator(Arc::new(ScriptedBackend::replying("")));
        let record = Record::from_pairs(
            "9",
            &[
                ("sender", "a@b.c"),
                ("subject", "Hello"),
                ("content", "Body"),
            ],
        );
        for action in [Action::Shorten, Action::Lengthen, Action::Friendly] {
            let prompt = generator.render(action, &record).unwrap();
            assert!(!prompt.system.contains('{') && !prompt.user.contains('{'));
        }
    }
}

//! Judging service: grade a rewrite against its original with the judge model

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::actions::Criterion;
use crate::ai::{Backend, CompletionClient};
use crate::constants::{RATING_MAX, RATING_MIN};
use crate::dataset::Record;
use crate::error::{PipelineError, PipelineResult};
use crate::prompts::{PromptLibrary, render};

/// Keys that may carry the judge's free-text justification
const EXPLANATION_KEYS: [&str; 5] = [
    "explanation",
    "justification",
    "reasoning",
    "rationale",
    "comment",
];

/// Parsed judge response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub criterion: Criterion,
    pub rating: u8,
    pub explanation: Option<String>,
    /// Full JSON object the judge returned
    pub raw: Value,
}

#[derive(Clone)]
pub struct Judge {
    prompts: Arc<PromptLibrary>,
    client: CompletionClient,
}

impl Judge {
    pub fn new(prompts: Arc<PromptLibrary>, client: CompletionClient) -> Self {
        Self { prompts, client }
    }

    pub fn model(&self) -> &str {
        self.client.judge_model()
    }

    /// Score `generated` for one criterion. Always sent to the judge model.
    pub async fn judge(
        &self,
        criterion: Criterion,
        task_description: &str,
        record: &Record,
        generated: &str,
    ) -> PipelineResult<Verdict> {
        let pair = self.prompts.get(criterion.template_key())?;
        let original = record.to_json_text();
        let fields: [(&str, &str); 3] = [
            ("task", task_description),
            ("selected_text", original.as_str()),
            ("model_response", generated),
        ];
        let system = render(&pair.system, &fields[..])?;
        let user = render(&pair.user, &fields[..])?;

        tracing::info!("Judging {} for record {}", criterion, record.id());
        let text = self.client.complete(&system, &user, &Backend::Judge).await?;
        let verdict = parse_verdict(criterion, &text)?;
        tracing::debug!(
            "Record {} {}: rating {}",
            record.id(),
            criterion,
            verdict.rating
        );
        Ok(verdict)
    }

    /// Score one rewrite on each criterion in order
    pub async fn judge_all(
        &self,
        criteria: &[Criterion],
        task_description: &str,
        record: &Record,
        generated: &str,
    ) -> PipelineResult<Vec<Verdict>> {
        let mut verdicts = Vec::with_capacity(criteria.len());
        for &criterion in criteria {
            verdicts.push(
                self.judge(criterion, task_description, record, generated)
                    .await?,
            );
        }
        Ok(verdicts)
    }
}

/// Extract and validate the verdict object from judge output.
///
/// The object may be wrapped in prose or a markdown fence; the first `{` that
/// starts a complete JSON object wins.
pub fn parse_verdict(criterion: Criterion, text: &str) -> PipelineResult<Verdict> {
    let reject = |reason: &str| PipelineError::JudgeFormat {
        reason: reason.to_string(),
        raw: text.to_string(),
    };

    let object = extract_object(text).ok_or_else(|| reject("no JSON object found"))?;
    let rating = match object.get("rating") {
        None => return Err(reject("missing 'rating' field")),
        Some(value) => integral_rating(value).ok_or_else(|| reject("'rating' is not an integer"))?,
    };
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(reject(&format!(
            "rating {} outside {}..={}",
            rating, RATING_MIN, RATING_MAX
        )));
    }

    let explanation = EXPLANATION_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    Ok(Verdict {
        criterion,
        rating: rating as u8,
        explanation,
        raw: Value::Object(object),
    })
}

fn extract_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
    })
}

fn integral_rating(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fake::{ScriptedBackend, user_turn};
    use crate::editor::Action;
    use serde_json::json;

    const JUDGE_PROMPTS: &str = r#"
        [completeness]
        system = "You grade completeness. Reply with {{\"rating\": 0-3, \"explanation\": \"...\"}}."
        user = "Task: {task}\nOriginal: {selected_text}\nRewrite: {model_response}"

        [faithfulness]
        system = "You grade faithfulness for {task}."
        user = "Original: {selected_text}\nRewrite: {model_response}"
    "#;

    fn judge(backend: Arc<ScriptedBackend>) -> Judge {
        let prompts = PromptLibrary::from_toml_str("judge_prompts.toml", JUDGE_PROMPTS).unwrap();
        Judge::new(
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
    async fn test_judge_round_trip() {
        let backend = Arc::new(ScriptedBackend::replying(
            r#"{"rating": 3, "explanation": "All key facts kept."}"#,
        ));
        let judge = judge(backend.clone());

        let verdict = judge
            .judge(
                Criterion::Completeness,
                Action::Shorten.task_description(),
                &sample(),
                "Ship date: Friday.",
            )
            .await
            .unwrap();
        assert_eq!(verdict.criterion, Criterion::Completeness);
        assert!((0..=3).contains(&verdict.rating));
        assert_eq!(verdict.rating, 3);
        assert_eq!(verdict.explanation.as_deref(), Some("All key facts kept."));

        let requests = backend.requests();
        assert_eq!(requests[0].model, "gpt-4.1");
        let user = user_turn(&requests[0]);
        assert!(user.starts_with("Task: shortening the original text\n"));
        assert!(user.contains("\"content\":\"Hi team, quick update: ship date is Friday.\""));
        assert!(user.ends_with("Rewrite: Ship date: Friday."));
    }

    #[tokio::test]
    async fn test_judge_always_uses_judge_model() {
        let backend = Arc::new(ScriptedBackend::replying(r#"{"rating": 2}"#));
        let judge = judge(backend.clone());

        for _ in 0..2 {
            judge
                .judge_all(&Criterion::ALL, "lengthening the original text", &sample(), "x")
                .await
                .unwrap();
        }
        assert_eq!(backend.call_count(), 4);
        assert!(backend.requests().iter().all(|r| r.model == "gpt-4.1"));
        assert_eq!(judge.model(), "gpt-4.1");
    }

    #[tokio::test]
    async fn test_judge_all_keeps_criterion_order() {
        let backend = Arc::new(ScriptedBackend::new(|request| {
            if request.messages[0].content.contains("completeness") {
                Ok(r#"{"rating": 1}"#.to_string())
            } else {
                Ok(r#"{"rating": 2}"#.to_string())
            }
        }));
        let verdicts = judge(backend)
            .judge_all(&Criterion::ALL, "task", &sample(), "rewrite")
            .await
            .unwrap();
        let pairs: Vec<_> = verdicts.iter().map(|v| (v.criterion, v.rating)).collect();
        assert_eq!(
            pairs,
            vec![(Criterion::Completeness, 1), (Criterion::Faithfulness, 2)]
        );
    }

    #[tokio::test]
    async fn test_unparseable_judge_output_is_format_error() {
        let backend = Arc::new(ScriptedBackend::replying("Looks great to me!"));
        let err = judge(backend)
            .judge(Criterion::Faithfulness, "task", &sample(), "rewrite")
            .await
            .unwrap_err();
        match err {
            PipelineError::JudgeFormat { reason, raw } => {
                assert_eq!(reason, "no JSON object found");
                assert_eq!(raw, "Looks great to me!");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_fenced_and_prefixed_output() {
        let text = "Here is my verdict:\n```json\n{\"rating\": 2, \"justification\": \"Dropped the date.\"}\n```";
        let verdict = parse_verdict(Criterion::Completeness, text).unwrap();
        assert_eq!(verdict.rating, 2);
        assert_eq!(verdict.explanation.as_deref(), Some("Dropped the date."));
        assert_eq!(verdict.raw["justification"], json!("Dropped the date."));
    }

    #[test]
    fn test_parse_skips_non_json_braces() {
        let text = "Scale {0..3}. Result: {\"rating\": 1}";
        assert_eq!(
            parse_verdict(Criterion::Faithfulness, text).unwrap().rating,
            1
        );
    }

    #[test]
    fn test_parse_accepts_integral_floats() {
        let verdict = parse_verdict(Criterion::Completeness, r#"{"rating": 3.0}"#).unwrap();
        assert_eq!(verdict.rating, 3);
        assert_eq!(verdict.explanation, None);
    }

    #[test]
    fn test_parse_rejects_bad_ratings() {
        for text in [
            r#"{"score": 2}"#,
            r#"{"rating": "2"}"#,
            r#"{"rating": 2.5}"#,
            r#"{"rating": 4}"#,
            r#"{"rating": -1}"#,
            r#"{"rating": null}"#,
        ] {
            let err = parse_verdict(Criterion::Completeness, text).unwrap_err();
            assert!(
                matches!(err, PipelineError::JudgeFormat { .. }),
                "{text}: {err}"
            );
        }
    }
}

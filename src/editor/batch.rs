//! Batch evaluation: generate and judge every record of one or more datasets
//! and average the ratings per criterion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::{Action, Criterion, Editor, Task, Verdict};
use crate::constants::SYNTHETIC_ID_PREFIX;
use crate::dataset::{Dataset, Record};
use crate::error::PipelineResult;

/// What to do when one record fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// First failure abandons the batch
    #[default]
    Abort,
    /// Record the failure on the record and keep going
    Skip,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub action: Action,
    pub model: String,
    pub criteria: Vec<Criterion>,
    pub failure_policy: FailurePolicy,
    /// Records in flight at once; 1 means strictly sequential
    pub concurrency: usize,
}

impl BatchOptions {
    pub fn new(action: Action, model: impl Into<String>) -> Self {
        Self {
            action,
            model: model.into(),
            criteria: Criterion::ALL.to_vec(),
            failure_policy: FailurePolicy::default(),
            concurrency: 1,
        }
    }
}

/// One record queued for evaluation
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Id as shown in the report (may carry a dataset prefix)
    pub id: String,
    pub record: Record,
}

/// Result for one record
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub id: String,
    pub original: Option<String>,
    pub generated: Option<String>,
    pub verdicts: Vec<Verdict>,
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn rating(&self, criterion: Criterion) -> Option<u8> {
        self.verdicts
            .iter()
            .find(|v| v.criterion == criterion)
            .map(|v| v.rating)
    }

    pub fn verdict(&self, criterion: Criterion) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.criterion == criterion)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub action: Action,
    pub generation_model: String,
    pub judge_model: String,
    pub per_record: Vec<RecordOutcome>,
    /// Mean rating per criterion; `None` when no record contributed
    pub averages: BTreeMap<Criterion, Option<f64>>,
    pub failed: usize,
}

impl BatchReport {
    pub fn average(&self, criterion: Criterion) -> Option<f64> {
        self.averages.get(&criterion).copied().flatten()
    }
}

/// Mean of `ratings`, or `None` for an empty slice
pub fn average(ratings: &[u8]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u64 = ratings.iter().map(|&r| u64::from(r)).sum();
    Some(sum as f64 / ratings.len() as f64)
}

/// Average for display: two decimals, or `n/a` when nothing was rated
pub fn format_average(average: Option<f64>) -> String {
    average.map_or_else(|| "n/a".to_string(), |avg| format!("{:.2}", avg))
}

/// Averages over successful outcomes only
pub fn averages(
    outcomes: &[RecordOutcome],
    criteria: &[Criterion],
) -> BTreeMap<Criterion, Option<f64>> {
    criteria
        .iter()
        .map(|&criterion| {
            let ratings: Vec<u8> = outcomes
                .iter()
                .filter(|o| o.is_ok())
                .filter_map(|o| o.rating(criterion))
                .collect();
            (criterion, average(&ratings))
        })
        .collect()
}

/// Queue every record of `datasets` in order. Records from synthetic
/// datasets get their ids prefixed so mixed reports stay unambiguous.
pub fn items_from_datasets(datasets: &[&Dataset]) -> Vec<BatchItem> {
    datasets
        .iter()
        .flat_map(|dataset| {
            let synthetic = dataset
                .name()
                .parse::<Task>()
                .is_ok_and(Task::is_synthetic);
            let prefix = if synthetic {
                SYNTHETIC_ID_PREFIX
            } else {
                ""
            };
            dataset.records().iter().map(move |record| BatchItem {
                id: format!("{}{}", prefix, record.id()),
                record: record.clone(),
            })
        })
        .collect()
}

struct Attempt {
    generated: Option<String>,
    result: PipelineResult<Vec<Verdict>>,
}

async fn attempt(editor: &Editor, item: &BatchItem, options: &BatchOptions) -> Attempt {
    let generated = match editor
        .generator
        .generate(options.action, &item.record, &options.model)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            return Attempt {
                generated: None,
                result: Err(e),
            };
        }
    };
    let result = editor
        .judge
        .judge_all(
            &options.criteria,
            options.action.task_description(),
            &item.record,
            &generated,
        )
        .await;
    Attempt {
        generated: Some(generated),
        result,
    }
}

/// Generate once per record, judge each criterion, then average.
///
/// Outcomes are reported through `on_outcome` in input order as they finish.
/// With [`FailurePolicy::Abort`] the first error is returned and the rest of
/// the batch is dropped.
pub async fn evaluate_batch<F>(
    editor: &Editor,
    items: &[BatchItem],
    options: &BatchOptions,
    mut on_outcome: F,
) -> PipelineResult<BatchReport>
where
    F: FnMut(&RecordOutcome),
{
    tracing::info!(
        "Evaluating {} record(s): action={} model={} concurrency={}",
        items.len(),
        options.action,
        options.model,
        options.concurrency.max(1)
    );

    // Boxed up front so the stream type carries no closure over borrowed items
    let pending: Vec<BoxFuture<'_, (&BatchItem, Attempt)>> = items
        .iter()
        .map(|item| {
            attempt(editor, item, options)
                .map(move |result| (item, result))
                .boxed()
        })
        .collect();
    let mut attempts = futures::stream::iter(pending).buffered(options.concurrency.max(1));

    let mut per_record = Vec::with_capacity(items.len());
    let mut failed = 0;
    while let Some((item, attempt)) = attempts.next().await {
        let outcome = match attempt.result {
            Ok(verdicts) => RecordOutcome {
                id: item.id.clone(),
                original: item.record.content().map(str::to_string),
                generated: attempt.generated,
                verdicts,
                error: None,
            },
            Err(e) => {
                if options.failure_policy == FailurePolicy::Abort {
                    tracing::error!("Record {} failed ({}), aborting batch: {}", item.id, e.kind(), e);
                    return Err(e);
                }
                tracing::warn!("Record {} failed ({}), skipping: {}", item.id, e.kind(), e);
                failed += 1;
                RecordOutcome {
                    id: item.id.clone(),
                    original: item.record.content().map(str::to_string),
                    generated: attempt.generated,
                    verdicts: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        on_outcome(&outcome);
        per_record.push(outcome);
    }

    let averages = averages(&per_record, &options.criteria);
    Ok(BatchReport {
        generated_at: Utc::now(),
        action: options.action,
        generation_model: options.model.clone(),
        judge_model: editor.judge.model().to_string(),
        per_record,
        averages,
        failed,
    })
}

/// Evaluate several datasets as one batch, see [`items_from_datasets`]
pub async fn evaluate_datasets<F>(
    editor: &Editor,
    datasets: &[&Dataset],
    options: &BatchOptions,
    on_outcome: F,
) -> PipelineResult<BatchReport>
where
    F: FnMut(&RecordOutcome),
{
    let items = items_from_datasets(datasets);
    evaluate_batch(editor, &items, options, on_outcome).await
}

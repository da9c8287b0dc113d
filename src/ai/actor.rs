//! Pipeline actor for running generation and evaluation off the UI thread

use tokio::sync::mpsc;

use crate::config::BatchConfig;
use crate::dataset::{Dataset, Record};
use crate::editor::{
    Action, BatchOptions, BatchReport, Criterion, EditOutcome, Editor, RecordOutcome, batch,
};

/// Commands that can be sent to the pipeline actor
#[derive(Debug)]
pub enum PipelineCommand {
    /// Rewrite one record and judge the result
    Generate {
        record: Record,
        action: Action,
        model: String,
    },
    /// Evaluate every record of `datasets` as one batch
    EvaluateAll {
        datasets: Vec<Dataset>,
        action: Action,
        model: String,
    },
    /// Shutdown the actor
    Shutdown,
}

/// Events emitted by the pipeline actor
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Single generation finished and was judged
    Generated {
        record_id: String,
        model: String,
        outcome: EditOutcome,
    },
    /// One batch record finished
    EvalProgress(RecordOutcome),
    /// Whole batch finished
    EvalDone(BatchReport),
    /// Error occurred while running a command
    Error(String),
}

/// Handle for communicating with the pipeline actor
pub struct PipelineActorHandle {
    pub cmd_tx: mpsc::Sender<PipelineCommand>,
    pub event_rx: mpsc::UnboundedReceiver<PipelineEvent>,
}

/// Spawn the pipeline actor task
pub fn spawn_pipeline_actor(editor: Editor, batch_config: BatchConfig) -> PipelineActorHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    // Batch progress is sent from a synchronous callback
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(pipeline_actor_loop(editor, batch_config, cmd_rx, event_tx));

    PipelineActorHandle { cmd_tx, event_rx }
}

async fn pipeline_actor_loop(
    editor: Editor,
    batch_config: BatchConfig,
    mut cmd_rx: mpsc::Receiver<PipelineCommand>,
    event_tx: mpsc::UnboundedSender<PipelineEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let event = match cmd {
            PipelineCommand::Generate {
                record,
                action,
                model,
            } => {
                match editor
                    .edit_and_judge(action, &record, &model, &Criterion::ALL)
                    .await
                {
                    Ok(outcome) => PipelineEvent::Generated {
                        record_id: record.id().to_string(),
                        model,
                        outcome,
                    },
                    Err(e) => PipelineEvent::Error(format!("Generation failed: {}", e)),
                }
            }

            PipelineCommand::EvaluateAll {
                datasets,
                action,
                model,
            } => {
                let mut options = BatchOptions::new(action, model);
                options.failure_policy = batch_config.failure_policy;
                options.concurrency = batch_config.concurrency;

                let refs: Vec<&Dataset> = datasets.iter().collect();
                let progress_tx = event_tx.clone();
                let result = batch::evaluate_datasets(&editor, &refs, &options, |outcome| {
                    let _ = progress_tx.send(PipelineEvent::EvalProgress(outcome.clone()));
                })
                .await;

                match result {
                    Ok(report) => PipelineEvent::EvalDone(report),
                    Err(e) => PipelineEvent::Error(format!("Evaluation failed: {}", e)),
                }
            }

            PipelineCommand::Shutdown => {
                break;
            }
        };

        if event_tx.send(event).is_err() {
            tracing::warn!("Pipeline actor: event receiver dropped");
            break;
        }
    }
}

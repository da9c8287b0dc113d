//! Generate and evaluate requests

use std::str::FromStr;

use anyhow::Result;

use crate::ai::PipelineCommand;
use crate::constants::EVALUATION_DATASETS;
use crate::dataset::Dataset;
use crate::editor::{Action, Task};

use super::super::App;

impl App {
    /// Rewrite and judge the selected record with the selected model
    pub(crate) async fn request_generation(&mut self) -> Result<()> {
        if self.state.is_busy() {
            self.state.set_status("Still running; wait for the current request");
            return Ok(());
        }
        let Some(record) = self.state.generate.record.clone() else {
            self.state
                .set_error(format!("No records in {}", self.state.generate.task.label()));
            return Ok(());
        };

        let action = self.state.generate.action();
        let model = self.state.models.current().to_string();
        tracing::info!("Generating {} for record {} with {}", action, record.id(), model);

        let command = PipelineCommand::Generate {
            record,
            action,
            model: model.clone(),
        };
        if self.pipeline.cmd_tx.send(command).await.is_err() {
            self.state.set_error("Pipeline is not running");
            return Ok(());
        }

        self.state.generate.running = true;
        self.state.set_status(format!("{} with {}...", action.label(), model));
        Ok(())
    }

    /// Evaluate the shorten datasets as one batch
    pub(crate) async fn request_evaluation(&mut self) -> Result<()> {
        if self.state.is_busy() {
            self.state.set_status("Still running; wait for the current request");
            return Ok(());
        }

        let datasets = self.evaluation_datasets();
        if datasets.iter().all(Dataset::is_empty) {
            self.state.set_error("No records to evaluate");
            return Ok(());
        }

        let model = self.state.models.current().to_string();
        let total: usize = datasets.iter().map(Dataset::len).sum();
        tracing::info!("Evaluating {} record(s) with {}", total, model);

        let command = PipelineCommand::EvaluateAll {
            datasets,
            action: Action::Shorten,
            model: model.clone(),
        };
        if self.pipeline.cmd_tx.send(command).await.is_err() {
            self.state.set_error("Pipeline is not running");
            return Ok(());
        }

        self.state.evaluate.start();
        self.state
            .set_status(format!("Evaluating {} record(s) with {}...", total, model));
        Ok(())
    }

    fn evaluation_datasets(&self) -> Vec<Dataset> {
        EVALUATION_DATASETS
            .iter()
            .filter_map(|stem| Task::from_str(stem).ok())
            .filter_map(|task| self.datasets.get(&task).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::ai::fake::ScriptedBackend;
    use crate::app::state::Tab;
    use crate::app::test_support;
    use crate::editor::Task;
    use crate::input::UiAction;

    fn backend() -> Arc<ScriptedBackend> {
        Arc::new(ScriptedBackend::new(|request| {
            if request.model == "gpt-4.1" {
                Ok(r#"{"rating": 3, "explanation": "fine"}"#.to_string())
            } else {
                Ok("Rewritten.".to_string())
            }
        }))
    }

    #[tokio::test]
    async fn test_generation_round_trip_through_actor() {
        let mut app = test_support::app(backend());

        app.handle_action(UiAction::Run).await.unwrap();
        assert!(app.state.generate.running);

        // A second request is refused while the first runs
        app.request_evaluation().await.unwrap();
        assert!(!app.state.evaluate.running);

        let event = app.pipeline.event_rx.recv().await.unwrap();
        app.apply_pipeline_event(event);

        assert!(!app.state.generate.running);
        let result = app.state.generate.result.as_ref().unwrap();
        assert_eq!(result.record_id, "1");
        assert_eq!(result.generated, "Rewritten.");
        assert_eq!(result.model, "gpt-4o-mini");
        assert_eq!(result.verdicts.len(), 2);
    }

    #[tokio::test]
    async fn test_evaluation_streams_outcomes() {
        let mut app = test_support::app(backend());
        app.state.tab = Tab::Evaluate;

        app.handle_action(UiAction::Run).await.unwrap();
        assert!(app.state.evaluate.running);

        while app.state.evaluate.running {
            let event = app.pipeline.event_rx.recv().await.unwrap();
            app.apply_pipeline_event(event);
        }

        let ids: Vec<_> = app
            .state
            .evaluate
            .outcomes
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "synthetic_1", "synthetic_2"]);
        let finished = app.state.evaluate.finished.as_ref().unwrap();
        assert_eq!(finished.failed, 0);
        assert_eq!(
            app.state.evaluate.running_averages()[&crate::editor::Criterion::Completeness],
            Some(3.0)
        );
    }

    #[tokio::test]
    async fn test_empty_dataset_is_reported() {
        let mut app = test_support::app(backend());
        app.datasets.remove(&Task::Lengthen);
        app.sync_records();

        app.request_generation().await.unwrap();
        assert!(!app.state.generate.running);
        assert!(app.state.status.error.as_deref().unwrap().contains("Lengthen"));
    }
}

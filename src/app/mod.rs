//! Application core - owns state, datasets, and the pipeline actor

mod actions;
mod event_loop;
pub mod render_thread;
pub mod state;

use anyhow::Result;
use std::collections::HashMap;

use render_thread::RenderThread;

use crate::ai::{PipelineActorHandle, PipelineCommand, spawn_pipeline_actor};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::editor::{Editor, Task};
use crate::input::KeyBindings;
use state::{AppState, HelpState, ModelPicker};

pub struct App {
    pub(crate) state: AppState,
    pub(crate) bindings: KeyBindings,
    /// One dataset per task, loaded at startup
    pub(crate) datasets: HashMap<Task, Dataset>,
    pub(crate) pipeline: PipelineActorHandle,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let editor = Editor::from_config(&config)?;

        let mut datasets = HashMap::new();
        for task in Task::ALL {
            let path = config.data.dataset_path(task.dataset_stem());
            let dataset = Dataset::load_or_empty(&path)?;
            tracing::info!("Loaded {} record(s) for {}", dataset.len(), task.label());
            datasets.insert(task, dataset);
        }

        Ok(Self::with_editor(&config, editor, datasets))
    }

    /// Assemble the app around an already built editor
    pub(crate) fn with_editor(
        config: &Config,
        editor: Editor,
        datasets: HashMap<Task, Dataset>,
    ) -> Self {
        let bindings = KeyBindings::new(&config.ui.keybinding_mode);
        let pipeline = spawn_pipeline_actor(editor, config.batch.clone());

        let state = AppState {
            models: ModelPicker::new(config.ai.model_choices(), &config.ai.default_model),
            judge_model: config.ai.judge_model.clone(),
            help: HelpState {
                entries: bindings.all_bindings(),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut app = Self {
            state,
            bindings,
            datasets,
            pipeline,
            dirty: true, // Start dirty for initial render
        };
        app.sync_records();
        app
    }

    /// Refresh the record list and original email after the task changes
    pub(crate) fn sync_records(&mut self) {
        let task = self.state.generate.task;
        let ids = self
            .datasets
            .get(&task)
            .map(|d| d.records().iter().map(|r| r.id().to_string()).collect())
            .unwrap_or_default();
        self.state.generate.set_record_ids(ids);
        self.sync_record();
    }

    /// Copy the selected record into state for the original email panel
    pub(crate) fn sync_record(&mut self) {
        let generate = &self.state.generate;
        let record = generate
            .selected_record_id()
            .and_then(|id| self.datasets.get(&generate.task)?.get(id))
            .cloned();
        self.state.generate.record = record;
        self.state.generate.result_scroll = 0;
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        self.state.set_status(format!(
            "{} record(s) in {}",
            self.state.generate.record_ids.len(),
            self.state.generate.task.label()
        ));

        let result = self.event_loop(&render_thread).await;

        // Shutdown render thread (handles terminal cleanup)
        render_thread.shutdown();

        self.pipeline.cmd_tx.send(PipelineCommand::Shutdown).await.ok();

        result
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::ai::fake::ScriptedBackend;
    use crate::dataset::Record;
    use crate::editor::test_support::editor;

    pub fn record(id: &str, content: &str) -> Record {
        Record::from_pairs(
            id,
            &[
                ("sender", "ops@example.com"),
                ("subject", "Status"),
                ("content", content),
            ],
        )
    }

    pub fn dataset(name: &str, records: &[Record]) -> Dataset {
        let mut dataset = Dataset::new(name);
        for record in records {
            dataset.insert(record.clone());
        }
        dataset
    }

    /// App with a scripted backend and two records per task
    pub fn app(backend: Arc<ScriptedBackend>) -> App {
        let datasets = Task::ALL
            .into_iter()
            .map(|task| {
                let stem = task.dataset_stem();
                let records = [
                    record("1", &format!("{} one", stem)),
                    record("2", &format!("{} two", stem)),
                ];
                (task, dataset(stem, &records))
            })
            .collect();
        App::with_editor(&Config::default(), editor(backend), datasets)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ai::fake::ScriptedBackend;

    #[tokio::test]
    async fn test_new_app_selects_first_record() {
        let app = test_support::app(Arc::new(ScriptedBackend::replying("ok")));

        assert_eq!(app.state.generate.task, Task::Lengthen);
        assert_eq!(app.state.generate.record_ids, vec!["1", "2"]);
        let record = app.state.generate.record.as_ref().unwrap();
        assert_eq!(record.content(), Some("lengthen one"));
        assert_eq!(app.state.models.current(), "gpt-4o-mini");
        assert_eq!(app.state.judge_model, "gpt-4.1");
        assert!(!app.state.help.entries.is_empty());
    }

    #[tokio::test]
    async fn test_sync_records_handles_missing_dataset() {
        let mut app = test_support::app(Arc::new(ScriptedBackend::replying("ok")));
        app.datasets.remove(&Task::Shorten);
        app.state.generate.task = Task::Shorten;
        app.sync_records();

        assert!(app.state.generate.record_ids.is_empty());
        assert!(app.state.generate.record.is_none());
    }
}

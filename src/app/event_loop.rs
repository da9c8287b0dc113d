//! Main event loop and pipeline event processing

use anyhow::Result;
use crossterm::event;
use std::time::Duration;

use crate::ai::PipelineEvent;
use crate::editor::{Criterion, batch};
use crate::input::{InputResult, handle_input};

use super::App;
use super::render_thread::RenderThread;
use super::state::{FinishedRun, GenerationView};

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        loop {
            // Process pipeline events FIRST (non-blocking)
            if self.process_pipeline_events() {
                self.dirty = true;
            }

            // Clear expired errors
            if self.state.clear_error_if_expired() {
                self.dirty = true;
            }

            // Keep the spinner moving while a request is in flight
            if self.state.is_busy() {
                self.dirty = true;
            }

            // Render only when dirty (non-blocking - sends to render thread)
            if self.dirty {
                render_thread.render(self.state.clone());
                self.dirty = false;
            }

            // Handle input (faster polling while busy so the spinner animates)
            let poll_timeout = if self.state.is_busy() { 50 } else { 150 };
            if event::poll(Duration::from_millis(poll_timeout))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.acknowledge_error();
                        self.handle_action(action).await?;
                    }
                    InputResult::Continue => {}
                }
            }
        }

        Ok(())
    }

    /// Drain events from the pipeline actor. Returns true if any were processed.
    pub(crate) fn process_pipeline_events(&mut self) -> bool {
        let mut had_events = false;
        while let Ok(event) = self.pipeline.event_rx.try_recv() {
            had_events = true;
            self.apply_pipeline_event(event);
        }
        had_events
    }

    pub(crate) fn apply_pipeline_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Generated {
                record_id,
                model,
                outcome,
            } => {
                let generate = &mut self.state.generate;
                generate.running = false;
                generate.result_scroll = 0;
                generate.result = Some(GenerationView {
                    record_id,
                    action: outcome.action,
                    model,
                    generated: outcome.generated,
                    verdicts: outcome.verdicts,
                });
                self.state.set_status("Generation judged");
            }
            PipelineEvent::EvalProgress(outcome) => {
                if let Some(error) = &outcome.error {
                    tracing::warn!("Record {} failed: {}", outcome.id, error);
                }
                self.state.evaluate.outcomes.push(outcome);
                let done = self.state.evaluate.outcomes.len();
                self.state.set_status(format!("Evaluated {} record(s)...", done));
            }
            PipelineEvent::EvalDone(report) => {
                let evaluate = &mut self.state.evaluate;
                evaluate.running = false;
                // The report is authoritative if progress events were missed
                evaluate.outcomes = report.per_record;
                evaluate.finished = Some(FinishedRun {
                    generated_at: report.generated_at,
                    model: report.generation_model,
                    failed: report.failed,
                });
                let averages: Vec<String> = Criterion::ALL
                    .iter()
                    .map(|c| {
                        format!(
                            "{} {}",
                            c.label(),
                            batch::format_average(report.averages.get(c).copied().flatten())
                        )
                    })
                    .collect();
                self.state
                    .set_status(format!("Evaluation done: {}", averages.join(", ")));
            }
            PipelineEvent::Error(e) => {
                self.state.generate.running = false;
                self.state.evaluate.running = false;
                self.state.set_error(e);
            }
        }
    }
}

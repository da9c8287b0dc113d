//! Application state types
//!
//! All state types live here to maintain clean dependency:
//! UI layer imports from app layer, not vice versa.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::constants::ERROR_TTL_SECS;
use crate::dataset::Record;
use crate::editor::{Action, Criterion, RecordOutcome, Task, Tone, Verdict, batch};
use crate::input::KeybindingEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Generate,
    Evaluate,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Generate, Tab::Evaluate];

    pub fn label(self) -> &'static str {
        match self {
            Self::Generate => "Generate",
            Self::Evaluate => "Evaluate",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Generate => 0,
            Self::Evaluate => 1,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Generate => Self::Evaluate,
            Self::Evaluate => Self::Generate,
        }
    }
}

/// Selector focused on the Generate tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerateField {
    #[default]
    Task,
    Record,
    Tone,
    Model,
}

impl GenerateField {
    /// Next selector; `Tone` is skipped unless the task changes tone
    pub fn next(self, tone_visible: bool) -> Self {
        match self {
            Self::Task => Self::Record,
            Self::Record if tone_visible => Self::Tone,
            Self::Record | Self::Tone => Self::Model,
            Self::Model => Self::Task,
        }
    }

    pub fn prev(self, tone_visible: bool) -> Self {
        match self {
            Self::Task => Self::Model,
            Self::Record => Self::Task,
            Self::Tone => Self::Record,
            Self::Model if tone_visible => Self::Tone,
            Self::Model => Self::Record,
        }
    }
}

/// Generation model selector, shared by both tabs
#[derive(Debug, Clone, Default)]
pub struct ModelPicker {
    pub choices: Vec<String>,
    pub selected: usize,
}

impl ModelPicker {
    pub fn new(choices: Vec<String>, default_model: &str) -> Self {
        let selected = choices
            .iter()
            .position(|m| m == default_model)
            .unwrap_or(0);
        Self { choices, selected }
    }

    pub fn current(&self) -> &str {
        self.choices
            .get(self.selected)
            .map_or("", String::as_str)
    }

    pub fn next(&mut self) {
        if !self.choices.is_empty() {
            self.selected = (self.selected + 1) % self.choices.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.choices.is_empty() {
            self.selected = (self.selected + self.choices.len() - 1) % self.choices.len();
        }
    }
}

/// Last finished generation shown in the result panel
#[derive(Debug, Clone)]
pub struct GenerationView {
    pub record_id: String,
    pub action: Action,
    pub model: String,
    pub generated: String,
    pub verdicts: Vec<Verdict>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateState {
    pub task: Task,
    pub tone: Tone,
    pub field: GenerateField,
    /// Ids of the current task's dataset, in file order
    pub record_ids: Vec<String>,
    pub record_index: usize,
    /// Copy of the selected record for the original email panel
    pub record: Option<Record>,
    pub running: bool,
    pub result: Option<GenerationView>,
    pub result_scroll: u16,
}

impl GenerateState {
    /// Action the Generate button runs for the current selection
    pub fn action(&self) -> Action {
        self.task.action(self.tone)
    }

    pub fn selected_record_id(&self) -> Option<&str> {
        self.record_ids.get(self.record_index).map(String::as_str)
    }

    /// Replace the record list, keeping the index in range
    pub fn set_record_ids(&mut self, ids: Vec<String>) {
        self.record_ids = ids;
        if self.record_index >= self.record_ids.len() {
            self.record_index = 0;
        }
    }

    pub fn next_record(&mut self) {
        if !self.record_ids.is_empty() {
            self.record_index = (self.record_index + 1) % self.record_ids.len();
        }
    }

    pub fn prev_record(&mut self) {
        if !self.record_ids.is_empty() {
            self.record_index =
                (self.record_index + self.record_ids.len() - 1) % self.record_ids.len();
        }
    }

    pub fn focus_next(&mut self) {
        self.field = self.field.next(self.task.is_tone());
    }

    pub fn focus_prev(&mut self) {
        self.field = self.field.prev(self.task.is_tone());
    }
}

/// Summary of a finished evaluation run
#[derive(Debug, Clone)]
pub struct FinishedRun {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EvaluateState {
    pub running: bool,
    /// Outcomes in record order, appended as they arrive
    pub outcomes: Vec<RecordOutcome>,
    pub selected: usize,
    pub detail_scroll: u16,
    pub finished: Option<FinishedRun>,
}

impl EvaluateState {
    /// Reset for a new run
    pub fn start(&mut self) {
        self.running = true;
        self.outcomes.clear();
        self.selected = 0;
        self.detail_scroll = 0;
        self.finished = None;
    }

    /// Averages over the outcomes received so far
    pub fn running_averages(&self) -> BTreeMap<Criterion, Option<f64>> {
        batch::averages(&self.outcomes, &Criterion::ALL)
    }

    pub fn selected_outcome(&self) -> Option<&RecordOutcome> {
        self.outcomes.get(self.selected)
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.outcomes.len() {
            self.selected += 1;
            self.detail_scroll = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.detail_scroll = 0;
        }
    }

    pub fn move_to_top(&mut self) {
        self.selected = 0;
        self.detail_scroll = 0;
    }

    pub fn move_to_bottom(&mut self) {
        self.selected = self.outcomes.len().saturating_sub(1);
        self.detail_scroll = 0;
    }
}

/// Loading, error, and status message state
#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub error: Option<String>,
    pub error_time: Option<std::time::Instant>,
    pub message: String,
    /// Persists after error bar expires - shown as indicator in status bar
    pub has_unacknowledged_error: bool,
}

impl StatusState {
    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
        self.error_time = Some(std::time::Instant::now());
        self.has_unacknowledged_error = true;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_time = None;
    }

    /// Acknowledge the error indicator (clear the persistent flag)
    pub fn acknowledge_error(&mut self) {
        self.has_unacknowledged_error = false;
    }

    /// Clear error if TTL expired. Returns true if error was cleared.
    pub fn clear_error_if_expired(&mut self) -> bool {
        if let Some(time) = self.error_time
            && time.elapsed().as_secs() >= ERROR_TTL_SECS
        {
            self.clear_error();
            true
        } else {
            false
        }
    }

    pub fn set_message(&mut self, msg: impl ToString) {
        self.message = msg.to_string();
    }
}

/// Keybinding overlay
#[derive(Debug, Clone, Default)]
pub struct HelpState {
    pub visible: bool,
    pub entries: Vec<KeybindingEntry>,
    pub scroll: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub tab: Tab,
    pub generate: GenerateState,
    pub evaluate: EvaluateState,
    pub models: ModelPicker,
    /// Fixed judge model, shown for reference
    pub judge_model: String,
    pub status: StatusState,
    pub help: HelpState,
}

impl AppState {
    /// Whether a pipeline command is in flight
    pub fn is_busy(&self) -> bool {
        self.generate.running || self.evaluate.running
    }

    // Delegate methods to StatusState
    pub fn set_error(&mut self, error: impl ToString) {
        self.status.set_error(error);
    }

    pub fn clear_error_if_expired(&mut self) -> bool {
        self.status.clear_error_if_expired()
    }

    pub fn acknowledge_error(&mut self) {
        self.status.acknowledge_error();
    }

    pub fn set_status(&mut self, msg: impl ToString) {
        self.status.set_message(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_cycle_skips_tone_for_plain_tasks() {
        let mut state = GenerateState::default();
        assert_eq!(state.task, Task::Lengthen);
        let mut seen = Vec::new();
        for _ in 0..4 {
            state.focus_next();
            seen.push(state.field);
        }
        assert_eq!(
            seen,
            vec![
                GenerateField::Record,
                GenerateField::Model,
                GenerateField::Task,
                GenerateField::Record
            ]
        );

        state.task = Task::ChangeTone;
        state.focus_next();
        assert_eq!(state.field, GenerateField::Tone);
        state.focus_prev();
        state.focus_prev();
        assert_eq!(state.field, GenerateField::Task);
        state.focus_prev();
        assert_eq!(state.field, GenerateField::Model);
        state.focus_prev();
        assert_eq!(state.field, GenerateField::Tone);
    }

    #[test]
    fn test_action_follows_task_and_tone() {
        let mut state = GenerateState {
            task: Task::ShortenSynthetic,
            ..Default::default()
        };
        assert_eq!(state.action(), Action::Shorten);
        state.task = Task::ChangeToneSynthetic;
        state.tone = Tone::Professional;
        assert_eq!(state.action(), Action::Professional);
    }

    #[test]
    fn test_record_selection_wraps_and_clamps() {
        let mut state = GenerateState::default();
        state.prev_record();
        assert_eq!(state.selected_record_id(), None);

        state.set_record_ids(vec!["1".into(), "2".into(), "3".into()]);
        state.prev_record();
        assert_eq!(state.selected_record_id(), Some("3"));
        state.next_record();
        assert_eq!(state.selected_record_id(), Some("1"));

        state.record_index = 2;
        state.set_record_ids(vec!["a".into()]);
        assert_eq!(state.selected_record_id(), Some("a"));
    }

    #[test]
    fn test_model_picker() {
        let mut picker = ModelPicker::new(
            vec!["gpt-4o-mini".into(), "gpt-4.1".into()],
            "gpt-4.1",
        );
        assert_eq!(picker.current(), "gpt-4.1");
        picker.next();
        assert_eq!(picker.current(), "gpt-4o-mini");
        picker.prev();
        assert_eq!(picker.current(), "gpt-4.1");

        let mut empty = ModelPicker::default();
        empty.next();
        assert_eq!(empty.current(), "");
    }

    #[test]
    fn test_running_averages_track_outcomes() {
        let mut state = EvaluateState::default();
        assert_eq!(state.running_averages()[&Criterion::Completeness], None);

        state.start();
        state.outcomes.push(RecordOutcome {
            id: "1".into(),
            original: None,
            generated: None,
            verdicts: Vec::new(),
            error: Some("backend unavailable".into()),
        });
        assert!(state.running);
        assert_eq!(state.running_averages()[&Criterion::Faithfulness], None);

        state.move_down();
        assert_eq!(state.selected, 0);
        state.move_to_bottom();
        assert_eq!(state.selected_outcome().map(|o| o.id.as_str()), Some("1"));
    }

    #[test]
    fn test_error_expiry() {
        let mut status = StatusState::default();
        assert!(!status.clear_error_if_expired());
        status.set_error("boom");
        assert!(status.has_unacknowledged_error);
        assert!(!status.clear_error_if_expired());
        status.error_time = Some(
            std::time::Instant::now() - std::time::Duration::from_secs(ERROR_TTL_SECS + 1),
        );
        assert!(status.clear_error_if_expired());
        assert!(status.error.is_none());
        assert!(status.has_unacknowledged_error);
    }
}

//! Navigation actions (selector focus, value cycling, scrolling)

use crate::app::state::{GenerateField, Tab};

use super::super::App;

impl App {
    pub(crate) fn move_up(&mut self) {
        match self.state.tab {
            Tab::Generate => self.state.generate.focus_prev(),
            Tab::Evaluate => self.state.evaluate.move_up(),
        }
    }

    pub(crate) fn move_down(&mut self) {
        match self.state.tab {
            Tab::Generate => self.state.generate.focus_next(),
            Tab::Evaluate => self.state.evaluate.move_down(),
        }
    }

    pub(crate) fn move_to_top(&mut self) {
        match self.state.tab {
            Tab::Generate => self.state.generate.field = GenerateField::Task,
            Tab::Evaluate => self.state.evaluate.move_to_top(),
        }
    }

    pub(crate) fn move_to_bottom(&mut self) {
        match self.state.tab {
            Tab::Generate => self.state.generate.field = GenerateField::Model,
            Tab::Evaluate => self.state.evaluate.move_to_bottom(),
        }
    }

    /// Cycle the focused selector; on the Evaluate tab this is the model
    pub(crate) fn cycle_value(&mut self, forward: bool) {
        let field = match self.state.tab {
            Tab::Generate => self.state.generate.field,
            Tab::Evaluate => GenerateField::Model,
        };

        match field {
            GenerateField::Task => {
                let generate = &mut self.state.generate;
                generate.task = if forward {
                    generate.task.next()
                } else {
                    generate.task.prev()
                };
                generate.record_index = 0;
                self.sync_records();
            }
            GenerateField::Record => {
                if forward {
                    self.state.generate.next_record();
                } else {
                    self.state.generate.prev_record();
                }
                self.sync_record();
            }
            GenerateField::Tone => {
                let generate = &mut self.state.generate;
                generate.tone = if forward {
                    generate.tone.next()
                } else {
                    generate.tone.prev()
                };
            }
            GenerateField::Model => {
                if forward {
                    self.state.models.next();
                } else {
                    self.state.models.prev();
                }
            }
        }
    }

    pub(crate) fn scroll_result_up(&mut self, lines: u16) {
        let scroll = self.result_scroll_mut();
        *scroll = scroll.saturating_sub(lines);
    }

    pub(crate) fn scroll_result_down(&mut self, lines: u16) {
        let scroll = self.result_scroll_mut();
        *scroll = scroll.saturating_add(lines);
    }

    fn result_scroll_mut(&mut self) -> &mut u16 {
        match self.state.tab {
            Tab::Generate => &mut self.state.generate.result_scroll,
            Tab::Evaluate => &mut self.state.evaluate.detail_scroll,
        }
    }
}

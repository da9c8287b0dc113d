//! Action handlers for user input
//!
//! - `navigation`: selector focus, value cycling, and scrolling
//! - `pipeline`: generate and evaluate requests to the pipeline actor

mod navigation;
mod pipeline;

use anyhow::Result;

use crate::app::state::Tab;
use crate::input::UiAction;

use super::App;

impl App {
    pub(crate) async fn handle_action(&mut self, action: UiAction) -> Result<()> {
        if self.state.help.visible {
            match action {
                UiAction::Up => self.help_scroll_up(),
                UiAction::Down => self.help_scroll_down(),
                UiAction::Help => self.toggle_help(),
                _ => {}
            }
            return Ok(());
        }

        match action {
            // Navigation
            UiAction::Up => self.move_up(),
            UiAction::Down => self.move_down(),
            UiAction::Left => self.cycle_value(false),
            UiAction::Right => self.cycle_value(true),
            UiAction::Top => self.move_to_top(),
            UiAction::Bottom => self.move_to_bottom(),
            UiAction::PageUp => self.scroll_result_up(crate::constants::SCROLL_PAGE_LINES),
            UiAction::PageDown => self.scroll_result_down(crate::constants::SCROLL_PAGE_LINES),
            UiAction::ScrollUp => self.scroll_result_up(1),
            UiAction::ScrollDown => self.scroll_result_down(1),
            UiAction::NextTab => {
                self.state.tab = self.state.tab.next();
            }

            // Actions
            UiAction::Run => match self.state.tab {
                Tab::Generate => self.request_generation().await?,
                Tab::Evaluate => self.request_evaluation().await?,
            },
            UiAction::Back => {
                self.state.status.clear_error();
            }
            UiAction::Help => self.toggle_help(),
            // Quit is handled by the input layer
            UiAction::Quit => {}
        }
        Ok(())
    }

    fn toggle_help(&mut self) {
        self.state.help.visible = !self.state.help.visible;
        self.state.help.scroll = 0;
    }

    fn help_scroll_up(&mut self) {
        self.state.help.scroll = self.state.help.scroll.saturating_sub(1);
    }

    fn help_scroll_down(&mut self) {
        if self.state.help.scroll + 1 < self.state.help.entries.len() {
            self.state.help.scroll += 1;
        }
    }
}

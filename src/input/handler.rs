use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::keybindings::{KeyBindings, UiAction};
use crate::app::state::AppState;

#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
    Action(UiAction),
}

pub fn handle_input(event: Event, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) => handle_key(key_event, state, bindings),
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState, bindings: &KeyBindings) -> InputResult {
    // Ctrl+C always quits, whatever the mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return InputResult::Quit;
    }

    if state.help.visible {
        return handle_help_input(key, bindings);
    }

    // Check for mapped action
    if let Some(action) = bindings.get(&key) {
        if action == UiAction::Quit {
            return InputResult::Quit;
        }
        return InputResult::Action(action);
    }

    InputResult::Continue
}

fn handle_help_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    // In help modal: up/down scroll, Esc or the help key closes
    if let Some(action) = bindings.get(&key) {
        match action {
            UiAction::Help | UiAction::Back => return InputResult::Action(UiAction::Help),
            UiAction::Up => return InputResult::Action(UiAction::Up),
            UiAction::Down => return InputResult::Action(UiAction::Down),
            UiAction::Quit => return InputResult::Quit,
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc => InputResult::Action(UiAction::Help),
        KeyCode::Up => InputResult::Action(UiAction::Up),
        KeyCode::Down => InputResult::Action(UiAction::Down),
        _ => InputResult::Continue,
    }
}

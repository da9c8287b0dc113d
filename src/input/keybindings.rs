use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::config::KeybindingMode;

/// What a key press asks the interface to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
    PageUp,
    PageDown,
    ScrollUp,
    ScrollDown,
    NextTab,

    // Actions
    Run,
    Back,
    Quit,

    // Help
    Help,
}

pub struct KeyBindings {
    bindings: HashMap<KeyEvent, UiAction>,
}

/// A displayable keybinding entry
#[derive(Debug, Clone)]
pub struct KeybindingEntry {
    pub key: String,
    pub description: String,
    pub category: &'static str,
}

impl KeyBindings {
    pub fn new(mode: &KeybindingMode) -> Self {
        let bindings = match mode {
            KeybindingMode::Vim => Self::vim_bindings(),
            KeybindingMode::Arrows => Self::arrow_bindings(),
        };
        Self { bindings }
    }

    pub fn get(&self, event: &KeyEvent) -> Option<UiAction> {
        self.bindings.get(event).copied()
    }

    /// Get all keybindings as displayable entries grouped by category
    pub fn all_bindings(&self) -> Vec<KeybindingEntry> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(event, action)| KeybindingEntry {
                key: format_key_event(event),
                description: action_description(action).to_string(),
                category: action_category(action),
            })
            .collect();

        // Sort by category, then description, then key for a stable listing
        entries.sort_by(|a, b| {
            category_order(a.category)
                .cmp(&category_order(b.category))
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| a.key.cmp(&b.key))
        });
        entries
    }

    fn vim_bindings() -> HashMap<KeyEvent, UiAction> {
        let mut map = HashMap::new();

        // Navigation
        map.insert(key('j'), UiAction::Down);
        map.insert(key('k'), UiAction::Up);
        map.insert(key('h'), UiAction::Left);
        map.insert(key('l'), UiAction::Right);
        map.insert(key('g'), UiAction::Top);
        map.insert(shift_key('G'), UiAction::Bottom);
        map.insert(ctrl_key('d'), UiAction::PageDown);
        map.insert(ctrl_key('u'), UiAction::PageUp);
        map.insert(shift_key('J'), UiAction::ScrollDown);
        map.insert(shift_key('K'), UiAction::ScrollUp);
        map.insert(key_code(KeyCode::Tab), UiAction::NextTab);

        // Actions
        map.insert(key_code(KeyCode::Enter), UiAction::Run);
        map.insert(key('q'), UiAction::Quit);
        map.insert(key_code(KeyCode::Esc), UiAction::Back);

        // Help
        map.insert(key('?'), UiAction::Help);

        map
    }

    fn arrow_bindings() -> HashMap<KeyEvent, UiAction> {
        let mut map = HashMap::new();

        // Navigation
        map.insert(key_code(KeyCode::Down), UiAction::Down);
        map.insert(key_code(KeyCode::Up), UiAction::Up);
        map.insert(key_code(KeyCode::Left), UiAction::Left);
        map.insert(key_code(KeyCode::Right), UiAction::Right);
        map.insert(key_code(KeyCode::Home), UiAction::Top);
        map.insert(key_code(KeyCode::End), UiAction::Bottom);
        map.insert(key_code(KeyCode::PageDown), UiAction::PageDown);
        map.insert(key_code(KeyCode::PageUp), UiAction::PageUp);
        map.insert(shift_key_code(KeyCode::Down), UiAction::ScrollDown);
        map.insert(shift_key_code(KeyCode::Up), UiAction::ScrollUp);
        map.insert(key_code(KeyCode::Tab), UiAction::NextTab);

        // Actions
        map.insert(key_code(KeyCode::Enter), UiAction::Run);
        map.insert(key_code(KeyCode::F(5)), UiAction::Run);
        map.insert(key_code(KeyCode::Esc), UiAction::Back);
        map.insert(ctrl_key('q'), UiAction::Quit);

        // Help
        map.insert(key_code(KeyCode::F(1)), UiAction::Help);

        map
    }
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn shift_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
}

fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn shift_key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SHIFT)
}

/// Format a KeyEvent for display
fn format_key_event(event: &KeyEvent) -> String {
    let mut parts = Vec::new();

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl+");
    }
    // Uppercase letters already show the shift
    if event.modifiers.contains(KeyModifiers::SHIFT) && !matches!(event.code, KeyCode::Char(_)) {
        parts.push("Shift+");
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt+");
    }

    let key_str = match event.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", event.code),
    };

    format!("{}{}", parts.join(""), key_str)
}

fn action_description(action: &UiAction) -> &'static str {
    match action {
        UiAction::Up => "Previous field / record",
        UiAction::Down => "Next field / record",
        UiAction::Left => "Previous choice",
        UiAction::Right => "Next choice",
        UiAction::Top => "Go to top",
        UiAction::Bottom => "Go to bottom",
        UiAction::PageUp => "Page up",
        UiAction::PageDown => "Page down",
        UiAction::ScrollUp => "Scroll result up",
        UiAction::ScrollDown => "Scroll result down",
        UiAction::NextTab => "Switch tab",
        UiAction::Run => "Generate / evaluate",
        UiAction::Back => "Close / dismiss error",
        UiAction::Quit => "Quit",
        UiAction::Help => "Toggle help",
    }
}

fn action_category(action: &UiAction) -> &'static str {
    match action {
        UiAction::Up
        | UiAction::Down
        | UiAction::Left
        | UiAction::Right
        | UiAction::Top
        | UiAction::Bottom
        | UiAction::PageUp
        | UiAction::PageDown
        | UiAction::ScrollUp
        | UiAction::ScrollDown
        | UiAction::NextTab => "Navigation",

        UiAction::Run | UiAction::Back | UiAction::Quit => "Actions",

        UiAction::Help => "Help",
    }
}

fn category_order(category: &str) -> u8 {
    match category {
        "Navigation" => 0,
        "Actions" => 1,
        "Help" => 2,
        _ => 99,
    }
}

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Tabs},
};

use super::components::centered_rect_constrained;
use super::evaluate::render_evaluate;
use super::generate::render_generate;
use super::theme::{Theme, borders};
use super::widgets::{StatusInfo, error_bar, help_bar, status_bar};
use crate::app::state::{AppState, Tab};
use crate::input::KeybindingEntry;

pub fn render(frame: &mut Frame, state: &AppState) {
    frame.render_widget(Block::default().style(Theme::main_bg()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Tabs
            Constraint::Min(0),    // Tab body
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_status_bar(frame, chunks[0], state);
    render_tabs(frame, chunks[1], state.tab);

    match state.tab {
        Tab::Generate => render_generate(frame, chunks[2], state),
        Tab::Evaluate => render_evaluate(frame, chunks[2], state),
    }

    // Help bar or error
    if let Some(ref error) = state.status.error {
        error_bar(frame, chunks[3], error);
    } else {
        let entries = &state.help.entries;
        let run = match state.tab {
            Tab::Generate => "generate",
            Tab::Evaluate => "evaluate all",
        };
        let hints = [
            (hint_key(entries, "Generate / evaluate"), run),
            (hint_key(entries, "Next field / record"), "move"),
            (hint_key(entries, "Next choice"), "change"),
            (hint_key(entries, "Scroll result down"), "scroll"),
            (hint_key(entries, "Switch tab"), "tab"),
            (hint_key(entries, "Toggle help"), "help"),
            (hint_key(entries, "Quit"), "quit"),
        ];
        let hints: Vec<(&str, &str)> = hints.iter().map(|(k, d)| (k.as_str(), *d)).collect();
        help_bar(frame, chunks[3], &hints);
    }

    if state.help.visible {
        render_help_popup(frame, frame.area(), &state.help.entries, state.help.scroll);
    }
}

/// Key bound to the action with `description`; "?" if unbound
fn hint_key(entries: &[KeybindingEntry], description: &str) -> String {
    let keys: Vec<&str> = entries
        .iter()
        .filter(|e| e.description == description)
        .map(|e| e.key.as_str())
        .collect();
    if keys.is_empty() {
        "?".to_string()
    } else {
        keys.join("/")
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let context = match state.tab {
        Tab::Generate => {
            let generate = &state.generate;
            match generate.selected_record_id() {
                Some(id) => format!("{} · record {}", generate.action().label(), id),
                None => format!("{} · no records", generate.task.label()),
            }
        }
        Tab::Evaluate => format!("Shorten · {} result(s)", state.evaluate.outcomes.len()),
    };
    let info = StatusInfo {
        busy: state.is_busy(),
        has_error: state.status.has_unacknowledged_error,
        context: &context,
        model: state.models.current(),
        judge_model: &state.judge_model,
        message: &state.status.message,
    };
    status_bar(frame, area, &info);
}

fn render_tabs(frame: &mut Frame, area: Rect, tab: Tab) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| Line::from(format!(" {} ", t.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(tab.index())
        .style(Theme::tab())
        .highlight_style(Theme::tab_active())
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_help_popup(frame: &mut Frame, area: Rect, entries: &[KeybindingEntry], scroll: usize) {
    let categories = entries
        .iter()
        .map(|e| e.category)
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let content_height = (entries.len() + categories * 2) as u16 + 2;
    let popup_area = centered_rect_constrained(area, 36, 56, 8, content_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Help ")
        .title_bottom(" up/down scroll │ Esc close ")
        .borders(Borders::ALL)
        .border_type(borders::popup())
        .border_style(Theme::border_focused())
        .style(Theme::text());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_width = 14;
    let mut items: Vec<ListItem> = Vec::new();
    let mut current_category: Option<&str> = None;
    for entry in entries {
        if current_category != Some(entry.category) {
            if current_category.is_some() {
                items.push(ListItem::new(Line::from("")));
            }
            let rule_width = inner.width.saturating_sub(entry.category.len() as u16 + 4);
            items.push(ListItem::new(Line::from(vec![
                Span::styled(
                    format!("── {} ", entry.category),
                    Theme::text_secondary().add_modifier(Modifier::BOLD),
                ),
                Span::styled("─".repeat(rule_width as usize), Theme::border()),
            ])));
            current_category = Some(entry.category);
        }

        items.push(ListItem::new(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                format!("{:width$}", entry.key, width = key_width),
                Theme::text_accent(),
            ),
            Span::styled(entry.description.clone(), Theme::text()),
        ])));
    }

    let visible: Vec<ListItem> = items.into_iter().skip(scroll).collect();
    frame.render_widget(List::new(visible), inner);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::config::KeybindingMode;
    use crate::input::KeyBindings;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn state() -> AppState {
        let mut state = AppState {
            judge_model: "gpt-4.1".to_string(),
            ..Default::default()
        };
        state.help.entries = KeyBindings::new(&KeybindingMode::Vim).all_bindings();
        state
    }

    #[test]
    fn test_hint_key_joins_alternatives() {
        let entries = KeyBindings::new(&KeybindingMode::Arrows).all_bindings();
        assert_eq!(hint_key(&entries, "Generate / evaluate"), "Enter/F5");
        assert_eq!(hint_key(&entries, "Nothing"), "?");
    }

    #[test]
    fn test_render_shows_tabs_and_hints() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let state = state();
        terminal.draw(|f| render(f, &state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Generate"));
        assert!(text.contains("Evaluate"));
        assert!(text.contains("judge gpt-4.1"));
        assert!(text.contains("Enter generate"));
    }

    #[test]
    fn test_render_help_and_error() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let mut state = state();
        state.help.visible = true;
        state.set_error("Generation failed: backend unavailable");
        terminal.draw(|f| render(f, &state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Help"));
        assert!(text.contains("Navigation"));
        assert!(text.contains("Error: Generation failed"));
    }
}

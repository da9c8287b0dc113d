//! Generate tab: selectors, the original email, and the judged rewrite

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::status_bar::spinner_char;
use super::theme::{Theme, borders, symbols};
use super::widgets::{sanitize_text, text_lines, verdict_lines};
use crate::app::state::{AppState, GenerateField, GenerateState};
use crate::constants::MIN_SPLIT_VIEW_WIDTH;

pub fn render_generate(frame: &mut Frame, area: Rect, state: &AppState) {
    let generate = &state.generate;
    let direction = if area.width >= MIN_SPLIT_VIEW_WIDTH {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let columns = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let selector_rows = selector_lines(state);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(selector_rows.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let selectors = Paragraph::new(selector_rows).block(panel(" Selection ", true));
    frame.render_widget(selectors, left[0]);

    render_original(frame, left[1], generate);
    render_result(frame, columns[1], generate);
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(borders::panel())
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .style(Theme::text())
}

fn selector_lines(state: &AppState) -> Vec<Line<'static>> {
    let generate = &state.generate;
    let record = generate
        .selected_record_id()
        .map(|id| {
            format!(
                "{} ({}/{})",
                id,
                generate.record_index + 1,
                generate.record_ids.len()
            )
        })
        .unwrap_or_else(|| "none".to_string());

    let mut rows = vec![
        selector(generate, GenerateField::Task, "Task", generate.task.label().to_string()),
        selector(generate, GenerateField::Record, "Record", record),
    ];
    if generate.task.is_tone() {
        rows.push(selector(
            generate,
            GenerateField::Tone,
            "Tone",
            generate.tone.label().to_string(),
        ));
    }
    rows.push(selector(
        generate,
        GenerateField::Model,
        "Model",
        state.models.current().to_string(),
    ));
    rows
}

fn selector(generate: &GenerateState, field: GenerateField, label: &str, value: String) -> Line<'static> {
    let focused = generate.field == field;
    let (marker, value_style, value) = if focused {
        (
            symbols::FOCUS,
            Theme::input_highlight(),
            format!("{}{}{}", symbols::CHOICE_LEFT, value, symbols::CHOICE_RIGHT),
        )
    } else {
        (symbols::NO_FOCUS, Theme::text(), value)
    };
    Line::from(vec![
        Span::styled(marker, Theme::text_accent()),
        Span::styled(format!("{:<8}", label), Theme::label()),
        Span::styled(value, value_style),
    ])
}

fn render_original(frame: &mut Frame, area: Rect, generate: &GenerateState) {
    let block = panel(" Original ", false);
    let Some(record) = &generate.record else {
        let empty = Paragraph::new(Line::styled(
            format!("No records in {}", generate.task.label()),
            Theme::text_muted(),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        header_line("From", record.sender()),
        header_line("Subject", record.subject()),
        Line::from(""),
    ];
    match record.content() {
        Some(content) => lines.extend(text_lines(content)),
        None => lines.push(Line::styled("(record has no content)", Theme::text_error())),
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn header_line(label: &str, value: Option<&str>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Theme::label()),
        Span::styled(sanitize_text(value.unwrap_or("-")), Theme::text_secondary()),
    ])
}

fn render_result(frame: &mut Frame, area: Rect, generate: &GenerateState) {
    if generate.running {
        let waiting = Paragraph::new(Line::styled(
            format!("{} Generating and judging...", spinner_char()),
            Theme::text_accent(),
        ))
        .block(panel(" Result ", false));
        frame.render_widget(waiting, area);
        return;
    }

    let Some(result) = &generate.result else {
        let hint = Paragraph::new(Line::styled(
            "Pick a record and run Generate",
            Theme::text_muted(),
        ))
        .block(panel(" Result ", false));
        frame.render_widget(hint, area);
        return;
    };

    let title = format!(
        " {} · record {} · {} ",
        result.action.label(),
        result.record_id,
        result.model
    );
    let mut lines = text_lines(&result.generated);
    for verdict in &result.verdicts {
        lines.push(Line::from(""));
        lines.extend(verdict_lines(verdict));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(&title, false))
        .wrap(Wrap { trim: false })
        .scroll((generate.result_scroll, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    use super::*;
    use crate::app::state::GenerationView;
    use crate::dataset::Record;
    use crate::editor::{Action, Criterion, Task, Verdict};

    fn draw(state: &AppState, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 24)).unwrap();
        terminal
            .draw(|f| render_generate(f, f.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_tone_selector_only_for_tone_tasks() {
        let mut state = AppState::default();
        state.generate.record_ids = vec!["7".to_string()];
        assert!(!draw(&state, 100).contains("Tone"));

        state.generate.task = Task::ChangeTone;
        let text = draw(&state, 100);
        assert!(text.contains("Tone"));
        assert!(text.contains("Friendly"));
        assert!(text.contains("7 (1/1)"));
    }

    #[test]
    fn test_original_and_verdicts_render() {
        let mut state = AppState::default();
        state.generate.record = Some(Record::from_pairs(
            "1",
            &[
                ("sender", "ana@example.com"),
                ("subject", "Offsite"),
                ("content", "We meet Friday at nine."),
            ],
        ));
        state.generate.result = Some(GenerationView {
            record_id: "1".to_string(),
            action: Action::Shorten,
            model: "gpt-4o".to_string(),
            generated: "Friday, 9am.".to_string(),
            verdicts: vec![Verdict {
                criterion: Criterion::Completeness,
                rating: 3,
                explanation: None,
                raw: json!({"rating": 3}),
            }],
        });

        let text = draw(&state, 120);
        assert!(text.contains("From: ana@example.com"));
        assert!(text.contains("We meet Friday at nine."));
        assert!(text.contains("Shorten · record 1 · gpt-4o"));
        assert!(text.contains("Friday, 9am."));
        assert!(text.contains("Completeness: 3/3"));

        // Narrow terminals stack the panels
        let narrow = draw(&state, 60);
        assert!(narrow.contains("Completeness: 3/3"));
    }

    #[test]
    fn test_missing_dataset_message() {
        let state = AppState::default();
        assert!(draw(&state, 100).contains("No records in Lengthen"));
    }
}

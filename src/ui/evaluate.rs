//! Evaluate tab: running averages, per-record outcomes, and a detail panel

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::status_bar::spinner_char;
use super::theme::{Theme, borders, symbols};
use super::widgets::{rating_label, text_lines, truncate_string, verdict_lines};
use crate::app::state::{AppState, EvaluateState};
use crate::constants::{MIN_SPLIT_VIEW_WIDTH, RATING_MAX};
use crate::editor::{Criterion, RecordOutcome, batch};

pub fn render_evaluate(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    render_summary(frame, chunks[0], state);

    let evaluate = &state.evaluate;
    if evaluate.outcomes.is_empty() {
        let message = if evaluate.running {
            format!("{} Waiting for the first record...", spinner_char())
        } else {
            "Run Evaluate to score every shorten record".to_string()
        };
        let hint = Paragraph::new(Line::styled(message, Theme::text_muted()))
            .block(panel(" Records ".to_string(), false));
        frame.render_widget(hint, chunks[1]);
        return;
    }

    let direction = if chunks[1].width >= MIN_SPLIT_VIEW_WIDTH {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let body = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    render_outcomes(frame, body[0], evaluate);
    render_detail(frame, body[1], evaluate);
}

fn panel(title: String, focused: bool) -> Block<'static> {
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

fn render_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let evaluate = &state.evaluate;
    let averages = evaluate.running_averages();

    let mut average_spans = vec![Span::styled("Averages  ", Theme::label())];
    for criterion in Criterion::ALL {
        let value = averages.get(&criterion).copied().flatten();
        average_spans.push(Span::styled(
            format!("{}: ", criterion.label()),
            Theme::text_secondary(),
        ));
        average_spans.push(Span::styled(
            format!("{}/{}   ", batch::format_average(value), RATING_MAX),
            Theme::text_accent(),
        ));
    }

    let failed = evaluate.outcomes.iter().filter(|o| !o.is_ok()).count();
    let progress = match (&evaluate.finished, evaluate.running) {
        (_, true) => format!(
            "{} Running · {} done · {} failed",
            spinner_char(),
            evaluate.outcomes.len(),
            failed
        ),
        (Some(run), false) => format!(
            "Finished {} with {} · {} record(s) · {} failed",
            run.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            run.model,
            evaluate.outcomes.len(),
            run.failed
        ),
        (None, false) => "Not run yet".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Model     ", Theme::label()),
            Span::styled(
                format!("‹ {} ›", state.models.current()),
                Theme::input_highlight(),
            ),
            Span::styled(format!("   judged by {}", state.judge_model), Theme::text_muted()),
        ]),
        Line::from(average_spans),
        Line::styled(progress, Theme::text_secondary()),
    ];

    let summary = Paragraph::new(lines).block(panel(" Shorten evaluation ".to_string(), true));
    frame.render_widget(summary, area);
}

fn outcome_line(outcome: &RecordOutcome, width: usize) -> Line<'static> {
    let id = truncate_string(&outcome.id, width.saturating_sub(12).max(4));
    if outcome.is_ok() {
        let ratings: Vec<String> = Criterion::ALL
            .iter()
            .map(|c| {
                outcome
                    .rating(*c)
                    .map_or_else(|| "-".to_string(), |r| r.to_string())
            })
            .collect();
        Line::from(vec![
            Span::styled(format!("{} ", symbols::OUTCOME_OK), Theme::text_accent()),
            Span::styled(id, Theme::text()),
            Span::styled(format!("  {}", ratings.join("/")), Theme::text_secondary()),
        ])
    } else {
        Line::from(vec![
            Span::styled(format!("{} ", symbols::OUTCOME_FAILED), Theme::text_error()),
            Span::styled(id, Theme::text()),
            Span::styled("  failed", Theme::text_error()),
        ])
    }
}

fn render_outcomes(frame: &mut Frame, area: Rect, evaluate: &EvaluateState) {
    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = evaluate
        .outcomes
        .iter()
        .map(|o| ListItem::new(outcome_line(o, width)))
        .collect();

    let list = List::new(items)
        .block(panel(format!(" Records ({}) ", evaluate.outcomes.len()), true))
        .highlight_style(Theme::selected_bold());
    let mut list_state = ListState::default().with_selected(Some(evaluate.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail(frame: &mut Frame, area: Rect, evaluate: &EvaluateState) {
    let Some(outcome) = evaluate.selected_outcome() else {
        frame.render_widget(panel(" Detail ".to_string(), false), area);
        return;
    };

    let mut lines = Vec::new();
    let ratings: Vec<Span> = outcome
        .verdicts
        .iter()
        .flat_map(|v| {
            [
                Span::styled(rating_label(v.criterion, v.rating), Theme::rating(v.rating)),
                Span::styled("   ", Theme::text()),
            ]
        })
        .collect();
    if !ratings.is_empty() {
        lines.push(Line::from(ratings));
    }
    if let Some(error) = &outcome.error {
        lines.push(Line::styled(format!("Error: {}", error), Theme::text_error()));
    }

    section(&mut lines, "Original", outcome.original.as_deref());
    section(&mut lines, "Generated", outcome.generated.as_deref());
    for verdict in &outcome.verdicts {
        lines.push(Line::from(""));
        lines.extend(verdict_lines(verdict));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(format!(" Record {} ", outcome.id), false))
        .wrap(Wrap { trim: false })
        .scroll((evaluate.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn section(lines: &mut Vec<Line<'static>>, heading: &str, text: Option<&str>) {
    let Some(text) = text else {
        return;
    };
    lines.push(Line::from(""));
    lines.push(Line::styled(format!("── {} ", heading), Theme::label()));
    lines.extend(text_lines(text));
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    use super::*;
    use crate::editor::Verdict;

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal
            .draw(|f| render_evaluate(f, f.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn verdict(criterion: Criterion, rating: u8) -> Verdict {
        Verdict {
            criterion,
            rating,
            explanation: None,
            raw: json!({ "rating": rating }),
        }
    }

    #[test]
    fn test_empty_run_shows_na_averages() {
        let state = AppState::default();
        let text = draw(&state);
        assert!(text.contains("Completeness: n/a/3"));
        assert!(text.contains("Not run yet"));
    }

    #[test]
    fn test_outcomes_and_detail() {
        let mut state = AppState::default();
        state.evaluate.outcomes = vec![
            RecordOutcome {
                id: "1".to_string(),
                original: Some("Long original text".to_string()),
                generated: Some("Short text".to_string()),
                verdicts: vec![
                    verdict(Criterion::Completeness, 3),
                    verdict(Criterion::Faithfulness, 2),
                ],
                error: None,
            },
            RecordOutcome {
                id: "synthetic_4".to_string(),
                original: None,
                generated: None,
                verdicts: Vec::new(),
                error: Some("Judge returned malformed output".to_string()),
            },
        ];

        let text = draw(&state);
        assert!(text.contains("Completeness: 3.00/3"));
        assert!(text.contains("Faithfulness: 2.00/3"));
        assert!(text.contains("1  3/2"));
        assert!(text.contains("synthetic_4  failed"));
        assert!(text.contains("Long original text"));
        assert!(text.contains("Short text"));

        state.evaluate.selected = 1;
        let text = draw(&state);
        assert!(text.contains("Error: Judge returned malformed output"));
    }
}

//! Common UI widgets and utilities

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Theme;
use crate::constants::RATING_MAX;
use crate::editor::{Criterion, Verdict};

pub use super::status_bar::{StatusInfo, status_bar};

pub fn error_bar(frame: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(format!(" Error: {} ", sanitize_text(message)))
        .style(Theme::error_bar());
    frame.render_widget(paragraph, area);
}

pub fn help_bar(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    use unicode_width::UnicodeWidthStr;

    let available_width = area.width as usize;

    // Each hint is " key desc", with " │ " between hints
    let mut total_width = 0;
    let mut hints_to_show = 0;
    for (i, (key, desc)) in hints.iter().enumerate() {
        let separator = if i + 1 < hints.len() { 3 } else { 1 };
        let width = key.width() + desc.width() + 2 + separator;
        if total_width + width > available_width {
            break;
        }
        total_width += width;
        hints_to_show += 1;
    }
    // Show at least one hint if possible
    let hints_to_show = hints_to_show.max(1).min(hints.len());

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().take(hints_to_show).enumerate() {
        spans.push(Span::styled(format!(" {} ", key), Theme::help_key()));
        spans.push(Span::styled(desc.to_string(), Theme::help_desc()));
        if i + 1 < hints_to_show {
            spans.push(Span::styled(" │ ", Theme::help_desc()));
        }
    }
    spans.push(Span::styled(" ", Theme::help_desc()));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Theme::help_desc()),
        area,
    );
}

pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Sanitize text for display: remove control characters and ANSI escape sequences
pub fn sanitize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        // Skip ANSI escape sequences (ESC [ ... letter)
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        // Replace other control characters (except newline and tab) with space
        if c.is_control() && c != '\n' && c != '\t' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}

/// Lines of `text` as display lines, sanitized
pub fn text_lines(text: &str) -> Vec<Line<'static>> {
    sanitize_text(text)
        .lines()
        .map(|l| Line::styled(l.to_string(), Theme::text()))
        .collect()
}

/// "Completeness: 2/3"
pub fn rating_label(criterion: Criterion, rating: u8) -> String {
    format!("{}: {}/{}", criterion.label(), rating, RATING_MAX)
}

/// Rating headline followed by the judge's explanation and its raw JSON
pub fn verdict_lines(verdict: &Verdict) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        rating_label(verdict.criterion, verdict.rating),
        Theme::rating(verdict.rating),
    ))];
    if let Some(explanation) = &verdict.explanation {
        lines.extend(text_lines(explanation));
    }
    let raw = serde_json::to_string_pretty(&verdict.raw).unwrap_or_else(|_| verdict.raw.to_string());
    lines.extend(
        raw.lines()
            .map(|l| Line::styled(l.to_string(), Theme::text_muted())),
    );
    lines
}

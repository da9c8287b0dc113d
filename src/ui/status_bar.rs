//! Status bar with run indicator, model selection, and status message

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::{Theme, symbols};
use crate::constants::SPINNER_FRAME_MS;

/// Status bar info for rendering
pub struct StatusInfo<'a> {
    pub busy: bool,
    /// Whether there's an unacknowledged error (show indicator)
    pub has_error: bool,
    /// Current selection, e.g. "Shorten · record 3"
    pub context: &'a str,
    pub model: &'a str,
    pub judge_model: &'a str,
    pub message: &'a str,
}

/// Calculate display width of a string (accounting for Unicode)
pub fn display_width(s: &str) -> usize {
    use unicode_width::UnicodeWidthStr;
    s.width()
}

/// Truncate string to fit display width
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width < 4 {
        return s.chars().take(max_width).collect();
    }

    let mut width = 0;
    let mut result = String::new();
    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);
        if width + char_width > max_width - 3 {
            break;
        }
        width += char_width;
        result.push(c);
    }
    result.push_str("...");
    result
}

pub fn status_bar(frame: &mut Frame, area: Rect, info: &StatusInfo) {
    let style = Theme::status_bar();
    let width = area.width as usize;

    let (indicator, indicator_style) = if info.busy {
        (format!(" {} ", spinner_char()), Theme::status_busy())
    } else {
        (format!(" {} ", symbols::IDLE), Theme::status_idle())
    };
    let error_indicator = if info.has_error { "! " } else { "" };

    let left = format!("{} ", info.context);
    let models = format!("{} │ judge {} ", info.model, info.judge_model);

    let fixed = display_width(&indicator)
        + display_width(error_indicator)
        + display_width(&left)
        + display_width(&models);
    // Message takes whatever room is left, keeping a two-column gap
    let room = width.saturating_sub(fixed + 2);
    let message = if info.message.is_empty() || room < 4 {
        String::new()
    } else {
        format!("{} │ ", truncate_to_width(info.message, room.saturating_sub(3)))
    };

    let used = fixed + display_width(&message);
    let padding = " ".repeat(width.saturating_sub(used));

    let mut spans = vec![Span::styled(indicator, indicator_style)];
    if info.has_error {
        spans.push(Span::styled(error_indicator, Theme::status_alert()));
    }
    spans.extend([
        Span::styled(left, style),
        Span::styled(padding, style),
        Span::styled(message, style),
        Span::styled(models, Theme::status_muted()),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)).style(style), area);
}

/// Get an animated spinner character for loading states
pub fn spinner_char() -> char {
    let spinner = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let idx = (millis / SPINNER_FRAME_MS) as usize % spinner.chars().count();

    spinner.chars().nth(idx).unwrap_or('*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("Evaluating records", 10), "Evaluat...");
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
    }

    #[test]
    fn test_spinner_char_is_a_frame() {
        assert!("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏".contains(spinner_char()));
    }
}

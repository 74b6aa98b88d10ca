use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Line;

use crate::error::CoreError;

use super::app::StatusKind;

/// Display width of a string in terminal cells. Hangul takes two cells per
/// syllable, so `chars().count()` would misplace the cursor.
pub(crate) fn display_width(text: &str) -> u16 {
    Line::from(text).width().min(u16::MAX as usize) as u16
}

/// Rows `text` occupies once wrapped to `width` cells. Word wrapping can
/// only add rows, so this is a lower bound used to keep the end of a long
/// field in view.
pub(crate) fn wrapped_height(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let rows: usize = text
        .split('\n')
        .map(|line| (display_width(line) as usize).div_ceil(width as usize).max(1))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Message and severity for a failed core operation. Empty loads and empty
/// saves are warnings; everything else is an error.
pub(crate) fn describe_core_error(err: &CoreError) -> (String, StatusKind) {
    let kind = if err.is_warning() {
        StatusKind::Warning
    } else {
        StatusKind::Error
    };
    (err.to_string(), kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hangul_counts_double_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("자소서"), 6);
    }

    #[test]
    fn wrapped_height_counts_blank_and_long_lines() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("a\n\nb", 10), 3);
        assert_eq!(wrapped_height("자소서자소서", 4), 3);
        assert_eq!(wrapped_height("anything", 0), 0);
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = anyhow::anyhow!("root").context("outer");
        assert_eq!(surface_error(&err), "root");
    }
}

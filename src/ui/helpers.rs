use std::error::Error as StdError;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::error::GatewayError;

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

/// Column of a text cursor `offset` characters into `area`, kept inside the
/// area however long the typed value gets.
pub(crate) fn cursor_column(area: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    area.x
        .saturating_add(offset)
        .min(area.right().saturating_sub(1).max(area.x))
}

/// Turn a gateway failure into one line for the status bar. Validation
/// messages are already user-facing; store failures get their root cause
/// appended.
pub(crate) fn surface_error(err: &GatewayError) -> String {
    if let GatewayError::Validation(validation) = err {
        return validation.to_string();
    }
    let mut root: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(next) = root.and_then(|cause| cause.source()) {
        root = Some(next);
    }
    match root {
        Some(cause) => format!("{err} ({cause})"),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }

    #[test]
    fn cursor_column_is_clamped_to_the_area() {
        let area = Rect::new(10, 0, 30, 3);
        assert_eq!(cursor_column(area, 6), 16);
        assert_eq!(cursor_column(area, 500), 39);
        assert_eq!(cursor_column(area, usize::MAX), 39);
        assert_eq!(cursor_column(Rect::new(u16::MAX - 2, 0, 2, 1), 100_000), u16::MAX - 1);
    }

    #[test]
    fn validation_errors_are_shown_verbatim() {
        let err = GatewayError::from(ValidationError::Empty { field: "Name" });
        assert_eq!(surface_error(&err), "Name is required.");
    }

    #[test]
    fn store_errors_carry_their_root_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = GatewayError::connection("failed to connect", io);
        let text = surface_error(&err);
        assert!(text.starts_with("could not reach the student store: failed to connect"));
        assert!(text.ends_with("(refused)"));
    }
}

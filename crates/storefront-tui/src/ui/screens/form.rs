use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use storefront_core::catalog::FormField;

use crate::app::App;
use crate::ui::styles;

/// Visible width of a form input
const FIELD_WIDTH: usize = 48;

pub fn render(frame: &mut Frame, app: &App, area: Rect, editing: Option<i64>) {
    let title = match (editing, app.form_saving) {
        (_, true) => " Saving... ".to_string(),
        (Some(id), false) => format!(" Edit product #{} ", id),
        (None, false) => " New product ".to_string(),
    };

    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let focused = app.form_focus == field;
        let cursor = if focused { "▌" } else { "" };
        let value = visible_tail(app.form.value(field));

        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", field.label()), styles::muted_style()),
            Span::styled("[", styles::muted_style()),
            Span::styled(
                format!("{:<width$}{}", value, cursor, width = FIELD_WIDTH),
                styles::input_style(focused),
            ),
            Span::styled("]", styles::muted_style()),
        ]));

        match app.form_errors.get(field) {
            Some(message) => lines.push(Line::from(Span::styled(
                format!("  {:<14} {}", "", message),
                styles::error_style(),
            ))),
            None => lines.push(Line::from("")),
        }
    }

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Last characters of a value that fit in the input
fn visible_tail(value: &str) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect()
}

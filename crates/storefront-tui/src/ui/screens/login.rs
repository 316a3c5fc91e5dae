use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LoginFocus};
use crate::ui::render::{centered_rect_fixed, logo_lines};
use crate::ui::styles;

/// Visible width of the username/password inputs
const FIELD_WIDTH: usize = 20;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let session = app.session_state();
    // Form validation wins over the store's last error
    let error = app.login_error.as_deref().or(session.error.as_deref());

    let height = if error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(46, height, area);

    frame.render_widget(Clear, area);

    let mut lines = logo_lines(44);
    lines.push(Line::from(""));

    let username_focused = app.login_focus == LoginFocus::Username;
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", tail(&app.login_username), cursor, width = FIELD_WIDTH),
            styles::input_style(username_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let cursor = if password_focused { "▌" } else { "" };
    let masked = "*".repeat(app.login_password.chars().count().min(FIELD_WIDTH));
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", masked, cursor, width = FIELD_WIDTH),
            styles::input_style(password_focused),
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_label = if session.is_loading {
        " Signing in "
    } else if button_focused {
        " ▶ Login ◀  "
    } else {
        "   Login    "
    };
    lines.push(Line::from(vec![
        Span::raw("             ["),
        Span::styled(button_label, styles::input_style(button_focused)),
        Span::raw("]"),
    ]));

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Last characters of a value that fit in the input
fn tail(value: &str) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect()
}

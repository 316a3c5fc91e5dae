use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    match app.session_state().user {
        Some(ref user) => {
            lines.push(Line::from(Span::styled(
                format!("  {}", user.display_name()),
                styles::title_style(),
            )));
            lines.push(Line::from(""));

            let fields = [
                ("Username: ", user.username.as_deref()),
                ("Email:    ", user.email.as_deref()),
                ("Avatar:   ", user.image.as_deref()),
            ];
            for (label, value) in fields {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}", label), styles::muted_style()),
                    Span::raw(value.unwrap_or("-").to_string()),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled("  Not signed in", styles::muted_style()))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [l]", styles::help_key_style()),
        Span::styled(" Log out", styles::help_desc_style()),
    ]));

    let block = Block::default()
        .title(" Settings ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, HomeTab, Screen};

use super::screens::{detail, form, login, products, settings};
use super::styles;

const LOGO: [&str; 3] = [
    "╔═╗╔╦╗╔═╗╦═╗╔═╗╔═╗╦═╗╔═╗╔╗╔╔╦╗",
    "╚═╗ ║ ║ ║╠╦╝║╣ ╠╣ ╠╦╝║ ║║║║ ║ ",
    "╚═╝ ╩ ╚═╝╩╚═╚═╝╚  ╩╚═╚═╝╝╚╝ ╩ ",
];

pub fn render(frame: &mut Frame, app: &App) {
    let screen = app.router.current();

    if screen == Screen::Login {
        login::render(frame, app, frame.area());
    } else {
        let tabs_height = if screen == Screen::Home { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),           // Title bar
                Constraint::Length(tabs_height), // Tabs
                Constraint::Min(10),             // Main content
                Constraint::Length(2),           // Status bar
            ])
            .split(frame.area());

        render_title_bar(frame, app, chunks[0]);
        if screen == Screen::Home {
            render_tabs(frame, app, chunks[1]);
        }
        render_main_content(frame, app, chunks[2]);
        render_status_bar(frame, app, chunks[3]);
    }

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => {
            render_confirm_overlay(frame, "Are you sure you want to quit?", "quit")
        }
        AppState::ConfirmingLogout => {
            render_confirm_overlay(frame, "Are you sure you want to log out?", "log out")
        }
        AppState::ConfirmingDelete => render_confirm_overlay(
            frame,
            "Are you sure you want to delete this product?",
            "delete",
        ),
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

/// The logo, indented to sit centered in a dialog of the given interior width
pub(crate) fn logo_lines(width: u16) -> Vec<Line<'static>> {
    let logo_width = LOGO[0].chars().count() as u16;
    let indent = " ".repeat(width.saturating_sub(logo_width) as usize / 2);
    LOGO.iter()
        .map(|row| Line::from(Span::styled(format!("{}{}", indent, row), styles::title_style())))
        .collect()
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Storefront";
    let user = app
        .session_state()
        .user
        .as_ref()
        .map(|u| format!("{}  ", u.display_name()))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let used = title.chars().count() + user.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in HomeTab::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        spans.push(Span::styled(label, styles::tab_style(*tab == app.home_tab)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.router.current() {
        Screen::Home => match app.home_tab {
            HomeTab::Category(_) => products::render(frame, app, area),
            HomeTab::Settings => settings::render(frame, app, area),
        },
        Screen::ProductDetail(_) => detail::render(frame, app, area),
        Screen::ProductForm(id) => form::render(frame, app, area, id),
        Screen::Login => login::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let screen = app.router.current();
    let shortcuts = match screen {
        Screen::Home => match app.home_tab {
            HomeTab::Category(_) => "[/]search [n]ew [u]pdate [q]uit",
            HomeTab::Settings => "[l]ogout [q]uit",
        },
        Screen::ProductDetail(_) => "[e]dit [d]elete [Esc] back",
        Screen::ProductForm(_) => "[Tab] next [Ctrl+S] save [Esc] cancel",
        Screen::Login => "",
    };

    let (left_text, left_style) = if matches!(app.state, AppState::Searching) {
        (format!(" Search: {}▌ ", app.search_query), styles::search_style())
    } else if let Some(ref msg) = app.status_message {
        (format!(" {} ", msg), styles::highlight_style())
    } else {
        match (&app.products_age, screen, app.home_tab) {
            (Some(age), Screen::Home, HomeTab::Category(_)) => {
                (format!(" Updated {} ", age), styles::muted_style())
            }
            _ => (String::new(), styles::muted_style()),
        }
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 27, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines(50);
    help_text.extend([
        Line::from(Span::styled(
            format!("{:^50}", format!("version {}", version)),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-3", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓", "Navigate list"),
        help_line("Enter", "Open product"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Products", styles::highlight_style())),
        help_line("/", "Search by title"),
        help_line("n", "New product"),
        help_line("e / d", "Edit / delete (detail view)"),
        help_line("u", "Update from the catalog"),
        Line::from(""),
        Line::from(Span::styled(" Account", styles::highlight_style())),
        help_line("l", "Log out (settings tab)"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub(crate) fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(52, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines(50);
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(format!("  {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

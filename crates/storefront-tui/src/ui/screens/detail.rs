use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use storefront_core::models::Product;
use storefront_core::utils::{format_currency, format_discount, format_timestamp};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.detail_loading {
        " Product - refreshing... "
    } else {
        " Product "
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let lines = match (&app.detail, &app.detail_error) {
        (Some(product), _) => product_lines(product),
        (None, Some(error)) => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", error), styles::error_style())),
        ],
        (None, None) => vec![
            Line::from(""),
            Line::from(Span::styled("  Loading product...", styles::muted_style())),
        ],
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn product_lines(product: &Product) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", product.title), styles::title_style())),
        Line::from(""),
    ];

    let mut price = vec![
        Span::styled("  Price:     ", styles::muted_style()),
        Span::styled(format_currency(product.price), styles::price_style()),
    ];
    if let Some(original) = product.original_price() {
        price.push(Span::raw("  "));
        price.push(Span::styled(format_currency(original), styles::strikethrough_style()));
    }
    lines.push(Line::from(price));

    if let Some(discount) = product.discount_percentage.filter(|d| *d > 0.0) {
        lines.push(Line::from(vec![
            Span::styled("  Discount:  ", styles::muted_style()),
            Span::styled(format_discount(discount), styles::sale_style()),
        ]));
    }

    if let Some(ref category) = product.category {
        lines.push(Line::from(vec![
            Span::styled("  Category:  ", styles::muted_style()),
            Span::raw(category.clone()),
        ]));
    }

    if !product.thumbnail.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Image:     ", styles::muted_style()),
            Span::raw(product.thumbnail.clone()),
        ]));
    }

    if product.is_deleted() {
        let when = product
            .deleted_on
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "unknown date".to_string());
        lines.push(Line::from(Span::styled(
            format!("  Deleted on {}", when),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Description", styles::highlight_style())));
    lines.push(Line::from(format!("  {}", product.description)));

    lines
}

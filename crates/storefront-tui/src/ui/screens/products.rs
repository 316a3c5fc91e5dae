use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use storefront_core::catalog::CATEGORY_GROUPS;
use storefront_core::utils::{format_currency, format_discount, truncate};

use crate::app::App;
use crate::ui::styles;

const ERROR_TEXT: &str = "Error loading products";

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let label = app
        .category_index()
        .and_then(|i| CATEGORY_GROUPS.get(i))
        .map(|g| g.label)
        .unwrap_or("Products");
    let visible = app.visible_products();

    let mut title = format!(" {} ({}) ", label, visible.len());
    if !app.search_query.is_empty() {
        title.push_str(&format!("- \"{}\" ", app.search_query));
    }
    if app.products_loading {
        title.push_str("- loading... ");
    } else if app.products_error {
        title.push_str(&format!("- {} ", ERROR_TEXT));
    }

    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if visible.is_empty() {
        let message = if app.products_error {
            Span::styled(ERROR_TEXT, styles::error_style())
        } else if app.products_loading {
            Span::styled("Loading products...", styles::muted_style())
        } else if !app.search_query.is_empty() {
            Span::styled("No products match the search", styles::muted_style())
        } else {
            Span::styled("No products", styles::muted_style())
        };
        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)]).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Title"),
        Cell::from("Category"),
        Cell::from("Price"),
        Cell::from("Discount"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = if i == app.product_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let discount = product
                .discount_percentage
                .filter(|d| *d > 0.0)
                .map(format_discount)
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(truncate(&product.title, 48)),
                Cell::from(product.category.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(Span::styled(format_currency(product.price), styles::price_style())),
                Cell::from(Span::styled(discount, styles::sale_style())),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(50), // Title
        Constraint::Fill(1),        // Category
        Constraint::Length(14),     // Price
        Constraint::Length(12),     // Discount
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.product_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

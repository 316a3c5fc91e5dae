use ratatui::style::{Color, Modifier, Style};

// Storefront palette
pub const BRAND: Color = Color::Rgb(230, 126, 34);
pub const PRICE: Color = Color::Rgb(46, 184, 114);
pub const SALE: Color = Color::Rgb(231, 76, 120);
pub const DANGER: Color = Color::Rgb(214, 48, 49);
pub const LABEL: Color = Color::Rgb(236, 200, 120);
pub const MUTED: Color = Color::Rgb(140, 136, 130);
pub const TEXT: Color = Color::Rgb(240, 236, 228);
pub const SELECTION: Color = Color::Rgb(70, 46, 28);
pub const STATUS_BAR: Color = Color::Rgb(38, 30, 26);

pub fn title_style() -> Style {
    Style::default().fg(BRAND).add_modifier(Modifier::BOLD)
}

/// Selected table row, or a focused input
pub fn selected_style() -> Style {
    Style::default().bg(SELECTION).fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(LABEL)
}

/// Current selling price
pub fn price_style() -> Style {
    Style::default().fg(PRICE).add_modifier(Modifier::BOLD)
}

/// Discount badges
pub fn sale_style() -> Style {
    Style::default().fg(SALE)
}

/// Original price next to a discounted one
pub fn strikethrough_style() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::CROSSED_OUT)
}

pub fn error_style() -> Style {
    Style::default().fg(DANGER)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(BRAND).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BRAND)
    } else {
        muted_style()
    }
}

pub fn search_style() -> Style {
    Style::default().fg(LABEL).add_modifier(Modifier::ITALIC)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(STATUS_BAR).fg(TEXT)
}

pub fn help_key_style() -> Style {
    Style::default().fg(BRAND).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}

pub fn input_style(focused: bool) -> Style {
    if focused {
        selected_style().add_modifier(Modifier::UNDERLINED)
    } else {
        list_item_style()
    }
}

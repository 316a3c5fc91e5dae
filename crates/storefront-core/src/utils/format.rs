use chrono::{DateTime, Utc};

/// Format a price as Brazilian reais: `R$ 1.234,56`
pub fn format_currency(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Format a discount percentage without trailing zeros: `12.5% off`
pub fn format_discount(percentage: f64) -> String {
    let rounded = (percentage * 100.0).round() / 100.0;
    format!("{}% off", rounded)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a timestamp for display: `May 21, 2024 13:47`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%b %d, %Y %H:%M").to_string()
}

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Shown before any conversion and after invalid live input.
pub const PLACEHOLDER_AMOUNT: &str = "0.00";
pub const PLACEHOLDER_RATE: &str = "1 USD = 0.85 EUR";

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    ResultValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::ResultValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats a display amount: two decimals with thousands grouping.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac_part}")
}

/// Formats a display rate: four decimals, no grouping.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.4}")
}

/// The effective-rate line, e.g. `1 USD = 0.8500 EUR`.
pub fn rate_line(from: &str, rate: f64, to: &str) -> String {
    format!("1 {from} = {} {to}", format_rate(rate))
}

/// A transient error banner line.
pub fn error_banner(message: &str) -> String {
    style(format!("✖ {message}")).red().bold().to_string()
}

/// Creates a spinner shown while a rate fetch is in flight.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Asks a yes/no question on the terminal; anything but y/yes is a no.
pub fn confirm(prompt: &str) -> bool {
    let term = console::Term::stdout();
    if term.write_str(&format!("{prompt} [y/N] ")).is_err() {
        return false;
    }
    match term.read_line() {
        Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(0.5), "0.50");
        assert_eq!(format_amount(85.0), "85.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(999.999), "1,000.00");
    }

    #[test]
    fn test_format_rate_four_decimals() {
        assert_eq!(format_rate(0.85), "0.8500");
        assert_eq!(format_rate(1.176), "1.1760");
        assert_eq!(format_rate(148.123456), "148.1235");
    }

    #[test]
    fn test_rate_line() {
        assert_eq!(rate_line("USD", 0.85, "EUR"), "1 USD = 0.8500 EUR");
    }
}

use crate::cli::ui::{self, StyleType};
use crate::core::history::{HistoryEntry, relative_time};
use crate::core::session::Session;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

/// Renders the history as a table, newest first; an empty log yields the
/// empty-state placeholder.
pub fn render(entries: &[HistoryEntry], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return ui::style_text("No recent conversions", StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Conversion"),
        ui::header_cell("Rate"),
        ui::header_cell("When"),
    ]);

    for entry in entries {
        let conversion = format!(
            "{} {} → {} {}",
            ui::format_amount(entry.amount),
            entry.from_currency,
            ui::format_amount(entry.result),
            entry.to_currency
        );
        table.add_row(vec![
            Cell::new(conversion),
            Cell::new(ui::format_rate(entry.rate)),
            Cell::new(relative_time(entry.timestamp, now)),
        ]);
    }

    table.to_string()
}

pub fn run(session: &Session) -> Result<()> {
    println!("{}", render(session.history().entries(), Utc::now()));
    Ok(())
}

/// Clears the history after an explicit confirmation (or `--yes`).
pub async fn clear(session: &mut Session, yes: bool) -> Result<()> {
    if session.history().is_empty() {
        println!(
            "{}",
            ui::style_text("No recent conversions", StyleType::Subtle)
        );
        return Ok(());
    }

    if !yes && !ui::confirm("Clear the conversion history?") {
        println!("Aborted.");
        return Ok(());
    }

    session.clear_history().await;
    println!("History cleared.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(amount: f64, result: f64, age_minutes: i64, now: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id: now.timestamp_millis() - age_minutes * 60_000,
            amount,
            from_currency: "USD".to_string(),
            result,
            to_currency: "EUR".to_string(),
            rate: 0.85,
            timestamp: now - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn test_render_empty_log_shows_placeholder() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let rendered = render(&[], now);
        assert!(rendered.contains("No recent conversions"));
    }

    #[test]
    fn test_render_lists_entries_with_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let entries = vec![entry(100.0, 85.0, 0, now), entry(1234.5, 1049.33, 5, now)];

        let rendered = render(&entries, now);
        assert!(rendered.contains("100.00 USD → 85.00 EUR"));
        assert!(rendered.contains("1,234.50 USD → 1,049.33 EUR"));
        assert!(rendered.contains("just now"));
        assert!(rendered.contains("5 min ago"));
        assert!(rendered.contains("0.8500"));
    }
}

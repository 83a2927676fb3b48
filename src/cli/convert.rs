use crate::cli::ui::{self, StyleType};
use crate::core::convert::parse_currency;
use crate::core::history::relative_time;
use crate::core::session::Session;
use anyhow::Result;
use chrono::Utc;

/// One-shot manual conversion: prints the result and effective rate, and
/// records a history entry. Failures print a banner and exit non-zero.
pub async fn run(session: &mut Session, amount: f64, from: &str, to: &str) -> Result<()> {
    let pair = parse_currency(from).and_then(|f| parse_currency(to).map(|t| (f, t)));
    let (from, to) = match pair {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("{}", ui::error_banner(&e.to_string()));
            return Err(e.into());
        }
    };

    session.set_pair(from, to);
    session.set_amount(amount);

    let spinner = session
        .needs_refresh()
        .then(|| ui::new_spinner("Fetching exchange rates..."));
    let outcome = session.manual_convert().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(conversion) => {
            let result_text = format!(
                "{} {} = {} {}",
                ui::format_amount(amount),
                session.from_currency(),
                ui::format_amount(conversion.result),
                session.to_currency()
            );
            println!("{}", ui::style_text(&result_text, StyleType::ResultValue));
            println!(
                "{}",
                ui::rate_line(session.from_currency(), conversion.rate, session.to_currency())
            );
            if let Some(updated) = session.last_update() {
                let label = format!("Rates updated: {}", relative_time(updated, Utc::now()));
                println!("{}", ui::style_text(&label, StyleType::Subtle));
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", ui::error_banner(&e.to_string()));
            Err(e.into())
        }
    }
}

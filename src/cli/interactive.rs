//! Interactive prompt: maps terminal input onto session events.

use crate::cli::history;
use crate::cli::ui::{self, StyleType};
use crate::core::convert::{parse_amount, parse_currency};
use crate::core::history::relative_time;
use crate::core::session::{Display, Session};
use anyhow::Result;
use chrono::Utc;
use console::Term;

pub async fn run(session: &mut Session) -> Result<()> {
    let term = Term::stdout();
    term.write_line(&ui::style_text("Currency Converter", StyleType::Title))?;

    // Load rates for the default pair up front; a failure is a banner,
    // not a crash.
    fetch_rates(session, &term).await?;
    render_pair(session, &term)?;
    render_display(session, &term)?;
    term.write_line(&ui::style_text(
        "Type an amount to convert, or 'help' for commands.",
        StyleType::Subtle,
    ))?;

    loop {
        term.write_str("> ")?;
        let line = term.read_line()?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or_default().to_ascii_lowercase();
        let argument = parts.next();

        match (command.as_str(), argument) {
            ("quit" | "exit" | "q", _) => break,
            ("help" | "?", _) => print_help(&term)?,
            ("from", Some(code)) => select(session, &term, code, Selector::From).await?,
            ("to", Some(code)) => select(session, &term, code, Selector::To).await?,
            ("from" | "to", None) => {
                term.write_line(&ui::error_banner("usage: from <CODE> / to <CODE>"))?;
            }
            ("swap" | "s", _) => {
                let spinner = fetch_spinner(session);
                session.swap().await;
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                render_pair(session, &term)?;
                render_display(session, &term)?;
            }
            ("convert" | "c", argument) => {
                if let Some(raw) = argument {
                    match parse_amount(raw) {
                        Ok(amount) => session.set_amount(amount),
                        Err(e) => {
                            term.write_line(&ui::error_banner(&e.to_string()))?;
                            continue;
                        }
                    }
                }
                manual_convert(session, &term).await?;
            }
            ("history" | "h", _) => {
                term.write_line(&history::render(session.history().entries(), Utc::now()))?;
            }
            ("clear", _) => clear_history(session, &term).await?,
            ("refresh" | "r", _) => {
                fetch_rates(session, &term).await?;
                session.auto_convert().await;
                render_pair(session, &term)?;
                render_display(session, &term)?;
            }
            _ if input.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-') => {
                // Live path: invalid input resets the display, failures
                // stay silent so typing is never interrupted.
                let spinner = fetch_spinner(session);
                session.enter_amount(input).await;
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                render_display(session, &term)?;
            }
            _ => {
                term.write_line(&ui::style_text(
                    &format!("Unknown command: {input}. Try 'help'."),
                    StyleType::Subtle,
                ))?;
            }
        }
    }

    Ok(())
}

enum Selector {
    From,
    To,
}

async fn select(session: &mut Session, term: &Term, code: &str, which: Selector) -> Result<()> {
    let code = match parse_currency(code) {
        Ok(code) => code,
        Err(e) => {
            term.write_line(&ui::error_banner(&e.to_string()))?;
            return Ok(());
        }
    };

    let spinner = fetch_spinner(session);
    match which {
        Selector::From => session.select_from(code).await,
        Selector::To => session.select_to(code).await,
    }
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    render_pair(session, term)?;
    render_display(session, term)?;
    Ok(())
}

/// Manual path: every failure surfaces as a banner; a success renders the
/// result and has already been recorded in the history.
async fn manual_convert(session: &mut Session, term: &Term) -> Result<()> {
    let spinner = fetch_spinner(session);
    let outcome = session.manual_convert().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(_) => render_display(session, term)?,
        Err(e) => term.write_line(&ui::error_banner(&e.to_string()))?,
    }
    Ok(())
}

async fn clear_history(session: &mut Session, term: &Term) -> Result<()> {
    if session.history().is_empty() {
        term.write_line(&ui::style_text("No recent conversions", StyleType::Subtle))?;
        return Ok(());
    }

    if ui::confirm("Clear the conversion history?") {
        session.clear_history().await;
        term.write_line("History cleared.")?;
    }
    Ok(())
}

/// Refreshes rates for the current base with the loading spinner up; the
/// spinner is cleared on both exits and a failure becomes a banner.
async fn fetch_rates(session: &mut Session, term: &Term) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let outcome = session.refresh_rates().await;
    pb.finish_and_clear();

    if let Err(e) = outcome {
        term.write_line(&ui::error_banner(&e.to_string()))?;
    }
    Ok(())
}

fn fetch_spinner(session: &Session) -> Option<indicatif::ProgressBar> {
    session
        .needs_refresh()
        .then(|| ui::new_spinner("Fetching exchange rates..."))
}

fn render_pair(session: &Session, term: &Term) -> Result<()> {
    let updated = match session.last_update() {
        Some(at) => relative_time(at, Utc::now()),
        None => "not available".to_string(),
    };
    term.write_line(&format!(
        "{} → {}   {}",
        session.from_currency(),
        session.to_currency(),
        ui::style_text(&format!("rates updated: {updated}"), StyleType::Subtle)
    ))?;
    Ok(())
}

fn render_display(session: &Session, term: &Term) -> Result<()> {
    match session.display() {
        Display::Placeholder => {
            term.write_line(&ui::style_text(
                ui::PLACEHOLDER_AMOUNT,
                StyleType::ResultValue,
            ))?;
            term.write_line(&ui::style_text(ui::PLACEHOLDER_RATE, StyleType::Subtle))?;
        }
        Display::Result {
            amount,
            from,
            result,
            to,
            rate,
        } => {
            let result_text = format!(
                "{} {} = {} {}",
                ui::format_amount(*amount),
                from,
                ui::format_amount(*result),
                to
            );
            term.write_line(&ui::style_text(&result_text, StyleType::ResultValue))?;
            term.write_line(&ui::rate_line(from, *rate, to))?;
        }
    }
    Ok(())
}

fn print_help(term: &Term) -> Result<()> {
    term.write_line("Commands:")?;
    term.write_line("  <amount>        convert as you type (no history entry)")?;
    term.write_line("  convert [amt]   convert and save to history")?;
    term.write_line("  from <CODE>     set the source currency")?;
    term.write_line("  to <CODE>       set the target currency")?;
    term.write_line("  swap            exchange source and target")?;
    term.write_line("  history         show recent conversions")?;
    term.write_line("  clear           clear the conversion history")?;
    term.write_line("  refresh         refetch exchange rates")?;
    term.write_line("  quit            leave")?;
    Ok(())
}

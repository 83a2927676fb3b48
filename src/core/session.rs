//! Interactive session state: the current pair, amount, and display.
//!
//! All mutation funnels through this struct; the CLI layer owns the only
//! instance and maps terminal events onto the methods below.

use crate::core::convert::{self, Conversion};
use crate::core::error::{Error, Result};
use crate::core::history::HistoryLog;
use crate::core::rates::RateStore;
use chrono::{DateTime, Utc};
use tracing::debug;

/// What the result panel should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum Display {
    /// Nothing converted yet, or the live input became invalid.
    Placeholder,
    Result {
        amount: f64,
        from: String,
        result: f64,
        to: String,
        rate: f64,
    },
}

pub struct Session {
    store: RateStore,
    history: HistoryLog,
    from: String,
    to: String,
    amount: Option<f64>,
    display: Display,
}

impl Session {
    pub fn new(store: RateStore, history: HistoryLog, from: String, to: String) -> Self {
        Session {
            store,
            history,
            from,
            to,
            amount: None,
            display: Display::Placeholder,
        }
    }

    pub fn from_currency(&self) -> &str {
        &self.from
    }

    pub fn to_currency(&self) -> &str {
        &self.to
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.store.last_update()
    }

    /// True when the next conversion will hit the network.
    pub fn needs_refresh(&self) -> bool {
        self.store.needs_refresh(&self.from)
    }

    /// Fetches rates for the current `from` currency unconditionally.
    pub async fn refresh_rates(&mut self) -> Result<()> {
        self.store.refresh(&self.from).await
    }

    /// Manual conversion: validates, converts, updates the display, and
    /// records a history entry. Every failure propagates to the caller.
    pub async fn manual_convert(&mut self) -> Result<Conversion> {
        let amount = self.valid_amount()?;
        let conversion = self.convert_current(amount).await?;

        self.display = Display::Result {
            amount,
            from: self.from.clone(),
            result: conversion.result,
            to: self.to.clone(),
            rate: conversion.rate,
        };
        self.history
            .record(
                amount,
                &self.from,
                conversion.result,
                &self.to,
                conversion.rate,
            )
            .await;

        Ok(conversion)
    }

    /// Live conversion while the user is still typing: an invalid amount
    /// resets the display, and fetch or data failures are only logged so
    /// typing is never interrupted. No history entry is recorded.
    pub async fn auto_convert(&mut self) {
        let amount = match self.valid_amount() {
            Ok(amount) => amount,
            Err(_) => {
                self.display = Display::Placeholder;
                return;
            }
        };

        match self.convert_current(amount).await {
            Ok(conversion) => {
                self.display = Display::Result {
                    amount,
                    from: self.from.clone(),
                    result: conversion.result,
                    to: self.to.clone(),
                    rate: conversion.rate,
                };
            }
            Err(e) => debug!(error = %e, "Auto-convert failed"),
        }
    }

    /// Sets the amount from raw input and re-runs the live conversion.
    pub async fn enter_amount(&mut self, input: &str) {
        self.amount = convert::parse_amount(input).ok();
        self.auto_convert().await;
    }

    pub async fn select_from(&mut self, code: String) {
        self.from = code;
        self.auto_convert().await;
    }

    pub async fn select_to(&mut self, code: String) {
        self.to = code;
        self.auto_convert().await;
    }

    /// Exchanges the pair and re-runs the live conversion.
    pub async fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.auto_convert().await;
    }

    /// Clears the history log. The caller confirms with the user first.
    pub async fn clear_history(&mut self) {
        self.history.clear().await;
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.amount = Some(amount);
    }

    /// Replaces the pair without triggering a live conversion; used by the
    /// one-shot command path where the manual conversion follows directly.
    pub fn set_pair(&mut self, from: String, to: String) {
        self.from = from;
        self.to = to;
    }

    fn valid_amount(&self) -> Result<f64> {
        let amount = self
            .amount
            .ok_or_else(|| Error::validation("enter an amount greater than zero"))?;
        convert::validate_amount(amount)
    }

    async fn convert_current(&mut self, amount: f64) -> Result<Conversion> {
        self.store.ensure_base(&self.from).await?;
        let table = self
            .store
            .table()
            .ok_or_else(|| Error::data("no rates loaded"))?;
        convert::convert(amount, &self.from, &self.to, table)
    }
}

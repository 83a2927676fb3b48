pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::history::{HistoryLog, HistoryRepository};
use crate::core::rates::RateStore;
use crate::core::session::Session;
use crate::providers::ExchangeRateApiProvider;
use crate::store::{DiskRepository, MemoryRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Interactive,
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    History,
    ClearHistory {
        yes: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let mut session = build_session(&config).await?;

    match command {
        AppCommand::Interactive => cli::interactive::run(&mut session).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&mut session, amount, &from, &to).await
        }
        AppCommand::History => cli::history::run(&session),
        AppCommand::ClearHistory { yes } => cli::history::clear(&mut session, yes).await,
    }
}

async fn build_session(config: &AppConfig) -> Result<Session> {
    let provider = ExchangeRateApiProvider::new(&config.api.base_url);
    let store = RateStore::new(Box::new(provider));

    // An unusable data directory degrades to an in-process history rather
    // than refusing to convert at all.
    let repository: Arc<dyn HistoryRepository> = match config
        .default_data_path()
        .and_then(|path| DiskRepository::open(&path))
    {
        Ok(repository) => Arc::new(repository),
        Err(e) => {
            warn!(error = %e, "Could not open history store, keeping history in memory");
            Arc::new(MemoryRepository::new())
        }
    };
    let history = HistoryLog::open(repository).await;

    Ok(Session::new(
        store,
        history,
        config.from_currency.clone(),
        config.to_currency.clone(),
    ))
}

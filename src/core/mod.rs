//! Core conversion pipeline: rates, conversion math, history, session.

pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod log;
pub mod rates;
pub mod session;

// Re-export main types for cleaner imports
pub use convert::Conversion;
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryLog, HistoryRepository, MAX_ENTRIES};
pub use rates::{RateProvider, RateStore, RateTable};
pub use session::{Display, Session};

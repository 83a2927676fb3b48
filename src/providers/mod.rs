pub mod exchange_rate_api;

// Re-export for callers wiring up a session
pub use exchange_rate_api::ExchangeRateApiProvider;

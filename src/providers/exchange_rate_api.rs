use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::error::{Error, Result};
use crate::core::rates::{RateProvider, RateTable};

/// Client for exchangerate-api style endpoints: `GET {base_url}/{BASE}`
/// answers a JSON body with a `rates` mapping and an optional `error`
/// field signalling a failed lookup.
pub struct ExchangeRateApiProvider {
    base_url: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct RatesResponse {
    rates: Option<HashMap<String, f64>>,
    error: Option<String>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(
        name = "RateFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("cambio/0.2")
            .build()
            .map_err(|e| Error::network(e.to_string()))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network(format!("{e} for base: {base}")))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "HTTP error: {} for base: {base}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let data: RatesResponse = serde_json::from_str(&text)
            .map_err(|e| Error::data(format!("failed to parse rates for {base}: {e}")))?;

        if let Some(message) = data.error {
            return Err(Error::data(message));
        }

        let raw = data
            .rates
            .ok_or_else(|| Error::data(format!("no rates in response for base: {base}")))?;

        RateTable::new(base, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(base: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/{base}")))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "base": "USD",
            "date": "2024-05-15",
            "rates": {
                "USD": 1.0,
                "EUR": 0.85,
                "GBP": 0.73
            }
        }"#;

        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri());
        let table = provider.fetch_rates("USD").await.unwrap();

        assert_eq!(table.base, "USD");
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate("EUR"), Some(0.85));
        assert_eq!(table.rate("GBP"), Some(0.73));
    }

    #[tokio::test]
    async fn test_http_error_is_network_error() {
        let mock_server = create_mock_server("USD", ResponseTemplate::new(500)).await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;

        assert!(matches!(result, Err(Error::Network(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "network error: HTTP error: 500 Internal Server Error for base: USD"
        );
    }

    #[tokio::test]
    async fn test_error_field_is_data_error() {
        let mock_response = r#"{"error": "Unsupported base currency"}"#;
        let mock_server = create_mock_server(
            "XXX",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("XXX").await;

        assert!(matches!(result, Err(Error::Data(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "exchange rate data error: Unsupported base currency"
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_is_data_error() {
        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string("not json at all"),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;

        assert!(matches!(result, Err(Error::Data(_))));
    }

    #[tokio::test]
    async fn test_missing_rates_is_data_error() {
        let mock_response = r#"{"base": "USD", "date": "2024-05-15"}"#;
        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri());
        let result = provider.fetch_rates("USD").await;

        assert!(matches!(result, Err(Error::Data(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "exchange rate data error: no rates in response for base: USD"
        );
    }

    #[tokio::test]
    async fn test_unusable_rate_entries_are_dropped() {
        let mock_response = r#"{
            "rates": {
                "EUR": 0.85,
                "BAD": -2.0
            }
        }"#;
        let mock_server = create_mock_server(
            "USD",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let provider = ExchangeRateApiProvider::new(&mock_server.uri());
        let table = provider.fetch_rates("USD").await.unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rate("EUR"), Some(0.85));
        assert_eq!(table.rate("BAD"), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on this port.
        let provider = ExchangeRateApiProvider::new("http://127.0.0.1:9");
        let result = provider.fetch_rates("USD").await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}

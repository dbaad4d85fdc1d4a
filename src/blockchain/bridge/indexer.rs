//! Union GraphQL indexer client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::blockchain::traits::PacketIndexer;
use crate::core::config::IndexerConfig;
use crate::core::errors::BridgeError;
use crate::utils::normalize_tx_hash;

const TRANSFERS_BY_TX_QUERY: &str = r#"
query ($submission_tx_hash: String!) {
  v2_transfers(args: {p_transaction_hash: $submission_tx_hash}) {
    packet_hash
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: TransferVariables,
}

#[derive(Debug, Serialize)]
struct TransferVariables {
    submission_tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<TransfersData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct TransfersData {
    #[serde(default)]
    v2_transfers: Vec<TransferRecord>,
}

#[derive(Debug, Deserialize)]
struct TransferRecord {
    #[serde(default)]
    packet_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// Looks up packet hashes for source transactions on the Union indexer.
#[derive(Debug, Clone)]
pub struct GraphqlIndexer {
    client: Client,
    endpoint: String,
}

impl GraphqlIndexer {
    pub fn new(config: &IndexerConfig) -> Result<Self, BridgeError> {
        Self::with_timeout(&config.endpoint, config.request_timeout())
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let endpoint = endpoint.trim();
        reqwest::Url::parse(endpoint).map_err(|e| {
            BridgeError::ConfigError(format!("Invalid indexer endpoint '{}': {}", endpoint, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers())
            .build()
            .map_err(|e| BridgeError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint: endpoint.to_string() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/graphql-response+json, application/json"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://app.union.build"));
    headers.insert(REFERER, HeaderValue::from_static("https://app.union.build/"));
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
    headers
}

#[async_trait]
impl PacketIndexer for GraphqlIndexer {
    async fn packet_hash(&self, tx_hash: &str) -> Result<Option<String>, BridgeError> {
        let body = GraphqlRequest {
            query: TRANSFERS_BY_TX_QUERY,
            variables: TransferVariables { submission_tx_hash: normalize_tx_hash(tx_hash) },
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BridgeError::IndexerError(format!("HTTP {}: {}", status, text)));
        }

        let parsed: GraphqlResponse = response.json().await?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(BridgeError::IndexerError(messages.join("; ")));
        }

        let packet_hash = parsed
            .data
            .and_then(|d| d.v2_transfers.into_iter().next())
            .and_then(|r| r.packet_hash)
            .filter(|h| !h.trim().is_empty());

        debug!(tx_hash, found = packet_hash.is_some(), "Indexer lookup");
        Ok(packet_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method, MockServer};
    use serde_json::json;

    fn indexer(server: &MockServer) -> GraphqlIndexer {
        GraphqlIndexer::with_timeout(&server.url("/v1/graphql"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_first_packet_hash() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/v1/graphql")
                .header("content-type", "application/json")
                .header("origin", "https://app.union.build")
                .json_body_partial(r#"{"variables": {"submission_tx_hash": "0xabc123"}}"#);
            then.status(200).json_body(json!({
                "data": { "v2_transfers": [ { "packet_hash": "0xdead" }, { "packet_hash": "0xbeef" } ] }
            }));
        });

        let found = indexer(&server).packet_hash("abc123").await.unwrap();
        mock.assert();
        assert_eq!(found.as_deref(), Some("0xdead"));
    }

    #[tokio::test]
    async fn empty_or_null_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST).path("/v1/graphql");
            then.status(200).json_body(json!({ "data": { "v2_transfers": [ { "packet_hash": null } ] } }));
        });
        assert_eq!(indexer(&server).packet_hash("0x01").await.unwrap(), None);
    }

    #[tokio::test]
    async fn http_error_is_indexer_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST).path("/v1/graphql");
            then.status(502).body("bad gateway");
        });
        let err = indexer(&server).packet_hash("0x01").await.unwrap_err();
        assert!(matches!(err, BridgeError::IndexerError(ref m) if m.contains("502")));
    }

    #[tokio::test]
    async fn graphql_errors_are_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::POST).path("/v1/graphql");
            then.status(200).json_body(json!({ "errors": [ { "message": "field not found" } ] }));
        });
        let err = indexer(&server).packet_hash("0x01").await.unwrap_err();
        assert!(err.to_string().contains("field not found"));
    }

    #[test]
    fn rejects_bad_endpoint() {
        let err = GraphqlIndexer::with_timeout("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigError(_)));
    }
}

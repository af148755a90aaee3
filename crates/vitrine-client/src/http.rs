//! HTTP commerce client.
//!
//! Posts `{query, variables}` JSON to a configured endpoint and decodes the
//! `{data, errors}` envelope. One type covers both external APIs; the
//! constructors differ in which config fields they read and whether the
//! session can be unauthenticated.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use vitrine_core::{ApiResponse, CommerceClient, Result, VitrineConfig, VitrineError};

/// Wire request for a query or mutation.
#[derive(Debug, Serialize)]
struct OperationRequest<'a> {
    query: &'a str,
    variables: Value,
}

/// Commerce API client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCommerceClient {
    client: Client,
    name: &'static str,
    endpoint: String,
    access_token: Option<String>,
    language: Option<String>,
}

impl HttpCommerceClient {
    fn build(
        name: &'static str,
        endpoint: String,
        access_token: Option<String>,
        language: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| VitrineError::Network(e.to_string()))?;

        Ok(Self {
            client,
            name,
            endpoint,
            access_token,
            language,
        })
    }

    /// Client for the storefront API. Requires an endpoint and a token.
    pub fn storefront(config: &VitrineConfig) -> Result<Self> {
        let endpoint = config
            .storefront_endpoint
            .clone()
            .ok_or_else(|| VitrineError::Config("VITRINE_STOREFRONT_ENDPOINT must be set".to_string()))?;
        let token = config
            .storefront_token
            .clone()
            .ok_or_else(|| VitrineError::Config("VITRINE_STOREFRONT_TOKEN must be set".to_string()))?;

        Self::build(
            "storefront",
            endpoint,
            Some(token),
            config.language.clone(),
            config.timeout_seconds,
        )
    }

    /// Client for the customer-account API. The session token is optional;
    /// without one the client reports a logged-out session and account
    /// handlers answer 401 instead of calling out.
    pub fn customer_account(config: &VitrineConfig) -> Result<Self> {
        let endpoint = config
            .customer_endpoint
            .clone()
            .ok_or_else(|| VitrineError::Config("VITRINE_CUSTOMER_ENDPOINT must be set".to_string()))?;

        Self::build(
            "customer-account",
            endpoint,
            config.customer_token.clone(),
            config.language.clone(),
            config.timeout_seconds,
        )
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, document: &str, variables: Value) -> Result<ApiResponse> {
        debug!(client = self.name, "Posting operation");

        let mut request = self.client.post(&self.endpoint).json(&OperationRequest {
            query: document,
            variables,
        });
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| VitrineError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VitrineError::Api(format!("API error {status}: {body}")));
        }

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| VitrineError::Api(e.to_string()))
    }
}

#[async_trait]
impl CommerceClient for HttpCommerceClient {
    fn name(&self) -> &str {
        self.name
    }

    #[instrument(skip(self, document, variables), fields(client = self.name))]
    async fn query(&self, document: &str, variables: Value) -> Result<ApiResponse> {
        self.post(document, variables).await
    }

    #[instrument(skip(self, document, variables), fields(client = self.name))]
    async fn mutate(&self, document: &str, variables: Value) -> Result<ApiResponse> {
        self.post(document, variables).await
    }

    async fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: &str) -> VitrineConfig {
        VitrineConfig::default()
            .with_storefront_endpoint(endpoint)
            .with_storefront_token("sf-token")
            .with_customer_endpoint(endpoint)
            .with_language("EN")
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let err = HttpCommerceClient::storefront(&VitrineConfig::default()).unwrap_err();
        assert!(matches!(err, VitrineError::Config(_)));
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(header("Authorization", "Bearer sf-token"))
            .and(body_partial_json(json!({"query": "query Products"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"products": {"nodes": []}}
            })))
            .mount(&server)
            .await;

        let client =
            HttpCommerceClient::storefront(&config(&format!("{}/api", server.uri()))).unwrap();
        let data = client
            .query("query Products", json!({"first": 8}))
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert!(data["products"]["nodes"].is_array());
    }

    #[tokio::test]
    async fn test_api_errors_survive_the_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "Throttled"}]
            })))
            .mount(&server)
            .await;

        let client = HttpCommerceClient::storefront(&config(&server.uri())).unwrap();
        let response = client.mutate("mutation CartCreate", json!({})).await.unwrap();
        assert_eq!(response.errors[0].message, "Throttled");
        assert!(response.into_result().is_err());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = HttpCommerceClient::storefront(&config(&server.uri())).unwrap();
        let err = client.query("query Products", json!({})).await.unwrap_err();
        assert!(matches!(err, VitrineError::Api(m) if m.contains("502")));
    }

    #[tokio::test]
    async fn test_customer_login_state_tracks_token() {
        let server = MockServer::start().await;
        let anonymous = HttpCommerceClient::customer_account(&config(&server.uri())).unwrap();
        assert!(!anonymous.is_logged_in().await);

        let session = HttpCommerceClient::customer_account(
            &config(&server.uri()).with_customer_token("session-token"),
        )
        .unwrap();
        assert!(session.is_logged_in().await);
        assert_eq!(session.language(), Some("EN"));
    }
}

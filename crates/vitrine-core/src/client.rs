//! Commerce client trait and response envelope.
//!
//! Defines the interface that commerce API backends must implement. Query
//! and mutation documents are opaque strings supplied by the caller; this
//! crate never defines schemas.

use crate::{Result, VitrineError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single error entry from the API's `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub message: String,

    /// Path to the field that produced the error, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }
}

/// Response envelope returned by every query and mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    /// The `data` payload, when the operation produced one.
    pub data: Option<Value>,

    /// Top-level API errors. Empty on success.
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

impl ApiResponse {
    /// Successful response wrapping a data payload.
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Failed response carrying a single error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![ApiError::new(message)],
        }
    }

    /// Collapse the envelope: first API error wins, then missing data.
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.errors.first() {
            return Err(VitrineError::Api(error.message.clone()));
        }
        self.data
            .ok_or_else(|| VitrineError::Api("Empty response".to_string()))
    }
}

/// Trait that commerce API backends must implement.
///
/// Covers both external collaborators of the framework: the storefront API
/// and the customer-account API. All cart, address, order, and profile
/// operations are pass-throughs to this client.
#[async_trait]
pub trait CommerceClient: Send + Sync {
    /// Get the client name (used in logs).
    fn name(&self) -> &str;

    /// Execute a read operation.
    ///
    /// # Arguments
    ///
    /// * `document` - Opaque query document supplied by the caller
    /// * `variables` - JSON variables for the document
    async fn query(&self, document: &str, variables: Value) -> Result<ApiResponse>;

    /// Execute a write operation.
    async fn mutate(&self, document: &str, variables: Value) -> Result<ApiResponse>;

    /// Whether the current session is authenticated.
    ///
    /// Storefront clients are unauthenticated by nature and default to true
    /// so public queries are never blocked.
    async fn is_logged_in(&self) -> bool {
        true
    }

    /// Language passed along with every operation, when configured.
    fn language(&self) -> Option<&str> {
        None
    }
}

/// A mock client for testing.
#[derive(Debug, Default)]
pub struct MockCommerceClient {
    /// Responses to return (document -> response).
    pub responses: std::collections::HashMap<String, ApiResponse>,

    /// Whether `is_logged_in` reports an authenticated session.
    pub logged_in: bool,
}

impl MockCommerceClient {
    /// Create a new mock client with an authenticated session.
    pub fn new() -> Self {
        Self {
            responses: Default::default(),
            logged_in: true,
        }
    }

    /// Add a canned response for a document.
    pub fn with_response(mut self, document: impl Into<String>, response: ApiResponse) -> Self {
        self.responses.insert(document.into(), response);
        self
    }

    /// Report an unauthenticated session.
    pub fn logged_out(mut self) -> Self {
        self.logged_in = false;
        self
    }

    fn lookup(&self, document: &str) -> ApiResponse {
        self.responses
            .get(document)
            .cloned()
            .unwrap_or_else(|| ApiResponse::error(format!("No mock response for document: {document}")))
    }
}

#[async_trait]
impl CommerceClient for MockCommerceClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn query(&self, document: &str, _variables: Value) -> Result<ApiResponse> {
        Ok(self.lookup(document))
    }

    async fn mutate(&self, document: &str, _variables: Value) -> Result<ApiResponse> {
        Ok(self.lookup(document))
    }

    async fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}

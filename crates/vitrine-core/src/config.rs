//! # Vitrine Configuration
//!
//! Central configuration for the framework. Supports loading from
//! environment variables and programmatic defaults.

use std::env;

/// Global configuration for a Vitrine storefront.
///
/// # Example
/// ```rust
/// use vitrine_core::VitrineConfig;
///
/// // Load from environment
/// let config = VitrineConfig::from_env();
///
/// // Or customize
/// let config = VitrineConfig::default()
///     .with_page_by(8)
///     .with_profiler(true);
/// ```
#[derive(Debug, Clone)]
pub struct VitrineConfig {
    /// Storefront API endpoint.
    /// Env: VITRINE_STOREFRONT_ENDPOINT
    pub storefront_endpoint: Option<String>,

    /// Storefront API access token.
    /// Env: VITRINE_STOREFRONT_TOKEN
    pub storefront_token: Option<String>,

    /// Customer-account API endpoint.
    /// Env: VITRINE_CUSTOMER_ENDPOINT
    pub customer_endpoint: Option<String>,

    /// Customer-account access token for the current session.
    /// Env: VITRINE_CUSTOMER_TOKEN
    pub customer_token: Option<String>,

    /// Language passed along with every API operation.
    /// Env: VITRINE_LANGUAGE
    pub language: Option<String>,

    /// Default page size for paginated connections.
    /// Default: 20, Env: VITRINE_PAGE_BY
    pub page_by: u32,

    /// Request timeout in seconds for API calls.
    /// Default: 30, Env: VITRINE_TIMEOUT
    pub timeout_seconds: u64,

    /// Whether to enable the request profiler overlay (development only).
    /// Default: false, Env: VITRINE_PROFILER=true
    pub profiler_enabled: bool,

    /// Port for the request profiler dashboard.
    /// Default: 3100, Env: VITRINE_PROFILER_PORT=8080
    pub profiler_port: u16,
}

impl Default for VitrineConfig {
    fn default() -> Self {
        Self {
            storefront_endpoint: None,
            storefront_token: None,
            customer_endpoint: None,
            customer_token: None,
            language: None,
            page_by: 20,
            timeout_seconds: 30,
            profiler_enabled: false,
            profiler_port: 3100,
        }
    }
}

impl VitrineConfig {
    /// Create a new config from environment variables.
    /// Falls back to defaults for missing variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("VITRINE_STOREFRONT_ENDPOINT") {
            config.storefront_endpoint = Some(v);
        }
        if let Ok(v) = env::var("VITRINE_STOREFRONT_TOKEN") {
            config.storefront_token = Some(v);
        }
        if let Ok(v) = env::var("VITRINE_CUSTOMER_ENDPOINT") {
            config.customer_endpoint = Some(v);
        }
        if let Ok(v) = env::var("VITRINE_CUSTOMER_TOKEN") {
            config.customer_token = Some(v);
        }
        if let Ok(v) = env::var("VITRINE_LANGUAGE") {
            config.language = Some(v);
        }
        if let Ok(v) = env::var("VITRINE_PAGE_BY") {
            if let Ok(n) = v.parse() {
                config.page_by = n;
            }
        }
        if let Ok(v) = env::var("VITRINE_TIMEOUT") {
            if let Ok(n) = v.parse() {
                config.timeout_seconds = n;
            }
        }
        if let Ok(v) = env::var("VITRINE_PROFILER") {
            config.profiler_enabled = v.to_lowercase() == "true" || v == "1";
        }
        if let Ok(v) = env::var("VITRINE_PROFILER_PORT") {
            if let Ok(n) = v.parse() {
                config.profiler_port = n;
            }
        }

        config
    }

    /// Builder: Set the storefront API endpoint.
    pub fn with_storefront_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.storefront_endpoint = Some(endpoint.into());
        self
    }

    /// Builder: Set the storefront API token.
    pub fn with_storefront_token(mut self, token: impl Into<String>) -> Self {
        self.storefront_token = Some(token.into());
        self
    }

    /// Builder: Set the customer-account API endpoint.
    pub fn with_customer_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.customer_endpoint = Some(endpoint.into());
        self
    }

    /// Builder: Set the customer-account session token.
    pub fn with_customer_token(mut self, token: impl Into<String>) -> Self {
        self.customer_token = Some(token.into());
        self
    }

    /// Builder: Set the operation language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder: Set the default page size.
    pub fn with_page_by(mut self, page_by: u32) -> Self {
        self.page_by = page_by;
        self
    }

    /// Builder: Set the API request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builder: Enable or disable the request profiler.
    pub fn with_profiler(mut self, enabled: bool) -> Self {
        self.profiler_enabled = enabled;
        self
    }

    /// Builder: Set the request profiler port.
    pub fn with_profiler_port(mut self, port: u16) -> Self {
        self.profiler_port = port;
        self
    }
}

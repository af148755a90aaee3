//! # Vitrine Client
//!
//! HTTP implementations of the commerce client trait for the Vitrine
//! storefront framework.
//!
//! Two constructors cover the framework's external APIs:
//!
//! - **Storefront**: public catalog and cart operations
//! - **Customer account**: authenticated addresses, orders, and profile
//!
//! ## Example
//!
//! ```rust,ignore
//! use vitrine_client::HttpCommerceClient;
//! use vitrine_core::VitrineConfig;
//!
//! let config = VitrineConfig::from_env();
//! let storefront = HttpCommerceClient::storefront(&config)?;
//! let response = storefront.query(PRODUCTS_QUERY, variables).await?;
//! ```

pub mod http;

pub use http::HttpCommerceClient;

/// Re-export core types for convenience.
pub use vitrine_core::{ApiResponse, CommerceClient, Result, VitrineConfig, VitrineError};

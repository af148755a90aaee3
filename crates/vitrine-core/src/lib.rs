//! # Vitrine Core
//!
//! Core library for the Vitrine storefront framework.
//!
//! This crate provides the glue between route handlers and the commerce
//! API: form decoding, cart/account/order action handlers, and cursor
//! pagination plumbing. Query and mutation documents stay external; every
//! operation is a pass-through to a [`CommerceClient`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use vitrine_core::{CartHandler, CartMutations, FormData};
//!
//! let handler = CartHandler::new(client, mutations).with_cart_id(cart_id);
//! let payload = handler.handle(&FormData::parse(&body)).await;
//! ```

pub mod account;
pub mod action;
pub mod cart;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod orders;
pub mod pagination;

pub use account::{AddressHandler, AddressInput, AddressMutations, ProfileHandler};
pub use action::{ActionErrors, ActionPayload};
pub use cart::{CartAction, CartFormInput, CartHandler, CartMutations};
pub use client::{ApiError, ApiResponse, CommerceClient, MockCommerceClient};
pub use config::VitrineConfig;
pub use error::{Result, VitrineError};
pub use form::{FormData, FormMethod};
pub use pagination::{flatten_connection, Connection, PageInfo, PaginationVariables};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        ActionPayload, ApiResponse, CartAction, CartFormInput, CartHandler,
        CommerceClient, FormData, FormMethod, Result, VitrineConfig, VitrineError,
    };
}

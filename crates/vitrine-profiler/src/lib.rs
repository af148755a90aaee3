//! # Vitrine Profiler
//!
//! Development-time request profiler for the Vitrine storefront framework.
//!
//! The storefront's development server pushes one event per HTTP
//! interaction (main requests and their sub-requests). This crate records
//! those events, groups them into display rows with computed durations,
//! and serves a small dashboard over them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine_profiler::{ProfilerServer, ProfilerStore};
//!
//! let store = Arc::new(ProfilerStore::default());
//! ProfilerServer::new(Arc::clone(&store)).start(3100).await?;
//! ```

pub mod aggregate;
pub mod model;
pub mod server;
pub mod store;

pub use aggregate::{build_request_rows, grouped_rows, RequestRow, RequestTotals, RowKind};
pub use model::{CacheStatus, RequestTimings, ServerEvent, ServerEvents};
pub use server::{ProfilerOptions, ProfilerServer};
pub use store::ProfilerStore;

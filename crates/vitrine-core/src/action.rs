//! Structured action results.
//!
//! Mutation failures are caught at the action boundary and returned as a
//! payload with an HTTP status, never left to propagate to a generic
//! handler. Loader lookups are the opposite: they return `Err` so the
//! hosting framework's error boundary takes over.

use crate::VitrineError;
use serde::Serialize;
use std::collections::HashMap;

/// Error body of an action payload: either a top-level message or a map of
/// per-field (or per-record-id) messages.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ActionErrors {
    Message(String),
    Fields(HashMap<String, String>),
}

/// Result of a form action, ready to be serialized into a response.
#[derive(Debug, Clone, Serialize)]
pub struct ActionPayload<T> {
    /// HTTP status to respond with.
    pub status: u16,

    /// Successful payload, when the action succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error body, when it did not.
    pub error: Option<ActionErrors>,
}

impl<T> ActionPayload<T> {
    /// Successful payload (200).
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data: Some(data),
            error: None,
        }
    }

    /// Failed payload with a top-level message.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            error: Some(ActionErrors::Message(message.into())),
        }
    }

    /// Failed payload with a single keyed message, e.g. per address id.
    pub fn field_error(status: u16, key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(key.into(), message.into());
        Self {
            status,
            data: None,
            error: Some(ActionErrors::Fields(fields)),
        }
    }

    /// Failed payload derived from an error, using its status mapping.
    pub fn from_error(err: &VitrineError) -> Self {
        Self::error(err.status(), err.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

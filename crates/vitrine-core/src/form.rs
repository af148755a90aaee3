//! Form-encoded input decoding.
//!
//! Route actions receive `application/x-www-form-urlencoded` bodies and an
//! HTTP method; both are decoded here before any handler runs.

use crate::{Result, VitrineError};
use std::fmt;

/// HTTP methods accepted by form actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormMethod {
    Post,
    Put,
    Delete,
}

impl FormMethod {
    /// Parse a method name, case-insensitively.
    ///
    /// Unknown methods are an error so handlers can answer 405 without
    /// string matching.
    pub fn parse(method: &str) -> Result<Self> {
        match method.to_ascii_uppercase().as_str() {
            "POST" => Ok(FormMethod::Post),
            "PUT" => Ok(FormMethod::Put),
            "DELETE" => Ok(FormMethod::Delete),
            other => Err(VitrineError::MethodNotAllowed(other.to_string())),
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormMethod::Post => "POST",
            FormMethod::Put => "PUT",
            FormMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Decoded form body. Preserves submission order and repeated keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Decode a form-urlencoded body.
    pub fn parse(body: &str) -> Self {
        let pairs = url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// Build form data from key/value pairs (used by tests and adapters
    /// that already have decoded input).
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the key was submitted at all.
    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// All pairs in submission order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

//! Cursor pagination plumbing.
//!
//! Translates the `cursor`/`direction` query parameters of a paginated page
//! into the forward/backward variables the commerce API expects, and
//! flattens connection payloads into plain node lists.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

/// Variables for a paginated connection query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationVariables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

impl PaginationVariables {
    /// Derive pagination variables from a page URL.
    ///
    /// `direction=previous` pages backwards from the cursor; anything else
    /// pages forwards. Without a cursor this is the first page.
    pub fn from_url(url: &Url, page_by: u32) -> Self {
        let mut cursor = None;
        let mut backwards = false;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "cursor" => cursor = Some(value.into_owned()),
                "direction" => backwards = value == "previous",
                _ => {}
            }
        }

        if backwards {
            Self {
                last: Some(page_by),
                start_cursor: cursor,
                ..Default::default()
            }
        } else {
            Self {
                first: Some(page_by),
                end_cursor: cursor,
                ..Default::default()
            }
        }
    }

    /// Merge these variables into a JSON variables object. Only the active
    /// direction's keys are written; the others stay absent.
    pub fn apply_to(&self, variables: &mut Value) {
        if let (Value::Object(map), Value::Object(own)) = (variables, json!(self)) {
            map.extend(own);
        }
    }
}

/// Page boundary metadata of a connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_previous_page: bool,

    #[serde(default)]
    pub has_next_page: bool,

    #[serde(default)]
    pub start_cursor: Option<String>,

    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One edge of an edge-shaped connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// A paginated connection, accepting either the `nodes` or the `edges`
/// wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,

    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,

    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

impl<T> Connection<T> {
    /// Flatten into a plain node list, whichever shape the API returned.
    pub fn flatten(self) -> Vec<T> {
        if !self.nodes.is_empty() {
            self.nodes
        } else {
            self.edges.into_iter().map(|edge| edge.node).collect()
        }
    }
}

/// Free-function form of [`Connection::flatten`].
pub fn flatten_connection<T>(connection: Connection<T>) -> Vec<T> {
    connection.flatten()
}

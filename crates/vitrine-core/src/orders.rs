//! Order history loaders and search filters.
//!
//! Loaders intentionally return `Err` on missing data so the hosting
//! framework's error boundary renders the error page; only form actions
//! catch errors locally.

use crate::{
    client::CommerceClient, pagination::PaginationVariables, Result, VitrineError,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::instrument;
use url::Url;

/// Filters accepted by the order list page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilterParams {
    /// Order name, digits only (a leading `#` is stripped).
    pub name: Option<String>,

    /// Alphanumeric confirmation number.
    pub confirmation_number: Option<String>,
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#?(\d+)$").unwrap())
}

fn confirmation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap())
}

/// Parse and sanitize order filters from the page URL. Values that do not
/// match the expected shape are dropped rather than forwarded to the API.
pub fn parse_order_filters(url: &Url) -> OrderFilterParams {
    let mut filters = OrderFilterParams::default();
    for (key, value) in url.query_pairs() {
        let value = value.trim();
        match key.as_ref() {
            "name" => {
                if let Some(captures) = name_pattern().captures(value) {
                    filters.name = Some(captures[1].to_string());
                }
            }
            "confirmation_number" => {
                if confirmation_pattern().is_match(value) {
                    filters.confirmation_number = Some(value.to_string());
                }
            }
            _ => {}
        }
    }
    filters
}

/// Compose the API search string from the filters, `None` when unfiltered.
pub fn build_order_search_query(filters: &OrderFilterParams) -> Option<String> {
    let mut terms = Vec::new();
    if let Some(name) = &filters.name {
        terms.push(format!("name:{name}"));
    }
    if let Some(confirmation) = &filters.confirmation_number {
        terms.push(format!("confirmation_number:{confirmation}"));
    }
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}

/// Load the customer's order list for the given page URL.
///
/// Deserializes the response's `customer` object into the caller's type;
/// missing customer data (or API errors) is a `NotFound` for the error
/// boundary.
#[instrument(skip(client, document, url), fields(client = %client.name()))]
pub async fn load_orders<T, C>(client: &C, document: &str, url: &Url, page_by: u32) -> Result<T>
where
    T: DeserializeOwned,
    C: CommerceClient,
{
    let filters = parse_order_filters(url);
    let mut variables = json!({
        "query": build_order_search_query(&filters),
    });
    PaginationVariables::from_url(url, page_by).apply_to(&mut variables);
    if let (Value::Object(map), Some(language)) = (&mut variables, client.language()) {
        map.insert("language".into(), json!(language));
    }

    let response = client.query(document, variables).await?;
    if !response.errors.is_empty() {
        return Err(VitrineError::NotFound("Customer orders".to_string()));
    }
    let customer = response
        .data
        .and_then(|mut data| {
            let customer = data.get_mut("customer").map(Value::take);
            customer.filter(|customer| !customer.is_null())
        })
        .ok_or_else(|| VitrineError::NotFound("Customer orders".to_string()))?;

    Ok(serde_json::from_value(customer)?)
}

/// Load a single order by id. Missing order is a `NotFound`.
#[instrument(skip(client, document), fields(client = %client.name()))]
pub async fn load_order<T, C>(client: &C, document: &str, order_id: &str) -> Result<T>
where
    T: DeserializeOwned,
    C: CommerceClient,
{
    let mut variables = json!({ "orderId": order_id });
    if let (Value::Object(map), Some(language)) = (&mut variables, client.language()) {
        map.insert("language".into(), json!(language));
    }

    let response = client.query(document, variables).await?;
    if !response.errors.is_empty() {
        return Err(VitrineError::NotFound("Order".to_string()));
    }
    let order = response
        .data
        .and_then(|mut data| {
            let order = data.get_mut("order").map(Value::take);
            order.filter(|order| !order.is_null())
        })
        .ok_or_else(|| VitrineError::NotFound("Order".to_string()))?;

    Ok(serde_json::from_value(order)?)
}

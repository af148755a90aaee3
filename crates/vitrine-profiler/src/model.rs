//! Event model for the request profiler.
//!
//! A development server pushes one [`ServerEvent`] per HTTP interaction:
//! main requests (document navigations) and the sub-requests they spawn.
//! Sub-requests point at their parent through `request_id`; a main request
//! is its own parent (`request_id == id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a request against the caching layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    Hit,
    Miss,
    Stale,
    Put,

    /// Request did not touch the cache.
    #[default]
    None,
}

/// Timing boundaries of one event, in milliseconds.
///
/// End timestamps are optional: a record can arrive before its response
/// finishes. Durations saturate to zero in that case rather than dropping
/// the row (see the duration helpers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTimings {
    pub request_start: u64,

    #[serde(default)]
    pub request_end: Option<u64>,

    #[serde(default)]
    pub response_end: Option<u64>,
}

impl RequestTimings {
    pub fn new(request_start: u64) -> Self {
        Self {
            request_start,
            request_end: None,
            response_end: None,
        }
    }

    pub fn with_request_end(mut self, request_end: u64) -> Self {
        self.request_end = Some(request_end);
        self
    }

    pub fn with_response_end(mut self, response_end: u64) -> Self {
        self.response_end = Some(response_end);
        self
    }

    /// Duration shown for a main request: response end minus request start.
    pub fn main_duration(&self) -> u64 {
        self.response_end
            .unwrap_or(self.request_start)
            .saturating_sub(self.request_start)
    }

    /// Duration shown for a sub-request: request end minus request start.
    pub fn sub_duration(&self) -> u64 {
        self.request_end
            .unwrap_or(self.request_start)
            .saturating_sub(self.request_start)
    }
}

/// One HTTP interaction observed by the development server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    /// Unique id of this event.
    pub id: String,

    /// Id of the main request this event belongs to. Equal to `id` for
    /// main requests themselves.
    pub request_id: String,

    pub url: String,

    /// Human-readable name shown instead of the URL when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub cache_status: CacheStatus,

    /// HTTP status of the response, 0 when unknown.
    #[serde(default)]
    pub status: u16,

    #[serde(default)]
    pub timings: RequestTimings,

    /// When the profiler recorded the event.
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

impl ServerEvent {
    /// Create a main-request event (its own parent).
    pub fn main(id: impl Into<String>, url: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            request_id: id.clone(),
            id,
            url: url.into(),
            display_name: None,
            cache_status: CacheStatus::None,
            status: 0,
            timings: RequestTimings::default(),
            recorded_at: Utc::now(),
        }
    }

    /// Create a sub-request event attached to a parent.
    pub fn sub(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            request_id: parent_id.into(),
            url: url.into(),
            display_name: None,
            cache_status: CacheStatus::None,
            status: 0,
            timings: RequestTimings::default(),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_cache_status(mut self, cache_status: CacheStatus) -> Self {
        self.cache_status = cache_status;
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_timings(mut self, timings: RequestTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Whether this event is a main request.
    pub fn is_main(&self) -> bool {
        self.request_id == self.id
    }

    /// Name shown in the request table: display name over URL.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.url)
    }
}

/// The full batch of recorded events plus the overlay's view toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvents {
    /// Main requests in arrival order.
    pub main_requests: Vec<ServerEvent>,

    /// Sub-requests in arrival order, across all main requests.
    pub sub_requests: Vec<ServerEvent>,

    /// Exclude cache PUT sub-requests from the visible count.
    pub hide_put_requests: bool,

    /// Keep the batch across navigations instead of clearing per page.
    pub preserve_log: bool,

    /// Hide the development-only notification banner.
    pub hide_notification: bool,
}

impl ServerEvents {
    pub fn is_empty(&self) -> bool {
        self.main_requests.is_empty() && self.sub_requests.is_empty()
    }

    /// Sub-requests of one main request, in arrival order.
    pub fn subs_of<'a>(&'a self, main_id: &'a str) -> impl Iterator<Item = &'a ServerEvent> {
        self.sub_requests
            .iter()
            .filter(move |sub| sub.request_id == main_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_request_is_its_own_parent() {
        let event = ServerEvent::main("a", "https://shop.example/");
        assert!(event.is_main());
        assert_eq!(event.request_id, "a");
    }

    #[test]
    fn test_label_prefers_display_name() {
        let event = ServerEvent::sub("a1", "a", "https://api.example/graphql")
            .with_display_name("ProductQuery");
        assert_eq!(event.label(), "ProductQuery");

        let bare = ServerEvent::sub("a2", "a", "https://api.example/graphql");
        assert_eq!(bare.label(), "https://api.example/graphql");
    }

    #[test]
    fn test_durations_saturate_when_end_missing() {
        let timings = RequestTimings::new(100);
        assert_eq!(timings.main_duration(), 0);
        assert_eq!(timings.sub_duration(), 0);

        let timings = RequestTimings::new(100).with_request_end(140).with_response_end(250);
        assert_eq!(timings.sub_duration(), 40);
        assert_eq!(timings.main_duration(), 150);
    }

    #[test]
    fn test_cache_status_wire_form() {
        assert_eq!(serde_json::to_string(&CacheStatus::Hit).unwrap(), "\"HIT\"");
        assert_eq!(
            serde_json::from_str::<CacheStatus>("\"PUT\"").unwrap(),
            CacheStatus::Put
        );
    }

    #[test]
    fn test_event_wire_shape() {
        let event: ServerEvent = serde_json::from_str(
            r#"{
                "id": "a1",
                "requestId": "a",
                "url": "https://api.example/graphql",
                "cacheStatus": "MISS",
                "timings": {"requestStart": 10, "requestEnd": 35}
            }"#,
        )
        .unwrap();
        assert!(!event.is_main());
        assert_eq!(event.cache_status, CacheStatus::Miss);
        assert_eq!(event.timings.sub_duration(), 25);
        assert_eq!(event.status, 0);
    }
}

//! Profiler dashboard server.
//!
//! Development-only axum server: a JSON API over the store, a server-sent
//! event feed of newly recorded events, and the embedded static dashboard.

use crate::aggregate::{grouped_rows, RequestRow, RequestTotals};
use crate::model::{ServerEvent, ServerEvents};
use crate::store::ProfilerStore;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::sse::{Event, KeepAlive, Sse},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

#[derive(RustEmbed)]
#[folder = "ui/dist/"]
struct Assets;

/// Toggle updates accepted by the options endpoint. Absent fields are
/// left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerOptions {
    pub hide_put_requests: Option<bool>,
    pub preserve_log: Option<bool>,
    pub hide_notification: Option<bool>,
}

/// Grouped table response: rows plus the re-derived totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTable {
    pub rows: Vec<RequestRow>,
    pub totals: RequestTotals,
}

pub struct ProfilerServer {
    store: Arc<ProfilerStore>,
}

impl ProfilerServer {
    pub fn new(store: Arc<ProfilerStore>) -> Self {
        Self { store }
    }

    /// The router, exposed separately so tests and embedders can mount it.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/events", get(list_events).post(ingest_event))
            .route("/api/events/:id", get(get_event))
            .route("/api/rows", get(list_rows))
            .route("/api/stream", get(stream_events))
            .route("/api/clear", post(clear_events))
            .route("/api/options", put(update_options))
            .fallback(static_handler)
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.store))
    }

    pub async fn start(self, port: u16) -> vitrine_core::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        tracing::info!("Vitrine profiler available at http://localhost:{port}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn list_events(State(store): State<Arc<ProfilerStore>>) -> Json<ServerEvents> {
    Json(store.snapshot())
}

async fn get_event(
    Path(id): Path<String>,
    State(store): State<Arc<ProfilerStore>>,
) -> Result<Json<ServerEvent>, StatusCode> {
    store.event(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn list_rows(State(store): State<Arc<ProfilerStore>>) -> Json<RequestTable> {
    let snapshot = store.snapshot();
    Json(RequestTable {
        rows: grouped_rows(&snapshot),
        totals: RequestTotals::of(&snapshot),
    })
}

/// Ingest one event from the development push channel. Events arriving
/// without an id get one assigned; an id-less event with no parent is a
/// main request.
async fn ingest_event(
    State(store): State<Arc<ProfilerStore>>,
    Json(mut event): Json<ServerEvent>,
) -> StatusCode {
    if event.id.is_empty() {
        event.id = Uuid::new_v4().to_string();
    }
    if event.request_id.is_empty() {
        event.request_id = event.id.clone();
    }
    store.record(event);
    StatusCode::ACCEPTED
}

async fn clear_events(State(store): State<Arc<ProfilerStore>>) -> StatusCode {
    store.clear();
    StatusCode::NO_CONTENT
}

async fn update_options(
    State(store): State<Arc<ProfilerStore>>,
    Json(options): Json<ProfilerOptions>,
) -> Json<ServerEvents> {
    if let Some(hide) = options.hide_put_requests {
        store.set_hide_put_requests(hide);
    }
    if let Some(preserve) = options.preserve_log {
        store.set_preserve_log(preserve);
    }
    if let Some(hide) = options.hide_notification {
        store.set_hide_notification(hide);
    }
    Json(store.snapshot())
}

/// Server-sent event feed of events as they are recorded.
async fn stream_events(
    State(store): State<Arc<ProfilerStore>>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = store.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(sse_event) = Event::default().json_data(&event) {
                        yield Ok::<Event, Infallible>(sse_event);
                    }
                }
                // Dashboards that fall behind resume with the next event.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn static_handler(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if path.is_empty() || path == "index.html" {
        return index_html().await;
    }

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => index_html().await,
    }
}

async fn index_html() -> Response {
    match Assets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RequestTimings;

    #[tokio::test]
    async fn test_options_apply_only_present_fields() {
        let store = Arc::new(ProfilerStore::default());
        store.set_preserve_log(true);

        let response = update_options(
            State(Arc::clone(&store)),
            Json(ProfilerOptions {
                hide_put_requests: Some(true),
                ..Default::default()
            }),
        )
        .await;

        assert!(response.0.hide_put_requests);
        assert!(response.0.preserve_log);
    }

    #[tokio::test]
    async fn test_ingest_assigns_ids() {
        let store = Arc::new(ProfilerStore::default());
        let event = ServerEvent {
            id: String::new(),
            request_id: String::new(),
            ..ServerEvent::main("x", "https://shop.example/")
        };

        let status = ingest_event(State(Arc::clone(&store)), Json(event)).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.main_requests.len(), 1);
        assert!(!snapshot.main_requests[0].id.is_empty());
        assert!(snapshot.main_requests[0].is_main());
    }

    #[tokio::test]
    async fn test_rows_endpoint_groups_and_counts() {
        let store = Arc::new(ProfilerStore::default());
        store.set_preserve_log(true);
        store.record_main(
            ServerEvent::main("a", "https://shop.example/")
                .with_timings(RequestTimings::new(0).with_response_end(100)),
        );
        store.record_sub(
            ServerEvent::sub("a1", "a", "https://api.example/q")
                .with_timings(RequestTimings::new(10).with_request_end(30)),
        );

        let table = list_rows(State(Arc::clone(&store))).await;
        assert_eq!(table.0.rows.len(), 2);
        assert_eq!(table.0.rows[1].duration, 20);
        assert_eq!(table.0.totals.main_requests, 1);
        assert_eq!(table.0.totals.visible_sub_requests, 1);
    }

    #[tokio::test]
    async fn test_get_event_not_found() {
        let store = Arc::new(ProfilerStore::default());
        let missing = get_event(Path("nope".into()), State(store)).await;
        assert!(matches!(missing, Err(StatusCode::NOT_FOUND)));
    }
}

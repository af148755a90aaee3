//! Request-event aggregation.
//!
//! Turns the flat event batch into display rows: one row per main request,
//! immediately followed by that main request's sub-requests, all in arrival
//! order. The transform is pure; totals are re-derived alongside it.

use crate::model::{CacheStatus, RequestTimings, ServerEvent, ServerEvents};
use serde::Serialize;

/// Group the batch into rows using caller-supplied builders.
///
/// `build_main` receives each main request with its timing, `build_sub`
/// each of that main request's sub-requests. Sub-requests whose parent is
/// not in the batch are orphaned and produce no row. Toggles do not change
/// the row list; `hide_put_requests` only affects [`RequestTotals`].
pub fn build_request_rows<R>(
    events: &ServerEvents,
    mut build_main: impl FnMut(&ServerEvent, &RequestTimings) -> R,
    mut build_sub: impl FnMut(&ServerEvent, &RequestTimings) -> R,
) -> Vec<R> {
    let mut rows = Vec::with_capacity(events.main_requests.len() + events.sub_requests.len());

    for main in &events.main_requests {
        rows.push(build_main(main, &main.timings));
        for sub in events.subs_of(&main.id) {
            rows.push(build_sub(sub, &sub.timings));
        }
    }

    rows
}

/// Counters shown under the request table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTotals {
    pub main_requests: usize,

    /// Attached sub-requests, minus cache PUTs when `hide_put_requests`
    /// is set. Rows for hidden PUTs still render; only this count changes.
    pub visible_sub_requests: usize,
}

impl RequestTotals {
    pub fn of(events: &ServerEvents) -> Self {
        let mut visible_sub_requests = 0;
        for main in &events.main_requests {
            for sub in events.subs_of(&main.id) {
                if events.hide_put_requests && sub.cache_status == CacheStatus::Put {
                    continue;
                }
                visible_sub_requests += 1;
            }
        }

        Self {
            main_requests: events.main_requests.len(),
            visible_sub_requests,
        }
    }
}

/// Row kind marker for ready-made rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Main,
    Sub,
}

/// A display-ready table row, the shape served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    pub id: String,
    pub request_id: String,
    pub url: String,
    pub cache_status: CacheStatus,
    pub status: u16,
    pub duration: u64,
    pub kind: RowKind,
}

/// Build the standard dashboard table from a batch.
pub fn grouped_rows(events: &ServerEvents) -> Vec<RequestRow> {
    build_request_rows(
        events,
        |main, timings| RequestRow {
            id: main.id.clone(),
            request_id: main.request_id.clone(),
            url: main.url.clone(),
            cache_status: main.cache_status,
            status: main.status,
            duration: timings.main_duration(),
            kind: RowKind::Main,
        },
        |sub, timings| RequestRow {
            id: sub.id.clone(),
            request_id: sub.request_id.clone(),
            url: sub.label().to_string(),
            cache_status: sub.cache_status,
            status: sub.status,
            duration: timings.sub_duration(),
            kind: RowKind::Sub,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RequestTimings;

    fn main_event(id: &str, start: u64, response_end: u64) -> ServerEvent {
        ServerEvent::main(id, format!("https://shop.example/{id}"))
            .with_timings(RequestTimings::new(start).with_response_end(response_end))
    }

    fn sub_event(id: &str, parent: &str, start: u64, request_end: u64) -> ServerEvent {
        ServerEvent::sub(id, parent, format!("https://api.example/{id}"))
            .with_timings(RequestTimings::new(start).with_request_end(request_end))
    }

    #[test]
    fn test_mains_without_subs_yield_one_row_each() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100), main_event("b", 50, 90)],
            ..Default::default()
        };

        let rows = grouped_rows(&events);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "a");
        assert_eq!(rows[0].duration, 100);
        assert_eq!(rows[1].id, "b");
        assert_eq!(rows[1].duration, 40);
    }

    #[test]
    fn test_sub_rows_follow_their_main() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100), main_event("b", 100, 200)],
            sub_requests: vec![
                sub_event("b1", "b", 110, 130),
                sub_event("a1", "a", 10, 30),
                sub_event("a2", "a", 20, 60),
            ],
            ..Default::default()
        };

        let ids: Vec<String> = grouped_rows(&events).into_iter().map(|r| r.id).collect();
        // Main first, then its subs in arrival order, per main in arrival order.
        assert_eq!(ids, ["a", "a1", "a2", "b", "b1"]);
    }

    #[test]
    fn test_one_plus_k_rows_per_main() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100)],
            sub_requests: (0..5)
                .map(|i| sub_event(&format!("a{i}"), "a", 0, 10))
                .collect(),
            ..Default::default()
        };
        assert_eq!(grouped_rows(&events).len(), 6);
    }

    #[test]
    fn test_orphaned_subs_are_excluded() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100)],
            sub_requests: vec![sub_event("z1", "z", 0, 10), sub_event("a1", "a", 0, 10)],
            ..Default::default()
        };

        let rows = grouped_rows(&events);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.id != "z1"));
        assert_eq!(RequestTotals::of(&events).visible_sub_requests, 1);
    }

    #[test]
    fn test_hide_put_changes_count_not_rows() {
        let put_sub = sub_event("a1", "a", 0, 10).with_cache_status(CacheStatus::Put);
        let mut events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100)],
            sub_requests: vec![put_sub, sub_event("a2", "a", 0, 20)],
            ..Default::default()
        };

        let before = RequestTotals::of(&events);
        assert_eq!(before.visible_sub_requests, 2);
        assert_eq!(grouped_rows(&events).len(), 3);

        events.hide_put_requests = true;
        let after = RequestTotals::of(&events);
        assert_eq!(after.main_requests, 1);
        assert_eq!(after.visible_sub_requests, 1);
        // The PUT row still renders.
        assert_eq!(grouped_rows(&events).len(), 3);
    }

    #[test]
    fn test_put_only_subs_count_to_zero() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100)],
            sub_requests: vec![sub_event("a1", "a", 0, 10).with_cache_status(CacheStatus::Put)],
            hide_put_requests: true,
            ..Default::default()
        };

        let rows = grouped_rows(&events);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "a1");
        assert_eq!(RequestTotals::of(&events).visible_sub_requests, 0);
    }

    #[test]
    fn test_custom_builders() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100)],
            sub_requests: vec![sub_event("a1", "a", 10, 40)],
            ..Default::default()
        };

        let durations = build_request_rows(
            &events,
            |_, timings| timings.main_duration(),
            |_, timings| timings.sub_duration(),
        );
        assert_eq!(durations, vec![100, 30]);
    }

    #[test]
    fn test_sub_row_uses_display_name() {
        let events = ServerEvents {
            main_requests: vec![main_event("a", 0, 100)],
            sub_requests: vec![
                sub_event("a1", "a", 0, 10).with_display_name("ProductQuery"),
            ],
            ..Default::default()
        };
        assert_eq!(grouped_rows(&events)[1].url, "ProductQuery");
    }
}

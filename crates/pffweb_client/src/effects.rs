use std::sync::{mpsc, Arc};

use client_logging::{client_debug, client_warn};
use pffweb_core::{FailureReason, Message, MessageBody, SearchEffect, SearchFailure, SearchMsg, SearchPage};
use pffweb_engine::{
    EngineEvent, EngineHandle, EventSink, FailureKind, SearchBackend, SearchError, SearchResponse,
};

use crate::app::AppEvent;

/// Executes search effects; implemented by the engine-backed runner and by test doubles.
pub trait EffectExecutor {
    fn enqueue(&self, effects: Vec<SearchEffect>);
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(backend: Arc<dyn SearchBackend>, events: mpsc::Sender<AppEvent>) -> Self {
        let engine = EngineHandle::new(backend, Arc::new(MsgSink { events }));
        Self { engine }
    }
}

impl EffectExecutor for EffectRunner {
    fn enqueue(&self, effects: Vec<SearchEffect>) {
        for effect in effects {
            match effect {
                SearchEffect::ScheduleDebounce { ticket, delay } => {
                    self.engine.schedule_debounce(ticket, delay);
                }
                SearchEffect::ExecuteSearch { query_id, query } => {
                    client_debug!(
                        "ExecuteSearch query_id={} offset={} term={:?}",
                        query_id,
                        query.offset,
                        query.term
                    );
                    self.engine.search(query_id, query.term, query.offset);
                }
                SearchEffect::AbortSearch { query_id } => self.engine.abort(query_id),
                SearchEffect::LocateMessage { id } => self.engine.locate_message(id),
            }
        }
    }
}

/// Turns engine events into search messages for the app loop.
struct MsgSink {
    events: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(AppEvent::Search(map_event(event)));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> SearchMsg {
    match event {
        EngineEvent::DebounceElapsed { ticket } => SearchMsg::DebounceElapsed { ticket },
        EngineEvent::SearchCompleted { query_id, result } => SearchMsg::SearchCompleted {
            query_id,
            result: result.map(map_response).map_err(map_error),
        },
        EngineEvent::MessageLocated { id, result } => SearchMsg::BodyLoaded {
            id,
            result: result
                .map(|body| MessageBody {
                    kind: body.kind,
                    value: body.value,
                })
                .map_err(map_error),
        },
    }
}

fn map_response(response: SearchResponse) -> SearchPage {
    SearchPage {
        messages: response.messages.into_iter().map(Message::new).collect(),
        total_matches: response.total_matches,
    }
}

fn map_error(err: SearchError) -> SearchFailure {
    client_warn!("Request failed: {}", err);
    let reason = match err.kind {
        FailureKind::HttpStatus(code) => FailureReason::HttpStatus(code),
        FailureKind::NotFound => FailureReason::NotFound,
        FailureKind::Timeout => FailureReason::Timeout,
        FailureKind::TooLarge { .. } => FailureReason::TooLarge,
        FailureKind::Decode => FailureReason::Decode,
        FailureKind::Network => FailureReason::Network,
        FailureKind::InvalidUrl => FailureReason::Other,
    };
    SearchFailure::new(reason, err.message)
}

#[cfg(test)]
mod tests {
    use pffweb_core::{FailureReason, SearchMsg};
    use pffweb_engine::{EngineEvent, FailureKind, SearchError, SearchResponse};
    use serde_json::json;

    use super::map_event;

    #[test]
    fn search_response_becomes_page() {
        let msg = map_event(EngineEvent::SearchCompleted {
            query_id: 4,
            result: Ok(SearchResponse {
                messages: vec![json!({ "id": "1" }), json!({ "id": "2" })],
                total_matches: 9,
                offset: None,
            }),
        });
        match msg {
            SearchMsg::SearchCompleted { query_id, result } => {
                assert_eq!(query_id, 4);
                let page = result.unwrap();
                assert_eq!(page.total_matches, 9);
                assert_eq!(page.messages[1].id(), Some("2"));
            }
            other => panic!("unexpected msg {other:?}"),
        }
    }

    #[test]
    fn oversize_failure_keeps_message() {
        let msg = map_event(EngineEvent::SearchCompleted {
            query_id: 1,
            result: Err(too_large()),
        });
        match msg {
            SearchMsg::SearchCompleted {
                result: Err(failure),
                ..
            } => {
                assert_eq!(failure.reason, FailureReason::TooLarge);
                assert_eq!(failure.message, "response too large");
            }
            other => panic!("unexpected msg {other:?}"),
        }
    }

    fn too_large() -> SearchError {
        SearchError {
            kind: FailureKind::TooLarge {
                max_bytes: 1,
                actual: Some(2),
            },
            message: "response too large".to_string(),
        }
    }
}

use pffweb_core::{
    update_search, LoadMore, Message, QueryId, SearchEffect, SearchMsg, SearchPage, SearchQuery,
    SearchState,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn page(ids: std::ops::Range<usize>, total_matches: usize) -> SearchPage {
    SearchPage {
        messages: ids
            .map(|id| Message::new(json!({ "id": id.to_string(), "subject": format!("s{id}") })))
            .collect(),
        total_matches,
    }
}

/// Types `term`, lets the debounce fire and returns the issued query.
fn search_for(state: SearchState, term: &str) -> (SearchState, QueryId, SearchQuery) {
    let (state, effects) = update_search(state, SearchMsg::KeyUp(term.to_string()));
    let ticket = match effects[0] {
        SearchEffect::ScheduleDebounce { ticket, .. } => ticket,
        ref other => panic!("unexpected effect {other:?}"),
    };
    let (state, effects) = update_search(state, SearchMsg::DebounceElapsed { ticket });
    let (query_id, query) = single_search(&effects);
    (state, query_id, query)
}

fn single_search(effects: &[SearchEffect]) -> (QueryId, SearchQuery) {
    match effects {
        [SearchEffect::ExecuteSearch { query_id, query }] => (*query_id, query.clone()),
        other => panic!("expected one search effect, got {other:?}"),
    }
}

fn complete(state: SearchState, query_id: QueryId, page: SearchPage) -> SearchState {
    let (state, effects) = update_search(
        state,
        SearchMsg::SearchCompleted {
            query_id,
            result: Ok(page),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn load_more_advances_offset_until_total_is_reached() {
    let (state, query_id, query) = search_for(SearchState::new(), "invoice");
    assert_eq!(query.offset, 0);
    let mut state = complete(state, query_id, page(0..5, 10));
    assert!(state.consume_dirty());
    assert_eq!(state.messages().len(), 5);
    assert_eq!(
        state.view().load_more,
        Some(LoadMore {
            next_offset: 5,
            remaining: 5,
        })
    );

    let (state, effects) = update_search(state, SearchMsg::LoadMoreClicked);
    let (query_id, query) = single_search(&effects);
    assert_eq!(
        query,
        SearchQuery {
            term: "invoice".to_string(),
            offset: 5,
        }
    );
    assert_eq!(state.offset(), 5);

    let state = complete(state, query_id, page(5..10, 10));
    assert_eq!(state.messages().len(), 10);
    assert_eq!(state.view().load_more, None);

    let (state, effects) = update_search(state, SearchMsg::LoadMoreClicked);
    assert!(effects.is_empty());
    let (_state, effects) = update_search(state, SearchMsg::LoadMoreClicked);
    assert!(effects.is_empty());
}

#[test]
fn results_accumulate_in_arrival_order_and_total_is_last_wins() {
    let (state, query_id, _) = search_for(SearchState::new(), "q");
    let state = complete(state, query_id, page(0..2, 6));
    let (state, effects) = update_search(state, SearchMsg::LoadMoreClicked);
    let (query_id, _) = single_search(&effects);
    // Server now reports fewer matches than before.
    let state = complete(state, query_id, page(2..4, 4));

    let ids: Vec<_> = state.messages().iter().filter_map(Message::id).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3"]);
    assert_eq!(state.total_matches(), 4);
    assert!(!state.has_more());
}

#[test]
fn load_more_is_ignored_while_query_in_flight() {
    let (state, query_id, _) = search_for(SearchState::new(), "q");
    let state = complete(state, query_id, page(0..5, 20));
    let (state, effects) = update_search(state, SearchMsg::LoadMoreClicked);
    assert_eq!(effects.len(), 1);
    assert!(state.view().loading);
    assert_eq!(state.view().load_more, None);

    let (state, effects) = update_search(state, SearchMsg::LoadMoreClicked);
    assert!(effects.is_empty());
    assert_eq!(state.offset(), 5);
}

#[test]
fn new_term_starts_fresh_result_set() {
    let (state, query_id, _) = search_for(SearchState::new(), "alpha");
    let state = complete(state, query_id, page(0..5, 10));

    let (state, query_id, query) = search_for(state, "beta");
    assert_eq!(
        query,
        SearchQuery {
            term: "beta".to_string(),
            offset: 0,
        }
    );
    assert!(state.messages().is_empty());
    assert_eq!(state.total_matches(), 0);

    let state = complete(state, query_id, page(100..102, 2));
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.active_term(), Some("beta"));
}

#[test]
fn same_term_retrigger_appends_at_current_offset() {
    let (state, query_id, _) = search_for(SearchState::new(), "alpha");
    let state = complete(state, query_id, page(0..3, 10));

    let (state, query_id, query) = search_for(state, "alpha");
    assert_eq!(query.offset, 0);
    let state = complete(state, query_id, page(0..3, 10));
    assert_eq!(state.messages().len(), 6);
}

#[test]
fn superseded_query_is_aborted_and_its_result_dropped() {
    let (state, first_id, _) = search_for(SearchState::new(), "alpha");

    let (state, effects) = update_search(state, SearchMsg::KeyUp("alphabet".to_string()));
    let ticket = match effects[0] {
        SearchEffect::ScheduleDebounce { ticket, .. } => ticket,
        ref other => panic!("unexpected effect {other:?}"),
    };
    let (state, effects) = update_search(state, SearchMsg::DebounceElapsed { ticket });
    let second_id = first_id + 1;
    assert_eq!(
        effects,
        vec![
            SearchEffect::AbortSearch { query_id: first_id },
            SearchEffect::ExecuteSearch {
                query_id: second_id,
                query: SearchQuery {
                    term: "alphabet".to_string(),
                    offset: 0,
                },
            },
        ]
    );

    // The older response resolves last; it must not land in the result set.
    let state = complete(state, second_id, page(0..1, 1));
    let before = state.clone();
    let (after, effects) = update_search(
        state,
        SearchMsg::SearchCompleted {
            query_id: first_id,
            result: Ok(page(50..55, 5)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(after, before);
}

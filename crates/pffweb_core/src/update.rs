use client_logging::{client_debug, client_info, client_trace};

use crate::{
    ConnectionState, ReloadEffect, ReloadMsg, ReloadState, SearchEffect, SearchMsg, SearchQuery,
    SearchState,
};

/// Pure update function for the search controller.
pub fn update_search(mut state: SearchState, msg: SearchMsg) -> (SearchState, Vec<SearchEffect>) {
    let effects = match msg {
        SearchMsg::KeyUp(value) => {
            state.set_input(value);
            let ticket = state.arm_debounce();
            vec![SearchEffect::ScheduleDebounce {
                ticket,
                delay: state.debounce_delay(),
            }]
        }
        SearchMsg::DebounceElapsed { ticket } => {
            if !state.take_debounce(ticket) {
                client_trace!("Ignoring stale debounce ticket {}", ticket);
                return (state, Vec::new());
            }
            if state.input().trim().is_empty() {
                client_debug!("Debounce fired on blank input; nothing to search");
                return (state, Vec::new());
            }
            let term = state.input().to_string();
            if state.active_term() != Some(term.as_str()) {
                state.start_term(term);
            }
            execute_search(&mut state)
        }
        SearchMsg::SearchCompleted { query_id, result } => {
            if !state.is_in_flight(query_id) {
                client_debug!("Dropping result of superseded query {}", query_id);
                return (state, Vec::new());
            }
            match result {
                Ok(page) => {
                    client_debug!(
                        "Query {} returned {} messages of {}",
                        query_id,
                        page.messages.len(),
                        page.total_matches
                    );
                    state.apply_page(page);
                }
                Err(failure) => {
                    client_info!("Query {} failed: {}", query_id, failure);
                    state.apply_failure(failure);
                }
            }
            Vec::new()
        }
        SearchMsg::LoadMoreClicked => {
            if state.in_flight_query().is_some() || !state.has_more() {
                return (state, Vec::new());
            }
            state.advance_offset();
            execute_search(&mut state)
        }
        SearchMsg::RetryClicked => {
            if state.in_flight_query().is_some() {
                return (state, Vec::new());
            }
            match state.take_failed_query() {
                Some(query) => issue(&mut state, query),
                None => Vec::new(),
            }
        }
        SearchMsg::OpenRequested { index } => {
            let id = state
                .messages()
                .get(index)
                .and_then(|message| message.id())
                .map(ToOwned::to_owned);
            match id {
                Some(id) => {
                    state.open(id.clone());
                    vec![SearchEffect::LocateMessage { id }]
                }
                None => Vec::new(),
            }
        }
        SearchMsg::BodyLoaded { id, result } => {
            if !state.apply_body(&id, result) {
                client_trace!("Ignoring body for message {} that is no longer open", id);
            }
            Vec::new()
        }
        SearchMsg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn execute_search(state: &mut SearchState) -> Vec<SearchEffect> {
    let Some(term) = state.active_term().map(ToOwned::to_owned) else {
        return Vec::new();
    };
    let query = SearchQuery {
        term,
        offset: state.offset(),
    };
    issue(state, query)
}

fn issue(state: &mut SearchState, query: SearchQuery) -> Vec<SearchEffect> {
    let (query_id, superseded) = state.begin_query(query.clone());
    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = superseded {
        effects.push(SearchEffect::AbortSearch { query_id: previous });
    }
    effects.push(SearchEffect::ExecuteSearch { query_id, query });
    effects
}

/// Pure update function for the reload client.
pub fn update_reload(mut state: ReloadState, msg: ReloadMsg) -> (ReloadState, Vec<ReloadEffect>) {
    if state.connection() == ConnectionState::Reloading {
        return (state, Vec::new());
    }

    let effects = match msg {
        ReloadMsg::Started => {
            if state.connection() == ConnectionState::Disconnected && !state.reconnect_pending() {
                state.set_connection(ConnectionState::Connecting);
                vec![ReloadEffect::Connect]
            } else {
                Vec::new()
            }
        }
        ReloadMsg::SocketOpened => {
            client_info!("Reload server connected.");
            if state.take_connectivity_lost() {
                client_info!("Connectivity was previously lost. Reloading.");
                state.set_connection(ConnectionState::Reloading);
                vec![ReloadEffect::CloseSocket, ReloadEffect::Reload]
            } else {
                state.set_connection(ConnectionState::Connected);
                Vec::new()
            }
        }
        ReloadMsg::SocketClosed => {
            state.set_connection(ConnectionState::Disconnected);
            state.mark_connectivity_lost();
            if state.arm_reconnect() {
                client_info!(
                    "Reload server disconnected. Will retry in {:?}.",
                    state.reconnect_delay()
                );
                vec![ReloadEffect::ScheduleReconnect {
                    delay: state.reconnect_delay(),
                }]
            } else {
                Vec::new()
            }
        }
        ReloadMsg::SignalReceived => {
            if state.connection() == ConnectionState::Connected {
                state.set_connection(ConnectionState::Reloading);
                vec![ReloadEffect::CloseSocket, ReloadEffect::Reload]
            } else {
                Vec::new()
            }
        }
        ReloadMsg::ReconnectElapsed => {
            if state.take_reconnect() {
                state.set_connection(ConnectionState::Connecting);
                vec![ReloadEffect::Connect]
            } else {
                Vec::new()
            }
        }
        ReloadMsg::NoOp => Vec::new(),
    };

    (state, effects)
}

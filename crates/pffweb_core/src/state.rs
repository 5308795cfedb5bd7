use std::time::Duration;

use crate::view_model::{ErrorView, LoadMore, OpenedMessageView, SearchViewModel};
use crate::{DebounceTicket, Message, MessageBody, QueryId, SearchFailure, SearchPage, SearchQuery};

/// Quiet window after the last key-up before a query is issued.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(500);
/// Fixed delay before reconnecting the reload socket.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlightQuery {
    query_id: QueryId,
    query: SearchQuery,
}

#[derive(Debug, Clone, PartialEq)]
struct OpenedMessage {
    id: String,
    body: Option<Result<MessageBody, SearchFailure>>,
}

/// Search controller state: accumulated results and pagination cursor.
///
/// `offset` always equals the number of messages already fetched for the
/// active term when a query is issued.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    debounce_delay: Duration,
    input: String,
    active_term: Option<String>,
    messages: Vec<Message>,
    total_matches: usize,
    offset: usize,
    debounce_ticket: DebounceTicket,
    debounce_pending: bool,
    next_query_id: QueryId,
    in_flight: Option<InFlightQuery>,
    failed_query: Option<SearchQuery>,
    error: Option<SearchFailure>,
    opened: Option<OpenedMessage>,
    dirty: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self::with_debounce_delay(DEFAULT_DEBOUNCE_DELAY)
    }

    pub fn with_debounce_delay(debounce_delay: Duration) -> Self {
        Self {
            debounce_delay,
            input: String::new(),
            active_term: None,
            messages: Vec::new(),
            total_matches: 0,
            offset: 0,
            debounce_ticket: 0,
            debounce_pending: false,
            next_query_id: 1,
            in_flight: None,
            failed_query: None,
            error: None,
            opened: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> SearchViewModel {
        SearchViewModel {
            input: self.input.clone(),
            term: self.active_term.clone(),
            messages: self.messages.clone(),
            total_matches: self.total_matches,
            loading: self.in_flight.is_some(),
            load_more: self.load_more(),
            error: self.error.as_ref().map(|failure| ErrorView {
                message: failure.to_string(),
                can_retry: self.failed_query.is_some(),
            }),
            opened: self.opened.as_ref().map(|opened| OpenedMessageView {
                id: opened.id.clone(),
                body: opened.body.clone(),
            }),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn active_term(&self) -> Option<&str> {
        self.active_term.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce_delay
    }

    pub fn in_flight_query(&self) -> Option<&SearchQuery> {
        self.in_flight.as_ref().map(|in_flight| &in_flight.query)
    }

    pub fn error(&self) -> Option<&SearchFailure> {
        self.error.as_ref()
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// No debounce, query or body lookup is outstanding.
    pub fn is_settled(&self) -> bool {
        !self.debounce_pending
            && self.in_flight.is_none()
            && !self
                .opened
                .as_ref()
                .is_some_and(|opened| opened.body.is_none())
    }

    /// More results are known to exist beyond those held.
    ///
    /// Compares the held count rather than `offset + held`: `offset` is
    /// always reset to the held count before a query, so adding it would
    /// count the first pages twice.
    pub fn has_more(&self) -> bool {
        self.active_term.is_some() && self.messages.len() < self.total_matches
    }

    fn load_more(&self) -> Option<LoadMore> {
        if self.in_flight.is_some() || !self.has_more() {
            return None;
        }
        Some(LoadMore {
            next_offset: self.messages.len(),
            remaining: self.total_matches - self.messages.len(),
        })
    }

    pub(crate) fn set_input(&mut self, value: String) {
        self.input = value;
    }

    pub(crate) fn arm_debounce(&mut self) -> DebounceTicket {
        self.debounce_ticket += 1;
        self.debounce_pending = true;
        self.debounce_ticket
    }

    /// Consumes the pending debounce if `ticket` is the newest one.
    pub(crate) fn take_debounce(&mut self, ticket: DebounceTicket) -> bool {
        if self.debounce_pending && ticket == self.debounce_ticket {
            self.debounce_pending = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn start_term(&mut self, term: String) {
        self.active_term = Some(term);
        self.messages.clear();
        self.total_matches = 0;
        self.offset = 0;
        self.failed_query = None;
        self.error = None;
        self.opened = None;
        self.dirty = true;
    }

    pub(crate) fn advance_offset(&mut self) {
        self.offset = self.messages.len();
    }

    /// Records `query` as in flight; returns its id and the superseded id, if any.
    pub(crate) fn begin_query(&mut self, query: SearchQuery) -> (QueryId, Option<QueryId>) {
        let query_id = self.next_query_id;
        self.next_query_id += 1;
        let superseded = self
            .in_flight
            .replace(InFlightQuery { query_id, query })
            .map(|previous| previous.query_id);
        self.dirty = true;
        (query_id, superseded)
    }

    pub(crate) fn is_in_flight(&self, query_id: QueryId) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.query_id == query_id)
    }

    pub(crate) fn apply_page(&mut self, page: SearchPage) {
        self.in_flight = None;
        self.messages.extend(page.messages);
        self.total_matches = page.total_matches;
        self.failed_query = None;
        self.error = None;
        self.dirty = true;
    }

    pub(crate) fn apply_failure(&mut self, failure: SearchFailure) {
        if let Some(in_flight) = self.in_flight.take() {
            self.failed_query = Some(in_flight.query);
        }
        self.error = Some(failure);
        self.dirty = true;
    }

    pub(crate) fn take_failed_query(&mut self) -> Option<SearchQuery> {
        let query = self.failed_query.take()?;
        self.error = None;
        Some(query)
    }

    pub(crate) fn open(&mut self, id: String) {
        self.opened = Some(OpenedMessage { id, body: None });
        self.dirty = true;
    }

    pub(crate) fn apply_body(&mut self, id: &str, body: Result<MessageBody, SearchFailure>) -> bool {
        match self.opened.as_mut() {
            Some(opened) if opened.id == id => {
                opened.body = Some(body);
                self.dirty = true;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// A reload was requested; the client is finished.
    Reloading,
}

/// Reload client state.
///
/// `connectivity_lost` is the only memory carried across connection cycles:
/// it decides whether the next successful open triggers a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadState {
    connection: ConnectionState,
    connectivity_lost: bool,
    reconnect_pending: bool,
    reconnect_delay: Duration,
}

impl Default for ReloadState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadState {
    pub fn new() -> Self {
        Self::with_reconnect_delay(DEFAULT_RECONNECT_DELAY)
    }

    pub fn with_reconnect_delay(reconnect_delay: Duration) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            connectivity_lost: false,
            reconnect_pending: false,
            reconnect_delay,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn connectivity_lost(&self) -> bool {
        self.connectivity_lost
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    /// Clears the lost flag, returning whether it was set.
    pub(crate) fn take_connectivity_lost(&mut self) -> bool {
        std::mem::take(&mut self.connectivity_lost)
    }

    pub(crate) fn mark_connectivity_lost(&mut self) {
        self.connectivity_lost = true;
    }

    /// Arms the reconnect timer; returns false if one is already pending.
    pub(crate) fn arm_reconnect(&mut self) -> bool {
        !std::mem::replace(&mut self.reconnect_pending, true)
    }

    pub(crate) fn take_reconnect(&mut self) -> bool {
        std::mem::take(&mut self.reconnect_pending)
    }
}

use crate::{DebounceTicket, MessageBody, QueryId, SearchFailure, SearchPage};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchMsg {
    /// A key was released in the search box; carries the full input value.
    KeyUp(String),
    /// The debounce scheduled for `ticket` elapsed without being cancelled.
    DebounceElapsed { ticket: DebounceTicket },
    /// Server response (or failure) for a query.
    SearchCompleted {
        query_id: QueryId,
        result: Result<SearchPage, SearchFailure>,
    },
    /// User activated the load-more affordance.
    LoadMoreClicked,
    /// User asked to retry the last failed query.
    RetryClicked,
    /// User asked to open the accumulated message at `index`.
    OpenRequested { index: usize },
    /// Body lookup finished for message `id`.
    BodyLoaded {
        id: String,
        result: Result<MessageBody, SearchFailure>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadMsg {
    /// Client created; make the first connection attempt.
    Started,
    SocketOpened,
    /// Socket closed, errored, or a connection attempt failed.
    SocketClosed,
    /// Any data message arrived on the socket.
    SignalReceived,
    ReconnectElapsed,
    NoOp,
}

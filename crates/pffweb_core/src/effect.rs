use std::time::Duration;

use crate::{DebounceTicket, QueryId, SearchQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEffect {
    /// Cancel any pending debounce and schedule a new one for `ticket`.
    ScheduleDebounce {
        ticket: DebounceTicket,
        delay: Duration,
    },
    ExecuteSearch {
        query_id: QueryId,
        query: SearchQuery,
    },
    /// The query was superseded; its result will be ignored.
    AbortSearch { query_id: QueryId },
    LocateMessage { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEffect {
    Connect,
    ScheduleReconnect { delay: Duration },
    CloseSocket,
    /// Discard all client state and reload.
    Reload,
}

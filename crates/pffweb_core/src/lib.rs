//! pffweb core: pure search and reload state machines plus view-model helpers.
mod effect;
mod message;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{ReloadEffect, SearchEffect};
pub use message::{
    DebounceTicket, FailureReason, Message, MessageBody, QueryId, SearchFailure, SearchPage,
    SearchQuery,
};
pub use msg::{ReloadMsg, SearchMsg};
pub use state::{
    ConnectionState, ReloadState, SearchState, DEFAULT_DEBOUNCE_DELAY, DEFAULT_RECONNECT_DELAY,
};
pub use update::{update_reload, update_search};
pub use view_model::{ErrorView, LoadMore, OpenedMessageView, SearchViewModel};

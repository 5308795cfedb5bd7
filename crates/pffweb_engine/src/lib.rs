//! pffweb engine: HTTP search backend, timers, reload socket and effect execution.
mod endpoint;
mod engine;
mod reload;
mod schedule;
mod search;
mod types;

pub use endpoint::{locate_message_url, reload_url, search_url};
pub use engine::{EngineHandle, EventSink};
pub use reload::{
    ReloadConnection, ReloadError, ReloadSignal, ReloadTransport, TungsteniteTransport,
};
pub use schedule::{Debouncer, ScheduledTask};
pub use search::{ReqwestSearchBackend, SearchBackend, SearchSettings};
pub use types::{
    DebounceTicket, EngineEvent, FailureKind, MessageBody, QueryId, SearchError, SearchResponse,
};

use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_error};
use tokio::task::JoinHandle;

use crate::schedule::Debouncer;
use crate::search::SearchBackend;
use crate::{DebounceTicket, EngineEvent, QueryId};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

enum EngineCommand {
    ScheduleDebounce {
        ticket: DebounceTicket,
        delay: Duration,
    },
    Search {
        query_id: QueryId,
        term: String,
        offset: usize,
    },
    Abort {
        query_id: QueryId,
    },
    LocateMessage {
        id: String,
    },
}

/// Runs IO on a dedicated runtime thread; results come back through the sink.
///
/// Dropping the handle stops the thread once queued commands are drained.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn SearchBackend>, sink: Arc<dyn EventSink>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    client_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut worker = Worker {
                runtime: runtime.handle().clone(),
                debouncer: Debouncer::new(runtime.handle().clone()),
                searches: HashMap::new(),
                backend,
                sink,
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(command);
            }
            worker.debouncer.cancel();
        });

        Self { cmd_tx }
    }

    pub fn schedule_debounce(&self, ticket: DebounceTicket, delay: Duration) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ScheduleDebounce { ticket, delay });
    }

    pub fn search(&self, query_id: QueryId, term: impl Into<String>, offset: usize) {
        let _ = self.cmd_tx.send(EngineCommand::Search {
            query_id,
            term: term.into(),
            offset,
        });
    }

    pub fn abort(&self, query_id: QueryId) {
        let _ = self.cmd_tx.send(EngineCommand::Abort { query_id });
    }

    pub fn locate_message(&self, id: impl Into<String>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::LocateMessage { id: id.into() });
    }
}

struct Worker {
    runtime: tokio::runtime::Handle,
    debouncer: Debouncer,
    searches: HashMap<QueryId, JoinHandle<()>>,
    backend: Arc<dyn SearchBackend>,
    sink: Arc<dyn EventSink>,
}

impl Worker {
    fn handle(&mut self, command: EngineCommand) {
        self.searches.retain(|_, task| !task.is_finished());

        match command {
            EngineCommand::ScheduleDebounce { ticket, delay } => {
                let sink = self.sink.clone();
                self.debouncer.trigger(delay, move || {
                    sink.emit(EngineEvent::DebounceElapsed { ticket });
                });
            }
            EngineCommand::Search {
                query_id,
                term,
                offset,
            } => {
                let backend = self.backend.clone();
                let sink = self.sink.clone();
                let task = self.runtime.spawn(async move {
                    let result = backend.search(&term, offset).await;
                    sink.emit(EngineEvent::SearchCompleted { query_id, result });
                });
                self.searches.insert(query_id, task);
            }
            EngineCommand::Abort { query_id } => {
                if let Some(task) = self.searches.remove(&query_id) {
                    client_debug!("Aborting query {}", query_id);
                    task.abort();
                }
            }
            EngineCommand::LocateMessage { id } => {
                let backend = self.backend.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let result = backend.locate_message(&id).await;
                    sink.emit(EngineEvent::MessageLocated { id, result });
                });
            }
        }
    }
}

use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use client_logging::{client_debug, client_info};
use pffweb_core::{update_search, LoadMore, SearchMsg, SearchState};
use pffweb_engine::ReqwestSearchBackend;

use crate::config::ClientConfig;
use crate::effects::{EffectExecutor, EffectRunner};
use crate::render::render;

/// Everything the search loop reacts to, in arrival order.
#[derive(Debug)]
pub enum AppEvent {
    Search(SearchMsg),
    Command(Command),
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A new value of the search box.
    Input(String),
    LoadMore,
    Retry,
    /// One-based message number as shown in the listing.
    Open(usize),
    Quit,
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed {
        ":more" | ":m" => Command::LoadMore,
        ":retry" | ":r" => Command::Retry,
        ":quit" | ":q" => Command::Quit,
        _ => match trimmed.strip_prefix(":open ") {
            Some(number) => match number.trim().parse() {
                Ok(number) => Command::Open(number),
                Err(_) => Command::Input(line.to_string()),
            },
            None => Command::Input(line.to_string()),
        },
    }
}

/// Owns the search state for the lifetime of one interactive session.
pub struct SearchSession<E, W> {
    state: SearchState,
    effects: E,
    out: W,
    load_more: Option<LoadMore>,
}

impl<E: EffectExecutor, W: Write> SearchSession<E, W> {
    pub fn new(state: SearchState, effects: E, out: W) -> Self {
        Self {
            state,
            effects,
            out,
            load_more: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Returns `false` when the session should end.
    pub fn handle_command(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::Input(value) => self.dispatch(SearchMsg::KeyUp(value))?,
            Command::LoadMore => {
                // Only the affordance from the latest render can be activated.
                if self.load_more.is_some() {
                    self.dispatch(SearchMsg::LoadMoreClicked)?;
                } else {
                    writeln!(self.out, "Nothing more to load.")?;
                }
            }
            Command::Retry => self.dispatch(SearchMsg::RetryClicked)?,
            Command::Open(number) => match number.checked_sub(1) {
                Some(index) => self.dispatch(SearchMsg::OpenRequested { index })?,
                None => writeln!(self.out, "Messages are numbered from 1.")?,
            },
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    pub fn dispatch(&mut self, msg: SearchMsg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update_search(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.effects.enqueue(effects);

        if was_dirty {
            self.render()?;
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let rendered = render(&self.state.view());
        for line in &rendered.lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        self.load_more = rendered.load_more;
        Ok(())
    }
}

/// Runs the interactive search loop on stdin/stdout until `:quit` or end of input.
pub fn run_search(config: &ClientConfig, initial_query: Option<String>) -> anyhow::Result<()> {
    let backend = ReqwestSearchBackend::new(config.search_settings()?)
        .context("failed to build search client")?;
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(Arc::new(backend), event_tx.clone());

    spawn_stdin_reader(event_tx.clone());
    if let Some(query) = initial_query {
        let _ = event_tx.send(AppEvent::Command(Command::Input(query)));
    }
    drop(event_tx);

    let state = SearchState::with_debounce_delay(config.debounce_delay());
    let mut session = SearchSession::new(state, runner, io::stdout());
    client_info!("Searching against {}", config.base_url);

    let mut input_closed = false;
    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Search(msg) => session.dispatch(msg)?,
            AppEvent::Command(command) => {
                if !session.handle_command(command)? {
                    break;
                }
            }
            AppEvent::InputClosed => {
                client_debug!("Input closed; waiting for outstanding work");
                input_closed = true;
            }
        }
        if input_closed && session.state().is_settled() {
            break;
        }
    }
    Ok(())
}

fn spawn_stdin_reader(events: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if events
                .send(AppEvent::Command(parse_command(&line)))
                .is_err()
            {
                return;
            }
        }
        let _ = events.send(AppEvent::InputClosed);
    });
}

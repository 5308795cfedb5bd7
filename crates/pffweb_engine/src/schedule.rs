use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A task that runs once after a delay unless cancelled first.
#[derive(Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn schedule<F>(runtime: &Handle, delay: Duration, task: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let join = runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => task(),
            }
        });
        Self { token, join }
    }

    /// Prevents the task from running if it has not fired yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Cancel-and-reschedule wrapper: only the most recent trigger can fire.
#[derive(Debug)]
pub struct Debouncer {
    runtime: Handle,
    pending: Option<ScheduledTask>,
}

impl Debouncer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: None,
        }
    }

    pub fn trigger<F>(&mut self, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(ScheduledTask::schedule(&self.runtime, delay, task));
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
    }

    /// True while a trigger is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|task| !task.is_finished() && !task.token.is_cancelled())
    }
}

//! Per-question countdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining_secs` is what is left on the clock.
    Tick { remaining_secs: u32 },
    /// The budget is used up. Always the last event of a countdown.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    #[default]
    Idle,
    Running { budget_secs: u32 },
    Expired,
}

/// A cancellable countdown running on its own tokio task.
///
/// Every start gets a fresh channel, so events of a superseded countdown are
/// never delivered.
#[derive(Debug, Default)]
pub struct Countdown {
    task: Option<JoinHandle<()>>,
    events: Option<mpsc::Receiver<TimerEvent>>,
    state: CountdownState,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down `budget_secs`, replacing any running countdown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, budget_secs: u32) {
        self.cancel();
        let (tx, rx) = mpsc::channel(16);
        self.task = Some(tokio::spawn(run(budget_secs, tx)));
        self.events = Some(rx);
        self.state = CountdownState::Running { budget_secs };
        tracing::debug!(budget_secs, "countdown started");
    }

    /// Stop the countdown. Pending events are dropped.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events = None;
        self.state = CountdownState::Idle;
    }

    #[must_use]
    pub fn state(&self) -> CountdownState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, CountdownState::Running { .. })
    }

    /// Wait for the next event of the current countdown.
    ///
    /// Returns `None` when no countdown is running or it already expired.
    pub async fn next_event(&mut self) -> Option<TimerEvent> {
        let events = self.events.as_mut()?;
        let event = events.recv().await;
        if matches!(event, Some(TimerEvent::Expired) | None) {
            self.events = None;
            self.task = None;
            self.state = CountdownState::Expired;
        }
        event
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(budget_secs: u32, tx: mpsc::Sender<TimerEvent>) {
    if budget_secs > 0 {
        let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
        for remaining_secs in (0..budget_secs).rev() {
            ticker.tick().await;
            if tx.send(TimerEvent::Tick { remaining_secs }).await.is_err() {
                return;
            }
        }
    }
    let _ = tx.send(TimerEvent::Expired).await;
}

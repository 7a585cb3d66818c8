//! Run progress tracking
//!
//! A run does not know its full task count up front: sections are known
//! first, each section's classes once fetched, then each class's days. The
//! counter pair grows via `schedule_more` as levels are discovered and is
//! advanced via `complete_one`; completion never regresses and saturates at
//! the current total. Observers subscribe through a watch channel.

use std::sync::Mutex;

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}

impl ProgressSnapshot {
    fn initial() -> Self {
        Self { completed: 0, total: 1, message: "Initializing...".to_string() }
    }
}

/// Mutable `(completed, total)` pair owned by a health run.
pub struct Progress {
    state: Mutex<ProgressSnapshot>,
    tx: watch::Sender<ProgressSnapshot>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        let snapshot = ProgressSnapshot::initial();
        let (tx, _) = watch::channel(snapshot.clone());
        Self { state: Mutex::new(snapshot), tx }
    }

    /// Start a fresh count with `initial_tasks` already scheduled.
    pub fn reset(&self, initial_tasks: usize, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.completed = 0;
        state.total = initial_tasks.max(1);
        state.message = message.to_string();
        let _ = self.tx.send(state.clone());
    }

    /// Extend the total as a new level of the tree becomes known.
    pub fn schedule_more(&self, count: usize) {
        if count == 0 {
            return;
        }
        let mut state = self.state.lock().unwrap();
        state.total += count;
        let _ = self.tx.send(state.clone());
    }

    /// Mark one task done. Saturates at the current total.
    pub fn complete_one(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        if state.total == 0 {
            state.total = 1;
        }
        state.completed = (state.completed + 1).min(state.total);
        if !message.is_empty() {
            state.message = message.to_string();
        }
        let _ = self.tx.send(state.clone());
    }

    /// Update only the status message.
    pub fn set_message(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.message = message.to_string();
        let _ = self.tx.send(state.clone());
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.state.lock().unwrap().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }
}

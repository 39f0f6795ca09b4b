use std::collections::VecDeque;

use crate::plan::Action;

/// FIFO queue of pending plan steps.
///
/// The control loop pops from the front; a replan swaps the whole remainder
/// in one call, so the queue never holds a mix of old and new plan.
#[derive(Debug, Default)]
pub struct PlanStore {
    queue: VecDeque<Action>,
}

impl PlanStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a plan.
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self {
            queue: actions.into(),
        }
    }

    /// Remove and return the next pending step.
    pub fn pop_front(&mut self) -> Option<Action> {
        self.queue.pop_front()
    }

    /// Look at the next pending step without removing it.
    pub fn peek(&self) -> Option<&Action> {
        self.queue.front()
    }

    /// Append a step to the end of the plan.
    pub fn push_back(&mut self, action: Action) {
        self.queue.push_back(action);
    }

    /// Discard every pending step and install a new plan.
    pub fn replace(&mut self, actions: Vec<Action>) {
        self.queue = actions.into();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate the pending steps in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.queue.iter()
    }

    /// Copy of the pending steps, in execution order. This is what the
    /// verifier sees as the remaining plan.
    pub fn snapshot(&self) -> Vec<Action> {
        self.queue.iter().cloned().collect()
    }
}

/// Append-only log of the steps executed so far, in their canonical line
/// form. The verifier receives this as context when judging progress.
#[derive(Debug, Default)]
pub struct ExecutionRecord {
    entries: Vec<String>,
}

impl ExecutionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an executed step.
    pub fn record(&mut self, action: &Action) {
        self.entries.push(action.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The record as one line per step, oldest first.
    pub fn summary(&self) -> String {
        self.entries.join("\n")
    }
}

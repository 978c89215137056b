//! Deferred work for the UI thread.
//!
//! Window teardown never happens inside the call that approved it: the
//! window posts a [`Task`] and the host runs it once the current turn
//! has unwound.

use crate::window::WindowId;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Work a window asks the host to perform later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Re-run the close flow; posted once the tab strip has been drained
    CloseWindow(WindowId),
    /// Destroy the window object
    DeleteWindow(WindowId),
}

impl Task {
    pub fn window(&self) -> WindowId {
        match self {
            Task::CloseWindow(id) | Task::DeleteWindow(id) => *id,
        }
    }
}

/// Accepts tasks to run after the current event-loop turn
pub trait TaskRunner {
    fn post(&self, task: Task);
}

/// FIFO task queue for a single-threaded host
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest task, if any
    pub fn pop(&self) -> Option<Task> {
        self.tasks.borrow_mut().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl TaskRunner for TaskQueue {
    fn post(&self, task: Task) {
        tracing::trace!("Posting {:?}", task);
        self.tasks.borrow_mut().push_back(task);
    }
}
